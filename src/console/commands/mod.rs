mod callable;
pub mod legacy;

pub use callable::*;

pub mod cancel;
pub mod container_runtime;
pub mod detector;
pub mod error;
pub mod executor;
pub mod progress;

#[cfg(test)]
pub(crate) mod testing;

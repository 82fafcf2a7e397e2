pub mod config_renderer;

pub use config_renderer::{ConfigRenderer, DEFAULT_COMPOSE_TEMPLATE};

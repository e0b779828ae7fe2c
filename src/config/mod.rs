pub mod env;
mod loader;

pub use env::{AkismetSettings, AppConfig, ConfigError, FormSettings, SiteSettings};
pub use loader::load_config;

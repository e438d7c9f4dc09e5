//! Configuration system
//!
//! Schemas are defined once via the `config_struct!` macro with embedded
//! defaults, loaded from `config.toml` into a global `OnceCell`, and read
//! through `with_config`. Credentials may come from the environment instead
//! of the file.

pub mod macros;
pub mod schemas;
pub mod utils;

pub use schemas::{Config, GeneralConfig, ScraperConfig, TelegramConfig};
pub use utils::{get_config, load_config_from_path, with_config, CONFIG};

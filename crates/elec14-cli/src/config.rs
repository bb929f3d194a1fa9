//! Evaluation settings merged from built-in defaults, an optional TOML file,
//! `--set` overrides and command-line flags, in increasing precedence.

mod builder;
mod defaults;
mod file;
mod models;

pub use builder::build_config;
pub use models::AppConfig;

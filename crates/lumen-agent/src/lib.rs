//! Lumen Agent - Runtime Layer
//!
//! Binds the headless composer in `lumen-app` to real infrastructure:
//!
//! - [`HttpBridge`]: `reqwest` implementation of [`lumen_app::ComposerBridge`]
//! - [`AgentConfig`]: TOML file plus environment overrides
//! - [`init_tracing`]: `tracing-subscriber` setup
//!
//! The `lumen-host` binary drives one composition session from the command
//! line using these pieces.

#![forbid(unsafe_code)]

pub mod config;
pub mod http;
pub mod logging;

pub use config::{AgentConfig, ConfigError};
pub use http::HttpBridge;
pub use logging::init_tracing;

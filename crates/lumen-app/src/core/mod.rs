//! # Core Composer Module
//!
//! This module contains the composer entry point and its supporting types:
//!
//! - [`Composer`]: The session-owning facade hosts drive
//! - [`ComposerConfig`]: Composer configuration
//! - [`CommandSlot`]: Registry for externally invoked commands
//! - [`ComposerError`]: Error type for composer operations

mod command_slot;
mod composer;
mod config;
mod error;

pub use command_slot::{CommandSlot, ComposerCommand, SlotRegistration};
pub use composer::{Composer, ComposerSession, ComposerUpdate};
pub use config::{ComposerConfig, DEFAULT_ANIMATION_KIND, DEFAULT_API_BASE, DEFAULT_SHARE_BASE};
pub use error::ComposerError;

//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the mobile music core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the other modules depend on.
//! It establishes the logging conventions, the bridge-handle wiring, and the
//! event broadcasting mechanism used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};

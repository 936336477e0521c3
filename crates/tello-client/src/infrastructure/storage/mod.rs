//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from an explicit path or the
//!   platform-appropriate directory.
//! - Writing a configuration back to disk (used to emit a starter file).
//! - Providing defaults for every setting when the file, a section, or a
//!   field is missing.

pub mod config;

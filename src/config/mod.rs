//! Configuration management.
//!
//! Application configuration lives in a TOML file in the user's config
//! directory; defaults apply when the file is absent.

pub mod file;

pub use file::{config_path, AudioConfig, WaveformConfig, WavetapConfig};

//! Application command handlers.
//!
//! One submodule per command.
//!
//! # Commands
//! - `record`: Live waveform scope with capture-to-WAV (default command)
//! - `replay`: Play back a saved recording
//! - `config`: Open configuration file in the user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod replay;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use replay::handle_replay;

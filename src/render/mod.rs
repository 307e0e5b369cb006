//! Waveform rendering: path projection and the terminal scope view.

pub mod path;
pub mod ui;

pub use ui::{FrameStatus, ScopeCommand, ScopeTui};

//! Microphone capture pipeline.
//!
//! The producer (`input`) pushes mono sample blocks from the audio callback
//! into a bounded hand-off queue (`handoff`); a per-session drain thread
//! moves them through the WAV sink (`writer`) and the stride downsampler
//! (`downsample`) into the bounded history ring (`history`). The session
//! controller (`session`) owns the lifecycle; `recordings` indexes the
//! saved WAV files.

pub mod downsample;
pub mod handoff;
pub mod history;
pub mod input;
pub mod recordings;
pub mod session;
pub mod writer;

pub use downsample::downsample_block;
pub use handoff::{handoff_channel, BlockSender, HANDOFF_CAPACITY};
pub use history::HistoryBuffer;
pub use input::InputStream;
pub use recordings::{RecordingEntry, RecordingStore};
pub use session::{AcquiredStream, CaptureSession, CaptureState, CaptureSummary, StreamHandle};
pub use writer::WavSink;

//! Capture session lifecycle.
//!
//! A session covers one microphone-open-to-close cycle: Idle until started,
//! Capturing while the device stream feeds the pipeline, Stopped once the
//! stream is released. Starting resets the history buffer, acquires the
//! device stream, and spawns the drain thread that moves blocks from the
//! hand-off queue into the WAV sink and the history buffer. Stopping drops
//! the stream handle (no callbacks run afterwards), then joins the drain
//! thread, which consumes whatever is still queued and finalizes the WAV
//! file. Stop is idempotent; the final waveform stays readable after it.

use anyhow::{anyhow, Result};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use super::downsample::downsample_block;
use super::handoff::{handoff_channel, BlockSender, HANDOFF_CAPACITY};
use super::history::HistoryBuffer;
use super::writer::WavSink;

/// Lifecycle state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No device stream open.
    Idle,
    /// Device stream open, pipeline running.
    Capturing,
    /// Stream released; history retained for display.
    Stopped,
}

/// Marker for an open device stream. Dropping the handle releases the
/// device; no producer callbacks run after the drop returns.
pub trait StreamHandle {}

/// A successfully acquired device stream plus its native parameters.
pub struct AcquiredStream {
    pub handle: Box<dyn StreamHandle>,
    pub sample_rate: u32,
    pub device_name: String,
}

/// Result of a finished capture.
pub struct CaptureSummary {
    /// WAV file written during the session, if recording was requested.
    pub output: Option<PathBuf>,
    /// Full-rate samples written to the WAV sink.
    pub samples_recorded: u64,
    /// Blocks dropped at the hand-off queue.
    pub blocks_dropped: usize,
}

pub struct CaptureSession {
    state: CaptureState,
    downsample_factor: usize,
    history: Arc<Mutex<HistoryBuffer>>,
    dropped: Arc<AtomicUsize>,
    stream: Option<AcquiredStream>,
    drain: Option<JoinHandle<Result<u64>>>,
    output: Option<PathBuf>,
    sample_rate: u32,
    device_name: String,
}

impl CaptureSession {
    pub fn new(downsample_factor: usize, max_visible: usize) -> Self {
        Self {
            state: CaptureState::Idle,
            downsample_factor,
            history: Arc::new(Mutex::new(HistoryBuffer::new(max_visible))),
            dropped: Arc::new(AtomicUsize::new(0)),
            stream: None,
            drain: None,
            output: None,
            sample_rate: 0,
            device_name: String::new(),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_capturing(&self) -> bool {
        self.state == CaptureState::Capturing
    }

    /// Shared handle to the history buffer for the renderer.
    pub fn history(&self) -> Arc<Mutex<HistoryBuffer>> {
        Arc::clone(&self.history)
    }

    /// Blocks dropped at the hand-off queue during the current session.
    pub fn blocks_dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Native sample rate of the active (or last) device stream.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Starts capturing. Resets the history buffer, acquires a device
    /// stream via `acquire`, and wires the pipeline. A restart from Stopped
    /// first discards the previous session's handle and buffer contents.
    ///
    /// If `output` is set, full-rate samples are written there as 16-bit
    /// PCM WAV until the session stops.
    ///
    /// # Errors
    /// - If stream acquisition fails (state stays Idle, buffer untouched
    ///   beyond the reset)
    /// - If the WAV output file cannot be created
    pub fn start<F>(&mut self, output: Option<PathBuf>, acquire: F) -> Result<()>
    where
        F: FnOnce(BlockSender) -> Result<AcquiredStream>,
    {
        self.discard_previous();
        self.state = CaptureState::Idle;
        self.history.lock().unwrap().reset();
        self.dropped.store(0, Ordering::Relaxed);

        let (sender, receiver) = handoff_channel(HANDOFF_CAPACITY, Arc::clone(&self.dropped));
        let acquired = acquire(sender)?;

        let sink = match &output {
            Some(path) => Some(WavSink::create(path, acquired.sample_rate)?),
            None => None,
        };

        let history = Arc::clone(&self.history);
        let factor = self.downsample_factor;
        let drain = thread::Builder::new()
            .name("wavetap-drain".to_string())
            .spawn(move || drain_loop(receiver, history, sink, factor))?;

        self.sample_rate = acquired.sample_rate;
        self.device_name = acquired.device_name.clone();
        self.stream = Some(acquired);
        self.drain = Some(drain);
        self.output = output;
        self.state = CaptureState::Capturing;

        tracing::info!(
            "Capture started on {} at {}Hz (stride {})",
            self.device_name,
            self.sample_rate,
            factor
        );
        Ok(())
    }

    /// Stops capturing: releases the device stream, drains the queue, and
    /// finalizes the WAV output. Returns `None` when there was nothing to
    /// stop; calling this twice is a no-op.
    pub fn stop(&mut self) -> Result<Option<CaptureSummary>> {
        if self.state != CaptureState::Capturing {
            return Ok(None);
        }

        // Dropping the handle stops the callbacks; the callback's sender
        // goes with it, disconnecting the queue so the drain thread exits
        // after consuming what is left.
        self.stream = None;

        let samples_recorded = match self.drain.take() {
            Some(handle) => match handle.join() {
                Ok(result) => result?,
                Err(_) => return Err(anyhow!("Capture drain thread panicked")),
            },
            None => 0,
        };

        self.state = CaptureState::Stopped;
        let summary = CaptureSummary {
            output: self.output.take(),
            samples_recorded,
            blocks_dropped: self.blocks_dropped(),
        };

        tracing::info!(
            "Capture stopped: {} samples recorded, {} blocks dropped",
            summary.samples_recorded,
            summary.blocks_dropped
        );
        Ok(Some(summary))
    }

    /// Drops any leftover stream and drain thread from an earlier session.
    fn discard_previous(&mut self) {
        self.stream = None;
        if let Some(handle) = self.drain.take() {
            match handle.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => tracing::warn!("Previous capture sink error: {e}"),
                Err(_) => tracing::warn!("Previous drain thread panicked"),
            }
        }
        self.output = None;
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!("Capture teardown failed: {e}");
        }
    }
}

/// Consumer side of the pipeline: WAV first, then downsample, then append.
/// Runs until every sender is gone and the queue is empty.
fn drain_loop(
    receiver: Receiver<Vec<f32>>,
    history: Arc<Mutex<HistoryBuffer>>,
    mut sink: Option<WavSink>,
    factor: usize,
) -> Result<u64> {
    while let Ok(block) = receiver.recv() {
        if let Some(sink) = sink.as_mut() {
            sink.write_block(&block)?;
        }
        let reduced = downsample_block(&block, factor);
        history.lock().unwrap().append(&reduced);
    }

    match sink {
        Some(sink) => {
            let written = sink.samples_written();
            sink.finalize()?;
            Ok(written)
        }
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    struct FakeHandle;
    impl StreamHandle for FakeHandle {}

    fn fake_stream(sender: BlockSender, tap: &mut Option<BlockSender>) -> Result<AcquiredStream> {
        *tap = Some(sender);
        Ok(AcquiredStream {
            handle: Box::new(FakeHandle),
            sample_rate: 48_000,
            device_name: "fake".to_string(),
        })
    }

    fn wait_for_len(session: &CaptureSession, expected: u64) {
        let history = session.history();
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            if history.lock().unwrap().len() == expected {
                return;
            }
            assert!(Instant::now() < deadline, "history never reached {expected} samples");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn block_flows_through_downsampler_into_history() {
        let mut session = CaptureSession::new(50, 5000);
        let mut tap = None;
        session.start(None, |s| fake_stream(s, &mut tap)).unwrap();
        assert_eq!(session.state(), CaptureState::Capturing);

        let sender = tap.take().unwrap();
        sender.send(vec![0.5; 1000]);
        wait_for_len(&session, 20);

        let visible = session.history().lock().unwrap().visible(5000);
        assert_eq!(visible.len(), 20);
        assert!(visible.iter().all(|&s| s == 0.5));

        drop(sender);
        session.stop().unwrap();
    }

    #[test]
    fn accepted_blocks_reach_history_in_arrival_order() {
        let mut session = CaptureSession::new(1, 100);
        let mut tap = None;
        session.start(None, |s| fake_stream(s, &mut tap)).unwrap();

        let sender = tap.take().unwrap();
        sender.send(vec![1.0, 2.0]);
        sender.send(vec![3.0]);
        sender.send(vec![4.0, 5.0]);
        wait_for_len(&session, 5);

        let visible = session.history().lock().unwrap().visible(100);
        assert_eq!(visible, vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        drop(sender);
        session.stop().unwrap();
    }

    #[test]
    fn stop_is_idempotent_and_retains_history() {
        let mut session = CaptureSession::new(1, 100);
        let mut tap = None;
        session.start(None, |s| fake_stream(s, &mut tap)).unwrap();

        let sender = tap.take().unwrap();
        sender.send(vec![0.1, 0.2]);
        wait_for_len(&session, 2);
        drop(sender);

        let first = session.stop().unwrap();
        assert!(first.is_some());
        assert_eq!(session.state(), CaptureState::Stopped);

        let second = session.stop().unwrap();
        assert!(second.is_none());
        assert_eq!(session.state(), CaptureState::Stopped);

        // Final contents stay readable after stop.
        assert_eq!(session.history().lock().unwrap().visible(100), vec![0.1, 0.2]);
    }

    #[test]
    fn restart_resets_history_before_new_data() {
        let mut session = CaptureSession::new(1, 100);
        let mut tap = None;
        session.start(None, |s| fake_stream(s, &mut tap)).unwrap();

        let sender = tap.take().unwrap();
        sender.send(vec![0.7; 10]);
        wait_for_len(&session, 10);
        drop(sender);
        session.stop().unwrap();

        let mut tap = None;
        session.start(None, |s| fake_stream(s, &mut tap)).unwrap();
        assert_eq!(session.state(), CaptureState::Capturing);
        assert_eq!(session.history().lock().unwrap().len(), 0);

        drop(tap.take());
        session.stop().unwrap();
    }

    #[test]
    fn failed_acquisition_leaves_idle_and_buffer_empty() {
        let mut session = CaptureSession::new(50, 5000);
        let err = session
            .start(None, |_sender| Err(anyhow!("permission denied")))
            .unwrap_err();

        assert!(err.to_string().contains("permission denied"));
        assert_eq!(session.state(), CaptureState::Idle);
        assert!(session.history().lock().unwrap().is_empty());
        assert!(session.stop().unwrap().is_none());
    }

    #[test]
    fn recording_writes_wav_while_capturing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");

        let mut session = CaptureSession::new(50, 5000);
        let mut tap = None;
        session
            .start(Some(path.clone()), |s| fake_stream(s, &mut tap))
            .unwrap();

        let sender = tap.take().unwrap();
        sender.send(vec![0.25; 500]);
        wait_for_len(&session, 10);
        drop(sender);

        let summary = session.stop().unwrap().unwrap();
        assert_eq!(summary.samples_recorded, 500);
        assert_eq!(summary.output.as_deref(), Some(path.as_path()));

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 48_000);
        assert_eq!(reader.len(), 500);
    }
}

//! Live microphone scope with capture-to-file recording.
//!
//! Runs the interactive TUI: a scrolling waveform of the downsampled
//! microphone signal, with Space toggling capture on and off. Every capture
//! is written to a WAV file and indexed for `wavetap replay`. Supports an
//! external stop trigger via SIGUSR1.

use crate::capture::{CaptureSession, InputStream, RecordingStore};
use crate::config::WavetapConfig;
use crate::render::{FrameStatus, ScopeCommand, ScopeTui};
use crate::ui::ErrorScreen;
use anyhow::anyhow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs the scope until the user quits.
///
/// # Errors
/// - If configuration loading fails
/// - If the TUI cannot be initialized
/// - If stopping a capture fails (WAV finalize error)
pub fn handle_record() -> Result<(), anyhow::Error> {
    tracing::info!("=== wavetap scope started ===");

    let config = match WavetapConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/wavetap/wavetap.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&message)?;
            error_screen.cleanup()?;
            return Err(anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, stride={}, window={} samples",
        config.audio.device,
        config.waveform.downsample_factor,
        config.waveform.max_visible_samples
    );

    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("wavetap");
    let store = RecordingStore::new(&data_dir)?;

    let mut session = CaptureSession::new(
        config.waveform.downsample_factor,
        config.waveform.max_visible_samples,
    );
    let history = session.history();
    let max_visible = config.waveform.max_visible_samples;
    let device = config.audio.device.clone();

    let mut tui = ScopeTui::new(config.waveform.canvas_width, config.waveform.canvas_height)?;

    // External stop trigger, mirroring the keyboard toggle.
    let stop_flag = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, Arc::clone(&stop_flag))
        .map_err(|e| anyhow!("Failed to register signal handler: {e}"))?;

    let mut capture_started: Option<Instant> = None;
    let mut frozen_elapsed = Duration::ZERO;

    tracing::debug!("Entering scope loop. Space starts/stops capture, 'q' quits.");

    loop {
        if stop_flag.swap(false, Ordering::Relaxed) && session.is_capturing() {
            tracing::info!("Received SIGUSR1: stopping capture via external trigger");
            frozen_elapsed = elapsed_of(capture_started.take());
            finish_capture(&mut session, &store)?;
        }

        match tui.handle_input() {
            Ok(ScopeCommand::Continue) => {}
            Ok(ScopeCommand::Toggle) => {
                if session.is_capturing() {
                    frozen_elapsed = elapsed_of(capture_started.take());
                    finish_capture(&mut session, &store)?;
                } else {
                    let output = store.new_wav_path();
                    let start =
                        session.start(Some(output), |sender| InputStream::acquire(&device, sender));
                    match start {
                        Ok(()) => {
                            capture_started = Some(Instant::now());
                            frozen_elapsed = Duration::ZERO;
                        }
                        Err(e) => {
                            tracing::error!("Failed to start capture: {e}");
                            tui.cleanup().ok();
                            let mut error_screen = ErrorScreen::new()?;
                            error_screen.show_error(&format!(
                                "Could not access microphone:\n\n{e}\n\nPress any key to return."
                            ))?;
                            error_screen.cleanup()?;
                            tui = ScopeTui::new(
                                config.waveform.canvas_width,
                                config.waveform.canvas_height,
                            )?;
                        }
                    }
                }
            }
            Ok(ScopeCommand::Quit) => {
                break;
            }
            Err(e) => {
                tracing::error!("Input handling error: {e}");
                return Err(anyhow!("Input handling error: {e}"));
            }
        }

        let samples = history.lock().unwrap().visible(max_visible);
        let status = FrameStatus {
            state: session.state(),
            sample_rate: session.sample_rate(),
            blocks_dropped: session.blocks_dropped(),
            elapsed: capture_started
                .map(|t| t.elapsed())
                .unwrap_or(frozen_elapsed),
        };
        tui.render(&samples, &status)?;
    }

    if session.is_capturing() {
        finish_capture(&mut session, &store)?;
    }

    tui.cleanup()?;
    tracing::info!("=== wavetap scope exited ===");
    Ok(())
}

fn elapsed_of(started: Option<Instant>) -> Duration {
    started.map(|t| t.elapsed()).unwrap_or_default()
}

/// Stops the active capture and indexes the WAV file. An empty capture is
/// discarded rather than saved.
fn finish_capture(session: &mut CaptureSession, store: &RecordingStore) -> Result<(), anyhow::Error> {
    let Some(summary) = session.stop()? else {
        return Ok(());
    };

    if let Some(path) = summary.output {
        if summary.samples_recorded == 0 {
            tracing::warn!("Capture stopped with no samples; discarding {}", path.display());
            let _ = std::fs::remove_file(&path);
        } else {
            let duration_secs = summary.samples_recorded as f32 / session.sample_rate() as f32;
            tracing::info!(
                "Recording saved: {} ({:.2}s at {}Hz)",
                path.display(),
                duration_secs,
                session.sample_rate()
            );
            store.save(path, session.sample_rate(), summary.samples_recorded)?;
        }
    }
    Ok(())
}

//! Replay a saved recording using the system audio player.

use crate::capture::RecordingStore;
use anyhow::anyhow;
use std::path::Path;
use std::process::Command;

/// Plays back a saved recording.
///
/// On macOS the file is handed to `open`; on Linux `xdg-open` is tried
/// first, falling back to common audio players (mpv, vlc, ffplay, paplay).
///
/// # Arguments
/// * `index` - Recording to play (1 = most recent, None = most recent)
pub fn handle_replay(index: Option<usize>) -> Result<(), anyhow::Error> {
    tracing::info!("=== wavetap replay ===");

    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("wavetap");

    let store = RecordingStore::new(&data_dir)?;
    let recordings = store.all()?;

    if recordings.is_empty() {
        return Err(anyhow!("No recordings found. Run 'wavetap' and press Space to capture one."));
    }

    let index = index.unwrap_or(1);
    if index < 1 || index > recordings.len() {
        return Err(anyhow!(
            "Recording index out of range. Available recordings: 1-{}",
            recordings.len()
        ));
    }

    let recording = &recordings[index - 1];
    if !recording.wav_path.exists() {
        return Err(anyhow!("Audio file not found: {}", recording.wav_path.display()));
    }

    tracing::info!(
        "Playing recording #{} ({:.1}s, captured {})",
        index,
        recording.duration_secs(),
        recording.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    play_file(&recording.wav_path)?;

    tracing::info!("Playback finished for recording #{index}");
    Ok(())
}

#[cfg(target_os = "macos")]
fn play_file(path: &Path) -> Result<(), anyhow::Error> {
    Command::new("open")
        .arg(path)
        .spawn()
        .map_err(|e| anyhow!("Failed to open audio player: {e}"))?
        .wait()
        .map_err(|e| anyhow!("Audio player error: {e}"))?;
    Ok(())
}

#[cfg(not(target_os = "macos"))]
fn play_file(path: &Path) -> Result<(), anyhow::Error> {
    match Command::new("xdg-open").arg(path).spawn() {
        Ok(mut child) => {
            child
                .wait()
                .map_err(|e| anyhow!("Audio player error: {e}"))?;
            Ok(())
        }
        Err(_) => {
            // xdg-open missing: try players directly
            for player in ["mpv", "vlc", "ffplay", "paplay"] {
                if let Ok(mut child) = Command::new(player).arg(path).spawn() {
                    let _ = child.wait();
                    return Ok(());
                }
            }
            Err(anyhow!(
                "No audio player found. Install mpv, vlc, ffplay, or paplay"
            ))
        }
    }
}

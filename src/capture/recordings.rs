//! Saved-recording index for the replay command.
//!
//! Each finished capture leaves a WAV file plus a small JSON metadata entry
//! under the data directory. Only the 10 most recent recordings are kept;
//! older audio and metadata are deleted when a new capture is saved.

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const MAX_RECORDINGS: usize = 10;

/// Metadata for one saved capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingEntry {
    /// Unique identifier (millisecond timestamp of the save)
    pub id: String,
    /// Path to the WAV file
    pub wav_path: PathBuf,
    /// Device sample rate the capture ran at
    pub sample_rate: u32,
    /// Full-rate samples in the WAV file
    pub sample_count: u64,
    /// When the recording finished
    pub created_at: DateTime<Local>,
}

impl RecordingEntry {
    /// Recording length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sample_rate as f64
    }
}

/// Filesystem-backed index of saved recordings.
pub struct RecordingStore {
    dir: PathBuf,
}

impl RecordingStore {
    /// Opens (creating if needed) the store under `data_dir/recordings`.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let dir = data_dir.join("recordings");
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory recordings and metadata live in. WAV files for new
    /// captures are created here before the session starts.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a new capture file, stamped with the local time.
    pub fn new_wav_path(&self) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        self.dir.join(format!("wavetap-{stamp}.wav"))
    }

    /// Records metadata for a finished capture and prunes old entries.
    pub fn save(&self, wav_path: PathBuf, sample_rate: u32, sample_count: u64) -> Result<String> {
        self.prune()?;

        let now = Local::now();
        let id = now.timestamp_millis().to_string();
        let entry = RecordingEntry {
            id: id.clone(),
            wav_path,
            sample_rate,
            sample_count,
            created_at: now,
        };

        let metadata_path = self.dir.join(format!("{id}.json"));
        fs::write(&metadata_path, serde_json::to_string_pretty(&entry)?)?;
        tracing::info!("Recording saved with ID: {id}");
        Ok(id)
    }

    /// All recordings, newest first.
    pub fn all(&self) -> Result<Vec<RecordingEntry>> {
        let mut entries: Vec<RecordingEntry> = fs::read_dir(&self.dir)?
            .filter_map(|e| {
                let path = e.ok()?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    serde_json::from_str(&fs::read_to_string(&path).ok()?).ok()
                } else {
                    None
                }
            })
            .collect();

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    /// Deletes the oldest recordings until at most `MAX_RECORDINGS - 1`
    /// remain, making room for the next save.
    fn prune(&self) -> Result<()> {
        let mut entries = self.all()?;
        while entries.len() >= MAX_RECORDINGS {
            let Some(oldest) = entries.pop() else { break };
            if oldest.wav_path.exists() {
                if let Err(e) = fs::remove_file(&oldest.wav_path) {
                    tracing::warn!("Failed to delete old recording audio: {e}");
                }
            }
            let metadata_path = self.dir.join(format!("{}.json", oldest.id));
            if let Err(e) = fs::remove_file(&metadata_path) {
                tracing::warn!("Failed to delete old recording metadata: {e}");
            } else {
                tracing::info!("Pruned old recording {}", oldest.id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_and_lists_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new(dir.path()).unwrap();

        let a = store.save(store.dir().join("a.wav"), 48_000, 48_000).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = store.save(store.dir().join("b.wav"), 48_000, 96_000).unwrap();

        let all = store.all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, b);
        assert_eq!(all[1].id, a);
        assert_eq!(all[0].duration_secs(), 2.0);
    }

    #[test]
    fn prunes_to_capacity_on_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordingStore::new(dir.path()).unwrap();

        for i in 0..12 {
            let wav = store.dir().join(format!("take-{i}.wav"));
            fs::write(&wav, b"riff").unwrap();
            store.save(wav, 16_000, 16_000).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let all = store.all().unwrap();
        assert_eq!(all.len(), MAX_RECORDINGS);
        // Oldest audio files were removed along with their metadata.
        assert!(!store.dir().join("take-0.wav").exists());
        assert!(!store.dir().join("take-1.wav").exists());
        assert!(store.dir().join("take-11.wav").exists());
    }
}

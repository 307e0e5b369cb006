//! WAV sink for the capture-to-file path.
//!
//! Receives the same full-rate mono blocks the waveform pipeline consumes
//! and encodes them as 16-bit PCM. The waveform never depends on this
//! output; a capture session may run with no sink at all.

use anyhow::Result;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Writes mono f32 blocks to a 16-bit PCM WAV file.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    samples_written: u64,
}

impl WavSink {
    /// Creates the output file with a mono 16-bit spec at `sample_rate`.
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(path, spec)?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            samples_written: 0,
        })
    }

    /// Appends one block, clamping to [-1, 1] and mapping non-finite
    /// samples to silence.
    pub fn write_block(&mut self, block: &[f32]) -> Result<()> {
        for &s in block {
            let sample = if s.is_finite() {
                (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
            } else {
                0i16
            };
            self.writer.write_sample(sample)?;
        }
        self.samples_written += block.len() as u64;
        Ok(())
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Finalizes the WAV header and returns the output path.
    pub fn finalize(self) -> Result<PathBuf> {
        self.writer.finalize()?;
        tracing::debug!("WAV finalized: {}", self.path.display());
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_clamped_pcm_and_finalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        let mut sink = WavSink::create(&path, 48_000).unwrap();
        sink.write_block(&[0.0, 0.5, -0.5, 2.0, f32::NAN]).unwrap();
        assert_eq!(sink.samples_written(), 5);
        let written = sink.finalize().unwrap();

        let mut reader = hound::WavReader::open(written).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48_000);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0], 0);
        assert_eq!(samples[3], i16::MAX); // clamped from 2.0
        assert_eq!(samples[4], 0); // NaN maps to silence
    }
}

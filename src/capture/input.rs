//! Microphone input stream: the real-time sample producer.
//!
//! Opens a cpal input stream on the configured device and, from the audio
//! callback, converts each device buffer to one mono f32 block and hands it
//! off through the bounded queue. The callback never blocks and never
//! touches the history buffer; dropping the stream releases the device and
//! ends the callbacks.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};

use super::handoff::BlockSender;
use super::session::{AcquiredStream, StreamHandle};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// An open microphone stream feeding the hand-off queue.
///
/// Kept alive for the duration of a capture session; dropping it stops the
/// device callbacks.
pub struct InputStream {
    _stream: cpal::Stream,
    sample_rate: u32,
    device_name: String,
}

impl StreamHandle for InputStream {}

impl InputStream {
    /// Opens the device named by `device_spec` ("default", a name, or a
    /// numeric index) and starts capturing into `sender`.
    ///
    /// # Errors
    /// - If no matching input device exists
    /// - If the device configuration cannot be read
    /// - If stream creation or playback fails
    pub fn open(device_spec: &str, sender: BlockSender) -> Result<Self> {
        let device = suppress_alsa_stderr(|| select_device(device_spec))?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();
        let channels = config.channels.max(1) as usize;
        let sample_rate = config.sample_rate.0;

        tracing::info!(
            "Capture device: {} ({}Hz, {} channels)",
            device_name,
            sample_rate,
            channels
        );

        let stream = match sample_format {
            SampleFormat::F32 => build_stream(&device, &config, channels, sender, |s: f32| s)?,
            SampleFormat::I16 => {
                build_stream(&device, &config, channels, sender, |s: i16| {
                    s as f32 / 32_768.0
                })?
            }
            SampleFormat::U16 => {
                build_stream(&device, &config, channels, sender, |s: u16| {
                    (s as f32 - 32_768.0) / 32_768.0
                })?
            }
            other => return Err(anyhow!("Unsupported sample format: {other:?}")),
        };

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(Self {
            _stream: stream,
            sample_rate,
            device_name,
        })
    }

    /// Opens the stream and packages it for the capture session.
    pub fn acquire(device_spec: &str, sender: BlockSender) -> Result<AcquiredStream> {
        let input = Self::open(device_spec, sender)?;
        let sample_rate = input.sample_rate;
        let device_name = input.device_name.clone();
        Ok(AcquiredStream {
            handle: Box::new(input),
            sample_rate,
            device_name,
        })
    }
}

/// Builds the input stream for one device sample type, downmixing
/// interleaved frames to mono by averaging channels.
fn build_stream<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    channels: usize,
    sender: BlockSender,
    convert: F,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample,
    F: Fn(T) -> f32 + Send + 'static,
{
    let err_fn = |err| tracing::error!("Input stream error: {err}");

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let mut block = Vec::with_capacity(data.len() / channels.max(1));
            for frame in data.chunks_exact(channels) {
                let sum: f32 = frame.iter().map(|&s| convert(s)).sum();
                block.push(sum / channels as f32);
            }
            sender.send(block);
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Resolves a device spec against the default host.
///
/// Accepts "default" for the system default device, a numeric index from
/// `wavetap list-devices`, or a device name.
fn select_device(device_spec: &str) -> Result<cpal::Device> {
    let host = cpal::default_host();

    if device_spec == "default" {
        return host
            .default_input_device()
            .ok_or_else(|| anyhow!("No audio input device available"));
    }

    let devices: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        }
        return Err(anyhow!(
            "Device index {} is out of range (0-{})",
            index,
            devices.len().saturating_sub(1)
        ));
    }

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'wavetap list-devices' to see available devices."
    ))
}

/// Runs `f` with stderr redirected to /dev/null, hiding ALSA library
/// warnings emitted during device enumeration on Linux.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_stderr<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// No-op on platforms without ALSA.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_stderr<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

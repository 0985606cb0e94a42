//! Microphone capture via cpal.
//!
//! Opens the selected input device at its native format and converts every
//! delivered chunk to mono 16 kHz inside the callback, so the accumulator
//! only ever holds target-format samples.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use voxkey_core::{Result, VoxkeyError, TARGET_SAMPLE_RATE};

use crate::buffer::RecordingBuffer;
use crate::convert;
use crate::recorder::RecorderCore;
use crate::CaptureControl;

/// Wrapper to make `cpal::Stream` storable in a struct that crosses threads.
///
/// `cpal::Stream` carries a `*mut ()` marker that prevents auto `Send`. The
/// handle is only ever stored (to keep capture alive) or dropped (to stop
/// it); the audio callback runs on a separate OS thread managed by cpal.
struct SendStream(#[allow(dead_code)] cpal::Stream);

// SAFETY: the Stream handle is never used to share data across threads;
// all sample traffic goes through the RecorderSink's own mutex.
unsafe impl Send for SendStream {}

/// Real microphone capture service.
///
/// One capture session at a time. The finished recording is delivered on
/// the channel given at construction, exactly once per session.
pub struct CaptureService {
    finished_tx: mpsc::UnboundedSender<RecordingBuffer>,
    max_recording_secs: u32,
    session: Option<CaptureSession>,
}

struct CaptureSession {
    /// Dropping the stream stops capture.
    stream: SendStream,
    recorder: RecorderCore,
}

impl CaptureService {
    pub fn new(finished_tx: mpsc::UnboundedSender<RecordingBuffer>, max_recording_secs: u32) -> Self {
        Self {
            finished_tx,
            max_recording_secs,
            session: None,
        }
    }

    fn resolve_device(selector: &str) -> Result<cpal::Device> {
        let host = cpal::default_host();

        if selector == "default" {
            return host
                .default_input_device()
                .ok_or_else(|| VoxkeyError::DeviceUnavailable("no default input device".into()));
        }

        let needle = selector.to_lowercase();
        host.input_devices()
            .map_err(|e| VoxkeyError::Audio(format!("Failed to enumerate devices: {}", e)))?
            .find(|d| {
                d.name()
                    .map(|n| n.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .ok_or_else(|| VoxkeyError::DeviceUnavailable(selector.to_string()))
    }
}

impl CaptureControl for CaptureService {
    fn start_recording(&mut self, selector: &str) -> Result<()> {
        if self.session.is_some() {
            return Err(VoxkeyError::Audio("Capture already active".into()));
        }

        let device = Self::resolve_device(selector)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
        debug!(device = %device_name, "Selected capture device");

        // Open at the device's native format; the callback converts. Many
        // devices reject a forced 16 kHz mono config outright.
        let supported = device.default_input_config().map_err(|e| {
            VoxkeyError::DeviceUnavailable(format!("{}: {}", device_name, e))
        })?;
        let stream_config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: supported.sample_rate(),
            buffer_size: cpal::BufferSize::Default,
        };

        let device_rate = stream_config.sample_rate.0;
        let device_channels = stream_config.channels;
        if device_rate != TARGET_SAMPLE_RATE || device_channels != 1 {
            info!(
                device_rate,
                device_channels, "Capture callback will downmix/resample to 1ch 16kHz"
            );
        }

        let recorder = RecorderCore::new(self.finished_tx.clone(), self.max_recording_secs);
        let sink = recorder.sink();

        let stream = device
            .build_input_stream(
                &stream_config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted = convert::convert_chunk(data, device_channels, device_rate);
                    sink.push(&converted);
                },
                move |err| {
                    error!("Capture stream error: {}", err);
                },
                None,
            )
            .map_err(|e| {
                VoxkeyError::DeviceUnavailable(format!(
                    "Failed to open stream on {}: {}",
                    device_name, e
                ))
            })?;

        stream.play().map_err(|e| {
            VoxkeyError::DeviceUnavailable(format!(
                "Failed to start stream on {}: {}",
                device_name, e
            ))
        })?;

        self.session = Some(CaptureSession {
            stream: SendStream(stream),
            recorder,
        });
        info!(device = %device_name, device_rate, device_channels, "Capture started");
        Ok(())
    }

    fn stop_recording(&mut self) {
        let Some(mut session) = self.session.take() else {
            debug!("stop_recording with no active session, ignoring");
            return;
        };

        // Stop the device before reading out the accumulator so no chunk
        // arrives after the buffer is taken.
        drop(session.stream);
        session.recorder.finish();
        info!("Capture stopped");
    }

    fn is_recording(&self) -> bool {
        self.session.is_some()
    }
}

impl Drop for CaptureService {
    fn drop(&mut self) {
        if self.session.is_some() {
            warn!("CaptureService dropped while recording, discarding session");
            self.session = None;
        }
    }
}

/// Enumerate input devices for configuration UIs as `(id, display name)`
/// pairs. The synthetic "default" selector is always first; enumeration
/// failure degrades to just that entry.
pub fn list_devices() -> Vec<(String, String)> {
    let host = cpal::default_host();

    let default_name = host
        .default_input_device()
        .and_then(|d| d.name().ok())
        .unwrap_or_else(|| "no input device".to_string());
    let mut devices = vec![(
        "default".to_string(),
        format!("Default — {}", default_name),
    )];

    match host.input_devices() {
        Ok(found) => {
            for device in found {
                if let Ok(name) = device.name() {
                    // cpal exposes no stable device id; the name doubles as
                    // the selector.
                    devices.push((name.clone(), name));
                }
            }
        }
        Err(e) => warn!("Failed to enumerate input devices: {}", e),
    }
    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_devices_has_default_pair_first() {
        let devices = list_devices();
        assert_eq!(devices[0].0, "default");
        assert!(devices[0].1.starts_with("Default"));
    }

    #[test]
    fn test_stop_without_start_is_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut service = CaptureService::new(tx, 120);

        service.stop_recording();
        assert!(!service.is_recording());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_device_is_unavailable() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut service = CaptureService::new(tx, 120);

        let result = service.start_recording("no-such-device-xyzzy");
        assert!(matches!(
            result,
            Err(VoxkeyError::DeviceUnavailable(_)) | Err(VoxkeyError::Audio(_))
        ));
        assert!(!service.is_recording());
    }
}

//! Microphone capture stream
//!
//! Opens the default cpal input device and keeps it running for the
//! lifetime of the handle. Samples are converted to mono f32 and fanned
//! out to a bounded preview channel (for the waveform display) and to an
//! optional recording tap installed by an active session.

use crate::{RecitalError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shared slot for the sender an active recording session installs
///
/// The capture callback forwards every chunk to the installed sender; when
/// the slot is empty the chunk is only used for the preview feed.
pub(crate) type PcmTap = Arc<Mutex<Option<Sender<Vec<f32>>>>>;

/// Live microphone input stream
pub struct MicStream {
    // Dropping the stream stops capture.
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: u16,
    device_name: String,
    preview_rx: Receiver<Vec<f32>>,
    tap: PcmTap,
}

impl MicStream {
    /// Open the default input device and start capturing
    ///
    /// # Errors
    /// Returns [`RecitalError::DeviceAccess`] if no input device is
    /// available or the stream cannot be built.
    pub(crate) fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| RecitalError::DeviceAccess("No input device available".into()))?;

        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device.default_input_config().map_err(|e| {
            RecitalError::DeviceAccess(format!("Failed to get input config: {}", e))
        })?;
        let config: StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        info!(
            "Opening microphone '{}': {}Hz, {} channel(s)",
            device_name, sample_rate, channels
        );

        let (preview_tx, preview_rx) = bounded::<Vec<f32>>(64);
        let tap: PcmTap = Arc::new(Mutex::new(None));
        let tap_in_callback = Arc::clone(&tap);
        let channel_count = channels as usize;

        let err_fn = |err| {
            error!("Microphone stream error: {}", err);
        };

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Mix down to mono so every consumer sees one channel
                    let samples: Vec<f32> = if channel_count == 1 {
                        data.to_vec()
                    } else {
                        data.chunks(channel_count)
                            .map(|frame| frame.iter().sum::<f32>() / channel_count as f32)
                            .collect()
                    };

                    if let Some(session_tx) = tap_in_callback.lock().as_ref() {
                        if let Err(e) = session_tx.try_send(samples.clone()) {
                            debug!("Recording tap not keeping up: {}", e);
                        }
                    }

                    // Preview is best-effort; drop chunks when the UI lags
                    let _ = preview_tx.try_send(samples);
                },
                err_fn,
                None,
            )
            .map_err(|e| {
                RecitalError::DeviceAccess(format!("Failed to build input stream: {}", e))
            })?;

        stream
            .play()
            .map_err(|e| RecitalError::DeviceAccess(format!("Failed to start input stream: {}", e)))?;

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
            device_name,
            preview_rx,
            tap,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Drain pending preview samples into `into`, keeping at most
    /// `max_samples` of the newest data there
    pub fn drain_preview(&self, into: &mut Vec<f32>, max_samples: usize) {
        while let Ok(samples) = self.preview_rx.try_recv() {
            into.extend(samples);
        }
        if into.len() > max_samples {
            let excess = into.len() - max_samples;
            into.drain(0..excess);
        }
    }

    pub(crate) fn tap(&self) -> PcmTap {
        Arc::clone(&self.tap)
    }
}

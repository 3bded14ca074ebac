//! MP3 recording sessions for microphone streams
//!
//! A session installs a tap on the live [`MicStream`], and a worker thread
//! encodes each PCM chunk to MP3 frames with LAME. MP3 frames concatenate
//! into a valid stream, so every encoder output is emitted as one session
//! fragment. Closing the tap ends the worker, which flushes the encoder
//! and emits the stop event.

use super::{RecorderEngine, RecordingSession, SessionEvent};
use crate::capture::{MediaStream, MicStream};
use crate::config::AudioCaptureConfig;
use crate::{RecitalError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use mp3lame_encoder::{Bitrate, Builder, Encoder, FlushNoGap, MonoPcm, Quality};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// Engine producing MP3 sessions from microphone streams
pub struct Mp3RecorderEngine {
    config: AudioCaptureConfig,
}

impl Mp3RecorderEngine {
    pub fn new(config: AudioCaptureConfig) -> Self {
        Self { config }
    }
}

impl RecorderEngine for Mp3RecorderEngine {
    fn open_session(&self, stream: &MediaStream) -> Result<Box<dyn RecordingSession>> {
        let mic = stream.as_microphone().ok_or_else(|| {
            RecitalError::Session("audio recorder needs a microphone stream".into())
        })?;
        Ok(Box::new(Mp3Session::new(mic, self.config.clone())))
    }
}

struct Mp3Session {
    tap: crate::capture::PcmTap,
    sample_rate: u32,
    config: AudioCaptureConfig,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
    worker: Option<JoinHandle<()>>,
    started: bool,
}

impl Mp3Session {
    fn new(mic: &MicStream, config: AudioCaptureConfig) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            tap: mic.tap(),
            sample_rate: mic.sample_rate(),
            config,
            event_tx,
            event_rx,
            worker: None,
            started: false,
        }
    }

    fn release_tap(&mut self) {
        // Removing the sender closes the PCM channel, which is the
        // worker's signal to flush and finalize.
        self.tap.lock().take();
    }
}

impl RecordingSession for Mp3Session {
    fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RecitalError::Session("session already started".into()));
        }
        self.started = true;

        let (pcm_tx, pcm_rx) = bounded::<Vec<f32>>(256);
        *self.tap.lock() = Some(pcm_tx);

        let event_tx = self.event_tx.clone();
        let sample_rate = self.sample_rate;
        let bitrate = self.config.bitrate_kbps;
        self.worker = Some(std::thread::spawn(move || {
            encode_loop(pcm_rx, event_tx, sample_rate, bitrate);
        }));

        info!("MP3 session started at {}Hz", self.sample_rate);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Err(RecitalError::Session("session never started".into()));
        }
        self.release_tap();
        Ok(())
    }

    fn events(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }
}

impl Drop for Mp3Session {
    fn drop(&mut self) {
        self.release_tap();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("MP3 encoder worker panicked");
            }
        }
    }
}

/// Worker body: encode incoming PCM until the channel closes, then flush
fn encode_loop(
    pcm_rx: Receiver<Vec<f32>>,
    event_tx: Sender<SessionEvent>,
    sample_rate: u32,
    bitrate_kbps: u32,
) {
    let mut encoder = match build_encoder(sample_rate, bitrate_kbps) {
        Ok(e) => e,
        Err(e) => {
            error!("Failed to set up MP3 encoder: {}", e);
            let _ = event_tx.send(SessionEvent::Stopped);
            return;
        }
    };

    let mut total_samples: usize = 0;
    while let Ok(samples) = pcm_rx.recv() {
        total_samples += samples.len();
        let pcm = samples_to_i16(&samples);

        let mut frame = Vec::new();
        frame.reserve(mp3lame_encoder::max_required_buffer_size(pcm.len()));
        match encoder.encode(MonoPcm(&pcm), frame.spare_capacity_mut()) {
            Ok(encoded) => {
                // SAFETY: encode() initializes exactly `encoded` bytes of
                // the spare capacity on success.
                unsafe { frame.set_len(encoded) };
            }
            Err(e) => {
                error!("MP3 encode error: {:?}", e);
                continue;
            }
        }
        if !frame.is_empty() {
            let _ = event_tx.send(SessionEvent::Data(frame));
        }
    }

    // Tap removed: flush whatever LAME still buffers.
    let mut tail = Vec::new();
    tail.reserve(mp3lame_encoder::max_required_buffer_size(1152));
    match encoder.flush::<FlushNoGap>(tail.spare_capacity_mut()) {
        Ok(flushed) => {
            // SAFETY: flush() initializes exactly `flushed` bytes.
            unsafe { tail.set_len(flushed) };
            if !tail.is_empty() {
                let _ = event_tx.send(SessionEvent::Data(tail));
            }
        }
        Err(e) => error!("MP3 flush error: {:?}", e),
    }

    debug!(
        "MP3 worker done: {:.1}s of audio encoded",
        total_samples as f32 / sample_rate as f32
    );
    let _ = event_tx.send(SessionEvent::Stopped);
}

fn build_encoder(sample_rate: u32, bitrate_kbps: u32) -> Result<Encoder> {
    let mut builder =
        Builder::new().ok_or_else(|| RecitalError::Session("Failed to create LAME builder".into()))?;

    builder
        .set_num_channels(1)
        .map_err(|e| RecitalError::Session(format!("Failed to set channels: {:?}", e)))?;
    builder
        .set_sample_rate(sample_rate)
        .map_err(|e| RecitalError::Session(format!("Failed to set sample rate: {:?}", e)))?;
    builder
        .set_brate(match bitrate_kbps {
            192 => Bitrate::Kbps192,
            _ => Bitrate::Kbps128,
        })
        .map_err(|e| RecitalError::Session(format!("Failed to set bitrate: {:?}", e)))?;
    builder
        .set_quality(Quality::Best)
        .map_err(|e| RecitalError::Session(format!("Failed to set quality: {:?}", e)))?;

    builder
        .build()
        .map_err(|e| RecitalError::Session(format!("Failed to initialize LAME encoder: {:?}", e)))
}

fn samples_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_to_i16_clamps() {
        let pcm = samples_to_i16(&[0.0, 1.0, -1.0, 2.0, -2.0]);
        assert_eq!(pcm[0], 0);
        assert_eq!(pcm[1], i16::MAX);
        assert_eq!(pcm[3], i16::MAX);
        assert_eq!(pcm[4], -i16::MAX);
    }
}

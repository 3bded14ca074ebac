//! Whisper-backed speech recognition engine
//!
//! The engine owns its own microphone stream, independent of any recording
//! session. A worker thread resamples incoming audio to 16 kHz, slices it
//! into phrases on silence, and transcribes with whisper.cpp: the phrase
//! in progress is re-transcribed periodically for interim results, and a
//! phrase is finalized once enough silence follows it.

use super::resample::Mono16kResampler;
use super::{SpeechEngine, SpeechEngineFactory, SpeechEvent, SpeechSegment};
use crate::capture::MicStream;
use crate::config::SpeechConfig;
use crate::{RecitalError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

const TARGET_RATE: usize = 16_000;

/// Speech recognition via a local Whisper model
pub struct WhisperSpeechEngine {
    config: SpeechConfig,
    context: Arc<WhisperContext>,
    mic: Option<MicStream>,
    worker: Option<JoinHandle<()>>,
    event_tx: Sender<SpeechEvent>,
    event_rx: Receiver<SpeechEvent>,
}

impl std::fmt::Debug for WhisperSpeechEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperSpeechEngine")
            .field("config", &self.config)
            .field("running", &self.worker.is_some())
            .finish()
    }
}

impl WhisperSpeechEngine {
    /// Load the model; fails when the model file is missing, leaving the
    /// capability absent for the view that asked
    pub fn new(config: SpeechConfig) -> Result<Self> {
        if !config.model_path.exists() {
            return Err(RecitalError::Unsupported(format!(
                "Speech recognition (model not found at {})",
                config.model_path.display()
            )));
        }

        info!("Loading Whisper model from {}", config.model_path.display());
        let path = config
            .model_path
            .to_str()
            .ok_or_else(|| RecitalError::Speech("Invalid model path".into()))?;
        let context = WhisperContext::new_with_params(path, WhisperContextParameters::default())
            .map_err(|e| RecitalError::Speech(format!("Failed to load Whisper model: {:?}", e)))?;
        info!("Whisper model loaded");

        let (event_tx, event_rx) = unbounded();
        Ok(Self {
            config,
            context: Arc::new(context),
            mic: None,
            worker: None,
            event_tx,
            event_rx,
        })
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Recognition worker panicked");
            }
        }
    }
}

impl SpeechEngine for WhisperSpeechEngine {
    fn start(&mut self) -> Result<()> {
        if self.mic.is_some() {
            warn!("Recognition already running, ignoring start request");
            return Ok(());
        }

        let mic = MicStream::open()?;
        let (pcm_tx, pcm_rx) = bounded::<Vec<f32>>(256);
        *mic.tap().lock() = Some(pcm_tx);

        let context = Arc::clone(&self.context);
        let config = self.config.clone();
        let event_tx = self.event_tx.clone();
        let input_rate = mic.sample_rate();
        self.worker = Some(std::thread::spawn(move || {
            recognize_loop(pcm_rx, event_tx, context, config, input_rate);
        }));

        self.mic = Some(mic);
        info!("Speech recognition started");
        Ok(())
    }

    fn stop(&mut self) {
        // Dropping the mic closes the PCM channel; the worker then emits
        // its final result and exits.
        if let Some(mic) = self.mic.take() {
            mic.tap().lock().take();
            drop(mic);
        }
        self.join_worker();
        info!("Speech recognition stopped");
    }

    fn events(&self) -> Receiver<SpeechEvent> {
        self.event_rx.clone()
    }
}

impl Drop for WhisperSpeechEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Worker body: phrase segmentation plus interim/final transcription
fn recognize_loop(
    pcm_rx: Receiver<Vec<f32>>,
    event_tx: Sender<SpeechEvent>,
    context: Arc<WhisperContext>,
    config: SpeechConfig,
    input_rate: u32,
) {
    let mut resampler = match Mono16kResampler::new(input_rate) {
        Ok(r) => r,
        Err(e) => {
            let _ = event_tx.send(SpeechEvent::Error(e.to_string()));
            return;
        }
    };

    let mut finalized: Vec<String> = Vec::new();
    let mut phrase: Vec<f32> = Vec::new();
    let mut silence_secs: f32 = 0.0;
    let mut since_interim: usize = 0;
    let interim_samples = (config.interim_interval * TARGET_RATE as f32) as usize;

    loop {
        let chunk = match pcm_rx.recv() {
            Ok(chunk) => chunk,
            Err(_) => break,
        };
        let resampled = match resampler.push(&chunk) {
            Ok(r) => r,
            Err(e) => {
                let _ = event_tx.send(SpeechEvent::Error(e.to_string()));
                continue;
            }
        };
        if resampled.is_empty() {
            continue;
        }

        let chunk_secs = resampled.len() as f32 / TARGET_RATE as f32;
        let speaking = rms(&resampled) >= config.silence_floor;

        if speaking || !phrase.is_empty() {
            phrase.extend_from_slice(&resampled);
            since_interim += resampled.len();
        }
        silence_secs = if speaking { 0.0 } else { silence_secs + chunk_secs };

        if !phrase.is_empty() && silence_secs >= config.silence_threshold {
            finalize_phrase(&mut phrase, &mut finalized, &event_tx, &context, &config);
            silence_secs = 0.0;
            since_interim = 0;
            if !config.continuous {
                break;
            }
        } else if config.interim_results && !phrase.is_empty() && since_interim >= interim_samples {
            since_interim = 0;
            match transcribe(&context, &config, &phrase) {
                Ok(text) if !text.is_empty() => {
                    let mut segments: Vec<SpeechSegment> = finalized
                        .iter()
                        .map(|done| SpeechSegment::finalized(done.as_str()))
                        .collect();
                    segments.push(SpeechSegment::interim(text));
                    let _ = event_tx.send(SpeechEvent::Result {
                        result_index: finalized.len(),
                        segments,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    let _ = event_tx.send(SpeechEvent::Error(e.to_string()));
                }
            }
        }
    }

    // Input ended: whatever is buffered becomes the last phrase.
    if let Ok(tail) = resampler.flush() {
        phrase.extend_from_slice(&tail);
    }
    if !phrase.is_empty() {
        finalize_phrase(&mut phrase, &mut finalized, &event_tx, &context, &config);
    }
    debug!("Recognition worker done: {} phrase(s)", finalized.len());
}

fn finalize_phrase(
    phrase: &mut Vec<f32>,
    finalized: &mut Vec<String>,
    event_tx: &Sender<SpeechEvent>,
    context: &WhisperContext,
    config: &SpeechConfig,
) {
    let samples = std::mem::take(phrase);
    match transcribe(context, config, &samples) {
        Ok(text) if !text.is_empty() => {
            finalized.push(text);
            let segments: Vec<SpeechSegment> = finalized
                .iter()
                .map(|done| SpeechSegment::finalized(done.as_str()))
                .collect();
            let _ = event_tx.send(SpeechEvent::Result {
                result_index: finalized.len() - 1,
                segments,
            });
        }
        Ok(_) => debug!("Phrase transcribed to nothing, dropping"),
        Err(e) => {
            let _ = event_tx.send(SpeechEvent::Error(e.to_string()));
        }
    }
}

/// Run one whisper pass over `samples` (mono, 16 kHz)
fn transcribe(context: &WhisperContext, config: &SpeechConfig, samples: &[f32]) -> Result<String> {
    // whisper.cpp refuses inputs shorter than a second; pad with silence.
    let padded;
    let samples = if samples.len() < TARGET_RATE {
        let mut p = samples.to_vec();
        p.resize(TARGET_RATE, 0.0);
        padded = p;
        &padded[..]
    } else {
        samples
    };

    let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
    params.set_n_threads(config.n_threads);
    params.set_language(Some(config.whisper_language()));
    params.set_print_special(false);
    params.set_print_progress(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    let mut state = context
        .create_state()
        .map_err(|e| RecitalError::Speech(format!("Failed to create state: {:?}", e)))?;
    state
        .full(params, samples)
        .map_err(|e| RecitalError::Speech(format!("Transcription failed: {:?}", e)))?;

    let segment_count = state
        .full_n_segments()
        .map_err(|e| RecitalError::Speech(format!("Failed to get segments: {:?}", e)))?;

    let mut text = String::new();
    for i in 0..segment_count {
        let segment = state
            .full_get_segment_text(i)
            .map_err(|e| RecitalError::Speech(format!("Failed to get segment text: {:?}", e)))?;
        text.push_str(&segment);
    }
    Ok(text.trim().to_string())
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

/// Factory loading one engine per recorder view
pub struct WhisperSpeechFactory {
    config: SpeechConfig,
}

impl WhisperSpeechFactory {
    pub fn new(config: SpeechConfig) -> Self {
        Self { config }
    }
}

impl SpeechEngineFactory for WhisperSpeechFactory {
    fn create(&self) -> Result<Box<dyn SpeechEngine>> {
        Ok(Box::new(WhisperSpeechEngine::new(self.config.clone())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 128]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn test_rms_of_steady_signal() {
        let signal = vec![0.5f32; 256];
        assert!((rms(&signal) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_missing_model_is_unsupported() {
        let config = SpeechConfig {
            model_path: std::path::PathBuf::from("/nonexistent/model.bin"),
            ..Default::default()
        };
        let err = WhisperSpeechEngine::new(config).unwrap_err();
        assert!(matches!(err, RecitalError::Unsupported(_)));
    }
}

//! Configuration for capture, encoding, and speech recognition
//!
//! All settings are plain structs with sensible defaults; there are no
//! config files and nothing is persisted between runs.

use std::path::PathBuf;

/// Configuration for the audio capture and MP3 encoding path
#[derive(Clone, Debug)]
pub struct AudioCaptureConfig {
    /// MP3 bitrate in kbit/s (only 128 and 192 are mapped; anything else
    /// falls back to 128)
    pub bitrate_kbps: u32,

    /// Number of recent samples kept for the live waveform display
    pub waveform_samples: usize,
}

impl Default for AudioCaptureConfig {
    fn default() -> Self {
        Self {
            bitrate_kbps: 128,
            waveform_samples: 4096,
        }
    }
}

/// Configuration for the video capture and WebM encoding path
#[derive(Clone, Debug)]
pub struct VideoCaptureConfig {
    /// Frame rate advertised to the encoder
    pub framerate: u32,

    /// Target video bitrate in kbit/s
    pub bitrate_kbps: u32,
}

impl Default for VideoCaptureConfig {
    fn default() -> Self {
        Self {
            framerate: 30,
            bitrate_kbps: 1000,
        }
    }
}

/// Configuration for the speech recognition engine
#[derive(Clone, Debug)]
pub struct SpeechConfig {
    /// BCP-47 language tag; the engine maps this to its own language codes
    pub language: String,

    /// Keep recognizing until explicitly stopped
    pub continuous: bool,

    /// Emit interim (non-final) results while a phrase is still being spoken
    pub interim_results: bool,

    /// Path to the Whisper model file
    pub model_path: PathBuf,

    /// Number of threads to use for transcription
    pub n_threads: i32,

    /// Minimum interval between interim result emissions (seconds)
    pub interim_interval: f32,

    /// Silence duration that finalizes the current phrase (seconds)
    pub silence_threshold: f32,

    /// RMS level below which a chunk counts as silence
    pub silence_floor: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            continuous: true,
            interim_results: true,
            model_path: PathBuf::from("models/ggml-base.en.bin"),
            n_threads: 4,
            interim_interval: 1.0,
            silence_threshold: 0.7,
            silence_floor: 0.01,
        }
    }
}

impl SpeechConfig {
    /// Whisper wants a bare ISO 639-1 code ("en"), not a full tag ("en-US")
    pub fn whisper_language(&self) -> &str {
        self.language.split('-').next().unwrap_or(&self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_config_defaults() {
        let config = SpeechConfig::default();
        assert_eq!(config.language, "en-US");
        assert!(config.continuous);
        assert!(config.interim_results);
    }

    #[test]
    fn test_whisper_language_strips_region() {
        let mut config = SpeechConfig::default();
        assert_eq!(config.whisper_language(), "en");

        config.language = "de".to_string();
        assert_eq!(config.whisper_language(), "de");
    }

    #[test]
    fn test_capture_config_defaults() {
        assert_eq!(AudioCaptureConfig::default().bitrate_kbps, 128);
        assert_eq!(VideoCaptureConfig::default().framerate, 30);
    }
}

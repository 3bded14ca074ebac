//! Live speech recognition
//!
//! A [`SpeechEngine`] runs independently of the recording session: it is
//! started and stopped alongside the recorder but captures and recognizes
//! on its own. Engines emit incremental result events; the
//! [`Transcriber`] folds those into the displayed transcript.

mod resample;
mod scripted;
mod transcriber;
mod whisper;

pub use scripted::{ScriptedSpeechEngine, ScriptedSpeechFactory};
pub use transcriber::Transcriber;
pub use whisper::{WhisperSpeechEngine, WhisperSpeechFactory};

use crate::Result;
use crossbeam_channel::Receiver;

/// One recognized phrase, final or still being refined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSegment {
    pub text: String,
    pub is_final: bool,
}

impl SpeechSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// Event emitted by a speech engine
#[derive(Debug, Clone)]
pub enum SpeechEvent {
    /// Updated recognition results
    ///
    /// `segments` is the engine's full buffered result list;
    /// `result_index` is the index of the first segment this event
    /// changed.
    Result {
        result_index: usize,
        segments: Vec<SpeechSegment>,
    },
    /// A runtime recognition error; recognition may continue
    Error(String),
}

/// A speech recognition capability
///
/// Constructed once per recorder view; construction fails when the
/// capability is absent (no model, no input device), in which case the
/// view runs without transcription for its whole lifetime.
pub trait SpeechEngine {
    /// Begin recognizing
    fn start(&mut self) -> Result<()>;

    /// Stop recognizing; buffered audio may still produce a final result
    fn stop(&mut self);

    /// Channel carrying recognition events
    fn events(&self) -> Receiver<SpeechEvent>;
}

/// Factory injected into the application so views can create their own
/// engine instance at mount time
pub trait SpeechEngineFactory {
    fn create(&self) -> Result<Box<dyn SpeechEngine>>;
}

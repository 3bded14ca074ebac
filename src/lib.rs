//! Recital - record audio or video with live speech transcription
//!
//! A small desktop recorder: pick a medium, grant device access, record,
//! and play the result back. Audio recordings are transcribed live while
//! they are captured. Platform capture, encoding, and recognition sit
//! behind capability traits, so the whole flow also runs against scripted
//! stand-ins.

pub mod capture;
pub mod config;
pub mod error;
pub mod record;
pub mod speech;
pub mod ui;

// Re-export error types
pub use error::{RecitalError, Result};

// Re-export capture types
pub use capture::{CaptureGate, DeviceAccess, MediaConstraints, MediaKind, MediaStream};

// Re-export recorder types
pub use record::{Clip, RecorderController, RecorderEvent, RecorderState};

// Re-export speech types
pub use speech::{SpeechEngine, SpeechEngineFactory, Transcriber};

//! Recording sessions and the recorder state machine
//!
//! A [`RecorderEngine`] opens a [`RecordingSession`] against a live
//! [`MediaStream`](crate::capture::MediaStream). Sessions emit encoded data
//! fragments followed by exactly one stop notification; the
//! [`RecorderController`] drains those events on the UI thread and turns
//! the accumulated fragments into a playable [`Clip`] when the session
//! winds down.

mod clip;
mod controller;
mod mp3;
mod scripted;
mod webm;

pub use clip::{Clip, ClipStore};
pub use controller::{RecorderController, RecorderEvent, RecorderState};
pub use mp3::Mp3RecorderEngine;
pub use scripted::ScriptedRecorderEngine;
pub use webm::WebmRecorderEngine;

use crate::capture::MediaStream;
use crate::Result;
use crossbeam_channel::Receiver;

/// Event emitted by an active recording session
///
/// A session sends zero or more `Data` fragments while it runs, then
/// exactly one `Stopped` after `stop()` has been requested. Fragments of a
/// session concatenate byte-wise into a playable file of the session's
/// media kind.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// An encoded data fragment became available
    Data(Vec<u8>),
    /// The session has finalized; no further fragments will arrive
    Stopped,
}

/// One platform-level recording, bound to a single stream
pub trait RecordingSession {
    /// Begin capturing and encoding
    fn start(&mut self) -> Result<()>;

    /// Request finalization; the `Stopped` event arrives asynchronously
    fn stop(&mut self) -> Result<()>;

    /// Channel carrying this session's events
    fn events(&self) -> Receiver<SessionEvent>;
}

/// Factory for recording sessions of one media kind
pub trait RecorderEngine {
    fn open_session(&self, stream: &MediaStream) -> Result<Box<dyn RecordingSession>>;
}

//! Recorder state machine
//!
//! Owns at most one [`RecordingSession`] and the fragment buffer it fills.
//! All session events are drained cooperatively on the UI thread via
//! [`RecorderController::pump`], so `stop()` only requests finalization;
//! the transition back to idle happens when the session's stop event is
//! consumed.

use super::{Clip, ClipStore, RecorderEngine, RecordingSession, SessionEvent};
use crate::capture::{MediaKind, MediaStream};
use crate::Result;
use std::sync::Arc;
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{debug, info, warn};

/// Externally observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// No session; a finished clip may be available
    #[default]
    Idle,
    /// A session is capturing
    Recording,
    /// Stop requested, waiting for the session to finalize
    Finalizing,
}

impl RecorderState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RecorderState::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderState::Recording)
    }

    pub fn is_finalizing(&self) -> bool {
        matches!(self, RecorderState::Finalizing)
    }
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecorderState::Idle => write!(f, "Idle"),
            RecorderState::Recording => write!(f, "Recording"),
            RecorderState::Finalizing => write!(f, "Finalizing"),
        }
    }
}

/// Notifications for the view layer, one per observable transition
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    /// A session started
    Started,
    /// A fragment of the given size was buffered
    Fragment { bytes: usize },
    /// The session finalized and a clip is available
    Finished,
    /// Clip assembly failed; the controller returned to idle without a clip
    Failed(String),
}

/// State machine driving one recorder panel's sessions
pub struct RecorderController {
    kind: MediaKind,
    engine: Arc<dyn RecorderEngine>,
    store: ClipStore,
    state: RecorderState,
    session: Option<Box<dyn RecordingSession>>,
    session_rx: Option<Receiver<SessionEvent>>,
    fragments: Vec<Vec<u8>>,
    clip: Option<Clip>,
    event_tx: Sender<RecorderEvent>,
    event_rx: Receiver<RecorderEvent>,
}

impl RecorderController {
    pub fn new(kind: MediaKind, engine: Arc<dyn RecorderEngine>, store: ClipStore) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            kind,
            engine,
            store,
            state: RecorderState::Idle,
            session: None,
            session_rx: None,
            fragments: Vec::new(),
            clip: None,
            event_tx,
            event_rx,
        }
    }

    /// Start a new session against `stream`
    ///
    /// Only valid from idle; without a live stream this is a no-op. Any
    /// previous clip is released before the new session begins.
    pub fn start(&mut self, stream: Option<&MediaStream>) -> Result<()> {
        if !self.state.is_idle() {
            warn!("Recorder is {}, ignoring start request", self.state);
            return Ok(());
        }
        let Some(stream) = stream else {
            debug!("No live stream, ignoring start request");
            return Ok(());
        };

        let mut session = self.engine.open_session(stream)?;
        session.start()?;

        // Dropping the old clip deletes its file before the replacement
        // is even underway.
        self.clip = None;
        self.fragments.clear();
        self.session_rx = Some(session.events());
        self.session = Some(session);
        self.state = RecorderState::Recording;
        info!("{} recording started", self.kind);
        let _ = self.event_tx.send(RecorderEvent::Started);
        Ok(())
    }

    /// Request finalization of the active session
    ///
    /// The controller stays in `Finalizing` until [`pump`](Self::pump)
    /// consumes the session's stop event.
    pub fn stop(&mut self) -> Result<()> {
        if !self.state.is_recording() {
            warn!("Recorder is {}, ignoring stop request", self.state);
            return Ok(());
        }
        if let Some(session) = self.session.as_mut() {
            session.stop()?;
        }
        self.state = RecorderState::Finalizing;
        info!("{} recording stopping", self.kind);
        Ok(())
    }

    /// Drain pending session events; call once per UI frame
    pub fn pump(&mut self) {
        let Some(rx) = self.session_rx.clone() else {
            return;
        };

        while let Ok(event) = rx.try_recv() {
            match event {
                SessionEvent::Data(fragment) => {
                    let bytes = fragment.len();
                    self.fragments.push(fragment);
                    let _ = self.event_tx.send(RecorderEvent::Fragment { bytes });
                }
                SessionEvent::Stopped => {
                    self.finish();
                    return;
                }
            }
        }
    }

    fn finish(&mut self) {
        let fragments = std::mem::take(&mut self.fragments);
        self.session = None;
        self.session_rx = None;
        self.state = RecorderState::Idle;

        match self.store.assemble(&fragments, self.kind) {
            Ok(clip) => {
                info!(
                    "{} recording finished: {} bytes at {}",
                    self.kind,
                    clip.len(),
                    clip.url().display()
                );
                self.clip = Some(clip);
                let _ = self.event_tx.send(RecorderEvent::Finished);
            }
            Err(e) => {
                warn!("Failed to assemble {} clip: {}", self.kind, e);
                let _ = self.event_tx.send(RecorderEvent::Failed(e.to_string()));
            }
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    /// The most recent finished clip, if any
    pub fn clip(&self) -> Option<&Clip> {
        self.clip.as_ref()
    }

    /// Transition notifications for the view layer
    pub fn events(&self) -> Receiver<RecorderEvent> {
        self.event_rx.clone()
    }
}

impl Drop for RecorderController {
    fn drop(&mut self) {
        // An unmounted panel must not leave an orphaned session running.
        if let Some(session) = self.session.as_mut() {
            info!("Recorder dropped mid-session, stopping {}", self.kind);
            if let Err(e) = session.stop() {
                warn!("Failed to stop orphaned session: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{MediaConstraints, SyntheticDeviceAccess};
    use crate::record::ScriptedRecorderEngine;
    use crate::DeviceAccess;

    fn controller_with(engine: ScriptedRecorderEngine) -> (RecorderController, MediaStream) {
        let stream = SyntheticDeviceAccess::granting()
            .request_stream(MediaConstraints::audio_only())
            .unwrap();
        let store = ClipStore::new().unwrap();
        let controller = RecorderController::new(MediaKind::Audio, Arc::new(engine), store);
        (controller, stream)
    }

    #[test]
    fn test_initial_state_is_idle() {
        let (controller, _stream) = controller_with(ScriptedRecorderEngine::empty());
        assert!(controller.state().is_idle());
        assert!(controller.clip().is_none());
    }

    #[test]
    fn test_start_without_stream_is_a_noop() {
        let (mut controller, _stream) = controller_with(ScriptedRecorderEngine::empty());
        controller.start(None).unwrap();
        assert!(controller.state().is_idle());
    }

    #[test]
    fn test_start_stop_pump_produces_a_clip() {
        let engine =
            ScriptedRecorderEngine::with_fragments(vec![b"aa".to_vec(), b"bb".to_vec()]);
        let (mut controller, stream) = controller_with(engine);

        controller.start(Some(&stream)).unwrap();
        assert!(controller.state().is_recording());

        controller.stop().unwrap();
        // Stop is asynchronous: still no clip until the events are drained.
        assert!(controller.state().is_finalizing());
        assert!(controller.clip().is_none());

        controller.pump();
        assert!(controller.state().is_idle());
        let clip = controller.clip().expect("clip after pump");
        assert_eq!(clip.len(), 4);
    }

    #[test]
    fn test_zero_fragment_session_yields_empty_clip() {
        let (mut controller, stream) = controller_with(ScriptedRecorderEngine::empty());

        controller.start(Some(&stream)).unwrap();
        controller.stop().unwrap();
        controller.pump();

        let clip = controller.clip().expect("clip even with no fragments");
        assert!(clip.is_empty());
    }

    #[test]
    fn test_new_recording_replaces_and_releases_clip() {
        let engine = ScriptedRecorderEngine::with_fragments(vec![b"one".to_vec()]);
        let (mut controller, stream) = controller_with(engine);

        controller.start(Some(&stream)).unwrap();
        controller.stop().unwrap();
        controller.pump();
        let first_path = controller.clip().unwrap().url().to_path_buf();
        assert!(first_path.exists());

        controller.start(Some(&stream)).unwrap();
        assert!(controller.clip().is_none(), "starting clears the old clip");
        assert!(!first_path.exists(), "old clip file is released");
    }

    #[test]
    fn test_double_start_is_ignored() {
        let engine = ScriptedRecorderEngine::with_fragments(vec![b"x".to_vec()]);
        let opened = engine.open_count_handle();
        let (mut controller, stream) = controller_with(engine);

        controller.start(Some(&stream)).unwrap();
        controller.start(Some(&stream)).unwrap();
        assert_eq!(opened.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_when_idle_is_ignored() {
        let (mut controller, _stream) = controller_with(ScriptedRecorderEngine::empty());
        controller.stop().unwrap();
        assert!(controller.state().is_idle());
    }

    #[test]
    fn test_drop_stops_active_session() {
        let engine = ScriptedRecorderEngine::empty();
        let stopped = engine.session_stopped_handle();
        let (mut controller, stream) = controller_with(engine);

        controller.start(Some(&stream)).unwrap();
        assert!(!stopped.load(std::sync::atomic::Ordering::SeqCst));

        drop(controller);
        assert!(stopped.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[test]
    fn test_events_report_transitions() {
        let engine = ScriptedRecorderEngine::with_fragments(vec![b"abc".to_vec()]);
        let (mut controller, stream) = controller_with(engine);
        let events = controller.events();

        controller.start(Some(&stream)).unwrap();
        controller.stop().unwrap();
        controller.pump();

        assert!(matches!(events.try_recv(), Ok(RecorderEvent::Started)));
        assert!(matches!(
            events.try_recv(),
            Ok(RecorderEvent::Fragment { bytes: 3 })
        ));
        assert!(matches!(events.try_recv(), Ok(RecorderEvent::Finished)));
    }
}

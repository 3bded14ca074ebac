//! Scripted recorder engine for tests and hardware-free runs
//!
//! Sessions emit a canned fragment script instead of touching a device.
//! The engine exposes counters so tests can observe how the controller
//! drives it.

use super::{RecorderEngine, RecordingSession, SessionEvent};
use crate::capture::MediaStream;
use crate::{RecitalError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Engine whose sessions replay a fixed fragment script
pub struct ScriptedRecorderEngine {
    fragments: Vec<Vec<u8>>,
    fail_open: Option<String>,
    open_count: Arc<AtomicUsize>,
    session_stopped: Arc<AtomicBool>,
}

impl ScriptedRecorderEngine {
    /// Sessions emit the given fragments, in order, once started
    pub fn with_fragments(fragments: Vec<Vec<u8>>) -> Self {
        Self {
            fragments,
            fail_open: None,
            open_count: Arc::new(AtomicUsize::new(0)),
            session_stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sessions emit no fragments at all
    pub fn empty() -> Self {
        Self::with_fragments(Vec::new())
    }

    /// Every open attempt fails with the given message
    pub fn failing(message: &str) -> Self {
        Self {
            fragments: Vec::new(),
            fail_open: Some(message.to_string()),
            open_count: Arc::new(AtomicUsize::new(0)),
            session_stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared counter of sessions opened by this engine
    pub fn open_count_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.open_count)
    }

    /// Shared flag set once any session of this engine is stopped
    pub fn session_stopped_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.session_stopped)
    }
}

impl RecorderEngine for ScriptedRecorderEngine {
    fn open_session(&self, _stream: &MediaStream) -> Result<Box<dyn RecordingSession>> {
        if let Some(message) = &self.fail_open {
            return Err(RecitalError::Session(message.clone()));
        }
        self.open_count.fetch_add(1, Ordering::SeqCst);
        let (event_tx, event_rx) = unbounded();
        Ok(Box::new(ScriptedSession {
            fragments: self.fragments.clone(),
            event_tx,
            event_rx,
            started: false,
            finalized: false,
            stopped: Arc::clone(&self.session_stopped),
        }))
    }
}

struct ScriptedSession {
    fragments: Vec<Vec<u8>>,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
    started: bool,
    finalized: bool,
    stopped: Arc<AtomicBool>,
}

impl RecordingSession for ScriptedSession {
    fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RecitalError::Session("session already started".into()));
        }
        self.started = true;
        // Queue the script up front; the controller only sees it when it
        // pumps, which models the asynchronous arrival of real fragments.
        for fragment in self.fragments.drain(..) {
            let _ = self.event_tx.send(SessionEvent::Data(fragment));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Err(RecitalError::Session("session never started".into()));
        }
        if !self.finalized {
            self.finalized = true;
            self.stopped.store(true, Ordering::SeqCst);
            let _ = self.event_tx.send(SessionEvent::Stopped);
        }
        Ok(())
    }

    fn events(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{MediaConstraints, SyntheticDeviceAccess};
    use crate::DeviceAccess;

    fn synthetic_stream() -> MediaStream {
        SyntheticDeviceAccess::granting()
            .request_stream(MediaConstraints::audio_only())
            .unwrap()
    }

    #[test]
    fn test_session_emits_script_then_stop() {
        let engine = ScriptedRecorderEngine::with_fragments(vec![b"a".to_vec()]);
        let mut session = engine.open_session(&synthetic_stream()).unwrap();
        let events = session.events();

        session.start().unwrap();
        session.stop().unwrap();

        assert!(matches!(events.try_recv(), Ok(SessionEvent::Data(d)) if d == b"a"));
        assert!(matches!(events.try_recv(), Ok(SessionEvent::Stopped)));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_stop_before_start_is_an_error() {
        let engine = ScriptedRecorderEngine::empty();
        let mut session = engine.open_session(&synthetic_stream()).unwrap();
        assert!(session.stop().is_err());
    }

    #[test]
    fn test_failing_engine_refuses_to_open() {
        let engine = ScriptedRecorderEngine::failing("no backend");
        assert!(engine.open_session(&synthetic_stream()).is_err());
    }
}

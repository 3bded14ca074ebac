//! Scripted speech engine for tests and hardware-free runs

use super::{SpeechEngine, SpeechEngineFactory, SpeechEvent};
use crate::{RecitalError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Engine that replays a fixed list of recognition events on start
pub struct ScriptedSpeechEngine {
    script: Vec<SpeechEvent>,
    event_tx: Sender<SpeechEvent>,
    event_rx: Receiver<SpeechEvent>,
}

impl ScriptedSpeechEngine {
    pub fn with_events(script: Vec<SpeechEvent>) -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            script,
            event_tx,
            event_rx,
        }
    }
}

impl SpeechEngine for ScriptedSpeechEngine {
    fn start(&mut self) -> Result<()> {
        for event in self.script.drain(..) {
            let _ = self.event_tx.send(event);
        }
        Ok(())
    }

    fn stop(&mut self) {}

    fn events(&self) -> Receiver<SpeechEvent> {
        self.event_rx.clone()
    }
}

/// Factory producing scripted engines, or refusing to, for tests
pub struct ScriptedSpeechFactory {
    script: Option<Vec<SpeechEvent>>,
}

impl ScriptedSpeechFactory {
    /// Every created engine replays the given script
    pub fn with_events(script: Vec<SpeechEvent>) -> Self {
        Self {
            script: Some(script),
        }
    }

    /// Creation always fails, modeling an absent recognition capability
    pub fn unavailable() -> Self {
        Self { script: None }
    }
}

impl SpeechEngineFactory for ScriptedSpeechFactory {
    fn create(&self) -> Result<Box<dyn SpeechEngine>> {
        match &self.script {
            Some(script) => Ok(Box::new(ScriptedSpeechEngine::with_events(script.clone()))),
            None => Err(RecitalError::Unsupported("Speech recognition".into())),
        }
    }
}

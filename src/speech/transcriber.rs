//! Transcript state fed by speech engine events
//!
//! Every result event rebuilds the displayed text from that event alone:
//! the segments from the event's result index to the end are concatenated
//! in order, and whatever was displayed before is discarded. Errors are
//! logged and never disturb the transcript or the recording.

use super::{SpeechEngine, SpeechEvent, SpeechSegment};
use crossbeam_channel::Receiver;
use tracing::{debug, warn};

/// Relays a speech engine's incremental results into displayable text
pub struct Transcriber {
    engine: Option<Box<dyn SpeechEngine>>,
    events: Option<Receiver<SpeechEvent>>,
    transcript: String,
}

impl Transcriber {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        let events = engine.events();
        Self {
            engine: Some(engine),
            events: Some(events),
            transcript: String::new(),
        }
    }

    /// A transcriber with no engine behind it; every operation is a no-op
    pub fn unavailable() -> Self {
        Self {
            engine: None,
            events: None,
            transcript: String::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Start recognition if an engine is present
    pub fn start(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            if let Err(e) = engine.start() {
                warn!("Failed to start speech recognition: {}", e);
            }
        }
    }

    /// Stop recognition if an engine is present
    pub fn stop(&mut self) {
        if let Some(engine) = self.engine.as_mut() {
            engine.stop();
        }
    }

    /// Drain pending recognition events; call once per UI frame
    pub fn pump(&mut self) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        while let Ok(event) = events.try_recv() {
            match event {
                SpeechEvent::Result {
                    result_index,
                    segments,
                } => {
                    self.transcript = recompute(result_index, &segments);
                    debug!("Transcript now: '{}'", self.transcript);
                }
                SpeechEvent::Error(reason) => {
                    warn!("Speech recognition error: {}", reason);
                }
            }
        }
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }
}

/// Concatenate the segments of one event from its result index onward
fn recompute(result_index: usize, segments: &[SpeechSegment]) -> String {
    segments
        .iter()
        .skip(result_index)
        .map(|segment| segment.text.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::ScriptedSpeechEngine;

    #[test]
    fn test_recompute_joins_from_result_index() {
        let segments = vec![
            SpeechSegment::finalized("hello "),
            SpeechSegment::finalized("there "),
            SpeechSegment::interim("world"),
        ];
        assert_eq!(recompute(0, &segments), "hello there world");
        assert_eq!(recompute(1, &segments), "there world");
        assert_eq!(recompute(3, &segments), "");
    }

    #[test]
    fn test_recompute_past_the_end_is_empty() {
        let segments = vec![SpeechSegment::interim("hi")];
        assert_eq!(recompute(9, &segments), "");
    }

    #[test]
    fn test_last_event_wins() {
        let engine = ScriptedSpeechEngine::with_events(vec![
            SpeechEvent::Result {
                result_index: 0,
                segments: vec![SpeechSegment::interim("hell")],
            },
            SpeechEvent::Result {
                result_index: 0,
                segments: vec![SpeechSegment::interim("hello")],
            },
            SpeechEvent::Result {
                result_index: 0,
                segments: vec![SpeechSegment::interim("hello world")],
            },
        ]);
        let mut transcriber = Transcriber::new(Box::new(engine));

        transcriber.start();
        transcriber.pump();

        assert_eq!(transcriber.transcript(), "hello world");
    }

    #[test]
    fn test_error_event_leaves_transcript_alone() {
        let engine = ScriptedSpeechEngine::with_events(vec![
            SpeechEvent::Result {
                result_index: 0,
                segments: vec![SpeechSegment::interim("so far")],
            },
            SpeechEvent::Error("no speech".into()),
        ]);
        let mut transcriber = Transcriber::new(Box::new(engine));

        transcriber.start();
        transcriber.pump();

        assert_eq!(transcriber.transcript(), "so far");
    }

    #[test]
    fn test_unavailable_transcriber_is_inert() {
        let mut transcriber = Transcriber::unavailable();
        assert!(!transcriber.is_available());

        transcriber.start();
        transcriber.pump();
        transcriber.stop();
        assert_eq!(transcriber.transcript(), "");
    }
}

//! Live transcription flow tests
//!
//! Recognition events are scripted; the assertions pin down the
//! last-event-wins transcript semantics and the independence of
//! recognition failures from the recording session.

use recital::capture::SyntheticDeviceAccess;
use recital::config::AudioCaptureConfig;
use recital::record::ScriptedRecorderEngine;
use recital::speech::{ScriptedSpeechFactory, SpeechEvent, SpeechSegment};
use recital::ui::AudioPanel;
use std::sync::Arc;

fn panel_with_speech(factory: ScriptedSpeechFactory) -> anyhow::Result<AudioPanel> {
    Ok(AudioPanel::new(
        Arc::new(SyntheticDeviceAccess::granting()),
        Arc::new(ScriptedRecorderEngine::empty()),
        &factory,
        &AudioCaptureConfig::default(),
    )?)
}

fn interim_result(text: &str) -> SpeechEvent {
    SpeechEvent::Result {
        result_index: 0,
        segments: vec![SpeechSegment::interim(text)],
    }
}

#[test]
fn scenario_incremental_results_keep_only_the_last() -> anyhow::Result<()> {
    let factory = ScriptedSpeechFactory::with_events(vec![
        interim_result("hell"),
        interim_result("hello"),
        interim_result("hello world"),
    ]);
    let mut panel = panel_with_speech(factory)?;

    panel.request_access();
    panel.start_recording();
    panel.pump();

    assert_eq!(panel.transcriber().transcript(), "hello world");
    Ok(())
}

#[test]
fn transcript_rebuilds_from_each_events_result_index() -> anyhow::Result<()> {
    let factory = ScriptedSpeechFactory::with_events(vec![
        SpeechEvent::Result {
            result_index: 0,
            segments: vec![SpeechSegment::finalized("one ")],
        },
        // A later event that starts past older results drops them from
        // the display entirely.
        SpeechEvent::Result {
            result_index: 1,
            segments: vec![
                SpeechSegment::finalized("one "),
                SpeechSegment::finalized("two "),
                SpeechSegment::interim("three"),
            ],
        },
    ]);
    let mut panel = panel_with_speech(factory)?;

    panel.request_access();
    panel.start_recording();
    panel.pump();

    assert_eq!(panel.transcriber().transcript(), "two three");
    Ok(())
}

#[test]
fn recognition_error_neither_clears_text_nor_stops_recording() -> anyhow::Result<()> {
    let factory = ScriptedSpeechFactory::with_events(vec![
        interim_result("so far so good"),
        SpeechEvent::Error("audio-capture".into()),
    ]);
    let mut panel = panel_with_speech(factory)?;

    panel.request_access();
    panel.start_recording();
    panel.pump();

    assert_eq!(panel.transcriber().transcript(), "so far so good");
    assert!(panel.controller().state().is_recording());
    Ok(())
}

#[test]
fn absent_engine_disables_transcription_but_not_recording() -> anyhow::Result<()> {
    let mut panel = panel_with_speech(ScriptedSpeechFactory::unavailable())?;

    // The missing capability is surfaced once, at mount.
    assert!(!panel.transcriber().is_available());
    assert!(panel.notice().is_some());

    panel.request_access();
    panel.start_recording();
    panel.stop_recording();
    panel.pump();

    assert!(panel.controller().clip().is_some());
    assert_eq!(panel.transcriber().transcript(), "");
    Ok(())
}

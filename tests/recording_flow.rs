//! End-to-end recording flow tests
//!
//! These drive the recorder panels exactly as the UI buttons do, with
//! scripted capability providers instead of real devices.

use recital::capture::SyntheticDeviceAccess;
use recital::config::AudioCaptureConfig;
use recital::record::ScriptedRecorderEngine;
use recital::speech::ScriptedSpeechFactory;
use recital::ui::{AudioPanel, VideoPanel};
use std::sync::Arc;

fn audio_panel(
    devices: SyntheticDeviceAccess,
    engine: ScriptedRecorderEngine,
) -> anyhow::Result<AudioPanel> {
    Ok(AudioPanel::new(
        Arc::new(devices),
        Arc::new(engine),
        &ScriptedSpeechFactory::with_events(Vec::new()),
        &AudioCaptureConfig::default(),
    )?)
}

fn video_panel(
    devices: SyntheticDeviceAccess,
    engine: ScriptedRecorderEngine,
) -> anyhow::Result<VideoPanel> {
    Ok(VideoPanel::new(Arc::new(devices), Arc::new(engine))?)
}

#[test]
fn scenario_grant_record_stop_yields_playable_audio() -> anyhow::Result<()> {
    let engine = ScriptedRecorderEngine::with_fragments(vec![b"frame1".to_vec(), b"frame2".to_vec()]);
    let mut panel = audio_panel(SyntheticDeviceAccess::granting(), engine)?;

    // Get Microphone
    panel.request_access();
    assert!(panel.gate().permission());
    assert!(panel.notice().is_none());

    // Record
    panel.start_recording();
    assert!(panel.controller().state().is_recording());

    // Stop: the Stop button and the pulsing indicator are tied to the
    // recording state, which must drop immediately on the click
    panel.stop_recording();
    assert!(!panel.controller().state().is_recording());

    panel.pump();
    assert!(panel.controller().state().is_idle());

    let clip = panel.controller().clip().expect("playable clip");
    assert_eq!(clip.mime(), "audio/mp3");
    assert_eq!(clip.len(), 12);
    assert!(clip.url().exists());
    Ok(())
}

#[test]
fn scenario_denied_grant_shows_notice_and_blocks_recording() -> anyhow::Result<()> {
    let mut panel = video_panel(
        SyntheticDeviceAccess::denying("permission denied"),
        ScriptedRecorderEngine::empty(),
    )?;

    // Get Camera, denied
    panel.request_access();
    assert!(panel.notice().is_some(), "denial surfaces a notice");
    assert!(!panel.gate().permission());

    // The Record button never appears without permission, and even a
    // forced start request stays a no-op without a stream.
    panel.start_recording();
    assert!(panel.controller().state().is_idle());
    assert!(panel.controller().clip().is_none());
    Ok(())
}

#[test]
fn start_does_nothing_before_permission() -> anyhow::Result<()> {
    let engine = ScriptedRecorderEngine::with_fragments(vec![b"x".to_vec()]);
    let opened = engine.open_count_handle();
    let mut panel = audio_panel(SyntheticDeviceAccess::granting(), engine)?;

    panel.start_recording();
    assert!(panel.controller().state().is_idle());
    assert_eq!(opened.load(std::sync::atomic::Ordering::SeqCst), 0);
    Ok(())
}

#[test]
fn permission_stays_granted_across_recordings() -> anyhow::Result<()> {
    let mut panel = audio_panel(
        SyntheticDeviceAccess::granting(),
        ScriptedRecorderEngine::empty(),
    )?;

    panel.request_access();
    for _ in 0..3 {
        panel.start_recording();
        panel.stop_recording();
        panel.pump();
        assert!(panel.gate().permission());
    }
    Ok(())
}

#[test]
fn no_clip_without_a_stop() -> anyhow::Result<()> {
    let engine = ScriptedRecorderEngine::with_fragments(vec![b"data".to_vec()]);
    let mut panel = audio_panel(SyntheticDeviceAccess::granting(), engine)?;

    panel.request_access();
    panel.start_recording();
    panel.pump();

    // Fragments have arrived, but without a stop there is no clip.
    assert!(panel.controller().state().is_recording());
    assert!(panel.controller().clip().is_none());
    Ok(())
}

#[test]
fn zero_fragment_recording_still_yields_an_empty_clip() -> anyhow::Result<()> {
    let mut panel = video_panel(
        SyntheticDeviceAccess::granting(),
        ScriptedRecorderEngine::empty(),
    )?;

    panel.request_access();
    panel.start_recording();
    panel.stop_recording();
    panel.pump();

    let clip = panel.controller().clip().expect("clip despite no fragments");
    assert!(clip.is_empty());
    assert_eq!(clip.mime(), "video/webm");
    Ok(())
}

#[test]
fn rerecording_replaces_and_releases_the_previous_clip() -> anyhow::Result<()> {
    let engine = ScriptedRecorderEngine::with_fragments(vec![b"take".to_vec()]);
    let mut panel = audio_panel(SyntheticDeviceAccess::granting(), engine)?;

    panel.request_access();
    panel.start_recording();
    panel.stop_recording();
    panel.pump();
    let first = panel.controller().clip().unwrap().url().to_path_buf();
    assert!(first.exists());

    panel.start_recording();
    assert!(!first.exists(), "previous clip is released on re-record");
    panel.stop_recording();
    panel.pump();

    let second = panel.controller().clip().unwrap().url().to_path_buf();
    assert_ne!(first, second);
    Ok(())
}

#[test]
fn failing_engine_surfaces_a_notice_and_stays_idle() -> anyhow::Result<()> {
    let mut panel = audio_panel(
        SyntheticDeviceAccess::granting(),
        ScriptedRecorderEngine::failing("no encoder"),
    )?;

    panel.request_access();
    panel.start_recording();

    assert!(panel.controller().state().is_idle());
    assert!(panel.notice().is_some());
    Ok(())
}

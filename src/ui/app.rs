//! Top-level application: picks which recorder view is mounted
//!
//! Exactly zero or one recorder is mounted at a time. Switching kinds
//! drops the previous panel, which force-stops any session it still had
//! running.

use super::components::{AudioPanel, VideoPanel};
use super::theme::Theme;
use crate::capture::{DeviceAccess, MediaKind, NativeDeviceAccess};
use crate::config::{AudioCaptureConfig, SpeechConfig, VideoCaptureConfig};
use crate::record::{Mp3RecorderEngine, RecorderEngine, WebmRecorderEngine};
use crate::speech::{SpeechEngineFactory, WhisperSpeechFactory};
use egui::{CentralPanel, RichText};
use std::sync::Arc;
use tracing::{info, warn};

/// The capability providers the application runs on
///
/// Injected at construction so the whole flow can run against real
/// hardware or against scripted stand-ins.
pub struct Capabilities {
    pub devices: Arc<dyn DeviceAccess>,
    pub audio_recorder: Arc<dyn RecorderEngine>,
    pub video_recorder: Arc<dyn RecorderEngine>,
    pub speech: Arc<dyn SpeechEngineFactory>,
    pub audio_config: AudioCaptureConfig,
}

impl Capabilities {
    /// Platform-backed providers with default configuration
    pub fn native() -> Self {
        let audio_config = AudioCaptureConfig::default();
        Self {
            devices: Arc::new(NativeDeviceAccess::new()),
            audio_recorder: Arc::new(Mp3RecorderEngine::new(audio_config.clone())),
            video_recorder: Arc::new(WebmRecorderEngine::new(VideoCaptureConfig::default())),
            speech: Arc::new(WhisperSpeechFactory::new(SpeechConfig::default())),
            audio_config,
        }
    }
}

enum MountedView {
    None,
    Audio(AudioPanel),
    Video(VideoPanel),
}

/// Main Recital application
pub struct RecitalApp {
    caps: Capabilities,
    theme: Theme,
    mounted: MountedView,
    initialized: bool,
    notice: Option<String>,
}

impl RecitalApp {
    pub fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            theme: Theme::dark(),
            mounted: MountedView::None,
            initialized: false,
            notice: None,
        }
    }

    /// Mount the recorder of the given kind, unmounting any other
    pub fn select(&mut self, kind: MediaKind) {
        if self.mounted_kind() == Some(kind) {
            return;
        }

        // Dropping the old panel stops any session it still had running.
        self.mounted = MountedView::None;
        self.notice = None;
        info!("Mounting {} recorder", kind);

        let mounted = match kind {
            MediaKind::Audio => AudioPanel::new(
                Arc::clone(&self.caps.devices),
                Arc::clone(&self.caps.audio_recorder),
                self.caps.speech.as_ref(),
                &self.caps.audio_config,
            )
            .map(MountedView::Audio),
            MediaKind::Video => VideoPanel::new(
                Arc::clone(&self.caps.devices),
                Arc::clone(&self.caps.video_recorder),
            )
            .map(MountedView::Video),
        };

        match mounted {
            Ok(view) => self.mounted = view,
            Err(e) => {
                warn!("Failed to mount {} recorder: {}", kind, e);
                self.notice = Some(e.user_message());
            }
        }
    }

    /// Which recorder is currently mounted
    pub fn mounted_kind(&self) -> Option<MediaKind> {
        match &self.mounted {
            MountedView::None => None,
            MountedView::Audio(_) => Some(MediaKind::Audio),
            MountedView::Video(_) => Some(MediaKind::Video),
        }
    }

    pub fn audio_panel(&self) -> Option<&AudioPanel> {
        match &self.mounted {
            MountedView::Audio(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn audio_panel_mut(&mut self) -> Option<&mut AudioPanel> {
        match &mut self.mounted {
            MountedView::Audio(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn video_panel(&self) -> Option<&VideoPanel> {
        match &self.mounted {
            MountedView::Video(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn video_panel_mut(&mut self) -> Option<&mut VideoPanel> {
        match &mut self.mounted {
            MountedView::Video(panel) => Some(panel),
            _ => None,
        }
    }

    fn initialize(&mut self, ctx: &egui::Context) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.theme.apply(ctx);
        info!("Recital UI initialized");
    }
}

impl eframe::App for RecitalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.initialize(ctx);

        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(self.theme.spacing);
                ui.label(RichText::new("Recital").heading().strong());
                ui.add_space(self.theme.spacing_sm);

                ui.horizontal(|ui| {
                    // Center the two selector buttons as one row.
                    let width = 240.0;
                    ui.add_space((ui.available_width() - width).max(0.0) / 2.0);
                    if ui.button("Record Audio").clicked() {
                        self.select(MediaKind::Audio);
                    }
                    if ui.button("Record Video").clicked() {
                        self.select(MediaKind::Video);
                    }
                });
                ui.add_space(self.theme.spacing);
            });

            let theme = self.theme.clone();
            match &mut self.mounted {
                MountedView::None => {}
                MountedView::Audio(panel) => panel.show(ui, &theme),
                MountedView::Video(panel) => panel.show(ui, &theme),
            }

            if let Some(notice) = self.notice.clone() {
                ui.add_space(theme.spacing_sm);
                super::components::notice_banner(ui, &theme, &notice);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::SyntheticDeviceAccess;
    use crate::record::ScriptedRecorderEngine;
    use crate::speech::ScriptedSpeechFactory;

    fn scripted_caps() -> Capabilities {
        Capabilities {
            devices: Arc::new(SyntheticDeviceAccess::granting()),
            audio_recorder: Arc::new(ScriptedRecorderEngine::empty()),
            video_recorder: Arc::new(ScriptedRecorderEngine::empty()),
            speech: Arc::new(ScriptedSpeechFactory::with_events(Vec::new())),
            audio_config: AudioCaptureConfig::default(),
        }
    }

    #[test]
    fn test_starts_with_nothing_mounted() {
        let app = RecitalApp::new(scripted_caps());
        assert_eq!(app.mounted_kind(), None);
    }

    #[test]
    fn test_selecting_mounts_exactly_one_recorder() {
        let mut app = RecitalApp::new(scripted_caps());

        app.select(MediaKind::Audio);
        assert_eq!(app.mounted_kind(), Some(MediaKind::Audio));
        assert!(app.audio_panel().is_some());
        assert!(app.video_panel().is_none());

        app.select(MediaKind::Video);
        assert_eq!(app.mounted_kind(), Some(MediaKind::Video));
        assert!(app.audio_panel().is_none());
        assert!(app.video_panel().is_some());
    }

    #[test]
    fn test_reselecting_keeps_the_mounted_panel() {
        let mut app = RecitalApp::new(scripted_caps());

        app.select(MediaKind::Audio);
        app.audio_panel_mut().unwrap().request_access();
        assert!(app.audio_panel().unwrap().gate().permission());

        // Clicking the same selector again must not remount and lose state.
        app.select(MediaKind::Audio);
        assert!(app.audio_panel().unwrap().gate().permission());
    }

    #[test]
    fn test_switching_away_stops_an_active_recording() {
        let engine = ScriptedRecorderEngine::empty();
        let stopped = engine.session_stopped_handle();
        let mut caps = scripted_caps();
        caps.audio_recorder = Arc::new(engine);
        let mut app = RecitalApp::new(caps);

        app.select(MediaKind::Audio);
        let panel = app.audio_panel_mut().unwrap();
        panel.request_access();
        panel.start_recording();
        assert!(panel.controller().state().is_recording());

        app.select(MediaKind::Video);
        assert!(stopped.load(std::sync::atomic::Ordering::SeqCst));
    }
}

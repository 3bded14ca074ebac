//! Audio recorder panel
//!
//! Drives the microphone gate, the MP3 recorder, and live transcription.
//! The interaction handlers are separate from the rendering so the flow
//! can be exercised without a UI.

use super::{notice_banner, CaptureIndicator, ClipPlayer, LevelStrip, TranscriptView};
use crate::capture::{CaptureGate, DeviceAccess, MediaConstraints, MediaKind};
use crate::config::AudioCaptureConfig;
use crate::record::{ClipStore, RecorderController, RecorderEngine};
use crate::speech::{SpeechEngineFactory, Transcriber};
use crate::ui::theme::Theme;
use crate::Result;
use egui::RichText;
use std::sync::Arc;
use tracing::{info, warn};

/// One mounted audio recorder view
pub struct AudioPanel {
    gate: CaptureGate,
    controller: RecorderController,
    transcriber: Transcriber,
    player: ClipPlayer,
    waveform: Vec<f32>,
    waveform_capacity: usize,
    notice: Option<String>,
}

impl AudioPanel {
    pub fn new(
        devices: Arc<dyn DeviceAccess>,
        engine: Arc<dyn RecorderEngine>,
        speech: &dyn SpeechEngineFactory,
        config: &AudioCaptureConfig,
    ) -> Result<Self> {
        // The recognition engine is acquired once at mount; when that
        // fails the view keeps running without transcription.
        let (transcriber, notice) = match speech.create() {
            Ok(engine) => (Transcriber::new(engine), None),
            Err(e) => {
                warn!("Speech recognition unavailable: {}", e);
                (Transcriber::unavailable(), Some(e.user_message()))
            }
        };

        Ok(Self {
            gate: CaptureGate::new(devices, MediaConstraints::audio_only()),
            controller: RecorderController::new(MediaKind::Audio, engine, ClipStore::new()?),
            transcriber,
            player: ClipPlayer::new(),
            waveform: Vec::new(),
            waveform_capacity: config.waveform_samples,
            notice,
        })
    }

    /// "Get Microphone" click
    pub fn request_access(&mut self) {
        match self.gate.request_access() {
            Ok(()) => self.notice = None,
            Err(e) => {
                warn!("Microphone access failed: {}", e);
                self.notice = Some(e.user_message());
            }
        }
    }

    /// "Record" click: start the session and recognition together
    pub fn start_recording(&mut self) {
        if let Err(e) = self.controller.start(self.gate.stream()) {
            warn!("Failed to start recording: {}", e);
            self.notice = Some(e.user_message());
            return;
        }
        if self.controller.state().is_recording() {
            self.transcriber.start();
        }
    }

    /// "Stop" click: recognition stops alongside the session
    pub fn stop_recording(&mut self) {
        if let Err(e) = self.controller.stop() {
            warn!("Failed to stop recording: {}", e);
            self.notice = Some(e.user_message());
        }
        self.transcriber.stop();
    }

    /// Drain session, recognition, and preview feeds; call every frame
    pub fn pump(&mut self) {
        self.controller.pump();
        self.transcriber.pump();
        if let Some(mic) = self.gate.stream().and_then(|s| s.as_microphone()) {
            mic.drain_preview(&mut self.waveform, self.waveform_capacity);
        }
    }

    pub fn gate(&self) -> &CaptureGate {
        &self.gate
    }

    pub fn controller(&self) -> &RecorderController {
        &self.controller
    }

    pub fn transcriber(&self) -> &Transcriber {
        &self.transcriber
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn show(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        self.pump();

        ui.vertical_centered(|ui| {
            ui.heading("Audio Recorder");
            ui.add_space(theme.spacing_sm);

            let state = self.controller.state();
            if !self.gate.permission() {
                if ui.button("Get Microphone").clicked() {
                    info!("Microphone access requested");
                    self.request_access();
                }
            } else if state.is_idle() {
                if ui.button("Record").clicked() {
                    self.start_recording();
                }
            }

            if state.is_recording() {
                if ui.button("Stop").clicked() {
                    self.stop_recording();
                }
                CaptureIndicator::new(MediaKind::Audio, theme).show(ui);
            } else if state.is_finalizing() {
                ui.label(RichText::new("Saving…").color(theme.text_muted));
            }

            if self.gate.stream().is_some() {
                ui.add_space(theme.spacing_sm);
                LevelStrip::new(&self.waveform, theme).show(ui);
            }

            if state.is_idle() {
                if let Some(clip) = self.controller.clip() {
                    ui.add_space(theme.spacing_sm);
                    if let Some(problem) = self.player.show(ui, theme, clip) {
                        self.notice = Some(problem);
                    }
                }
            }

            ui.add_space(theme.spacing);
            TranscriptView::new(
                self.transcriber.transcript(),
                self.transcriber.is_available(),
                theme,
            )
            .show(ui);

            if let Some(notice) = self.notice.clone() {
                ui.add_space(theme.spacing_sm);
                notice_banner(ui, theme, &notice);
            }
        });

        // Channel-fed state changes between clicks need repaints too.
        if self.gate.stream().is_some() || !self.controller.state().is_idle() {
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

//! Video recorder panel
//!
//! Drives the camera gate and the WebM recorder, and renders the live
//! camera preview as an egui texture while the stream is up.

use super::{notice_banner, CaptureIndicator, ClipPlayer};
use crate::capture::{CaptureGate, DeviceAccess, MediaConstraints, MediaKind};
use crate::record::{ClipStore, RecorderController, RecorderEngine};
use crate::ui::theme::Theme;
use crate::Result;
use egui::{ColorImage, RichText, TextureHandle, TextureOptions};
use std::sync::Arc;
use tracing::{info, warn};

/// One mounted video recorder view
pub struct VideoPanel {
    gate: CaptureGate,
    controller: RecorderController,
    player: ClipPlayer,
    preview: Option<TextureHandle>,
    notice: Option<String>,
}

impl VideoPanel {
    pub fn new(devices: Arc<dyn DeviceAccess>, engine: Arc<dyn RecorderEngine>) -> Result<Self> {
        Ok(Self {
            gate: CaptureGate::new(devices, MediaConstraints::video_only()),
            controller: RecorderController::new(MediaKind::Video, engine, ClipStore::new()?),
            player: ClipPlayer::new(),
            preview: None,
            notice: None,
        })
    }

    /// "Get Camera" click
    pub fn request_access(&mut self) {
        match self.gate.request_access() {
            Ok(()) => self.notice = None,
            Err(e) => {
                warn!("Camera access failed: {}", e);
                self.notice = Some(e.user_message());
            }
        }
    }

    /// "Record" click; without a live stream this is a no-op, the same
    /// policy the audio panel applies
    pub fn start_recording(&mut self) {
        if let Err(e) = self.controller.start(self.gate.stream()) {
            warn!("Failed to start recording: {}", e);
            self.notice = Some(e.user_message());
        }
    }

    /// "Stop" click
    pub fn stop_recording(&mut self) {
        if let Err(e) = self.controller.stop() {
            warn!("Failed to stop recording: {}", e);
            self.notice = Some(e.user_message());
        }
    }

    /// Drain session events; call every frame
    pub fn pump(&mut self) {
        self.controller.pump();
    }

    pub fn gate(&self) -> &CaptureGate {
        &self.gate
    }

    pub fn controller(&self) -> &RecorderController {
        &self.controller
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let Some(cam) = self.gate.stream().and_then(|s| s.as_camera()) else {
            return;
        };
        let Some(frame) = cam.latest_preview() else {
            return;
        };

        let image = ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.rgba,
        );
        match self.preview.as_mut() {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                self.preview = Some(ctx.load_texture("camera-preview", image, TextureOptions::LINEAR));
            }
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        self.pump();
        self.refresh_preview(ui.ctx());

        ui.vertical_centered(|ui| {
            ui.heading("Video Recorder");
            ui.add_space(theme.spacing_sm);

            let state = self.controller.state();
            if !self.gate.permission() {
                if ui.button("Get Camera").clicked() {
                    info!("Camera access requested");
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
                CaptureIndicator::new(MediaKind::Video, theme).show(ui);
            } else if state.is_finalizing() {
                ui.label(RichText::new("Saving…").color(theme.text_muted));
            }

            if let Some(texture) = self.preview.as_ref() {
                if self.gate.stream().is_some() {
                    ui.add_space(theme.spacing_sm);
                    ui.add(egui::Image::new(texture).max_width(400.0));
                }
            }

            if state.is_idle() {
                if let Some(clip) = self.controller.clip() {
                    ui.add_space(theme.spacing_sm);
                    if let Some(problem) = self.player.show(ui, theme, clip) {
                        self.notice = Some(problem);
                    }
                }
            }

            if let Some(notice) = self.notice.clone() {
                ui.add_space(theme.spacing_sm);
                notice_banner(ui, theme, &notice);
            }
        });

        if self.gate.stream().is_some() || !self.controller.state().is_idle() {
            ui.ctx()
                .request_repaint_after(std::time::Duration::from_millis(33));
        }
    }
}

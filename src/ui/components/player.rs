//! Clip playback row
//!
//! Plays finished audio clips through rodio. Video clips cannot be
//! decoded in-app, so their row offers the system player instead.

use crate::record::Clip;
use crate::ui::theme::Theme;
use crate::{MediaKind, RecitalError, Result};
use egui::RichText;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Audio output handle plus the currently playing sink
pub struct ClipPlayer {
    // The stream must outlive every sink attached to it.
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl ClipPlayer {
    pub fn new() -> Self {
        let output = match OutputStream::try_default() {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!("No audio output available: {}", e);
                None
            }
        };
        Self { output, sink: None }
    }

    fn play(&mut self, path: &Path) -> Result<()> {
        let Some((_, handle)) = self.output.as_ref() else {
            return Err(RecitalError::Unsupported("Audio playback".into()));
        };
        let handle = handle.clone();

        self.stop();
        let file = File::open(path)?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| RecitalError::Clip(format!("Failed to decode clip: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| RecitalError::Clip(format!("Failed to open playback sink: {}", e)))?;
        sink.append(source);
        self.sink = Some(sink);
        info!("Playing {}", path.display());
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| !s.empty())
    }

    /// Render the playback row for `clip`; returns an error message to
    /// surface as a panel notice, if any
    pub fn show(&mut self, ui: &mut egui::Ui, theme: &Theme, clip: &Clip) -> Option<String> {
        let mut notice = None;

        egui::Frame::none()
            .fill(theme.bg_secondary)
            .rounding(theme.card_rounding)
            .inner_margin(theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    match clip.kind() {
                        MediaKind::Audio => {
                            if self.is_playing() {
                                if ui.button(RichText::new("⏹").size(18.0)).clicked() {
                                    self.stop();
                                }
                            } else if ui.button(RichText::new("▶").size(18.0)).clicked() {
                                if let Err(e) = self.play(clip.url()) {
                                    warn!("Playback failed: {}", e);
                                    notice = Some(e.user_message());
                                }
                            }
                        }
                        MediaKind::Video => {
                            if ui.button("Open").clicked() {
                                if let Err(e) = open_in_system_player(clip.url()) {
                                    warn!("Could not open clip: {}", e);
                                    notice = Some("Could not open the clip.".to_string());
                                }
                            }
                        }
                    }

                    ui.vertical(|ui| {
                        ui.label(
                            RichText::new(format!(
                                "{} · {:.1} kB",
                                clip.mime(),
                                clip.len() as f64 / 1024.0
                            ))
                            .color(theme.text_primary),
                        );
                        ui.label(
                            RichText::new(format!(
                                "recorded at {}",
                                clip.recorded_at().format("%H:%M:%S")
                            ))
                            .size(11.0)
                            .color(theme.text_muted),
                        );
                    });
                });
            });

        notice
    }
}

impl Default for ClipPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// Hand a file to the platform's default player
fn open_in_system_player(path: &Path) -> std::io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        let mut c = std::process::Command::new("open");
        c.arg(path);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]).arg(path);
        c
    } else {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(path);
        c
    };
    command.spawn().map(|_| ())
}

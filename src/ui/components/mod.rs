//! Reusable UI components for the recorder panels

pub mod audio_panel;
pub mod indicator;
pub mod player;
pub mod transcript_view;
pub mod video_panel;
pub mod waveform;

pub use audio_panel::AudioPanel;
pub use indicator::CaptureIndicator;
pub use player::ClipPlayer;
pub use transcript_view::TranscriptView;
pub use video_panel::VideoPanel;
pub use waveform::LevelStrip;

use crate::ui::theme::Theme;
use egui::RichText;

/// Blocking notice shown inside a panel, the desktop analog of an alert
pub(crate) fn notice_banner(ui: &mut egui::Ui, theme: &Theme, text: &str) {
    egui::Frame::none()
        .fill(theme.error.gamma_multiply(0.15))
        .rounding(theme.card_rounding)
        .inner_margin(theme.spacing_sm)
        .show(ui, |ui| {
            ui.label(RichText::new(text).color(theme.error));
        });
}

//! Recognized-speech display for the audio panel

use crate::ui::theme::Theme;
use egui::RichText;

/// Shows the live transcript, or why there is none
pub struct TranscriptView<'a> {
    transcript: &'a str,
    available: bool,
    theme: &'a Theme,
}

impl<'a> TranscriptView<'a> {
    pub fn new(transcript: &'a str, available: bool, theme: &'a Theme) -> Self {
        Self {
            transcript,
            available,
            theme,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Recognized Speech:")
                .strong()
                .color(self.theme.text_primary),
        );

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width().min(360.0));
                if !self.available {
                    ui.label(
                        RichText::new("Speech recognition is not available.")
                            .italics()
                            .color(self.theme.text_muted),
                    );
                } else if self.transcript.is_empty() {
                    ui.label(RichText::new("…").color(self.theme.text_muted));
                } else {
                    ui.label(RichText::new(self.transcript).color(self.theme.text_primary));
                }
            });
    }
}

//! Live input level strip for the audio panel

use crate::ui::theme::Theme;
use egui::{Pos2, Rect, Sense, Stroke, Vec2};

/// Bar-style rendering of recent microphone samples
pub struct LevelStrip<'a> {
    samples: &'a [f32],
    theme: &'a Theme,
    height: f32,
}

impl<'a> LevelStrip<'a> {
    pub fn new(samples: &'a [f32], theme: &'a Theme) -> Self {
        Self {
            samples,
            theme,
            height: 48.0,
        }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let size = Vec2::new(ui.available_width().min(360.0), self.height);
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());

        if !ui.is_rect_visible(rect) {
            return response;
        }
        let painter = ui.painter();
        painter.rect_filled(rect, self.theme.card_rounding, self.theme.bg_secondary);

        let inner = rect.shrink(6.0);
        if self.samples.is_empty() {
            painter.line_segment(
                [
                    Pos2::new(inner.left(), inner.center().y),
                    Pos2::new(inner.right(), inner.center().y),
                ],
                Stroke::new(1.0, self.theme.text_muted),
            );
            return response;
        }

        self.draw_bars(painter, inner);
        response
    }

    fn draw_bars(&self, painter: &egui::Painter, rect: Rect) {
        const BARS: usize = 48;
        let per_bar = (self.samples.len() / BARS).max(1);
        let bar_width = rect.width() / BARS as f32;
        let half = rect.height() / 2.0;

        for (i, window) in self.samples.chunks(per_bar).take(BARS).enumerate() {
            let peak = window.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
            let amplitude = (peak * half).clamp(1.0, half);

            let x = rect.left() + i as f32 * bar_width + bar_width / 2.0;
            painter.line_segment(
                [
                    Pos2::new(x, rect.center().y - amplitude),
                    Pos2::new(x, rect.center().y + amplitude),
                ],
                Stroke::new((bar_width - 1.5).max(1.0), self.theme.waveform),
            );
        }
    }
}

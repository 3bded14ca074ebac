//! Pulsing capture indicator
//!
//! Small animated icon shown while a session is recording: a microphone
//! for audio, a camera for video, each inside pulsing rings.

use crate::capture::MediaKind;
use crate::ui::theme::Theme;
use egui::{Pos2, Rect, Sense, Stroke, Vec2};

/// Animated recording indicator for one media kind
pub struct CaptureIndicator<'a> {
    kind: MediaKind,
    theme: &'a Theme,
}

impl<'a> CaptureIndicator<'a> {
    pub fn new(kind: MediaKind, theme: &'a Theme) -> Self {
        Self { kind, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(48.0), Sense::hover());

        if ui.is_rect_visible(rect) {
            let center = rect.center();
            match self.kind {
                MediaKind::Audio => self.draw_mic(ui, center),
                MediaKind::Video => self.draw_camera(ui, center),
            }
            self.draw_pulse(ui, center);
        }

        // Keep the pulse animating.
        ui.ctx().request_repaint();
        response
    }

    fn draw_mic(&self, ui: &egui::Ui, center: Pos2) {
        let painter = ui.painter();
        let color = self.theme.recording;

        // Capsule body
        let body = Rect::from_center_size(Pos2::new(center.x, center.y - 4.0), Vec2::new(8.0, 14.0));
        painter.rect_filled(body, 4.0, color);

        // Stand: stem and base
        painter.line_segment(
            [
                Pos2::new(center.x, center.y + 4.0),
                Pos2::new(center.x, center.y + 10.0),
            ],
            Stroke::new(2.0, color),
        );
        painter.line_segment(
            [
                Pos2::new(center.x - 5.0, center.y + 10.0),
                Pos2::new(center.x + 5.0, center.y + 10.0),
            ],
            Stroke::new(2.0, color),
        );
    }

    fn draw_camera(&self, ui: &egui::Ui, center: Pos2) {
        let painter = ui.painter();
        let color = self.theme.recording;

        let body = Rect::from_center_size(center, Vec2::new(18.0, 13.0));
        painter.rect_filled(body, 3.0, color);
        painter.circle_stroke(center, 3.5, Stroke::new(1.5, self.theme.bg_primary));
    }

    fn draw_pulse(&self, ui: &egui::Ui, center: Pos2) {
        let painter = ui.painter();
        let t = ui.ctx().input(|i| i.time);
        let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

        let radius = 16.0 + pulse * 6.0;
        let alpha = (1.0 - pulse) * 0.6;
        painter.circle_stroke(
            center,
            radius,
            Stroke::new(1.5 + pulse, self.theme.recording.gamma_multiply(alpha)),
        );
    }
}

//! Theme and styling for the Recital UI

use egui::{Color32, Rounding, Visuals};

/// Application theme configuration
#[derive(Clone, Debug)]
pub struct Theme {
    /// Primary accent color
    pub primary: Color32,
    /// Error / notice color
    pub error: Color32,
    /// Recording indicator color
    pub recording: Color32,

    /// Background colors
    pub bg_primary: Color32,
    pub bg_secondary: Color32,

    /// Text colors
    pub text_primary: Color32,
    pub text_muted: Color32,

    /// Waveform bar color
    pub waveform: Color32,

    /// Border radius for cards/panels
    pub card_rounding: Rounding,

    /// Standard spacing
    pub spacing: f32,
    /// Small spacing
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Create the default dark theme
    pub fn dark() -> Self {
        Self {
            primary: Color32::from_rgb(45, 170, 158),  // Teal
            error: Color32::from_rgb(231, 76, 60),     // Red
            recording: Color32::from_rgb(231, 76, 60), // Red

            bg_primary: Color32::from_rgb(24, 26, 31),
            bg_secondary: Color32::from_rgb(36, 39, 46),

            text_primary: Color32::from_rgb(236, 239, 244),
            text_muted: Color32::from_rgb(144, 152, 166),

            waveform: Color32::from_rgb(45, 170, 158),

            card_rounding: Rounding::same(10.0),

            spacing: 16.0,
            spacing_sm: 8.0,
        }
    }

    /// Apply this theme to the egui context
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();
        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.override_text_color = Some(self.text_primary);
        visuals.selection.bg_fill = self.primary.gamma_multiply(0.4);
        ctx.set_visuals(visuals);
    }
}

use serde::{Deserialize, Serialize};

pub const FONT_SIZE_DEFAULT: u8 = 16;
pub const FONT_SIZE_STEP: u8 = 2;
pub const FONT_SIZE_MIN: u8 = 12;
pub const FONT_SIZE_MAX: u8 = 24;

const TEXT_SPACING_MIN: f32 = 1.0;
const TEXT_SPACING_MAX: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBlindMode {
    #[default]
    None,
    Protanopia,
    Deuteranopia,
    Tritanopia,
}

/// Display overrides chosen by the user. Survive logout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilitySettings {
    pub high_contrast: bool,
    pub font_size: u8,
    pub reduced_motion: bool,
    pub text_spacing: f32,
    pub color_blind_mode: ColorBlindMode,
    pub dark_theme: bool,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            high_contrast: false,
            font_size: FONT_SIZE_DEFAULT,
            reduced_motion: false,
            text_spacing: TEXT_SPACING_MIN,
            color_blind_mode: ColorBlindMode::None,
            dark_theme: false,
        }
    }
}

impl AccessibilitySettings {
    pub fn toggle_high_contrast(&mut self) {
        self.high_contrast = !self.high_contrast;
    }

    pub fn increase_font_size(&mut self) {
        self.font_size = self
            .font_size
            .saturating_add(FONT_SIZE_STEP)
            .min(FONT_SIZE_MAX);
    }

    pub fn decrease_font_size(&mut self) {
        self.font_size = self
            .font_size
            .saturating_sub(FONT_SIZE_STEP)
            .max(FONT_SIZE_MIN);
    }

    pub fn reset_font_size(&mut self) {
        self.font_size = FONT_SIZE_DEFAULT;
    }

    pub fn toggle_reduced_motion(&mut self) {
        self.reduced_motion = !self.reduced_motion;
    }

    /// Non-finite values reset to the default spacing.
    pub fn set_text_spacing(&mut self, spacing: f32) {
        self.text_spacing = if spacing.is_finite() {
            spacing.clamp(TEXT_SPACING_MIN, TEXT_SPACING_MAX)
        } else {
            TEXT_SPACING_MIN
        };
    }

    pub fn set_color_blind_mode(&mut self, mode: ColorBlindMode) {
        self.color_blind_mode = mode;
    }

    pub fn toggle_dark_theme(&mut self) {
        self.dark_theme = !self.dark_theme;
    }

    /// Brings values loaded from disk back into their valid ranges.
    pub fn sanitized(mut self) -> Self {
        self.font_size = self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
        self.set_text_spacing(self.text_spacing);
        self
    }
}

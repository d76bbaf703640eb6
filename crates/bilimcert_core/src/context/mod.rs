//! Cross-cutting user preferences: interface language and accessibility.
mod accessibility;
mod language;

pub use accessibility::{
    AccessibilitySettings, ColorBlindMode, FONT_SIZE_DEFAULT, FONT_SIZE_MAX, FONT_SIZE_MIN,
    FONT_SIZE_STEP,
};
pub use language::{Language, Translator};

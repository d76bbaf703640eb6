use std::fs;
use std::path::Path;

use bilimcert_core::context::{AccessibilitySettings, Language};
use bilimcert_gateway::{ensure_state_dir, AtomicFileWriter, PersistError};
use portal_logging::{portal_info, portal_warn};
use serde::{Deserialize, Serialize};

pub const PREFERENCES_FILENAME: &str = "preferences.ron";

/// What survives a restart: the chosen language and accessibility settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub language: Language,
    pub accessibility: AccessibilitySettings,
}

/// Missing or unreadable preferences fall back to the defaults.
pub fn load_preferences(state_dir: &Path) -> Preferences {
    let path = state_dir.join(PREFERENCES_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Preferences::default();
        }
        Err(err) => {
            portal_warn!("Failed to read preferences from {:?}: {}", path, err);
            return Preferences::default();
        }
    };

    match ron::from_str::<Preferences>(&content) {
        Ok(prefs) => {
            portal_info!("Loaded preferences from {:?}", path);
            Preferences {
                language: prefs.language,
                accessibility: prefs.accessibility.sanitized(),
            }
        }
        Err(err) => {
            portal_warn!("Failed to parse preferences from {:?}: {}", path, err);
            Preferences::default()
        }
    }
}

pub fn save_preferences(state_dir: &Path, prefs: &Preferences) -> Result<(), PersistError> {
    ensure_state_dir(state_dir)?;

    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(prefs, pretty)
        .map_err(|err| PersistError::Serialize(err.to_string()))?;

    AtomicFileWriter::new(state_dir.to_path_buf()).write(PREFERENCES_FILENAME, &content)?;
    Ok(())
}

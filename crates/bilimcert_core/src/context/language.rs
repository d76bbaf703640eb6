use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Kz,
    Ru,
    En,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Kz, Language::Ru, Language::En];

    pub fn code(self) -> &'static str {
        match self {
            Language::Kz => "kz",
            Language::Ru => "ru",
            Language::En => "en",
        }
    }

    /// Accepts `kz`, `ru`, `en`, plus the ISO `kk` for Kazakh, in any case.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "kz" | "kk" => Some(Language::Kz),
            "ru" => Some(Language::Ru),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Kz => "Kazakh",
            Language::Ru => "Russian",
            Language::En => "English",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Language::Kz => "Қазақша",
            Language::Ru => "Русский",
            Language::En => "English",
        }
    }

    fn builtin_table(self) -> &'static str {
        match self {
            Language::Kz => include_str!("../../locales/kz.json"),
            Language::Ru => include_str!("../../locales/ru.json"),
            Language::En => include_str!("../../locales/en.json"),
        }
    }
}

/// Nested JSON translation tables addressed by dotted keys.
///
/// Lookups that do not resolve to a string return the key unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Translator {
    language: Language,
    tables: BTreeMap<Language, Value>,
}

impl Translator {
    /// Translator with only the built-in engine strings.
    pub fn builtin(language: Language) -> Self {
        let tables = Language::ALL
            .into_iter()
            .map(|lang| {
                let table = serde_json::from_str(lang.builtin_table())
                    .unwrap_or_else(|_| Value::Object(Default::default()));
                (lang, table)
            })
            .collect();
        Self { language, tables }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Deep-merges `table` over the existing one for `language`.
    pub fn merge_table(&mut self, language: Language, table: Value) {
        let target = self
            .tables
            .entry(language)
            .or_insert_with(|| Value::Object(Default::default()));
        merge(target, table);
    }

    /// Parses a JSON document and merges it; the existing table is untouched
    /// on error.
    pub fn load_table(&mut self, language: Language, json: &str) -> Result<(), serde_json::Error> {
        let table = serde_json::from_str(json)?;
        self.merge_table(language, table);
        Ok(())
    }

    pub fn t(&self, key: &str) -> String {
        self.t_in(self.language, key, &[])
    }

    /// Like `t`, replacing `{{name}}` placeholders from `params`.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        self.t_in(self.language, key, params)
    }

    pub fn t_in(&self, language: Language, key: &str, params: &[(&str, &str)]) -> String {
        let Some(template) = self.lookup(language, key) else {
            return key.to_string();
        };
        params
            .iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{{{name}}}}}"), value)
            })
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        let mut node = self.tables.get(&language)?;
        for part in key.split('.') {
            node = node.get(part)?;
        }
        node.as_str()
    }
}

fn merge(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match existing.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        existing.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

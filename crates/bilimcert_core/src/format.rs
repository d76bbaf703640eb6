//! Display helpers shared by listing cards, review pages and attachments.
use chrono::{DateTime, Datelike, Utc};

use crate::context::Language;

const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human-readable size with at most two decimals, e.g. `1.5 MB`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

/// Cuts `text` to `max_chars` characters and appends `...` when shortened.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim())
}

/// Lowercase, dash-separated slug. Letters and digits of any script are kept
/// so Kazakh and Russian titles still produce readable slugs.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_dash = true;
        }
    }
    slug
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

struct TimeUnits {
    second: &'static str,
    minute: &'static str,
    hour: &'static str,
    day: &'static str,
    week: &'static str,
    month: &'static str,
    year: &'static str,
    ago: &'static str,
}

fn time_units(language: Language) -> TimeUnits {
    match language {
        Language::Kz => TimeUnits {
            second: "секунд",
            minute: "минут",
            hour: "сағат",
            day: "күн",
            week: "апта",
            month: "ай",
            year: "жыл",
            ago: "бұрын",
        },
        Language::Ru => TimeUnits {
            second: "секунд",
            minute: "минут",
            hour: "часов",
            day: "дней",
            week: "недель",
            month: "месяцев",
            year: "лет",
            ago: "назад",
        },
        Language::En => TimeUnits {
            second: "seconds",
            minute: "minutes",
            hour: "hours",
            day: "days",
            week: "weeks",
            month: "months",
            year: "years",
            ago: "ago",
        },
    }
}

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;
const MONTH: i64 = 2_629_746;
const YEAR: i64 = 31_556_952;

/// `3 days ago`, in the given language. Future instants count as zero seconds.
pub fn format_relative_time(
    published: DateTime<Utc>,
    now: DateTime<Utc>,
    language: Language,
) -> String {
    let seconds = (now - published).num_seconds().max(0);
    let units = time_units(language);
    let (amount, unit) = match seconds {
        s if s < MINUTE => (s, units.second),
        s if s < HOUR => (s / MINUTE, units.minute),
        s if s < DAY => (s / HOUR, units.hour),
        s if s < WEEK => (s / DAY, units.day),
        s if s < MONTH => (s / WEEK, units.week),
        s if s < YEAR => (s / MONTH, units.month),
        s => (s / YEAR, units.year),
    };
    format!("{amount} {unit} {}", units.ago)
}

const MONTHS_KZ: [&str; 12] = [
    "қаңтар", "ақпан", "наурыз", "сәуір", "мамыр", "маусым", "шілде", "тамыз", "қыркүйек",
    "қазан", "қараша", "желтоқсан",
];
const MONTHS_RU: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня", "июля", "августа", "сентября",
    "октября", "ноября", "декабря",
];
const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Long-form calendar date: `2024 ж. 15 маусым`, `15 июня 2024 г.`,
/// `June 15, 2024`.
pub fn format_date(date: DateTime<Utc>, language: Language) -> String {
    let month = date.month0() as usize;
    let (day, year) = (date.day(), date.year());
    match language {
        Language::Kz => format!("{year} ж. {day} {}", MONTHS_KZ[month]),
        Language::Ru => format!("{day} {} {year} г.", MONTHS_RU[month]),
        Language::En => format!("{} {day}, {year}", MONTHS_EN[month]),
    }
}

/// Groups thousands: spaces for Kazakh and Russian, commas for English.
pub fn format_number(value: u64, language: Language) -> String {
    let separator = match language {
        Language::Kz | Language::Ru => ' ',
        Language::En => ',',
    };
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(separator);
        }
        out.push(digit);
    }
    out
}

use serde::Serialize;

/// The fixed set of recognition languages offered by the UI. Display name
/// on the left, locale code passed to the speech service on the right.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("English (US)", "en-US"),
    ("Hindi (India)", "hi-IN"),
    ("Spanish", "es-ES"),
    ("French", "fr-FR"),
    ("German", "de-DE"),
    ("Chinese (Mandarin)", "zh-CN"),
    ("Arabic", "ar-SA"),
    ("Bengali", "bn-IN"),
    ("Japanese", "ja-JP"),
    ("Tamil", "ta-IN"),
    ("Telugu", "te-IN"),
    ("Marathi", "mr-IN"),
];

#[derive(Debug, Serialize)]
pub struct LanguageEntry {
    pub name: &'static str,
    pub code: &'static str,
}

pub fn all() -> Vec<LanguageEntry> {
    LANGUAGES
        .iter()
        .map(|&(name, code)| LanguageEntry { name, code })
        .collect()
}

/// Looks up the locale code for a display name. The UI constrains input to
/// the enumerated set, so `None` only shows up for hand-built requests.
pub fn locale_code(name: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(display, _)| *display == name)
        .map(|(_, code)| *code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_maps_to_its_locale_code() {
        for (name, code) in LANGUAGES {
            assert_eq!(locale_code(name), Some(*code));
        }
    }

    #[test]
    fn spot_check_known_locales() {
        assert_eq!(locale_code("English (US)"), Some("en-US"));
        assert_eq!(locale_code("Chinese (Mandarin)"), Some("zh-CN"));
        assert_eq!(locale_code("Marathi"), Some("mr-IN"));
    }

    #[test]
    fn unknown_names_have_no_code() {
        assert_eq!(locale_code("Klingon"), None);
        assert_eq!(locale_code(""), None);
    }

    #[test]
    fn listing_preserves_order_and_size() {
        let entries = all();
        assert_eq!(entries.len(), 12);
        assert_eq!(entries[0].name, "English (US)");
        assert_eq!(entries[11].code, "mr-IN");
    }
}

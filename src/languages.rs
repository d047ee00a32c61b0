//! Country to translation-language mapping.
//!
//! Maps ISO 3166-1 alpha-2 country codes to the DeepL source-language code
//! of that country's feeds. A country without an entry cannot be translated.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static COUNTRY_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("AE", "AR"),
        ("AR", "ES"),
        ("AT", "DE"),
        ("AU", "EN-GB"),
        ("BE", "NL"),
        ("BG", "BG"),
        ("BR", "PT-BR"),
        ("CA", "EN-GB"),
        ("CH", "DE"),
        ("CL", "ES"),
        ("CN", "ZH"),
        ("CZ", "CS"),
        ("DE", "DE"),
        ("DK", "DA"),
        ("EE", "ET"),
        ("EG", "AR"),
        ("ES", "ES"),
        ("FI", "FI"),
        ("FR", "FR"),
        ("GB", "EN-GB"),
        ("GR", "EL"),
        ("HU", "HU"),
        ("ID", "ID"),
        ("IE", "EN-GB"),
        // Hebrew is unsupported by the provider; Israeli feeds are read as English.
        ("IL", "EN-GB"),
        ("IN", "EN-GB"),
        ("IT", "IT"),
        ("JP", "JA"),
        ("KR", "KO"),
        ("LT", "LT"),
        ("LU", "FR"),
        ("LV", "LV"),
        ("MX", "ES"),
        ("MY", "EN-GB"),
        ("NL", "NL"),
        ("NO", "NB"),
        ("NZ", "EN-GB"),
        ("PE", "ES"),
        ("PH", "EN-GB"),
        ("PL", "PL"),
        ("PT", "PT-PT"),
        ("RO", "RO"),
        ("RU", "RU"),
        ("SE", "SV"),
        ("SG", "EN-GB"),
        ("SK", "SK"),
        ("SI", "SL"),
        ("TH", "TH"),
        ("TR", "TR"),
        ("TW", "ZH"),
        ("UA", "UK"),
        ("US", "EN-US"),
        ("VE", "ES"),
        ("VN", "EN-GB"),
        ("ZA", "EN-GB"),
    ])
});

/// The source language of a country's feeds, if translation is supported for it.
pub fn source_language(country: &str) -> Option<&'static str> {
    COUNTRY_LANGUAGES
        .get(country.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// Strip the region subtag and uppercase: `"pt-br"` becomes `"PT"`.
pub fn normalize_language(code: &str) -> String {
    code.trim()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase()
}

pub fn is_english(code: &str) -> bool {
    normalize_language(code) == "EN"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_language_lookup() {
        assert_eq!(source_language("FR"), Some("FR"));
        assert_eq!(source_language("br"), Some("PT-BR"));
        assert_eq!(source_language("US"), Some("EN-US"));
        assert_eq!(source_language("XX"), None);
    }

    #[test]
    fn test_normalize_language() {
        assert_eq!(normalize_language("EN-GB"), "EN");
        assert_eq!(normalize_language("pt-br"), "PT");
        assert_eq!(normalize_language("de"), "DE");
        assert_eq!(normalize_language(""), "");
    }

    #[test]
    fn test_english_variants() {
        assert!(is_english("EN-US"));
        assert!(is_english("en"));
        assert!(!is_english("FR"));
        assert!(!is_english("ET"));
    }
}

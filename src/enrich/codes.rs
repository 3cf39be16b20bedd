//! Language and script code normalization.
//!
//! The service speaks ISO 639-3 language codes and ISO 15924 script codes.
//! Configuration may use the shorter ISO 639-1 codes.

/// ISO 639-1 → ISO 639-3 for the languages the service supports.
const ISO_639_1_TO_3: &[(&str, &str)] = &[
    ("ar", "ara"),
    ("bn", "ben"),
    ("bg", "bul"),
    ("ca", "cat"),
    ("cs", "ces"),
    ("da", "dan"),
    ("de", "deu"),
    ("el", "ell"),
    ("en", "eng"),
    ("es", "spa"),
    ("et", "est"),
    ("fa", "fas"),
    ("fi", "fin"),
    ("fr", "fra"),
    ("he", "heb"),
    ("hi", "hin"),
    ("hr", "hrv"),
    ("hu", "hun"),
    ("id", "ind"),
    ("is", "isl"),
    ("it", "ita"),
    ("ja", "jpn"),
    ("ko", "kor"),
    ("ku", "kur"),
    ("lt", "lit"),
    ("lv", "lav"),
    ("ms", "msa"),
    ("nb", "nob"),
    ("nl", "nld"),
    ("nn", "nno"),
    ("no", "nor"),
    ("pl", "pol"),
    ("ps", "pus"),
    ("pt", "por"),
    ("ro", "ron"),
    ("ru", "rus"),
    ("sk", "slk"),
    ("sl", "slv"),
    ("so", "som"),
    ("sq", "sqi"),
    ("sr", "srp"),
    ("sv", "swe"),
    ("sw", "swa"),
    ("ta", "tam"),
    ("th", "tha"),
    ("tl", "tgl"),
    ("tr", "tur"),
    ("uk", "ukr"),
    ("ur", "urd"),
    ("uz", "uzb"),
    ("vi", "vie"),
    ("zh", "zho"),
];

/// Normalize a language code to lowercase ISO 639-3.
///
/// Returns `None` for anything that is not a known two-letter code or a
/// three-letter alphabetic code.
pub fn normalize_language_code(code: &str) -> Option<String> {
    let code = code.trim();
    if !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    match code.len() {
        2 => {
            let lower = code.to_ascii_lowercase();
            ISO_639_1_TO_3
                .iter()
                .find(|(short, _)| *short == lower)
                .map(|(_, long)| long.to_string())
        }
        3 => Some(code.to_ascii_lowercase()),
        _ => None,
    }
}

/// Normalize a script code to title case (`cyrl` → `Cyrl`).
pub fn normalize_script_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.len() != 4 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut chars = code.chars();
    let first = chars.next()?.to_ascii_uppercase();
    Some(
        std::iter::once(first)
            .chain(chars.map(|c| c.to_ascii_lowercase()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_letter_codes_map_to_three() {
        assert_eq!(normalize_language_code("en").as_deref(), Some("eng"));
        assert_eq!(normalize_language_code("RU").as_deref(), Some("rus"));
        assert_eq!(normalize_language_code("zh").as_deref(), Some("zho"));
        assert_eq!(normalize_language_code("qq"), None);
    }

    #[test]
    fn test_three_letter_codes_are_lowercased() {
        assert_eq!(normalize_language_code("ENG").as_deref(), Some("eng"));
        assert_eq!(normalize_language_code(" xxx ").as_deref(), Some("xxx"));
    }

    #[test]
    fn test_invalid_language_codes() {
        assert_eq!(normalize_language_code(""), None);
        assert_eq!(normalize_language_code("english"), None);
        assert_eq!(normalize_language_code("e1g"), None);
        assert_eq!(normalize_language_code("en-US"), None);
    }

    #[test]
    fn test_script_codes() {
        assert_eq!(normalize_script_code("cyrl").as_deref(), Some("Cyrl"));
        assert_eq!(normalize_script_code("LATN").as_deref(), Some("Latn"));
        assert_eq!(normalize_script_code("Zyyy").as_deref(), Some("Zyyy"));
        assert_eq!(normalize_script_code("Cyr"), None);
        assert_eq!(normalize_script_code("Cy1l"), None);
    }
}

pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Substring match against an already normalized haystack.
pub(crate) fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| normalized.contains(keyword))
}

/// Whole-word match, for keywords too short to be safe as substrings.
pub(crate) fn has_token(normalized: &str, tokens: &[&str]) -> bool {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| tokens.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_strips_markers_and_folds_case() {
        assert_eq!(
            normalize_text("\u{feff}Conso  Radiateur   ÉLEC"),
            "conso radiateur élec"
        );
    }

    #[test]
    fn has_token_ignores_embedded_substrings() {
        assert!(has_token("it & printers", &["it"]));
        assert!(!has_token("facilities", &["it"]));
    }
}

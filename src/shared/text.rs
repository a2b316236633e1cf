use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Folds a name into its search key: decomposes, drops diacritics and lowercases.
/// "Můstek" and "MUSTEK" both become "mustek".
pub fn normalize(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .nfc()
        .collect()
}

/// Case insensitive equality for identifiers and filter names.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[test]
fn normalize_strips_diacritics() {
    assert_eq!(normalize("Náměstí Míru"), "namesti miru");
}

#[test]
fn normalize_lowercases() {
    assert_eq!(normalize("MUZEUM"), "muzeum");
}

#[test]
fn normalize_blank() {
    assert_eq!(normalize("   "), "");
}

#[test]
fn normalize_keeps_inner_spacing() {
    assert_eq!(normalize("Hlavní  nádraží"), "hlavni  nadrazi");
}

#[test]
fn eq_ignore_case_unicode() {
    assert!(eq_ignore_case("Žižkov", "ŽIŽKOV"));
    assert!(!eq_ignore_case("A", "B"));
}

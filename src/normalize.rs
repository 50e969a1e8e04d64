/// Generic club-type qualifiers that scrapers add or drop at will.
const ORG_TOKENS: &[&str] = &["fc", "cf", "cd", "sc", "ac", "afc", "ud", "sd", "club", "real"];

/// Canonical form of a team/subject name used for identity matching.
///
/// `"Real Madrid CF"`, `"Real Madrid"` and `"R. Madrid"` all normalize to
/// `"madrid"`. Letters from any script are kept; Latin diacritics fold to
/// their base letter. Empty or punctuation-only input yields `""`, which
/// callers treat as carrying no identity. The result is a fixed point:
/// normalizing it again returns it unchanged.
pub fn normalize_subject(raw: &str) -> String {
    let folded: String = raw
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !is_combining_mark(*c))
        .map(fold_diacritic)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    folded
        .split_whitespace()
        .filter(|tok| tok.chars().count() > 1 && !ORG_TOKENS.contains(tok))
        .collect::<Vec<_>>()
        .join(" ")
}

// Decomposed input ("e" + U+0301) and the dot left by lowercasing 'İ'.
fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}')
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ą' | 'ă' | 'ā' => 'a',
        'ç' | 'ć' | 'č' => 'c',
        'ď' | 'đ' => 'd',
        'é' | 'è' | 'ê' | 'ë' | 'ę' | 'ě' | 'ē' => 'e',
        'ğ' => 'g',
        'í' | 'ì' | 'î' | 'ï' | 'ı' | 'ī' => 'i',
        'ł' => 'l',
        'ñ' | 'ń' | 'ň' => 'n',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ő' | 'ō' => 'o',
        'ř' => 'r',
        'ś' | 'š' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ú' | 'ù' | 'û' | 'ü' | 'ů' | 'ű' | 'ū' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        _ => c,
    }
}

/// Folds Turkish letters to ASCII, upper-cases, and collapses whitespace so
/// descriptions from different banks compare equal.
pub(crate) fn normalize_description(value: &str) -> String {
    let folded: String = value
        .chars()
        .filter(|c| !matches!(c, '\u{feff}' | '\u{200b}'))
        .map(fold_turkish)
        .collect();
    let collapsed = folded.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_uppercase()
}

fn fold_turkish(c: char) -> char {
    match c {
        'ç' | 'Ç' => 'C',
        'ğ' | 'Ğ' => 'G',
        'ı' | 'İ' | 'i' => 'I',
        'ö' | 'Ö' => 'O',
        'ş' | 'Ş' => 'S',
        'ü' | 'Ü' => 'U',
        'â' | 'Â' => 'A',
        'î' | 'Î' => 'I',
        'û' | 'Û' => 'U',
        '\u{a0}' => ' ',
        other => other,
    }
}

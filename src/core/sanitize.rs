// src/core/sanitize.rs

/// Decode the handful of entities the site actually emits.
pub fn normalize_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#36;", "$")
        .replace("&amp;", "&")
}

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Read a displayed number: `$1,234.50`, `85%`, `(1,200)`, ` -3 `.
/// Anything else (`N/A`, `-`, empty, text) is `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let mut t = cell.trim();
    let mut negative = false;

    if let Some(inner) = t.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        t = inner.trim();
    }

    let cleaned: String = t
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%' | '\u{a0}' | '_') && !c.is_whitespace())
        .collect();

    // `-$5` leaves "-5"; `$-5` leaves "-5" too
    if cleaned.is_empty() || !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    // Rust would accept "inf"/"nan" spellings; the site never shows them as data
    if cleaned.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }

    let v: f64 = cleaned.parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if negative { -v } else { v })
}

/// A positive whole day number: `12`, `12.0`, ` 12 `. Not `0`, `12.5`, `-1`.
pub fn parse_day(cell: &str) -> Option<u32> {
    let t = cell.trim();
    if let Ok(d) = t.parse::<u32>() {
        return (d > 0).then_some(d);
    }
    let v: f64 = t.parse().ok()?;
    day_from_f64(v)
}

/// Plot pages carry days as floats; only whole, positive ones are table rows.
pub fn day_from_f64(v: f64) -> Option<u32> {
    if v.is_finite() && v >= 1.0 && v.fract() == 0.0 && v <= u32::MAX as f64 {
        Some(v as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_tolerate_display_formatting() {
        assert_eq!(parse_number("1,234"), Some(1234.0));
        assert_eq!(parse_number(" $1,234.50 "), Some(1234.5));
        assert_eq!(parse_number("85%"), Some(85.0));
        assert_eq!(parse_number("(1,200)"), Some(-1200.0));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("1.5e3"), Some(1500.0));
    }

    #[test]
    fn non_numbers_are_none() {
        for cell in ["N/A", "", " ", "-", "$", "n/a", "inf", "NaN", "12 units", "--"] {
            assert_eq!(parse_number(cell), None, "{cell:?}");
        }
    }

    #[test]
    fn days_must_be_positive_whole_numbers() {
        assert_eq!(parse_day("12"), Some(12));
        assert_eq!(parse_day(" 7.0 "), Some(7));
        assert_eq!(parse_day("0"), None);
        assert_eq!(parse_day("12.5"), None);
        assert_eq!(parse_day("-1"), None);
        assert_eq!(parse_day("Day 3"), None);
    }

    #[test]
    fn entities_decode_amp_last() {
        assert_eq!(normalize_entities("&amp;nbsp;"), "&nbsp;");
        assert_eq!(normalize_entities("a&nbsp;&lt;b&gt;"), "a <b>");
    }
}

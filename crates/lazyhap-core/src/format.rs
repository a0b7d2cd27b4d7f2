const UNIT: i64 = 1024;
const UNIT_PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// Renders a raw byte counter from the stats table with binary units.
///
/// Anything that does not start with an integer counts as zero, so blank
/// fields on aggregate rows render as `0 B` instead of failing.
pub fn format_bytes(raw: &str) -> String {
    format_byte_count(parse_leading_int(raw))
}

pub fn format_byte_count(bytes: i64) -> String {
    if bytes < UNIT {
        return format!("{bytes} B");
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp + 1 < UNIT_PREFIXES.len() {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}B", bytes as f64 / div as f64, UNIT_PREFIXES[exp])
}

/// Parses an optional sign followed by decimal digits, ignoring leading
/// whitespace and anything after the digits. Returns 0 when no digits are
/// present or the value does not fit.
pub fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return 0;
    }
    match digits[..end].parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) => 0,
    }
}

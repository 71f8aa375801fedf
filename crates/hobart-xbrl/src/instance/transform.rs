//! Inline XBRL transformation registry (`ix:format`).
//!
//! Transformations normalize human-readable fact text ("1,234.5", "December
//! 31, 2023") into canonical numeric or ISO-date strings. Registry versions
//! differ on hyphenation (`num-dot-decimal` vs `numdotdecimal`); matching is
//! done on the lowercased, hyphen-stripped local name.

/// Applies the transformation named by `format` to `raw`.
///
/// Returns `None` for unknown formats; callers keep the raw text and record
/// a warning in that case.
pub(crate) fn apply(format: &str, raw: &str) -> Option<String> {
    let local = format.rsplit(':').next().unwrap_or(format);
    let name: String = local
        .chars()
        .filter(|c| *c != '-')
        .collect::<String>()
        .to_lowercase();
    let text = raw.trim();

    match name.as_str() {
        "numdotdecimal" | "numdotdecimalin" => Some(num_dot_decimal(text)),
        "numcommadecimal" => Some(num_comma_decimal(text)),
        "zerodash" | "numdash" | "fixedzero" => Some("0".to_string()),
        "fixedempty" => Some(String::new()),
        "booleantrue" | "fixedtrue" => Some("true".to_string()),
        "booleanfalse" | "fixedfalse" => Some("false".to_string()),
        "datemonthdayyear" => numeric_date(text, DateOrder::MonthDayYear),
        "datedaymonthyear" => numeric_date(text, DateOrder::DayMonthYear),
        "dateyearmonthday" => numeric_date(text, DateOrder::YearMonthDay),
        "datemonthdayyearen" | "datemonthnamedayyearen" => named_month_date(text, false),
        "datedaymonthyearen" | "datedaymonthnameyearen" => named_month_date(text, true),
        _ => None,
    }
}

/// "1,234.50" -> "1234.50". Commas and spaces are thousands separators.
fn num_dot_decimal(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect()
}

/// "1.234,50" -> "1234.50". Dots are thousands separators, comma is the
/// decimal mark.
fn num_comma_decimal(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '.' | ' ' | '\u{a0}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

#[derive(Clone, Copy)]
enum DateOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

/// Numeric dates with `/`, `-` or `.` separators.
fn numeric_date(text: &str, order: DateOrder) -> Option<String> {
    let parts: Vec<&str> = text
        .split(['/', '-', '.'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }
    let nums: Vec<u32> = parts.iter().filter_map(|p| p.parse().ok()).collect();
    if nums.len() != 3 {
        return None;
    }
    let (year, month, day) = match order {
        DateOrder::MonthDayYear => (nums[2], nums[0], nums[1]),
        DateOrder::DayMonthYear => (nums[2], nums[1], nums[0]),
        DateOrder::YearMonthDay => (nums[0], nums[1], nums[2]),
    };
    let year = normalize_year(year);
    ((1..=12).contains(&month) && (1..=31).contains(&day))
        .then(|| format!("{year:04}-{month:02}-{day:02}"))
}

/// "December 31, 2023" / "31 December 2023" -> "2023-12-31".
fn named_month_date(text: &str, day_first: bool) -> Option<String> {
    let cleaned = text.replace(',', " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }
    let (day_str, month_str, year_str) = if day_first {
        (parts[0], parts[1], parts[2])
    } else {
        (parts[1], parts[0], parts[2])
    };
    let month = month_number(month_str)?;
    let day: u32 = day_str.parse().ok()?;
    let year = normalize_year(year_str.parse().ok()?);
    (1..=31).contains(&day).then(|| format!("{year:04}-{month:02}-{day:02}"))
}

fn month_number(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|i| i as u32 + 1)
}

/// Two-digit years pivot at 70, matching the registry's documented behavior.
const fn normalize_year(year: u32) -> u32 {
    if year < 70 {
        2000 + year
    } else if year < 100 {
        1900 + year
    } else {
        year
    }
}

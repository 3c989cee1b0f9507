use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveTime;

pub const NOT_AVAILABLE: &str = "N/A";

const MAGNITUDES: [(i64, &str); 4] = [
    (1_000_000_000_000, "T"),
    (1_000_000_000, "B"),
    (1_000_000, "M"),
    (1_000, "K"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::Up => "▲",
            Direction::Down => "▼",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Direction::Up => "positive",
            Direction::Down => "negative",
        }
    }
}

pub fn format_price(price: Option<&BigDecimal>) -> String {
    let Some(price) = price else {
        return NOT_AVAILABLE.to_string();
    };

    if *price < ratio(1, 100) {
        to_fixed(price, 6)
    } else if *price < BigDecimal::from(1) {
        to_fixed(price, 4)
    } else if *price < BigDecimal::from(100) {
        to_fixed(price, 2)
    } else {
        format_grouped(price)
    }
}

/// Dollar amount scaled to T/B/M/K with two decimals, e.g. `$2.50T`.
pub fn format_magnitude(amount: Option<&BigDecimal>) -> String {
    let Some(amount) = amount else {
        return NOT_AVAILABLE.to_string();
    };

    for (unit, suffix) in MAGNITUDES {
        let unit = BigDecimal::from(unit);
        if *amount >= unit {
            return format!("${}{}", to_fixed(&(amount.clone() / unit), 2), suffix);
        }
    }

    format!("${}", format_grouped(amount))
}

pub fn format_price_change(change: Option<f64>) -> (Direction, String) {
    let change = change.unwrap_or(0.0);
    let direction = if change >= 0.0 {
        Direction::Up
    } else {
        Direction::Down
    };

    (direction, format!("{:.2}%", change.abs()))
}

pub fn format_rank(rank: Option<u32>) -> String {
    match rank {
        Some(rank) => rank.to_string(),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_clock(time: NaiveTime) -> String {
    time.format("%I:%M:%S %p").to_string()
}

pub fn escape_html(unsafe_text: &str) -> String {
    let mut escaped = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn ratio(numerator: i64, denominator: i64) -> BigDecimal {
    BigDecimal::from(numerator) / BigDecimal::from(denominator)
}

/// Rounds half-up to exactly `digits` fractional digits, never in exponent form.
fn to_fixed(value: &BigDecimal, digits: i64) -> String {
    let rounded = value.with_scale_round(digits, RoundingMode::HalfUp);
    let (int_value, _) = rounded.as_bigint_and_exponent();

    let text = int_value.to_string();
    let (negative, mut magnitude) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.to_string()),
        None => (false, text),
    };

    let frac_len = digits.max(0) as usize;
    if magnitude.len() <= frac_len {
        magnitude.insert_str(0, &"0".repeat(frac_len + 1 - magnitude.len()));
    }

    let (int_part, frac_part) = magnitude.split_at(magnitude.len() - frac_len);
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, int_part)
    } else {
        format!("{}{}.{}", sign, int_part, frac_part)
    }
}

fn format_grouped(value: &BigDecimal) -> String {
    let fixed = to_fixed(value, 2);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };

    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let grouped = group_thousands(int_part);
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

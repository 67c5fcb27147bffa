//! Small text helpers shared by repositories, prompts and email rendering.

use regex::Regex;

lazy_static::lazy_static! {
    static ref PHONE_NOISE_RE: Regex = Regex::new(r"[\s().\-]").unwrap();
}

/// Strips formatting characters so `(555) 123-4567` and `5551234567` share one key.
pub fn normalize_phone(phone: &str) -> String {
    PHONE_NOISE_RE.replace_all(phone.trim(), "").into_owned()
}

/// Upper-cases the first letter of every word, lower-cases the rest.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// USD currency with thousands separators, e.g. `$1,250.50`.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let remainder = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, remainder)
}

/// Percentage without a trailing `.0` for whole numbers.
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}%", value as i64)
    } else {
        format!("{}%", value)
    }
}

/// Minimal HTML escaping for values interpolated into email bodies.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_formatting_is_stripped() {
        assert_eq!(normalize_phone(" (555) 123-4567 "), "5551234567");
        assert_eq!(normalize_phone("+1 555.123.4567"), "+15551234567");
    }

    #[test]
    fn title_case_handles_mixed_input() {
        assert_eq!(title_case("jOHN   smith"), "John Smith");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(25.0), "$25.00");
        assert_eq!(format_usd(1250.5), "$1,250.50");
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
    }

    #[test]
    fn percentage_formatting() {
        assert_eq!(format_percentage(15.0), "15%");
        assert_eq!(format_percentage(12.5), "12.5%");
    }

    #[test]
    fn html_is_escaped() {
        assert_eq!(escape_html("<b>Tom & Jerry</b>"), "&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;");
    }
}

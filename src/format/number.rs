//! Numeric coercion and grouping shared by the value and column formatters

use serde_json::Value;

/// Upper bound for requested fraction digits
pub const MAX_DECIMALS: usize = 20;

/// Coerce a JSON value to a finite number the way `Number()` would.
///
/// Returns `None` for anything that would be `NaN` (or infinite).
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            parse_js_number(trimmed)?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Decimal literal, or an unsigned `0x`/`0o`/`0b` integer
fn parse_js_number(text: &str) -> Option<f64> {
    let radix = match text.get(..2) {
        Some("0x" | "0X") => 16,
        Some("0o" | "0O") => 8,
        Some("0b" | "0B") => 2,
        _ => return text.parse::<f64>().ok(),
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Render a number the way JavaScript's `String(n)` does
pub fn js_number_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let exponent = format!("{:e}", n);
        return match exponent.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exponent,
        };
    }
    format!("{}", n)
}

/// Round half away from zero to `decimals` fraction digits
///
/// Values too large to scale are already integral at that precision and come
/// back unchanged.
pub fn round_half_away(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Fixed-point rendering with explicit rounding
pub fn to_fixed(value: f64, decimals: usize) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    format!("{:.prec$}", round_half_away(value, decimals), prec = decimals)
}

/// Insert `thousands` every three integer digits of a fixed-point string
pub fn group_thousands(fixed: &str, thousands: char, decimal: char) -> String {
    let (integer_part, fraction) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed, None),
    };

    let negative = integer_part.starts_with('-');
    let digits: Vec<char> = integer_part.chars().filter(|c| c.is_ascii_digit()).collect();
    let len = digits.len();

    let mut result = String::with_capacity(fixed.len() + len / 3);
    if negative {
        result.push('-');
    }
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(thousands);
        }
        result.push(*c);
    }

    if let Some(fraction) = fraction {
        result.push(decimal);
        result.push_str(fraction);
    }

    result
}

/// Fixed decimals with optional `,` grouping
pub fn format_grouped(value: f64, decimals: usize, grouping: bool) -> String {
    let fixed = to_fixed(value, decimals);
    if grouping {
        group_thousands(&fixed, ',', '.')
    } else {
        fixed
    }
}

/// Grouped with up to three fraction digits, trailing zeros removed
pub fn format_compact(value: f64) -> String {
    let fixed = to_fixed(value, 3);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    group_thousands(trimmed, ',', '.')
}

/// Currencies with a known symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Mxn,
    Usd,
    Eur,
}

impl Currency {
    /// Look up an ISO code, case-insensitively
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "mxn" => Some(Currency::Mxn),
            "usd" => Some(Currency::Usd),
            "eur" => Some(Currency::Eur),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Mxn | Currency::Usd => "$",
            Currency::Eur => "€",
        }
    }

    /// Format an amount; a missing amount renders as zero
    pub fn format(&self, value: Option<f64>, decimals: usize, grouping: bool) -> String {
        prefixed_amount(self.symbol(), value, decimals, grouping)
    }
}

/// Symbol-prefixed amount with the sign in front of the symbol
pub fn prefixed_amount(prefix: &str, value: Option<f64>, decimals: usize, grouping: bool) -> String {
    let rounded = round_half_away(value.unwrap_or(0.0), decimals);
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!(
        "{}{}{}",
        sign,
        prefix,
        format_grouped(rounded.abs(), decimals, grouping)
    )
}

/// Value already expressed in percentage points
pub fn format_percentage(value: Option<f64>, decimals: usize) -> String {
    format!("{}%", to_fixed(value.unwrap_or(0.0), decimals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(2.5)), Some(2.5));
        assert_eq!(coerce_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!("")), None);
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn test_coerce_radix_prefixes() {
        assert_eq!(coerce_number(&json!("0x10")), Some(16.0));
        assert_eq!(coerce_number(&json!(" 0XfF ")), Some(255.0));
        assert_eq!(coerce_number(&json!("0o17")), Some(15.0));
        assert_eq!(coerce_number(&json!("0b101")), Some(5.0));
        assert_eq!(coerce_number(&json!("-0x10")), None);
        assert_eq!(coerce_number(&json!("0x+1")), None);
        assert_eq!(coerce_number(&json!("0x")), None);
        assert_eq!(coerce_number(&json!("0b102")), None);
    }

    #[test]
    fn test_js_number_string() {
        assert_eq!(js_number_string(10.0), "10");
        assert_eq!(js_number_string(2.5), "2.5");
        assert_eq!(js_number_string(-3.0), "-3");
        assert_eq!(js_number_string(f64::NAN), "NaN");
        assert_eq!(js_number_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(js_number_string(-0.0), "0");
    }

    #[test]
    fn test_js_number_string_exponent_form() {
        assert_eq!(js_number_string(1e21), "1e+21");
        assert_eq!(js_number_string(-1.5e300), "-1.5e+300");
        assert_eq!(js_number_string(1e-7), "1e-7");
        assert_eq!(js_number_string(1.25e-9), "1.25e-9");
        assert_eq!(js_number_string(1e20), "100000000000000000000");
        assert_eq!(js_number_string(0.000001), "0.000001");
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
        assert_eq!(to_fixed(-0.001, 2), "0.00");
    }

    #[test]
    fn test_huge_values_survive_rounding() {
        assert_eq!(round_half_away(1e307, 2), 1e307);
        assert_eq!(round_half_away(-1e300, 20), -1e300);

        let fixed = to_fixed(1e290, 20);
        assert!(fixed.ends_with(&format!(".{}", "0".repeat(20))), "got {fixed}");
        assert!(fixed.len() > 300, "got {fixed}");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1234567.89", ',', '.'), "1,234,567.89");
        assert_eq!(group_thousands("-1234", ',', '.'), "-1,234");
        assert_eq!(group_thousands("999", ',', '.'), "999");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(1234.5), "1,234.5");
        assert_eq!(format_compact(1234.0), "1,234");
        assert_eq!(format_compact(0.12345), "0.123");
    }

    #[test]
    fn test_currency() {
        assert_eq!(Currency::Usd.format(Some(1234.5), 2, true), "$1,234.50");
        assert_eq!(Currency::Eur.format(None, 2, true), "€0.00");
        assert_eq!(Currency::Mxn.format(Some(-1234.5), 2, true), "-$1,234.50");
        assert_eq!(Currency::from_code("EUR"), Some(Currency::Eur));
        assert_eq!(Currency::from_code("gbp"), None);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(format_percentage(Some(16.0), 0), "16%");
        assert_eq!(format_percentage(Some(12.345), 1), "12.3%");
        assert_eq!(format_percentage(None, 0), "0%");
    }
}

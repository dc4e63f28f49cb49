//! Display strings for reasoning records and their inverse parsers.
//!
//! The sink reads numbers back out of the same strings the console shows,
//! so every `format_*` here must stay readable by its `parse_*` twin.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot read {what} from {input:?}")]
pub struct ParseError {
    pub what: &'static str,
    pub input: String,
}

impl ParseError {
    fn new(what: &'static str, input: &str) -> Self {
        Self {
            what,
            input: input.to_string(),
        }
    }
}

/// Insert `,` every three digits of the integer part of a formatted number.
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) {
        // inf / NaN
        return formatted.to_string();
    }

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

/// Plain grouped number with two decimals: `1,234.56`
pub fn format_amount(value: f64) -> String {
    group_thousands(&format!("{:.2}", value))
}

/// Currency with two decimals and thousands separators: `$1,234.56`
pub fn format_usd(value: f64) -> String {
    format!("${}", format_amount(value))
}

/// Unit price. Four decimals, widened for sub-cent prices so at least four
/// significant digits survive: `$0.1234`, `$0.00001234`.
pub fn format_price(value: f64) -> String {
    let magnitude = value.abs();
    let decimals = if magnitude > 0.0 && magnitude < 0.01 {
        ((-magnitude.log10().floor()) as usize + 3).min(18)
    } else {
        4
    };
    format!("${:.*}", decimals, value)
}

/// Grouped percentage with two decimals: `3.00%`, `1,250.00%`
pub fn format_pct(value: f64) -> String {
    format!("{}%", format_amount(value))
}

pub fn format_ratio(value: f64) -> String {
    format!("{:.2}", value)
}

/// Number with optional `,` grouping; also accepts `inf` and `NaN`.
pub fn parse_number(input: &str) -> Result<f64, ParseError> {
    input
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| ParseError::new("number", input))
}

/// Inverse of `format_usd` and `format_price`
pub fn parse_usd(input: &str) -> Result<f64, ParseError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix('$')
        .ok_or_else(|| ParseError::new("currency", input))?;
    parse_number(digits).map_err(|_| ParseError::new("currency", input))
}

/// Inverse of `format_pct`
pub fn parse_pct(input: &str) -> Result<f64, ParseError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_suffix('%')
        .ok_or_else(|| ParseError::new("percentage", input))?;
    parse_number(digits).map_err(|_| ParseError::new("percentage", input))
}

/// Value that follows `label` inside a details string, up to the next `, `.
///
/// `parse_labeled("Market Cap: $1,000.00, TVL: $500.00, Ratio: 2.00", "Ratio: ")`
/// reads `2.00`. Currency and percent decorations are stripped.
pub fn parse_labeled(details: &str, label: &str) -> Result<f64, ParseError> {
    let (_, rest) = details
        .split_once(label)
        .ok_or_else(|| ParseError::new("labeled value", details))?;
    let value = rest.split(", ").next().unwrap_or(rest).trim();
    let value = value.strip_prefix('$').unwrap_or(value);
    let value = value.strip_suffix('%').unwrap_or(value);
    parse_number(value).map_err(|_| ParseError::new("labeled value", details))
}

pub fn format_trades(buys: u64, sells: u64) -> String {
    format!("Buys: {}, Sells: {}", buys, sells)
}

/// Inverse of `format_trades`: `(buys, sells)`
pub fn parse_trades(input: &str) -> Result<(u64, u64), ParseError> {
    let count = |label: &str| -> Result<u64, ParseError> {
        let (_, rest) = input
            .split_once(label)
            .ok_or_else(|| ParseError::new("trade counts", input))?;
        rest.split(',')
            .next()
            .unwrap_or(rest)
            .trim()
            .parse::<u64>()
            .map_err(|_| ParseError::new("trade counts", input))
    };
    Ok((count("Buys: ")?, count("Sells: ")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1234.56), "$1,234.56");
        assert_eq!(format_usd(0.0), "$0.00");
        assert_eq!(format_usd(999.999), "$1,000.00");
        assert_eq!(format_usd(6_000_000.0), "$6,000,000.00");
        assert_eq!(format_usd(-1234.5), "$-1,234.50");
        assert_eq!(format_usd(f64::INFINITY), "$inf");
    }

    #[test]
    fn test_parse_usd() {
        assert_eq!(parse_usd("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_usd("$-1,234.50").unwrap(), -1234.5);
        assert_eq!(parse_usd(" $0.1234 ").unwrap(), 0.1234);
        assert!(parse_usd("1,234.56").is_err());
        assert!(parse_usd("$abc").is_err());
    }

    #[test]
    fn test_format_price_keeps_small_prices() {
        assert_eq!(format_price(0.1234), "$0.1234");
        assert_eq!(format_price(1.5), "$1.5000");
        assert_eq!(format_price(0.000012341), "$0.00001234");
        assert_eq!(format_price(0.0), "$0.0000");
        assert!((parse_usd(&format_price(0.000012341)).unwrap() - 0.00001234).abs() < 1e-12);
    }

    #[test]
    fn test_percentages() {
        assert_eq!(format_pct(3.0), "3.00%");
        assert_eq!(format_pct(-12.346), "-12.35%");
        assert_eq!(format_pct(1250.0), "1,250.00%");
        assert_eq!(parse_pct("1,250.00%").unwrap(), 1250.0);
        assert_eq!(parse_pct("-12.35%").unwrap(), -12.35);
        assert!(parse_pct("12.35").is_err());
    }

    #[test]
    fn test_parse_labeled() {
        let details = "Market Cap: $1,000,000.00, TVL: $500,000.00, Ratio: 2.00";
        assert_eq!(parse_labeled(details, "Ratio: ").unwrap(), 2.0);
        assert_eq!(parse_labeled(details, "TVL: ").unwrap(), 500_000.0);

        let details = "24h Volume: $1,200,000.00, Volume/MCap Ratio: 0.120";
        assert_eq!(parse_labeled(details, "Ratio: ").unwrap(), 0.12);

        let details = "Liquidity: $0.00, Volume/Liquidity Ratio: inf";
        assert!(parse_labeled(details, "Ratio: ").unwrap().is_infinite());

        assert!(parse_labeled("no label here", "Ratio: ").is_err());
    }

    #[test]
    fn test_trades_round_trip() {
        let text = format_trades(1200, 700);
        assert_eq!(text, "Buys: 1200, Sells: 700");
        assert_eq!(parse_trades(&text).unwrap(), (1200, 700));
        assert!(parse_trades("Buys: x, Sells: 1").is_err());
    }
}

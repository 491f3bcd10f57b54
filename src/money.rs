use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Display metadata for a destination currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
    #[serde(default = "default_symbol_first")]
    pub symbol_first: bool,
    #[serde(default = "default_exponent")]
    pub exponent: u32,
}

fn default_symbol_first() -> bool {
    true
}

fn default_exponent() -> u32 {
    2
}

impl Currency {
    pub fn new(code: &str, symbol: &str) -> Self {
        Currency {
            code: code.to_string(),
            symbol: symbol.to_string(),
            symbol_first: true,
            exponent: 2,
        }
    }

    pub fn nad() -> Self {
        Currency::new("NAD", "N$")
    }

    pub fn zar() -> Self {
        Currency::new("ZAR", "R")
    }

    pub fn bwp() -> Self {
        Currency::new("BWP", "P")
    }

    pub fn zmw() -> Self {
        Currency::new("ZMW", "K")
    }
}

/// Format an amount for display, e.g. `N$ 1,234.50`.
///
/// Rounding to the currency exponent happens here and nowhere else.
pub fn format_amount(amount: Decimal, currency: &Currency) -> String {
    let rounded = amount.round_dp(currency.exponent);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = format!("{:.*}", currency.exponent as usize, rounded.abs());
    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (digits, None),
    };

    let mut number = group_thousands(&whole);
    if let Some(frac) = frac {
        number.push('.');
        number.push_str(&frac);
    }

    let sign = if negative { "-" } else { "" };
    if currency.symbol_first {
        format!("{}{} {}", sign, currency.symbol, number)
    } else {
        format!("{}{} {}", sign, number, currency.symbol)
    }
}

/// Format a fractional rate as a percentage, trimming trailing zeros
pub fn format_rate(rate: Decimal) -> String {
    let pct = (rate * dec!(100)).normalize();
    format!("{}%", pct)
}

fn group_thousands(whole: &str) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3);
    let len = whole.len();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

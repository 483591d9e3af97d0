//! Display formatting for raw market numbers.
//!
//! Entities keep raw `f64` values; these helpers produce the strings a dashboard
//! shows, at render time.

/// Format a USD price, with more decimals for smaller prices.
///
/// ```
/// use cryptodash::format::format_price;
///
/// assert_eq!(format_price(Some(150.2)), "$150.20");
/// assert_eq!(format_price(Some(67250.0)), "$67,250.00");
/// assert_eq!(format_price(None), "N/A");
/// ```
pub fn format_price(price: Option<f64>) -> String {
    let Some(price) = price else {
        return "N/A".to_string();
    };

    let magnitude = price.abs();
    if magnitude >= 1000.0 {
        format!("${}", group_thousands(&format!("{:.2}", price)))
    } else if magnitude >= 1.0 {
        format!("${:.2}", price)
    } else if magnitude >= 0.01 {
        format!("${:.4}", price)
    } else if magnitude >= 0.0001 {
        format!("${:.6}", price)
    } else {
        format!("${:.8}", price)
    }
}

/// Format a percentage change with an explicit `+` for gains.
pub fn format_change(change: f64) -> String {
    if change > 0.0 {
        format!("+{:.2}%", change)
    } else {
        format!("{:.2}%", change)
    }
}

/// Format a large USD amount with a T/B/M suffix.
pub fn format_compact_usd(amount: f64) -> String {
    const TRILLION: f64 = 1_000_000_000_000.0;
    const BILLION: f64 = 1_000_000_000.0;
    const MILLION: f64 = 1_000_000.0;

    if amount >= TRILLION {
        format!("${:.2}T", amount / TRILLION)
    } else if amount >= BILLION {
        format!("${:.2}B", amount / BILLION)
    } else if amount >= MILLION {
        format!("${:.2}M", amount / MILLION)
    } else {
        format!("${:.2}", amount)
    }
}

/// Insert `,` separators into the integer part of a formatted decimal.
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

//! Cell formatting for the nearby-sales table

const ADDRESS_WIDTH: usize = 25;
const MISSING: &str = "-";

/// Address cut to 25 characters, with `...` when something was cut
pub fn truncate_address(address: &str) -> String {
    let mut chars = address.chars();
    let head: String = chars.by_ref().take(ADDRESS_WIDTH).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Sale price in thousands, e.g. `$455k`, `$1,250k`
pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) if price.is_finite() => {
            format!("${}k", group_thousands((price / 1000.0).round() as i64))
        }
        _ => MISSING.to_string(),
    }
}

/// `beds/baths`, e.g. `3/2.5`
pub fn format_beds_baths(beds: Option<f64>, baths: Option<f64>) -> String {
    format!("{}/{}", format_count(beds), format_count(baths))
}

pub fn format_square_feet(square_feet: Option<f64>) -> String {
    match square_feet {
        Some(sqft) if sqft.is_finite() => group_thousands(sqft.round() as i64),
        _ => MISSING.to_string(),
    }
}

pub fn format_distance(miles: f64) -> String {
    format!("{:.2} mi", miles)
}

fn format_count(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) if v.is_finite() => format!("{}", v),
        _ => MISSING.to_string(),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

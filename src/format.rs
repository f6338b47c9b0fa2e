// Value formatting for key/value rows and chart legends.

pub fn percent(value: f64) -> String {
    format!("{}%", trim_decimal(value, 2))
}

// Cents above this no longer fit exactly in an f64.
const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0;

pub fn currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round();
    if !cents.is_finite() || cents > MAX_EXACT_CENTS {
        return plain(value);
    }
    let cents = cents as u64;
    let whole = group_thousands(cents / 100);
    let frac = cents % 100;
    if value < 0.0 && cents > 0 {
        format!("-${whole}.{frac:02}")
    } else {
        format!("${whole}.{frac:02}")
    }
}

pub fn years(value: f64) -> String {
    let text = trim_decimal(value, 1);
    if text == "1" {
        "1 year".to_string()
    } else {
        format!("{text} years")
    }
}

pub fn plain(value: f64) -> String {
    trim_decimal(value, 2)
}

fn trim_decimal(value: f64, places: usize) -> String {
    let mut text = format!("{value:.places$}");
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_trims_trailing_zeros() {
        assert_eq!(percent(48.0), "48%");
        assert_eq!(percent(31.5), "31.5%");
        assert_eq!(percent(12.346), "12.35%");
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(currency(1843.2), "$1,843.20");
        assert_eq!(currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(currency(-50.0), "-$50.00");
        assert_eq!(currency(0.0), "$0.00");
    }

    #[test]
    fn currency_drops_sign_when_rounding_to_zero() {
        assert_eq!(currency(-0.001), "$0.00");
        assert_eq!(currency(-0.0), "$0.00");
        assert_eq!(currency(-0.25), "-$0.25");
    }

    #[test]
    fn currency_falls_back_to_plain_outside_exact_range() {
        assert_eq!(currency(1e20), plain(1e20));
        assert_eq!(currency(f64::INFINITY), "inf");
        assert_eq!(currency(f64::NAN), "NaN");
        assert_eq!(currency(90_071_992_547_409.0), "$90,071,992,547,409.00");
    }

    #[test]
    fn years_pluralize() {
        assert_eq!(years(1.0), "1 year");
        assert_eq!(years(7.26), "7.3 years");
        assert_eq!(plain(72.0), "72");
    }
}

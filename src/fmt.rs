/// Format a float as a euro amount with thousands separators: 1,234.56 €
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part} €")
    } else {
        format!("{with_commas}.{dec_part} €")
    }
}

/// Format a VAT rate the way it is usually written: 19%, 5.5%
pub fn percent(rate: f64) -> String {
    format!("{rate}%")
}

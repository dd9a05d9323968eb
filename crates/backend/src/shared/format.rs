/// Форматирует число с разделителями тысяч (точками)
///
/// # Примеры
/// ```
/// use backend::shared::format::format_number;
/// assert_eq!(format_number(1234567), "1.234.567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Decimal string with two places, as used by popularity shares.
///
/// ```
/// use backend::shared::format::format_percentage;
/// assert_eq!(format_percentage(37.5), "37.50");
/// assert_eq!(format_percentage(100.0 / 3.0), "33.33");
/// ```
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}", value)
}

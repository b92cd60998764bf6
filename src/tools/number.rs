/// Render a number as tool output text.
///
/// Uses the shortest digits that round-trip, drops a trailing `.0` on whole
/// values, spells out `Infinity`, `-Infinity` and `NaN`, and switches to
/// exponent notation with an explicit sign outside `[1e-6, 1e21)`.
pub fn render_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        // Covers negative zero as well.
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{}", value);
    }

    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => formatted,
    }
}

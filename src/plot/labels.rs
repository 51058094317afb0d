/// Scientific notation with a signed, at least two-digit exponent
/// (`1.23450e-03`), the layout used by the summary tables.
pub fn python_sci(x: f64, precision: usize) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let raw = format!("{:.*e}", precision, x);
    let (mantissa, exponent) = match raw.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (raw.as_str(), 0),
    };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exponent.abs())
}

/// Legend label of a timestep: `t=1.23×10^-4`.
pub fn format_time_label(time: f64) -> String {
    let sci = python_sci(time, 2);
    match sci.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent = exponent.parse::<i32>().unwrap_or(0);
            format!("t={}×10^{}", mantissa, exponent)
        }
        None => format!("t={}", sci),
    }
}

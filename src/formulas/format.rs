//! Rendering helpers for echoed inputs in result strings

/// Echo an amount or period count in its shortest form (`1000`, `1628.89`, `5.5`).
pub(crate) fn amount(value: f64) -> String {
    value.to_string()
}

/// Echo a decimal rate as a percentage with at least one decimal (`0.05` -> `5.0`).
///
/// `r * 100` picks up binary noise for many inputs (`0.07 * 100` is
/// `7.000000000000001`), so the product is snapped to ten decimals first.
/// Rates too small to survive the snap, or too large to scale, are shown unsnapped.
pub(crate) fn percent(rate: f64) -> String {
    let pct = rate * 100.0;
    if !pct.is_finite() {
        return pct.to_string();
    }

    let scaled = pct * 1e10;
    let snapped = scaled.round() / 1e10;
    let shown = if !scaled.is_finite() || (snapped == 0.0 && pct != 0.0) {
        pct
    } else if snapped == 0.0 {
        0.0
    } else {
        snapped
    };

    let mut out = shown.to_string();
    if !out.contains('.') {
        out.push_str(".0");
    }
    out
}

/// Two-decimal money value, as shown after the `$` label.
pub(crate) fn money(value: f64) -> String {
    format!("{:.2}", value)
}

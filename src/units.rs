//! Unit conversions and display formatting.
//!
//! Formatters take `Option<f64>` and render the "—" placeholder for missing
//! or non-finite values, so raw gaps in the payload never reach the screen
//! as "NaN°".

pub const MISSING: &str = "—";

/// Rounds half away from zero (`f64::round` semantics), cast through `i64`
/// so values like -0.1 don't render as "-0".
fn round_whole(v: f64) -> i64 {
    v.round() as i64
}

pub mod temperature {
    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    pub fn f2c(temp_f: f64) -> f64 {
        (temp_f - 32.0) * 5.0 / 9.0
    }

    #[test]
    fn test_temperature() {
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
        assert_eq!(f2c(212.0), 100.0);
        assert_eq!(f2c(32.0), 0.0);
    }

    #[test]
    fn test_round_trip() {
        for c in [-40.0, -17.5, 0.0, 0.3, 21.7, 100.0, 1234.5] {
            assert!((f2c(c2f(c)) - c).abs() < 1e-9);
        }
    }
}

pub mod speed {
    const KPM: f64 = 0.621371;

    pub fn ms2kmh(ms: f64) -> f64 {
        ms * 3.6
    }

    pub fn kmh2mph(kmh: f64) -> f64 {
        kmh * KPM
    }

    #[test]
    fn test_speed() {
        assert_eq!(ms2kmh(10.0), 36.0);
        assert!((kmh2mph(100.0) - 62.1371).abs() < 1e-9);
    }
}

pub mod precip {
    pub fn mm2in(mm: f64) -> f64 {
        mm / 25.4
    }

    #[test]
    fn test_precip() {
        assert_eq!(mm2in(25.4), 1.0);
        assert_eq!(mm2in(0.0), 0.0);
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub fn format_temp(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{}°", round_whole(v)),
        None => MISSING.to_string(),
    }
}

pub fn format_wind(value: Option<f64>, label: &str) -> String {
    match finite(value) {
        Some(v) => format!("{} {}", round_whole(v), label),
        None => MISSING.to_string(),
    }
}

pub fn format_humidity(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{}%", round_whole(v)),
        None => MISSING.to_string(),
    }
}

/// Millimeters render as a whole number, inches with two decimals.
pub fn format_precip_mm(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{} mm", round_whole(v)),
        None => MISSING.to_string(),
    }
}

pub fn format_precip_in(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) => format!("{:.2} in", v),
        None => MISSING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_round_half_away_from_zero() {
        assert_eq!(format_temp(Some(0.5)), "1°");
        assert_eq!(format_temp(Some(-0.5)), "-1°");
        assert_eq!(format_temp(Some(2.4)), "2°");
        assert_eq!(format_temp(Some(-0.1)), "0°");
    }

    #[test]
    fn missing_values_render_placeholder() {
        assert_eq!(format_temp(None), MISSING);
        assert_eq!(format_temp(Some(f64::NAN)), MISSING);
        assert_eq!(format_wind(None, "km/h"), MISSING);
        assert_eq!(format_humidity(Some(f64::INFINITY)), MISSING);
        assert_eq!(format_precip_mm(None), MISSING);
        assert_eq!(format_precip_in(None), MISSING);
    }

    #[test]
    fn precip_formatting_per_unit() {
        assert_eq!(format_precip_mm(Some(3.6)), "4 mm");
        assert_eq!(format_precip_in(Some(precip::mm2in(12.7))), "0.50 in");
        assert_eq!(format_humidity(Some(82.3)), "82%");
        assert_eq!(format_wind(Some(17.2), "mph"), "17 mph");
    }
}

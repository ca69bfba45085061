//! Value conversions shared by the resource collectors.
//!
//! Unrecognised status strings always map to the documented default value.

/// 1.0 for true, 0.0 for false.
pub fn bool_to_f64(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

/// Percentage (0-100) to ratio (0.0-1.0).
pub fn percent_to_ratio(percent: f64) -> f64 {
    percent / 100.0
}

/// Milliseconds to seconds.
pub fn millis_to_seconds(millis: f64) -> f64 {
    millis / 1000.0
}

/// CARP status: `master` = 1, `backup` = 0, anything else = -1.
pub fn carp_status_to_f64(status: &str) -> f64 {
    match status {
        "master" => 1.0,
        "backup" => 0.0,
        _ => -1.0,
    }
}

/// Gateway status: `online` = 1, anything else = 0.
pub fn gateway_status_to_f64(status: &str) -> f64 {
    bool_to_f64(status == "online")
}

/// Interface status: `up` = 1, anything else = 0.
pub fn interface_status_to_f64(status: &str) -> f64 {
    bool_to_f64(status == "up")
}

/// Effective maximum and usage ratio for a capacity counter.
///
/// A zero `maximum` falls back to `default_maximum`. When both are zero the
/// ratio is undefined and `None` is returned.
pub fn usage_ratio(current: f64, maximum: f64, default_maximum: f64) -> (f64, Option<f64>) {
    let maximum = if maximum == 0.0 { default_maximum } else { maximum };
    let ratio = (maximum != 0.0).then(|| current / maximum);
    (maximum, ratio)
}

//! Shared range-validation helpers used by all section validators.

/// Push an error if `value` is outside `[min, max]` (integer).
pub(crate) fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is NaN, infinite, or outside `[min, max]`.
pub(crate) fn validate_range_f64(
    errors: &mut Vec<String>,
    name: &str,
    value: f64,
    min: f64,
    max: f64,
) {
    if !value.is_finite() || value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is set but not an http(s) URL.
pub(crate) fn validate_url(errors: &mut Vec<String>, name: &str, value: Option<&str>) {
    if let Some(url) = value {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!("{name} = {url:?} must start with http:// or https://"));
        }
    }
}

use crate::utils::error::{PricingError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 價格區間百分比: 0 < lo <= hi
pub fn validate_bounds_pct(field_name: &str, bounds: (f64, f64)) -> Result<()> {
    let (lo, hi) = bounds;
    validate_finite(field_name, lo)?;
    validate_finite(field_name, hi)?;

    if lo <= 0.0 || lo > hi {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("[{}, {}]", lo, hi),
            reason: "Expected 0 < lo <= hi".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("data.dir", "data").is_ok());
        assert!(validate_path("data.dir", "  ").is_err());
        assert!(validate_path("data.dir", "da\0ta").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("optimization.n_grid", 121, 2).is_ok());
        assert!(validate_positive_number("optimization.n_grid", 1, 2).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("optimization.price_ending", 0.99, 0.0, 0.999_999).is_ok());
        assert!(validate_range("optimization.price_ending", 1.5, 0.0, 0.999_999).is_err());
    }

    #[test]
    fn test_validate_bounds_pct() {
        assert!(validate_bounds_pct("optimization.price_bounds_pct", (0.85, 1.35)).is_ok());
        assert!(validate_bounds_pct("optimization.price_bounds_pct", (1.0, 1.0)).is_ok());
        assert!(validate_bounds_pct("optimization.price_bounds_pct", (1.2, 0.9)).is_err());
        assert!(validate_bounds_pct("optimization.price_bounds_pct", (0.0, 1.2)).is_err());
        assert!(validate_bounds_pct("optimization.price_bounds_pct", (f64::NAN, 1.2)).is_err());
    }
}

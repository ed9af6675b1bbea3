//! Validation utilities for the Compost Monitoring Platform

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::OdorLevel;

/// Longest odor text the store keeps
pub const ODOR_TEXT_MAX_LEN: usize = 40;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate a required display name (first name, last name, site name...)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    if name.len() > 120 {
        return Err("Name must be at most 120 characters");
    }
    Ok(())
}

// ============================================================================
// Measurement Validations
// ============================================================================

/// Validate a norm bound (all composter quantities are non-negative)
pub fn validate_bound(bound: Option<Decimal>) -> Result<(), &'static str> {
    match bound {
        Some(value) if value < Decimal::ZERO => Err("Norm bounds cannot be negative"),
        _ => Ok(()),
    }
}

/// Whether a value fits a two-decimal column with `integer_digits` before the point.
/// The store rounds half away from zero, so the check does too.
fn fits_column(value: Decimal, integer_digits: u32) -> bool {
    let stored = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    stored.abs() < Decimal::from(10i64.pow(integer_digits))
}

/// Validate a temperature in °C (may be negative)
pub fn validate_temperature(value: Option<Decimal>) -> Result<(), &'static str> {
    match value {
        Some(v) if !fits_column(v, 4) => Err("Temperature must be between -9999.99 and 9999.99"),
        _ => Ok(()),
    }
}

/// Validate a mass in kg (compost mass, wood chips added)
pub fn validate_quantity(value: Option<Decimal>) -> Result<(), &'static str> {
    match value {
        Some(v) if v < Decimal::ZERO => Err("Quantities cannot be negative"),
        Some(v) if !fits_column(v, 8) => Err("Quantity must be below 100000000"),
        _ => Ok(()),
    }
}

/// Validate free odor text recorded on a reading
pub fn validate_odor_text(text: Option<&str>) -> Result<(), &'static str> {
    match text {
        Some(t) if t.chars().count() > ODOR_TEXT_MAX_LEN => {
            Err("Odor level must be at most 40 characters")
        }
        _ => Ok(()),
    }
}

/// Validate a percentage measurement (humidity, oxygenation)
pub fn validate_percent(value: Option<Decimal>) -> Result<(), &'static str> {
    match value {
        Some(v) if v < Decimal::ZERO || v > Decimal::from(100) => {
            Err("Percentage must be between 0 and 100")
        }
        _ => Ok(()),
    }
}

/// Validate an odor bound: it must sit on the scale to be comparable
pub fn validate_odor_bound(label: Option<&str>) -> Result<(), &'static str> {
    match label {
        Some(label) if OdorLevel::from_label(label).is_none() => {
            Err("Odor level must be one of: Faible, Moyen, Fort, Très fort")
        }
        _ => Ok(()),
    }
}

/// Validate GPS coordinates range
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

//! Fleet registry services.
//!
//! Every operation takes an explicit connection and returns [`FleetResult`]; the GraphQL
//! layer in [`crate::schema`] only translates inputs and errors.

pub mod last_update;
pub mod listing;
pub mod reference;
pub mod status;
pub mod vehicles;

use sea_orm::sea_query::LikeExpr;

use crate::error::{FleetError, FleetResult};

pub use listing::{VehicleFilter, VehicleListing};
pub use status::{MaintenanceDetails, VehicleState};
pub use vehicles::VehicleInput;

/// Trims `value` and rejects blank or oversized input.
pub(crate) fn required_text(field: &str, value: &str, max: usize) -> FleetResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FleetError::validation(format!("{} is required", field)));
    }
    validate_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Short codes (department/region) and plates are stored upper-cased.
pub(crate) fn normalize_code(field: &str, value: &str, max: usize) -> FleetResult<String> {
    required_text(field, value, max).map(|code| code.to_uppercase())
}

pub(crate) fn validate_length(field: &str, value: &str, max: usize) -> FleetResult<()> {
    if value.chars().count() > max {
        return Err(FleetError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Blank filter strings count as "not supplied".
pub(crate) fn sanitize_optional_filter(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Lower-cases `term` and escapes the LIKE metacharacters so it matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Case-insensitive "contains" pattern; compare it against `LOWER(column)`.
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(term))).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_trimmed_and_uppercased() {
        assert_eq!(normalize_code("code", "  adm ", 10).unwrap(), "ADM");
    }

    #[test]
    fn blank_required_text_is_rejected() {
        let err = required_text("name", "   ", 100).unwrap_err();
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(required_text("code", "ÇÃÕÉÍ", 5).is_ok());
        let err = required_text("code", "ABCDEF", 5).unwrap_err();
        assert_eq!(err.to_string(), "code must be at most 5 characters");
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("AbC"), "abc");
        assert_eq!(escape_like("a_c"), "a\\_c");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("x\\y"), "x\\\\y");
    }

    #[test]
    fn blank_filters_are_dropped() {
        assert_eq!(sanitize_optional_filter(Some("  ".into())), None);
        assert_eq!(
            sanitize_optional_filter(Some(" abc ".into())),
            Some("abc".to_string())
        );
        assert_eq!(sanitize_optional_filter(None), None);
    }
}

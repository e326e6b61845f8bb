use thiserror::Error;

use crate::models::{DateMode, FilterDescriptor};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub fn validate_month(month: Option<u32>) -> Result<u32, ValidationError> {
    let month = month.ok_or_else(|| ValidationError::MissingParameter("month".to_string()))?;
    if !(1..=12).contains(&month) {
        return Err(ValidationError::InvalidParameter(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }
    Ok(month)
}

/// Check that a descriptor carries everything its date mode needs
/// before it is used to fetch.
pub fn validate_filter(filter: &FilterDescriptor) -> Result<(), ValidationError> {
    // Search ignores every date parameter
    if filter.active_search().is_some() {
        return Ok(());
    }

    match filter.date_mode {
        DateMode::All => Ok(()),
        DateMode::Single => {
            validate_month(filter.month)?;
            if filter.year.is_none() {
                return Err(ValidationError::MissingParameter("year".to_string()));
            }
            Ok(())
        }
        DateMode::Range => {
            let from = filter
                .from
                .ok_or_else(|| ValidationError::MissingParameter("from".to_string()))?;
            let to = filter
                .to
                .ok_or_else(|| ValidationError::MissingParameter("to".to_string()))?;
            if from > to {
                return Err(ValidationError::InvalidParameter(format!(
                    "range start {} is after range end {}",
                    from, to
                )));
            }
            Ok(())
        }
        DateMode::Unrecognized => Err(ValidationError::InvalidParameter(
            "unrecognized date mode".to_string(),
        )),
    }
}

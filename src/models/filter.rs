//! Filter descriptors supplied by the view layer

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a view restricts records by date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateMode {
    /// No date restriction
    #[default]
    All,
    /// One month of one year
    Single,
    /// A from/to date interval
    Range,
    /// Any mode string this build does not know about
    #[serde(other)]
    Unrecognized,
}

/// Which date attribute of a record the filter applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateField {
    DueDate,
    ConfirmationDate,
    /// Sentinel sent by the UI when no date field is selected; same as absent
    None,
}

impl DateField {
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Self::DueDate => Some("dueDate"),
            Self::ConfirmationDate => Some("confirmationDate"),
            Self::None => None,
        }
    }
}

/// The filter parameters describing a requested view of a resource.
///
/// Fields that the active `date_mode` does not use are carried but ignored
/// when building addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterDescriptor {
    pub date_mode: DateMode,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub date_field: Option<DateField>,
    pub search_term: Option<String>,
}

impl FilterDescriptor {
    /// Unrestricted view
    pub fn all() -> Self {
        Self::default()
    }

    /// View of a single month
    pub fn single(month: u32, year: i32) -> Self {
        Self {
            date_mode: DateMode::Single,
            month: Some(month),
            year: Some(year),
            ..Self::default()
        }
    }

    /// View of a date interval, both ends inclusive
    pub fn range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            date_mode: DateMode::Range,
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    pub fn with_date_field(mut self, field: DateField) -> Self {
        self.date_field = Some(field);
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    /// The search term, if one is set and non-empty
    pub fn active_search(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|term| !term.is_empty())
    }

    /// The date field with the `none` sentinel folded into absence
    pub fn effective_date_field(&self) -> Option<DateField> {
        self.date_field.filter(|field| *field != DateField::None)
    }
}

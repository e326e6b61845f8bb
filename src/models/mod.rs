// Resource scopes, filter descriptors and partial update payloads
// Implement serialization/deserialization for filter state coming from the UI

pub mod filter;
pub mod patch;
pub mod scope;

pub use filter::{DateField, DateMode, FilterDescriptor};
pub use patch::{build_patch, Confirmation, CustomFieldValue, FieldUpdate};
pub use scope::Scope;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A transaction row as returned by the remote API; the typical cached payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub confirmation_date: Option<NaiveDate>,
    pub category_id: Option<String>,
    pub account_id: Option<String>,
}

// API list response shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
}

//! Partial update payloads for editable transaction fields
//!
//! Each variant carries exactly the data its update needs, so a payload for
//! a field/mode combination the API does not accept cannot be constructed.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

/// Confirmation state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed { on: NaiveDate },
    Pending,
}

/// Value written to a user-defined custom field
#[derive(Debug, Clone, PartialEq)]
pub enum CustomFieldValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Options(Vec<String>),
    Cleared,
}

impl CustomFieldValue {
    fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(number) => json!(number),
            Self::Date(date) => Value::String(iso_date(date)),
            Self::Options(options) => json!(options),
            Self::Cleared => Value::Null,
        }
    }
}

/// One edit to one field of a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    Description(String),
    Amount(f64),
    DueDate(NaiveDate),
    Confirmation(Confirmation),
    Category { id: String },
    Account { id: String },
    Installment { current: u32, total: u32 },
    CustomField { field_id: String, value: CustomFieldValue },
}

impl FieldUpdate {
    /// The partial payload for this single update
    pub fn to_payload(&self) -> Map<String, Value> {
        let value = match self {
            Self::Description(text) => json!({ "description": text }),
            Self::Amount(amount) => json!({ "amount": amount }),
            Self::DueDate(date) => json!({ "dueDate": iso_date(date) }),
            Self::Confirmation(Confirmation::Confirmed { on }) => json!({
                "confirmed": true,
                "confirmationDate": iso_date(on),
            }),
            Self::Confirmation(Confirmation::Pending) => json!({
                "confirmed": false,
                "confirmationDate": Value::Null,
            }),
            Self::Category { id } => json!({ "categoryId": id }),
            Self::Account { id } => json!({ "accountId": id }),
            Self::Installment { current, total } => json!({
                "installment": current,
                "installmentsTotal": total,
            }),
            Self::CustomField { field_id, value } => json!({
                "customFields": [{ "fieldId": field_id, "value": value.to_json() }],
            }),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Merge several updates into one payload. A later update of the same field
/// replaces an earlier one; custom field updates are collected per field id.
pub fn build_patch(updates: &[FieldUpdate]) -> Value {
    let mut payload = Map::new();
    let mut custom_fields: Vec<(String, Value)> = Vec::new();

    for update in updates {
        if let FieldUpdate::CustomField { field_id, value } = update {
            let value = value.to_json();
            match custom_fields.iter_mut().find(|(id, _)| *id == *field_id) {
                Some(existing) => existing.1 = value,
                None => custom_fields.push((field_id.clone(), value)),
            }
            continue;
        }
        payload.extend(update.to_payload());
    }

    if !custom_fields.is_empty() {
        let entries = custom_fields
            .into_iter()
            .map(|(field_id, value)| json!({ "fieldId": field_id, "value": value }))
            .collect();
        payload.insert("customFields".to_string(), Value::Array(entries));
    }

    Value::Object(payload)
}

fn iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

use crate::ir::{MISSING_FIELD, SENTINEL};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of rows, found {0}")]
    NotAnArray(&'static str),
    #[error("row {0} is not a JSON object")]
    RowNotObject(usize),
}

/// Column names the records are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldNames {
    pub business_process: String,
    pub scenario: String,
    pub role: String,
    pub state: String,
    pub business_process_prev: String,
    pub scenario_prev: String,
    /// The source data spells this column `Reole_Prev`.
    pub role_prev: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            business_process: "BusinessProcess".to_string(),
            scenario: "Scenario".to_string(),
            role: "Role".to_string(),
            state: "State".to_string(),
            business_process_prev: "BusinessProcess_Prev".to_string(),
            scenario_prev: "Scenario_Prev".to_string(),
            role_prev: "Reole_Prev".to_string(),
        }
    }
}

/// One process step as supplied by the data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub business_process: Option<String>,
    pub scenario: Option<String>,
    pub role: Option<String>,
    pub state: Option<String>,
    pub business_process_prev: Option<String>,
    pub scenario_prev: Option<String>,
    pub role_prev: Option<String>,
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(MISSING_FIELD)
}

impl Record {
    pub fn from_row(row: &Map<String, Value>, fields: &FieldNames) -> Self {
        Self {
            business_process: cell(row, &fields.business_process),
            scenario: cell(row, &fields.scenario),
            role: cell(row, &fields.role),
            state: cell(row, &fields.state),
            business_process_prev: cell(row, &fields.business_process_prev),
            scenario_prev: cell(row, &fields.scenario_prev),
            role_prev: cell(row, &fields.role_prev),
        }
    }

    /// Role as it appears in edge labels, `"undefined"` when missing.
    pub fn role_label(&self) -> &str {
        field(&self.role)
    }

    pub fn group_id(&self) -> String {
        field(&self.scenario).to_string()
    }

    pub fn node_id(&self) -> String {
        format!(
            "{}+{}+{}",
            field(&self.business_process),
            field(&self.scenario),
            field(&self.role)
        )
    }

    /// Composite predecessor key, built even for sentinel rows.
    pub fn raw_predecessor_id(&self) -> String {
        format!(
            "{}+{}+{}",
            field(&self.business_process_prev),
            field(&self.scenario_prev),
            field(&self.role_prev)
        )
    }

    pub fn is_entry(&self) -> bool {
        self.business_process_prev.as_deref() == Some(SENTINEL)
    }

    pub fn predecessor_id(&self) -> Option<String> {
        if self.is_entry() {
            None
        } else {
            Some(self.raw_predecessor_id())
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state.as_deref() == Some("Completed")
    }
}

/// Parses a JSON array of row objects into records.
pub fn load_records(input: &str, fields: &FieldNames) -> Result<Vec<Record>, InputError> {
    let value: Value = serde_json::from_str(input)?;
    records_from_value(&value, fields)
}

pub fn records_from_value(value: &Value, fields: &FieldNames) -> Result<Vec<Record>, InputError> {
    let rows = match value {
        Value::Array(rows) => rows,
        Value::Object(_) => return Err(InputError::NotAnArray("an object")),
        Value::String(_) => return Err(InputError::NotAnArray("a string")),
        Value::Number(_) => return Err(InputError::NotAnArray("a number")),
        Value::Bool(_) => return Err(InputError::NotAnArray("a boolean")),
        Value::Null => return Err(InputError::NotAnArray("null")),
    };
    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            row.as_object()
                .map(|row| Record::from_row(row, fields))
                .ok_or(InputError::RowNotObject(idx))
        })
        .collect()
}

fn cell(row: &Map<String, Value>, name: &str) -> Option<String> {
    let value = row.get(name).or_else(|| {
        row.iter()
            .find(|(key, _)| key.rsplit('.').next() == Some(name))
            .map(|(_, value)| value)
    })?;
    scalar(value)
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(cell) => cell.get("value").and_then(scalar),
        Value::Null | Value::Array(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_row(value.as_object().unwrap(), &FieldNames::default())
    }

    #[test]
    fn derives_composite_ids() {
        let rec = record(json!({
            "BusinessProcess": "Onboarding",
            "Scenario": "Hire",
            "Role": "HR",
            "State": "Completed",
            "BusinessProcess_Prev": "Onboarding",
            "Scenario_Prev": "Hire",
            "Reole_Prev": "Manager"
        }));
        assert_eq!(rec.group_id(), "Hire");
        assert_eq!(rec.node_id(), "Onboarding+Hire+HR");
        assert_eq!(rec.predecessor_id().as_deref(), Some("Onboarding+Hire+Manager"));
        assert!(rec.is_completed());
    }

    #[test]
    fn missing_fields_render_as_undefined() {
        let rec = record(json!({ "Scenario": "Hire", "Role_Prev": "Manager" }));
        assert_eq!(rec.node_id(), "undefined+Hire+undefined");
        // Only the misspelled column is read by default.
        assert_eq!(rec.raw_predecessor_id(), "undefined+undefined+undefined");
        assert!(!rec.is_entry());
    }

    #[test]
    fn role_prev_column_is_configurable() {
        let fields = FieldNames {
            role_prev: "Role_Prev".to_string(),
            ..FieldNames::default()
        };
        let row = json!({ "BusinessProcess_Prev": "P", "Scenario_Prev": "S", "Role_Prev": "R" });
        let rec = Record::from_row(row.as_object().unwrap(), &fields);
        assert_eq!(rec.raw_predecessor_id(), "P+S+R");
    }

    #[test]
    fn sentinel_predecessor_marks_entry() {
        let rec = record(json!({
            "BusinessProcess_Prev": "--",
            "Scenario_Prev": "--",
            "Reole_Prev": "--"
        }));
        assert!(rec.is_entry());
        assert_eq!(rec.predecessor_id(), None);
        assert_eq!(rec.raw_predecessor_id(), "--+--+--");
    }

    #[test]
    fn unwraps_dashboard_cells_and_qualified_keys() {
        let rec = record(json!({
            "steps.BusinessProcess": { "value": "Billing" },
            "steps.Scenario": { "value": 42 },
            "Role": { "value": null },
            "State": true
        }));
        assert_eq!(rec.business_process.as_deref(), Some("Billing"));
        assert_eq!(rec.scenario.as_deref(), Some("42"));
        assert_eq!(rec.role, None);
        assert_eq!(rec.state.as_deref(), Some("true"));
    }

    #[test]
    fn load_rejects_non_array_input() {
        let fields = FieldNames::default();
        assert!(matches!(
            load_records("{}", &fields),
            Err(InputError::NotAnArray("an object"))
        ));
        assert!(matches!(
            load_records("[{}, 3]", &fields),
            Err(InputError::RowNotObject(1))
        ));
        assert!(matches!(load_records("[", &fields), Err(InputError::Json(_))));
        assert_eq!(load_records("[]", &fields).unwrap().len(), 0);
    }
}

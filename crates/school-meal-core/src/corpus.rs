//! Validation of raw school-information records.
//!
//! A corpus source is a JSON array of NEIS school-information objects.
//! Only three fields matter for identity:
//!
//! | Field | Meaning | Required |
//! |-------|---------|----------|
//! | `SCHUL_NM` | school name | yes |
//! | `ATPT_OFCDC_SC_CODE` | education office code | yes |
//! | `SD_SCHUL_CODE` | school code | yes |
//! | `ATPT_OFCDC_SC_NM` | education office name | no (defaults to `""`) |
//!
//! Records missing a required field are dropped and counted, never
//! reported individually. Reading files is the caller's job; this module
//! only sees parsed JSON.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::models::SchoolIdentity;

/// Outcome of validating one corpus source.
#[derive(Debug, Clone, Default)]
pub struct RecordBatch {
    /// Valid identities in source order.
    pub identities: Vec<SchoolIdentity>,
    /// Number of elements that failed validation.
    pub dropped: usize,
}

/// Validate every element of a parsed corpus source.
///
/// # Errors
///
/// Returns an error when `source` is not a JSON array. The caller should
/// skip that source and continue with the next one.
pub fn identities_from_json(source: &Value) -> Result<RecordBatch> {
    let Some(records) = source.as_array() else {
        bail!("expected a JSON array of school records");
    };

    let mut batch = RecordBatch::default();
    for record in records {
        match identity_from_record(record) {
            Some(identity) => batch.identities.push(identity),
            None => batch.dropped += 1,
        }
    }
    Ok(batch)
}

/// Build an identity from one record, or `None` if a required field is
/// absent or empty.
pub fn identity_from_record(record: &Value) -> Option<SchoolIdentity> {
    let school_name = field_text(record, "SCHUL_NM")?;
    let office_code = field_text(record, "ATPT_OFCDC_SC_CODE")?;
    let school_code = field_text(record, "SD_SCHUL_CODE")?;
    let office_name = field_text(record, "ATPT_OFCDC_SC_NM").unwrap_or_default();

    Some(SchoolIdentity {
        office_code,
        office_name,
        school_code,
        school_name,
    })
}

/// Non-empty string or number field as text.
fn field_text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

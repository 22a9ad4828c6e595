//! Core data models shared by the index, resolver, and aggregator.

use serde::Serialize;

/// A school, identified by its education office and school codes.
///
/// `school_name` is **not** unique across the corpus: the same name is
/// used by schools under different regional education offices. Two
/// identities are the same school only when [`key`](SchoolIdentity::key)
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchoolIdentity {
    /// Education office code (`ATPT_OFCDC_SC_CODE`, e.g. `"B10"`).
    pub office_code: String,
    /// Education office name (`ATPT_OFCDC_SC_NM`). May be empty.
    pub office_name: String,
    /// Standard school code (`SD_SCHUL_CODE`).
    pub school_code: String,
    /// School name (`SCHUL_NM`).
    pub school_name: String,
}

impl SchoolIdentity {
    pub fn new(
        office_code: impl Into<String>,
        office_name: impl Into<String>,
        school_code: impl Into<String>,
        school_name: impl Into<String>,
    ) -> Self {
        Self {
            office_code: office_code.into(),
            office_name: office_name.into(),
            school_code: school_code.into(),
            school_name: school_name.into(),
        }
    }

    /// Uniqueness key: `(office_code, school_code)`.
    pub fn key(&self) -> (&str, &str) {
        (&self.office_code, &self.school_code)
    }

    /// `"[office] school"` prefix used by every report block.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.office_name, self.school_name)
    }
}

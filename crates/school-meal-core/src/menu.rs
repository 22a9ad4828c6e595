//! NEIS `mealServiceDietInfo` documents and menu text cleanup.
//!
//! A successful response looks like:
//!
//! ```json
//! { "mealServiceDietInfo": [
//!     { "head": [ { "list_total_count": 1 }, { "RESULT": { "CODE": "INFO-000", "MESSAGE": "..." } } ] },
//!     { "row": [ { "MMEAL_SC_NM": "중식", "DDISH_NM": "밥<br/>국(5.6.)", "CAL_INFO": "650.3 Kcal" } ] }
//! ] }
//! ```
//!
//! while "no data" and errors are reported at the top level:
//!
//! ```json
//! { "RESULT": { "CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다." } }
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

/// Result code NEIS uses for "no matching data".
pub const NO_DATA_CODE: &str = "INFO-200";

/// Meal-type label used when a row has no `MMEAL_SC_NM`.
pub const DEFAULT_MEAL_TYPE: &str = "meal";

/// One response from the meal-information endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealDocument {
    /// Top-level result, present for "no data" and error responses.
    #[serde(rename = "RESULT", default)]
    pub result: Option<ApiResult>,
    /// `[ head, { row } ]` sections of a successful response.
    #[serde(rename = "mealServiceDietInfo", default)]
    pub sections: Vec<MealSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResult {
    #[serde(rename = "CODE")]
    pub code: String,
    #[serde(rename = "MESSAGE", default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealSection {
    #[serde(default)]
    pub head: Option<Value>,
    /// Rows are kept as raw JSON so one malformed row cannot reject the
    /// whole document.
    #[serde(default)]
    pub row: Option<Vec<Value>>,
}

impl MealDocument {
    /// Document carrying only a top-level result code.
    pub fn with_result(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            result: Some(ApiResult {
                code: code.into(),
                message: message.into(),
            }),
            sections: Vec::new(),
        }
    }

    /// Successful document with the given rows.
    pub fn with_rows(rows: Vec<Value>) -> Self {
        Self {
            result: None,
            sections: vec![
                MealSection {
                    head: Some(Value::Array(Vec::new())),
                    row: None,
                },
                MealSection {
                    head: None,
                    row: Some(rows),
                },
            ],
        }
    }

    /// The first `row` array in the document, if any.
    pub fn rows(&self) -> Option<&[Value]> {
        self.sections.iter().find_map(|s| s.row.as_deref())
    }
}

/// One meal row as served by NEIS.
#[derive(Debug, Clone, Deserialize)]
pub struct MealRow {
    #[serde(rename = "DDISH_NM")]
    pub dishes: String,
    #[serde(rename = "MMEAL_SC_NM", default)]
    pub meal_type: Option<String>,
    #[serde(rename = "CAL_INFO", default)]
    pub calories: Option<String>,
}

/// A cleaned, display-ready meal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedMeal {
    pub meal_type: String,
    pub calories: String,
    pub menu: String,
}

impl ServedMeal {
    /// Decode and clean one raw row.
    pub fn from_row(row: &Value) -> serde_json::Result<Self> {
        let row: MealRow = serde_json::from_value(row.clone())?;
        Ok(Self {
            meal_type: row
                .meal_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_MEAL_TYPE.to_string()),
            calories: row.calories.unwrap_or_default(),
            menu: clean_menu_text(&row.dishes),
        })
    }

    /// `"[type] calories\nmenu"`.
    pub fn render(&self) -> String {
        format!("[{}] {}\n{}", self.meal_type, self.calories, self.menu)
    }
}

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line-break pattern"));
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([0-9.]+\)").expect("valid annotation pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace pattern"));

/// Turn a raw `DDISH_NM` value into readable menu text.
///
/// `<br/>` markup becomes a line break, allergen annotations such as
/// `(1.2.5.)` are removed, runs of two or more whitespace characters
/// collapse to one space, and the result is trimmed.
pub fn clean_menu_text(raw: &str) -> String {
    let text = LINE_BREAK.replace_all(raw, "\n");
    let text = ANNOTATION.replace_all(&text, "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

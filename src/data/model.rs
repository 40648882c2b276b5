use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::LoadError;
use crate::config::{
    COL_CATEGORY, COL_COMPANIES_HOUSE, COL_CONTRACT_VALUE, COL_CQC_RATING, COL_ORG_TYPE,
    COL_PROVIDER, COL_SUMMARY, REQUIRED_COLUMNS,
};

// ---------------------------------------------------------------------------
// Cell – a single untyped value as read from the source file
// ---------------------------------------------------------------------------

/// A source cell before coercion. Every file format lowers to this.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Text view of the cell; `None` for empty cells.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(v) => Some(format_number(*v)),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Numeric coercion: anything that does not read as a finite number is missing.
    pub fn as_number(&self) -> Option<f64> {
        let v = match self {
            Cell::Empty => return None,
            Cell::Number(v) => *v,
            Cell::Bool(b) => f64::from(u8::from(*b)),
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

/// Integral floats print without a trailing `.0` so numeric provider ids stay readable.
fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(s) => write!(f, "{s}"),
            None => write!(f, "<empty>"),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – header row plus cell rows, format independent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

static EMPTY: Cell = Cell::Empty;

impl RawTable {
    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

// ---------------------------------------------------------------------------
// ContractRecord – one row of the base table
// ---------------------------------------------------------------------------

/// One contract line item, already coerced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContractRecord {
    pub provider: Option<String>,
    pub org_type: Option<String>,
    pub category: Option<String>,
    pub cqc_rating: Option<String>,
    pub summary: Option<String>,
    pub companies_house_info: Option<String>,
    /// `None` when the source cell did not coerce to a finite number.
    pub contract_value: Option<f64>,
}

// ---------------------------------------------------------------------------
// ContractTable – the immutable base table
// ---------------------------------------------------------------------------

/// The full base table with its domains, computed once at load time.
#[derive(Debug, Clone, Default)]
pub struct ContractTable {
    pub records: Vec<ContractRecord>,
    /// Distinct non-missing organisation types, sorted.
    pub org_types: BTreeSet<String>,
    /// Distinct non-missing categories, sorted.
    pub categories: BTreeSet<String>,
    /// Distinct non-missing CQC ratings; empty when the column is absent.
    pub ratings: BTreeSet<String>,
    /// Observed `(min, max)` of numeric contract values, if any.
    pub value_bounds: Option<(f64, f64)>,
    /// Number of contract-value cells that failed numeric coercion.
    pub coercion_failures: usize,
}

impl ContractTable {
    /// Build domains and bounds from already typed records.
    pub fn from_records(records: Vec<ContractRecord>) -> Self {
        let mut org_types = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut ratings = BTreeSet::new();
        let mut value_bounds: Option<(f64, f64)> = None;

        for rec in &records {
            if let Some(v) = &rec.org_type {
                org_types.insert(v.clone());
            }
            if let Some(v) = &rec.category {
                categories.insert(v.clone());
            }
            if let Some(v) = &rec.cqc_rating {
                ratings.insert(v.clone());
            }
            if let Some(v) = rec.contract_value {
                value_bounds = Some(match value_bounds {
                    Some((lo, hi)) => (lo.min(v), hi.max(v)),
                    None => (v, v),
                });
            }
        }

        ContractTable {
            records,
            org_types,
            categories,
            ratings,
            value_bounds,
            coercion_failures: 0,
        }
    }

    /// Resolve named columns and coerce every row into a [`ContractRecord`].
    pub fn from_raw(raw: RawTable) -> Result<Self, LoadError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| raw.column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let provider = raw.column(COL_PROVIDER);
        let org_type = raw.column(COL_ORG_TYPE);
        let category = raw.column(COL_CATEGORY);
        let value = raw.column(COL_CONTRACT_VALUE);
        let rating = raw.column(COL_CQC_RATING);
        let summary = raw.column(COL_SUMMARY);
        let companies_house = raw.column(COL_COMPANIES_HOUSE);

        let mut failures = 0usize;
        let records: Vec<ContractRecord> = raw
            .rows
            .iter()
            .map(|row| {
                let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or(&EMPTY);
                let raw_value = cell(value);
                let contract_value = raw_value.as_number();
                if contract_value.is_none() && *raw_value != Cell::Empty {
                    failures += 1;
                }
                ContractRecord {
                    provider: cell(provider).as_text(),
                    org_type: cell(org_type).as_text(),
                    category: cell(category).as_text(),
                    cqc_rating: cell(rating).as_text(),
                    summary: cell(summary).as_text(),
                    companies_house_info: cell(companies_house).as_text(),
                    contract_value,
                }
            })
            .collect();

        if failures > 0 {
            log::warn!("{failures} '{COL_CONTRACT_VALUE}' cell(s) are not numeric and were treated as missing");
        }

        let mut table = ContractTable::from_records(records);
        table.coercion_failures = failures;
        Ok(table)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// One row of the main aggregated view. Field order is the export column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAggregate {
    #[serde(rename = "Provider")]
    pub provider: Option<String>,
    #[serde(rename = "Contract Value")]
    pub contract_value: f64,
    #[serde(rename = "OrgType")]
    pub org_type: Option<String>,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "enr_CQC_Rating")]
    pub cqc_rating: Option<String>,
    #[serde(rename = "enr_Summary")]
    pub summary: Option<String>,
    #[serde(rename = "enr_Companies_House_Info")]
    pub companies_house_info: Option<String>,
}

/// Spend per provider in the fixed private-provider view.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderTotal {
    pub provider: String,
    pub contract_value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn raw(headers: &[&str], rows: Vec<Vec<Cell>>) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn number_coercion() {
        assert_eq!(Cell::Number(12.5).as_number(), Some(12.5));
        assert_eq!(text(" 1e3 ").as_number(), Some(1000.0));
        assert_eq!(text("N/A").as_number(), None);
        assert_eq!(text("1,000").as_number(), None);
        assert_eq!(text("").as_number(), None);
        assert_eq!(text("inf").as_number(), None);
        assert_eq!(Cell::Number(f64::NAN).as_number(), None);
        assert_eq!(Cell::Bool(true).as_number(), Some(1.0));
        assert_eq!(Cell::Empty.as_number(), None);
    }

    #[test]
    fn text_coercion() {
        assert_eq!(Cell::Number(42.0).as_text().as_deref(), Some("42"));
        assert_eq!(Cell::Number(4.25).as_text().as_deref(), Some("4.25"));
        assert_eq!(text("").as_text(), None);
        assert_eq!(text(" Good ").as_text().as_deref(), Some(" Good "));
    }

    #[test]
    fn missing_required_columns_are_all_reported() {
        let err = ContractTable::from_raw(raw(&["Provider", "Category"], vec![])).unwrap_err();
        match err {
            LoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["OrgType".to_string(), "Contract Value".to_string()])
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn optional_columns_default_to_missing() {
        let table = ContractTable::from_raw(raw(
            &["Provider", "OrgType", "Category", "Contract Value"],
            vec![vec![text("A"), text("X"), text("Y"), Cell::Number(10.0)]],
        ))
        .unwrap();
        let rec = &table.records[0];
        assert_eq!(rec.cqc_rating, None);
        assert_eq!(rec.summary, None);
        assert_eq!(rec.companies_house_info, None);
        assert!(table.ratings.is_empty());
    }

    #[test]
    fn domains_bounds_and_failures() {
        let table = ContractTable::from_raw(raw(
            &["Provider", "OrgType", "Category", "Contract Value", "enr_CQC_Rating"],
            vec![
                vec![text("A"), text("X"), text("Y"), Cell::Number(100.0), text("Good")],
                vec![text("B"), text("Z"), text("Y"), text("N/A"), Cell::Empty],
                vec![text("C"), Cell::Empty, text("W"), text("-5")],
            ],
        ))
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.org_types.iter().collect::<Vec<_>>(), vec!["X", "Z"]);
        assert_eq!(table.categories.iter().collect::<Vec<_>>(), vec!["W", "Y"]);
        assert_eq!(table.ratings.iter().collect::<Vec<_>>(), vec!["Good"]);
        assert_eq!(table.value_bounds, Some((-5.0, 100.0)));
        assert_eq!(table.coercion_failures, 1);
        // short rows read as empty cells
        assert_eq!(table.records[2].cqc_rating, None);
        assert_eq!(table.records[1].contract_value, None);
    }

    #[test]
    fn no_numeric_values_means_no_bounds() {
        let table = ContractTable::from_records(vec![ContractRecord {
            provider: Some("A".into()),
            ..Default::default()
        }]);
        assert_eq!(table.value_bounds, None);
    }
}

use std::collections::BTreeSet;

use super::model::{ContractRecord, ContractTable};

// ---------------------------------------------------------------------------
// Filter predicate: selected values per categorical column + value range
// ---------------------------------------------------------------------------

/// Sidebar selection state.
///
/// A categorical set equal to the column's whole domain imposes no constraint;
/// an empty set hides everything. The same holds for `value_range` against the
/// table's observed bounds.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    pub org_types: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub ratings: BTreeSet<String>,
    /// Inclusive `(min, max)`; `None` when the table has no numeric values.
    pub value_range: Option<(f64, f64)>,
}

impl FilterState {
    /// Initialise with all values selected and the full observed range.
    pub fn from_table(table: &ContractTable) -> Self {
        FilterState {
            org_types: table.org_types.clone(),
            categories: table.categories.clone(),
            ratings: table.ratings.clone(),
            value_range: table.value_bounds,
        }
    }
}

/// Which categorical column a selection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    OrgType,
    Category,
    Rating,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::OrgType, Column::Category, Column::Rating];

    pub fn label(self) -> &'static str {
        match self {
            Column::OrgType => "Organisation Type",
            Column::Category => "Category",
            Column::Rating => "CQC Rating",
        }
    }

    pub fn domain(self, table: &ContractTable) -> &BTreeSet<String> {
        match self {
            Column::OrgType => &table.org_types,
            Column::Category => &table.categories,
            Column::Rating => &table.ratings,
        }
    }

    pub fn selection(self, filters: &FilterState) -> &BTreeSet<String> {
        match self {
            Column::OrgType => &filters.org_types,
            Column::Category => &filters.categories,
            Column::Rating => &filters.ratings,
        }
    }

    pub fn selection_mut(self, filters: &mut FilterState) -> &mut BTreeSet<String> {
        match self {
            Column::OrgType => &mut filters.org_types,
            Column::Category => &mut filters.categories,
            Column::Rating => &mut filters.ratings,
        }
    }

    fn value(self, rec: &ContractRecord) -> Option<&String> {
        match self {
            Column::OrgType => rec.org_type.as_ref(),
            Column::Category => rec.category.as_ref(),
            Column::Rating => rec.cqc_rating.as_ref(),
        }
    }
}

/// The active parts of a [`FilterState`]; inactive columns are left out.
struct Predicate<'a> {
    sets: Vec<(Column, &'a BTreeSet<String>)>,
    range: Option<(f64, f64)>,
}

impl<'a> Predicate<'a> {
    fn compile(table: &ContractTable, filters: &'a FilterState) -> Self {
        let sets = Column::ALL
            .into_iter()
            .filter_map(|col| {
                let domain = col.domain(table);
                // Nothing to choose from (e.g. no rating column): skip the predicate.
                if domain.is_empty() {
                    return None;
                }
                let selected = col.selection(filters);
                // All unique values selected → no effective filter.
                if !selected.is_empty() && selected.is_superset(domain) {
                    return None;
                }
                Some((col, selected))
            })
            .collect();

        let range = match (filters.value_range, table.value_bounds) {
            (Some((lo, hi)), Some((min, max))) if lo <= min && hi >= max => None,
            (range, Some(_)) => range,
            (_, None) => None,
        };

        Predicate { sets, range }
    }

    fn accepts(&self, rec: &ContractRecord) -> bool {
        for (col, selected) in &self.sets {
            match col.value(rec) {
                Some(v) if selected.contains(v) => {}
                _ => return false,
            }
        }
        match (self.range, rec.contract_value) {
            (None, _) => true,
            (Some((lo, hi)), Some(v)) => lo <= v && v <= hi,
            (Some(_), None) => false,
        }
    }
}

/// Return the records that pass all active filters, in base-table order.
///
/// A record passes when:
/// * each narrowed categorical column holds a present value inside the selection
/// * the rating column is ignored if the table has no ratings at all
/// * its contract value lies inside a narrowed range (missing values fail)
pub fn filter_records<'a>(table: &'a ContractTable, filters: &FilterState) -> Vec<&'a ContractRecord> {
    let predicate = Predicate::compile(table, filters);
    table.records.iter().filter(|rec| predicate.accepts(rec)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(provider: &str, org: &str, cat: &str, rating: Option<&str>, value: Option<f64>) -> ContractRecord {
        ContractRecord {
            provider: Some(provider.to_string()),
            org_type: Some(org.to_string()),
            category: Some(cat.to_string()),
            cqc_rating: rating.map(str::to_string),
            summary: None,
            companies_house_info: None,
            contract_value: value,
        }
    }

    fn sample() -> ContractTable {
        ContractTable::from_records(vec![
            rec("A", "NHS", "Acute", Some("Good"), Some(100.0)),
            rec("B", "Ltd", "Community", Some("Outstanding"), Some(2_000.0)),
            rec("C", "Ltd", "Acute", None, Some(50.0)),
            rec("D", "NHS", "Community", Some("Good"), None),
        ])
    }

    fn providers(recs: &[&ContractRecord]) -> Vec<String> {
        recs.iter().filter_map(|r| r.provider.clone()).collect()
    }

    fn set(vals: &[&str]) -> BTreeSet<String> {
        vals.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn default_state_selects_everything() {
        let table = sample();
        let filters = FilterState::from_table(&table);
        assert_eq!(filters.value_range, Some((50.0, 2_000.0)));
        let out = filter_records(&table, &filters);
        assert_eq!(providers(&out), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn categorical_conjunction() {
        let table = sample();
        let mut filters = FilterState::from_table(&table);
        filters.org_types = set(&["Ltd"]);
        filters.categories = set(&["Acute"]);
        let out = filter_records(&table, &filters);
        assert_eq!(providers(&out), vec!["C"]);
        for r in out {
            assert_eq!(r.org_type.as_deref(), Some("Ltd"));
            assert_eq!(r.category.as_deref(), Some("Acute"));
        }
    }

    #[test]
    fn empty_selection_hides_everything() {
        let table = sample();
        let mut filters = FilterState::from_table(&table);
        filters.categories.clear();
        assert!(filter_records(&table, &filters).is_empty());
    }

    #[test]
    fn narrowed_rating_excludes_missing_ratings() {
        let table = sample();
        let mut filters = FilterState::from_table(&table);
        filters.ratings = set(&["Good"]);
        let out = filter_records(&table, &filters);
        assert_eq!(providers(&out), vec!["A", "D"]);
    }

    #[test]
    fn rating_predicate_skipped_without_rating_domain() {
        let table = ContractTable::from_records(vec![
            rec("A", "NHS", "Acute", None, Some(1.0)),
            rec("B", "NHS", "Acute", None, Some(2.0)),
        ]);
        let mut filters = FilterState::from_table(&table);
        assert!(filters.ratings.is_empty());
        filters.org_types = set(&["NHS"]);
        assert_eq!(filter_records(&table, &filters).len(), 2);
    }

    #[test]
    fn range_is_inclusive_and_drops_missing_when_narrowed() {
        let table = sample();
        let mut filters = FilterState::from_table(&table);
        filters.value_range = Some((50.0, 100.0));
        let out = filter_records(&table, &filters);
        assert_eq!(providers(&out), vec!["A", "C"]);
        for r in &out {
            let v = r.contract_value.unwrap();
            assert!((50.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn full_range_keeps_non_numeric_values() {
        let table = sample();
        let filters = FilterState::from_table(&table);
        let out = filter_records(&table, &filters);
        assert!(out.iter().any(|r| r.contract_value.is_none()));
    }

    #[test]
    fn base_table_is_not_mutated() {
        let table = sample();
        let before = table.records.clone();
        let mut filters = FilterState::from_table(&table);
        filters.value_range = Some((0.0, 1.0));
        let _ = filter_records(&table, &filters);
        assert_eq!(table.records, before);
    }
}

use std::collections::HashMap;

use super::model::{ContractRecord, ProviderAggregate, ProviderTotal};

/// Grouping key of the main view. `None == None`, so missing values share a group.
type GroupKey<'a> = (
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
);

fn group_key(rec: &ContractRecord) -> GroupKey<'_> {
    (
        rec.provider.as_deref(),
        rec.org_type.as_deref(),
        rec.category.as_deref(),
        rec.cqc_rating.as_deref(),
        rec.summary.as_deref(),
        rec.companies_house_info.as_deref(),
    )
}

/// Stable descending sort by value; ties keep first-encounter order.
fn sort_descending<T>(rows: &mut [T], value: impl Fn(&T) -> f64) {
    rows.sort_by(|a, b| value(b).total_cmp(&value(a)));
}

/// Group filtered records by provider identity and sum contract value.
///
/// Missing values add nothing to a sum, but a group made only of missing
/// values still appears with a total of `0`.
pub fn aggregate(records: &[&ContractRecord]) -> Vec<ProviderAggregate> {
    let mut index: HashMap<GroupKey<'_>, usize> = HashMap::new();
    let mut rows: Vec<ProviderAggregate> = Vec::new();

    for rec in records {
        let slot = *index.entry(group_key(rec)).or_insert_with(|| {
            rows.push(ProviderAggregate {
                provider: rec.provider.clone(),
                contract_value: 0.0,
                org_type: rec.org_type.clone(),
                category: rec.category.clone(),
                cqc_rating: rec.cqc_rating.clone(),
                summary: rec.summary.clone(),
                companies_house_info: rec.companies_house_info.clone(),
            });
            rows.len() - 1
        });
        rows[slot].contract_value += rec.contract_value.unwrap_or(0.0);
    }

    sort_descending(&mut rows, |r| r.contract_value);
    rows
}

/// Spend per provider over `records` where org type and category match exactly,
/// restricted to totals inside the inclusive `band`, sorted by descending value.
///
/// Records without a provider are not grouped.
pub fn provider_totals_in_band<'a, I>(
    records: I,
    org_type: &str,
    category: &str,
    band: (f64, f64),
) -> Vec<ProviderTotal>
where
    I: IntoIterator<Item = &'a ContractRecord>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut totals: Vec<ProviderTotal> = Vec::new();

    for rec in records {
        if rec.org_type.as_deref() != Some(org_type) || rec.category.as_deref() != Some(category) {
            continue;
        }
        let Some(provider) = rec.provider.as_deref() else {
            continue;
        };
        let slot = *index.entry(provider).or_insert_with(|| {
            totals.push(ProviderTotal {
                provider: provider.to_string(),
                contract_value: 0.0,
            });
            totals.len() - 1
        });
        totals[slot].contract_value += rec.contract_value.unwrap_or(0.0);
    }

    let (lo, hi) = band;
    totals.retain(|t| lo <= t.contract_value && t.contract_value <= hi);
    sort_descending(&mut totals, |t| t.contract_value);
    totals
}

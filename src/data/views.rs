use super::aggregate::{aggregate, provider_totals_in_band};
use super::filter::{filter_records, FilterState};
use super::model::{ContractTable, ProviderAggregate, ProviderTotal};
use crate::config::{PRIVATE_BAND, PRIVATE_CATEGORY, PRIVATE_ORG_TYPE};

/// Main view: filter the base table, then group and sum per provider.
pub fn provider_view(table: &ContractTable, filters: &FilterState) -> Vec<ProviderAggregate> {
    let filtered = filter_records(table, filters);
    let rows = aggregate(&filtered);
    log::debug!(
        "{} of {} records pass the filters, {} provider rows",
        filtered.len(),
        table.len(),
        rows.len()
    );
    rows
}

/// Fixed private-provider view over the unfiltered base table.
pub fn private_view(table: &ContractTable) -> Vec<ProviderTotal> {
    provider_totals_in_band(&table.records, PRIVATE_ORG_TYPE, PRIVATE_CATEGORY, PRIVATE_BAND)
}

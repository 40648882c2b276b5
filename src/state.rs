use std::path::Path;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::Settings;
use crate::data::cache::DatasetCache;
use crate::data::export::export_csv;
use crate::data::filter::{Column, FilterState};
use crate::data::model::{ContractTable, ProviderAggregate, ProviderTotal};
use crate::data::views::{private_view, provider_view};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    /// Loaded base tables, keyed by source.
    cache: DatasetCache,

    /// Source of the current table.
    pub settings: Settings,

    /// Shared, read-only base table (None until a load succeeds).
    pub table: Option<Arc<ContractTable>>,

    /// Sidebar selections.
    pub filters: FilterState,

    /// Main aggregated view for the current filters.
    pub rows: Vec<ProviderAggregate>,

    /// Private providers in the fixed spend band; independent of `filters`.
    pub private_rows: Vec<ProviderTotal>,

    /// CQC rating → colour.
    pub rating_colors: ColorMap,

    /// Startup load failure; nothing else is shown while set.
    pub fatal: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Load the configured source. A failure here is fatal for the session.
    pub fn load(settings: Settings) -> Self {
        let mut state = AppState {
            settings,
            ..Default::default()
        };
        match state.cache.get_or_load(&state.settings.path, &state.settings.sheet) {
            Ok(table) => state.set_dataset(table),
            Err(e) => {
                log::error!("Failed to load {}: {e}", state.settings.path.display());
                state.fatal = Some(format!("Could not load {}: {e}", state.settings.path.display()));
            }
        }
        state
    }

    /// Ingest a base table, reset filters to their defaults and rebuild both views.
    pub fn set_dataset(&mut self, table: Arc<ContractTable>) {
        self.filters = FilterState::from_table(&table);
        self.private_rows = private_view(&table);
        self.rating_colors = ColorMap::new(&table.ratings);
        self.table = Some(table);
        self.status_message = None;
        self.refilter();
    }

    /// Switch to another source from the File menu; the current table stays on failure.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path, &self.settings.sheet) {
            Ok(table) => {
                log::debug!("{} source(s) cached", self.cache.len());
                self.settings.path = path.to_path_buf();
                self.fatal = None;
                self.set_dataset(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Recompute the main view after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.rows = provider_view(table, &self.filters);
        }
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_filter_value(&mut self, column: Column, value: &str) {
        let selected = column.selection_mut(&mut self.filters);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: Column) {
        if let Some(table) = &self.table {
            *column.selection_mut(&mut self.filters) = column.domain(table).clone();
            self.refilter();
        }
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: Column) {
        column.selection_mut(&mut self.filters).clear();
        self.refilter();
    }

    /// Set the value range, clamped to the observed bounds with `min <= max`.
    pub fn set_value_range(&mut self, lo: f64, hi: f64) {
        let Some((min, max)) = self.table.as_ref().and_then(|t| t.value_bounds) else {
            return;
        };
        let lo = lo.clamp(min, max);
        let hi = hi.clamp(lo, max);
        if self.filters.value_range != Some((lo, hi)) {
            self.filters.value_range = Some((lo, hi));
            self.refilter();
        }
    }

    /// Restore the default selection.
    pub fn reset_filters(&mut self) {
        if let Some(table) = &self.table {
            self.filters = FilterState::from_table(table);
            self.refilter();
        }
    }

    /// Export the main view; the outcome is reported in the status line.
    pub fn export_to(&mut self, path: &Path) {
        match export_csv(&self.rows, path) {
            Ok(()) => {
                self.status_message = Some(format!("Exported {} rows to {}", self.rows.len(), path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::tests::scratch_dir;

    const CSV: &str = "Provider,OrgType,Category,Contract Value,enr_CQC_Rating\n\
        Acme,Independent Ltd/LLP/Co.,Private Community Sector Providers (Non NHS),1500000,Good\n\
        Acme,Independent Ltd/LLP/Co.,Private Community Sector Providers (Non NHS),500000,Good\n\
        Trust,NHS Trust,Acute,9000000,Outstanding\n\
        Odd,NHS Trust,Acute,N/A,\n";

    fn settings(dir: &Path) -> Settings {
        let path = dir.join("contracts.csv");
        std::fs::write(&path, CSV).unwrap();
        Settings {
            path,
            sheet: "merged_data".to_string(),
        }
    }

    #[test]
    fn load_builds_both_views() {
        let state = AppState::load(settings(&scratch_dir("state_load")));
        assert!(state.fatal.is_none());
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.rows[0].provider.as_deref(), Some("Trust"));
        assert_eq!(state.private_rows.len(), 1);
        assert_eq!(state.private_rows[0].contract_value, 2_000_000.0);
    }

    #[test]
    fn missing_source_is_fatal() {
        let dir = scratch_dir("state_fatal");
        let state = AppState::load(Settings {
            path: dir.join("absent.xlsx"),
            sheet: "merged_data".to_string(),
        });
        assert!(state.fatal.is_some());
        assert!(state.table.is_none());
        assert!(state.rows.is_empty());
    }

    #[test]
    fn filter_changes_recompute_main_view_only() {
        let mut state = AppState::load(settings(&scratch_dir("state_filters")));
        let private = state.private_rows.clone();

        state.toggle_filter_value(Column::OrgType, "NHS Trust");
        assert_eq!(state.rows.len(), 1);
        state.select_none(Column::Category);
        assert!(state.rows.is_empty());
        state.select_all(Column::Category);
        assert_eq!(state.rows.len(), 1);

        assert_eq!(state.private_rows, private);
        state.reset_filters();
        assert_eq!(state.rows.len(), 3);
    }

    #[test]
    fn value_range_is_clamped_and_ordered() {
        let mut state = AppState::load(settings(&scratch_dir("state_range")));
        state.set_value_range(-10.0, 1e12);
        assert_eq!(state.filters.value_range, Some((500_000.0, 9_000_000.0)));

        state.set_value_range(2_000_000.0, 1_000_000.0);
        assert_eq!(state.filters.value_range, Some((2_000_000.0, 2_000_000.0)));
        assert!(state.rows.is_empty());

        state.set_value_range(1_000_000.0, 9_000_000.0);
        let names: Vec<_> = state.rows.iter().filter_map(|r| r.provider.as_deref()).collect();
        assert_eq!(names, vec!["Trust", "Acme"]);
    }

    #[test]
    fn failed_open_keeps_current_table() {
        let dir = scratch_dir("state_reopen");
        let mut state = AppState::load(settings(&dir));
        let before = state.rows.clone();
        state.open(&dir.join("missing.csv"));
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error"));
        assert_eq!(state.rows, before);
        assert!(state.table.is_some());
    }

    #[test]
    fn export_reports_status() {
        let dir = scratch_dir("state_export");
        let mut state = AppState::load(settings(&dir));
        let out = dir.join("out.csv");
        state.export_to(&out);
        assert!(out.is_file());
        assert!(state.status_message.unwrap().starts_with("Exported 3 rows"));
    }
}

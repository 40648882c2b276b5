use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Workbook opened at launch when no path argument is given.
pub const DEFAULT_WORKBOOK: &str = "NEL_Main_Enriched_Output.xlsx";

/// Worksheet holding the merged contract rows.
pub const SHEET_NAME: &str = "merged_data";

// ---------------------------------------------------------------------------
// Source column names (exact match, case-sensitive)
// ---------------------------------------------------------------------------

pub const COL_PROVIDER: &str = "Provider";
pub const COL_ORG_TYPE: &str = "OrgType";
pub const COL_CATEGORY: &str = "Category";
pub const COL_CONTRACT_VALUE: &str = "Contract Value";
pub const COL_CQC_RATING: &str = "enr_CQC_Rating";
pub const COL_SUMMARY: &str = "enr_Summary";
pub const COL_COMPANIES_HOUSE: &str = "enr_Companies_House_Info";

/// Column order of the aggregated table and its CSV export.
pub const AGGREGATE_COLUMNS: [&str; 7] = [
    COL_PROVIDER,
    COL_CONTRACT_VALUE,
    COL_ORG_TYPE,
    COL_CATEGORY,
    COL_CQC_RATING,
    COL_SUMMARY,
    COL_COMPANIES_HOUSE,
];

/// Columns the loader refuses to start without.
pub const REQUIRED_COLUMNS: [&str; 4] = [COL_PROVIDER, COL_ORG_TYPE, COL_CATEGORY, COL_CONTRACT_VALUE];

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

pub const EXPORT_FILE_NAME: &str = "NEL_filtered_aggregated.csv";
pub const EXPORT_MIME: &str = "text/csv";

// ---------------------------------------------------------------------------
// Private-provider view
// ---------------------------------------------------------------------------

pub const PRIVATE_ORG_TYPE: &str = "Independent Ltd/LLP/Co.";
pub const PRIVATE_CATEGORY: &str = "Private Community Sector Providers (Non NHS)";

/// Inclusive spend band (£) for the private-provider view.
pub const PRIVATE_BAND: (f64, f64) = (1_000_000.0, 4_000_000.0);

// ---------------------------------------------------------------------------
// Launch settings
// ---------------------------------------------------------------------------

/// Where the dashboard reads its data from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub path: PathBuf,
    pub sheet: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_WORKBOOK),
            sheet: SHEET_NAME.to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from process arguments (program name excluded).
    /// The first positional argument, if any, replaces the default workbook.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut settings = Settings::default();
        if let Some(path) = args.into_iter().next() {
            settings.path = PathBuf::from(path);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_fixed_workbook_and_sheet() {
        let s = Settings::from_args(Vec::<String>::new());
        assert_eq!(s.path, PathBuf::from(DEFAULT_WORKBOOK));
        assert_eq!(s.sheet, "merged_data");
    }

    #[test]
    fn first_argument_overrides_path_only() {
        let s = Settings::from_args(vec!["other.csv".to_string(), "ignored".to_string()]);
        assert_eq!(s.path, PathBuf::from("other.csv"));
        assert_eq!(s.sheet, SHEET_NAME);
    }
}

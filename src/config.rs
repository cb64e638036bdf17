/// Header of the input column holding the domains.
pub const DOMAIN_COLUMN: &str = "Domain Name";

/// Header appended to every output sheet.
pub const BUCKET_COLUMN: &str = "bucket";

/// Rows between two progress checkpoints.
pub const PROGRESS_EVERY: usize = 50;

/// Longest worksheet name Excel accepts.
pub const SHEET_NAME_MAX: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub domain_column: String,
    pub bucket_column: String,
    pub progress_every: usize,
    pub sheet_name_max: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain_column: DOMAIN_COLUMN.to_string(),
            bucket_column: BUCKET_COLUMN.to_string(),
            progress_every: PROGRESS_EVERY,
            sheet_name_max: SHEET_NAME_MAX,
        }
    }
}

impl Settings {
    pub fn with_domain_column(mut self, column: impl Into<String>) -> Self {
        self.domain_column = column.into();
        self
    }

    pub fn with_progress_every(mut self, rows: usize) -> Self {
        self.progress_every = rows.max(1);
        self
    }
}

//! Caller-facing defaults: sheet name and vendor labels.

/// Sheet read from each workbook unless the caller names another.
pub const DEFAULT_SHEET_NAME: &str = "Series Formatted Data";

pub const DEFAULT_VENDOR1_LABEL: &str = "Vendor 1";
pub const DEFAULT_VENDOR2_LABEL: &str = "Vendor 2";

/// Labels used by the batch plotting command when none are given.
pub const BATCH_VENDOR1_LABEL: &str = "PW";
pub const BATCH_VENDOR2_LABEL: &str = "HW";

/// The pair of labels written into the Source tag of every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorLabels {
    pub vendor1: String,
    pub vendor2: String,
}

impl VendorLabels {
    pub fn new(vendor1: impl Into<String>, vendor2: impl Into<String>) -> Self {
        Self {
            vendor1: vendor1.into(),
            vendor2: vendor2.into(),
        }
    }

    /// Trims user input and falls back to the given defaults for blank labels.
    pub fn resolve(
        vendor1: Option<&str>,
        vendor2: Option<&str>,
        default1: &str,
        default2: &str,
    ) -> Self {
        Self::new(label_or(vendor1, default1), label_or(vendor2, default2))
    }
}

impl Default for VendorLabels {
    fn default() -> Self {
        Self::new(DEFAULT_VENDOR1_LABEL, DEFAULT_VENDOR2_LABEL)
    }
}

fn label_or(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => default.to_string(),
    }
}

/// Options applied when reading both vendor workbooks.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub sheet_name: String,
    pub labels: VendorLabels,
}

impl LoadOptions {
    pub fn with_sheet(mut self, sheet_name: Option<&str>) -> Self {
        if let Some(name) = sheet_name.map(str::trim).filter(|s| !s.is_empty()) {
            self.sheet_name = name.to_string();
        }
        self
    }

    pub fn with_labels(mut self, labels: VendorLabels) -> Self {
        self.labels = labels;
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            labels: VendorLabels::default(),
        }
    }
}

use serde::{Deserialize, Serialize};

// ============================================================================
// Priority
// ============================================================================

/// Ordinal deal priority.
///
/// Variants are declared in ascending order so the derived `Ord` matches
/// [`Priority::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    /// All levels in ascending order.
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Levels in the order used by the priority chart.
    pub const CHART_ORDER: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Numeric rank, 1 (Low) to 4 (Critical).
    pub fn rank(self) -> i64 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    /// Canonical label stored in the clean table.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }

    /// Fixed chart color for this level.
    pub fn color(self) -> &'static str {
        match self {
            Self::Low => "#1f77b4",
            Self::Medium => "#2ca02c",
            Self::High => "#ff7f0e",
            Self::Critical => "#d62728",
        }
    }

    /// Exact match against a canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    /// Trim, then upper-case the first character and lower-case the rest.
    pub fn normalize(raw: &str) -> String {
        let mut chars = raw.trim().chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }

    /// Normalize a raw value and map it onto the ordinal set.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::from_label(&Self::normalize(raw))
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Typed schema
// ============================================================================

/// Declared role of a column after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Median-imputed, stored as a numeric dtype.
    Numeric,
    /// Mode-imputed, stored as strings.
    Categorical,
    /// Parsed to a date; missing values stay missing.
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Column classification produced once and read by every later stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    pub fn push(&mut self, name: impl Into<String>, kind: ColumnKind) {
        self.columns.push(ColumnSpec {
            name: name.into(),
            kind,
        });
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.kind)
    }

    /// Names of all columns of the given kind, in table order.
    pub fn columns_of(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of(ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of(ColumnKind::Categorical)
    }

    /// Register a column, replacing the kind if it is already known.
    pub fn upsert(&mut self, name: &str, kind: ColumnKind) {
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(spec) => spec.kind = kind,
            None => self.push(name, kind),
        }
    }
}

// ============================================================================
// Cleaning report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    Median,
    Mode,
}

/// Missing values filled in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub strategy: ImputationStrategy,
    /// Fill value rendered as text.
    pub fill_value: String,
    pub count: usize,
}

/// IQR fences used by the outlier filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub multiplier: f64,
    pub lower: f64,
    pub upper: f64,
}

impl OutlierBounds {
    pub fn from_quartiles(q1: f64, q3: f64, multiplier: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            q1,
            q3,
            iqr,
            multiplier,
            lower: q1 - multiplier * iqr,
            upper: q3 + multiplier * iqr,
        }
    }

    /// Inclusive range check.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Audit trail of everything the cleaner dropped or altered.
///
/// # Example
///
/// ```rust,ignore
/// let (clean, report) = cleaner.clean(&raw)?;
/// println!(
///     "{} -> {} rows ({:.1}% removed)",
///     report.rows_in,
///     report.rows_out,
///     report.rows_removed_percentage()
/// );
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_in: usize,
    pub columns_in: usize,
    pub rows_out: usize,
    pub columns_out: usize,

    /// `(original, normalized)` for every column whose name changed.
    pub renamed_columns: Vec<(String, String)>,
    /// Alias renamed to `total_sales_value`, if any.
    pub value_column_renamed_from: Option<String>,
    /// Classification used by the imputation stages.
    pub schema: TableSchema,
    /// String columns converted to Float64.
    pub numeric_coercions: Vec<String>,

    pub rows_dropped_missing_required: usize,
    pub imputations: Vec<ImputationRecord>,

    /// Non-missing date values that failed every format.
    pub unparseable_dates: usize,
    /// Dates missing after parsing (includes the unparseable ones).
    pub missing_dates: usize,

    pub rows_dropped_unmapped_priority: usize,
    /// Distinct rejected priority values, normalized and sorted.
    pub unmapped_priority_values: Vec<String>,

    pub duplicates_removed: usize,

    pub outliers_removed: usize,
    pub outlier_bounds: Option<OutlierBounds>,

    pub actions: Vec<CleaningAction>,
    pub warnings: Vec<String>,
}

impl CleaningReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Total number of values filled across all columns.
    pub fn total_imputed(&self) -> usize {
        self.imputations.iter().map(|i| i.count).sum()
    }

    /// Rows removed by every row-level stage combined.
    pub fn total_rows_removed(&self) -> usize {
        self.rows_dropped_missing_required
            + self.rows_dropped_unmapped_priority
            + self.duplicates_removed
            + self.outliers_removed
    }

    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_in == 0 {
            0.0
        } else {
            (self.total_rows_removed() as f32 / self.rows_in as f32) * 100.0
        }
    }
}

/// A single action taken during cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningAction {
    pub action_type: ActionType,
    /// Column name or "dataset".
    pub target: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CleaningAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Types of actions the cleaner records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// A column was renamed.
    ColumnRenamed,
    /// A column's data type was converted.
    TypeCorrected,
    /// Rows missing a required field were removed.
    RowsRemoved,
    /// Missing values were imputed.
    ValueImputed,
    /// Date values were parsed.
    DatesParsed,
    /// Rows with an unmapped priority were removed.
    PriorityFiltered,
    /// Duplicate rows were removed.
    DuplicatesRemoved,
    /// Outlier rows were removed.
    OutlierHandled,
}

impl ActionType {
    /// Get a human-readable display name for the action type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ColumnRenamed => "Column Renamed",
            Self::TypeCorrected => "Type Corrected",
            Self::RowsRemoved => "Rows Removed",
            Self::ValueImputed => "Value Imputed",
            Self::DatesParsed => "Dates Parsed",
            Self::PriorityFiltered => "Priority Filtered",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::OutlierHandled => "Outlier Handled",
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

//! Rows read from the ASU TP schema.
//!
//! Display columns are cast to `text` in SQL, so these types hold strings and
//! do not follow the exact column types of a given deployment.

/// Schemas every ASU TP database must contain, in report order.
pub const EXPECTED_SCHEMAS: [&str; 11] = [
    "algorithms",
    "archive",
    "controllers",
    "core",
    "events",
    "kross",
    "reports",
    "security",
    "tech_params",
    "topology",
    "visualization",
];

/// Quality code written by the parameter-write check (good / manual).
pub const QUALITY_GOOD_MANUAL: i32 = 192;

/// Source marker stored with values written by this tool.
pub const WRITE_SOURCE: &str = "test";

/// Number of base tables in one schema.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SchemaTableCount {
    pub table_schema: String,
    pub table_count: i64,
}

/// Number of parameters sharing a `parameter_type`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ParameterTypeCount {
    pub parameter_type: Option<String>,
    pub count: i64,
}

/// A parameter joined with its current value and unit.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ParameterSnapshot {
    pub tag: String,
    pub name: Option<String>,
    pub value: Option<String>,
    pub quality: Option<String>,
    pub timestamp: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RoleSummary {
    pub code: String,
    pub name: String,
}

/// An active account with its role names joined by `", "`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ActiveUser {
    pub username: String,
    pub full_name: Option<String>,
    pub roles: Option<String>,
}

/// Current value as stored after an upsert.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredValue {
    pub value: Option<String>,
    pub timestamp: Option<String>,
}

/// Size and time span of `archive.historical_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct ArchiveSummary {
    pub total_records: i64,
    pub oldest: Option<String>,
    pub newest: Option<String>,
}

impl ArchiveSummary {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Row of the timed read.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ActiveParameter {
    pub tag: String,
    pub value: Option<String>,
    pub timestamp: Option<String>,
}

//! In-memory store for exercising checks and the runner without PostgreSQL.

use crate::checks::CheckContext;
use asutp_common::error::{AsutpError, AsutpResult};
use asutp_common::models::{
    ActiveParameter, ActiveUser, ArchiveSummary, EXPECTED_SCHEMAS, ParameterSnapshot,
    ParameterTypeCount, QUALITY_GOOD_MANUAL, RoleSummary, SchemaTableCount, StoredValue,
    WRITE_SOURCE,
};
use asutp_db::DiagnosticStore;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

pub const SENTINEL: &str = "REACTOR.POWER";

pub fn context(allow_writes: bool) -> CheckContext {
    CheckContext {
        sentinel_tag: SENTINEL.into(),
        allow_writes,
        read_limit: 1000,
        write_iterations: 100,
    }
}

#[derive(Debug, Clone)]
pub struct FakeParameter {
    pub id: i64,
    pub tag: String,
    pub name: String,
    pub parameter_type: String,
    pub unit: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FakeCurrentValue {
    pub value: f64,
    pub quality: i32,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct FakeStore {
    pub schemas: Vec<String>,
    pub tables: Vec<SchemaTableCount>,
    pub parameters: Vec<FakeParameter>,
    pub current_values: BTreeMap<i64, FakeCurrentValue>,
    pub roles: Vec<RoleSummary>,
    pub users: Vec<ActiveUser>,
    pub archive: ArchiveSummary,
    pub partitions: Vec<String>,
    /// Operations that return an error instead of touching the data.
    pub failing: HashSet<&'static str>,
    pub fail_close: bool,
    /// Every operation invoked, in order.
    pub calls: Vec<&'static str>,
    /// Incremented by `close`; shared so tests can observe it after the move.
    pub closes: Rc<Cell<u32>>,
}

impl FakeStore {
    /// No ASU TP schemas, but every table query still answers (with no rows).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A freshly created database: the catalog answers, every ASU TP table
    /// query fails the way PostgreSQL does for an undefined relation.
    pub fn bare() -> Self {
        let mut store = Self::default();
        for op in [
            "parameter_type_counts",
            "current_value_count",
            "parameter_snapshot",
            "roles",
            "active_users",
            "parameter_id",
            "upsert_current_value",
            "archive_summary",
            "archive_partitions",
            "read_active_parameters",
            "write_burst",
        ] {
            store.fail_on(op);
        }
        store
    }

    /// All schemas, two parameters with the sentinel, one active operator.
    pub fn seeded() -> Self {
        let reading_time = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut current_values = BTreeMap::new();
        current_values.insert(
            1,
            FakeCurrentValue {
                value: 2750.0,
                quality: QUALITY_GOOD_MANUAL,
                timestamp: reading_time,
                source: "opc".into(),
                updated_at: None,
            },
        );

        Self {
            schemas: EXPECTED_SCHEMAS.iter().map(|s| s.to_string()).collect(),
            tables: EXPECTED_SCHEMAS
                .iter()
                .enumerate()
                .map(|(i, s)| SchemaTableCount {
                    table_schema: s.to_string(),
                    table_count: i as i64 + 1,
                })
                .collect(),
            parameters: vec![
                FakeParameter {
                    id: 1,
                    tag: SENTINEL.into(),
                    name: "Reactor thermal power".into(),
                    parameter_type: "analog".into(),
                    unit: Some("MW".into()),
                    is_active: true,
                },
                FakeParameter {
                    id: 2,
                    tag: "PUMP.1.STATE".into(),
                    name: "Main circulation pump 1".into(),
                    parameter_type: "discrete".into(),
                    unit: None,
                    is_active: true,
                },
            ],
            current_values,
            roles: vec![RoleSummary {
                code: "operator".into(),
                name: "Operator".into(),
            }],
            users: vec![ActiveUser {
                username: "ivanov".into(),
                full_name: Some("I. Ivanov".into()),
                roles: Some("Operator".into()),
            }],
            archive: ArchiveSummary::default(),
            partitions: vec![
                "historical_data_2024_01".into(),
                "historical_data_2024_02".into(),
            ],
            ..Default::default()
        }
    }

    pub fn fail_on(&mut self, op: &'static str) {
        self.failing.insert(op);
    }

    pub fn sentinel_id(&self) -> i64 {
        self.find(SENTINEL).map(|p| p.id).unwrap()
    }

    fn find(&self, tag: &str) -> Option<&FakeParameter> {
        self.parameters.iter().find(|p| p.tag == tag)
    }

    fn guard(&mut self, op: &'static str) -> AsutpResult<()> {
        self.calls.push(op);
        if self.failing.contains(op) {
            return Err(AsutpError::store(format!("injected failure in {op}")));
        }
        Ok(())
    }
}

impl DiagnosticStore for FakeStore {
    async fn schema_names(&mut self, candidates: &[&str]) -> AsutpResult<Vec<String>> {
        self.guard("schema_names")?;
        let mut found: Vec<String> = self
            .schemas
            .iter()
            .filter(|s| candidates.contains(&s.as_str()))
            .cloned()
            .collect();
        found.sort();
        Ok(found)
    }

    async fn table_counts(&mut self, schemas: &[&str]) -> AsutpResult<Vec<SchemaTableCount>> {
        self.guard("table_counts")?;
        Ok(self
            .tables
            .iter()
            .filter(|t| schemas.contains(&t.table_schema.as_str()))
            .cloned()
            .collect())
    }

    async fn parameter_type_counts(&mut self) -> AsutpResult<Vec<ParameterTypeCount>> {
        self.guard("parameter_type_counts")?;
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for p in &self.parameters {
            *counts.entry(p.parameter_type.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(t, count)| ParameterTypeCount {
                parameter_type: Some(t.to_string()),
                count,
            })
            .collect())
    }

    async fn current_value_count(&mut self) -> AsutpResult<i64> {
        self.guard("current_value_count")?;
        Ok(self.current_values.len() as i64)
    }

    async fn parameter_snapshot(&mut self, tag: &str) -> AsutpResult<Option<ParameterSnapshot>> {
        self.guard("parameter_snapshot")?;
        Ok(self.find(tag).map(|p| {
            let current = self.current_values.get(&p.id);
            ParameterSnapshot {
                tag: p.tag.clone(),
                name: Some(p.name.clone()),
                value: current.map(|c| c.value.to_string()),
                quality: current.map(|c| c.quality.to_string()),
                timestamp: current.map(|c| c.timestamp.to_rfc3339()),
                unit: p.unit.clone(),
            }
        }))
    }

    async fn roles(&mut self) -> AsutpResult<Vec<RoleSummary>> {
        self.guard("roles")?;
        Ok(self.roles.clone())
    }

    async fn active_users(&mut self) -> AsutpResult<Vec<ActiveUser>> {
        self.guard("active_users")?;
        Ok(self.users.clone())
    }

    async fn parameter_id(&mut self, tag: &str) -> AsutpResult<Option<i64>> {
        self.guard("parameter_id")?;
        Ok(self.find(tag).map(|p| p.id))
    }

    async fn upsert_current_value(
        &mut self,
        parameter_id: i64,
        value: f64,
        at: DateTime<Utc>,
    ) -> AsutpResult<StoredValue> {
        self.guard("upsert_current_value")?;
        let row = self
            .current_values
            .entry(parameter_id)
            .and_modify(|row| {
                row.value = value;
                row.timestamp = at;
                row.source = WRITE_SOURCE.into();
                row.updated_at = Some(Utc::now());
            })
            .or_insert_with(|| FakeCurrentValue {
                value,
                quality: QUALITY_GOOD_MANUAL,
                timestamp: at,
                source: WRITE_SOURCE.into(),
                updated_at: None,
            });
        Ok(StoredValue {
            value: Some(row.value.to_string()),
            timestamp: Some(row.timestamp.to_rfc3339()),
        })
    }

    async fn archive_summary(&mut self) -> AsutpResult<ArchiveSummary> {
        self.guard("archive_summary")?;
        Ok(self.archive.clone())
    }

    async fn archive_partitions(&mut self) -> AsutpResult<Vec<String>> {
        self.guard("archive_partitions")?;
        Ok(self.partitions.clone())
    }

    async fn read_active_parameters(&mut self, limit: u32) -> AsutpResult<Vec<ActiveParameter>> {
        self.guard("read_active_parameters")?;
        Ok(self
            .parameters
            .iter()
            .filter(|p| p.is_active)
            .take(limit as usize)
            .map(|p| {
                let current = self.current_values.get(&p.id);
                ActiveParameter {
                    tag: p.tag.clone(),
                    value: current.map(|c| c.value.to_string()),
                    timestamp: current.map(|c| c.timestamp.to_rfc3339()),
                }
            })
            .collect())
    }

    async fn write_burst(&mut self, tag: &str, values: &[f64]) -> AsutpResult<u64> {
        self.guard("write_burst")?;
        let Some(id) = self.find(tag).map(|p| p.id) else {
            return Ok(0);
        };
        let Some(row) = self.current_values.get_mut(&id) else {
            return Ok(0);
        };
        for value in values {
            row.value = *value;
            row.timestamp = Utc::now();
        }
        Ok(values.len() as u64)
    }

    async fn close(self) -> AsutpResult<()> {
        self.closes.set(self.closes.get() + 1);
        if self.fail_close {
            return Err(AsutpError::store("injected failure in close"));
        }
        Ok(())
    }
}

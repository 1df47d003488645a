//! Ordered registry of the checks run on every invocation.

use crate::checks::{self, CheckContext};
use crate::report::{CheckOutcome, Reporter};
use asutp_common::error::AsutpResult;
use asutp_db::DiagnosticStore;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Schemas,
    TableCounts,
    Parameters,
    UsersAndRoles,
    WriteParameter,
    ArchiveData,
    Performance,
}

/// One entry of the registry.
#[derive(Debug, Clone, Copy)]
pub struct Check {
    pub kind: CheckKind,
    /// Name in the result summary.
    pub name: &'static str,
    /// Section header while running.
    pub title: &'static str,
    /// Whether the check modifies data when writes are allowed.
    pub writes: bool,
}

/// Execution order is the array order.
pub const REGISTRY: [Check; 7] = [
    Check {
        kind: CheckKind::Schemas,
        name: "Schemas",
        title: "Schema presence",
        writes: false,
    },
    Check {
        kind: CheckKind::TableCounts,
        name: "Tables",
        title: "Tables per schema",
        writes: false,
    },
    Check {
        kind: CheckKind::Parameters,
        name: "Parameters",
        title: "Technical parameters",
        writes: false,
    },
    Check {
        kind: CheckKind::UsersAndRoles,
        name: "Users",
        title: "Users and roles",
        writes: false,
    },
    Check {
        kind: CheckKind::WriteParameter,
        name: "Parameter write",
        title: "Parameter write",
        writes: true,
    },
    Check {
        kind: CheckKind::ArchiveData,
        name: "Archive",
        title: "Archive data",
        writes: false,
    },
    Check {
        kind: CheckKind::Performance,
        name: "Performance",
        title: "Performance",
        writes: true,
    },
];

impl Check {
    pub async fn run<S: DiagnosticStore, W: Write>(
        &self,
        store: &mut S,
        ctx: &CheckContext,
        out: &mut Reporter<W>,
    ) -> AsutpResult<CheckOutcome> {
        match self.kind {
            CheckKind::Schemas => checks::schemas(store, ctx, out).await,
            CheckKind::TableCounts => checks::table_counts(store, ctx, out).await,
            CheckKind::Parameters => checks::parameters(store, ctx, out).await,
            CheckKind::UsersAndRoles => checks::users_and_roles(store, ctx, out).await,
            CheckKind::WriteParameter => checks::write_parameter(store, ctx, out).await,
            CheckKind::ArchiveData => checks::archive_data(store, ctx, out).await,
            CheckKind::Performance => checks::performance(store, ctx, out).await,
        }
    }
}

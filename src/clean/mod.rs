//! Cleaning pipeline.
//!
//! Each entity kind goes through four stages in a fixed order:
//!
//! 1. redundancy filter (placeholder and garbage rows)
//! 2. spelling correction against the kind's reference list
//! 3. title-case normalization
//! 4. duplicate collapse (references re-pointed before deletion)
//!
//! Kinds are visited parents-first (types, abilities, pokemon, trainers).
//! Every stage runs in its own transaction, and the first failing stage
//! aborts the run with its changes rolled back.

pub mod case;
pub mod collapse;
pub mod redundancy;
pub mod spelling;

pub use case::*;
pub use collapse::*;
pub use redundancy::*;
pub use spelling::*;

use rusqlite::Connection;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use crate::download::ReferenceNames;
use crate::error::{Error, Result};
use crate::schema::{DependencyResolver, EntityKind};
use crate::ui::{Phase, Ui};

/// Marker found in retracted seed rows ("Remove this ability")
pub const DEFAULT_GARBAGE_MARKER: &str = "Remove this";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Filter,
    Correct,
    Normalize,
    Collapse,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Filter, Stage::Correct, Stage::Normalize, Stage::Collapse];

    pub fn phase(self) -> Phase {
        match self {
            Stage::Filter => Phase::Filtering,
            Stage::Correct => Phase::Correcting,
            Stage::Normalize => Phase::Normalizing,
            Stage::Collapse => Phase::Collapsing,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Filter => write!(f, "redundancy filter"),
            Stage::Correct => write!(f, "spelling correction"),
            Stage::Normalize => write!(f, "case normalization"),
            Stage::Collapse => write!(f, "duplicate collapse"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanConfig {
    /// Case-sensitive substrings that disqualify a name
    pub garbage_markers: Vec<String>,
    pub similarity_threshold: f64,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            garbage_markers: vec![DEFAULT_GARBAGE_MARKER.to_string()],
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl CleanConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(Error::Validation(format!(
                "similarity threshold must be in (0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Per-kind change counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KindReport {
    pub removed: usize,
    pub detached: usize,
    pub corrected: usize,
    pub normalized: usize,
    pub collapsed: usize,
    pub remapped: usize,
}

impl KindReport {
    pub fn changes(&self) -> usize {
        self.removed + self.detached + self.corrected + self.normalized + self.collapsed + self.remapped
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub kinds: BTreeMap<EntityKind, KindReport>,
}

impl CleanReport {
    pub fn kind(&self, kind: EntityKind) -> KindReport {
        self.kinds.get(&kind).copied().unwrap_or_default()
    }

    /// Total rows touched; zero on already-clean data
    pub fn changes(&self) -> usize {
        self.kinds.values().map(KindReport::changes).sum()
    }
}

/// The stage that aborted a cleaning run
#[derive(Debug, thiserror::Error)]
#[error("cleaning {kind} aborted during {stage}: {source}")]
pub struct CleanError {
    pub kind: EntityKind,
    pub stage: Stage,
    #[source]
    pub source: Error,
}

/// Run the full pipeline over `kinds` (visited in dependency order).
///
/// `Ok` means every stage of every kind committed. On `Err`, the failing
/// stage's transaction has been rolled back and no later stage was started.
pub fn clean_database(
    conn: &mut Connection,
    kinds: &[EntityKind],
    references: &ReferenceNames,
    config: &CleanConfig,
    ui: &mut impl Ui,
) -> std::result::Result<CleanReport, CleanError> {
    let order = ordered(kinds).map_err(|source| CleanError {
        kind: kinds.first().copied().unwrap_or(EntityKind::Type),
        stage: Stage::Filter,
        source,
    })?;
    if let Err(source) = config.validate() {
        return Err(CleanError {
            kind: order.first().copied().unwrap_or(EntityKind::Type),
            stage: Stage::Filter,
            source,
        });
    }

    let start = Instant::now();
    let total_steps = (order.len() * Stage::ALL.len()) as u64;
    let mut step = 0;
    let mut report = CleanReport::default();

    for kind in order {
        let entry = report.kinds.entry(kind).or_default();

        for stage in Stage::ALL {
            ui.set_phase(stage.phase());
            ui.set_progress(step, total_steps, format!("{}: {}", kind, stage));

            run_stage(conn, kind, stage, references, config, entry).map_err(|source| {
                tracing::error!(kind = %kind, stage = %stage, error = %source, "cleaning aborted");
                ui.log(format!("{}: {} failed: {}", kind, stage, source));
                CleanError {
                    kind,
                    stage,
                    source,
                }
            })?;

            step += 1;
        }

        ui.log(format!(
            "{}: removed {}, corrected {}, normalized {}, collapsed {}",
            kind, entry.removed, entry.corrected, entry.normalized, entry.collapsed
        ));
        ui.kind_finished(kind, entry);
    }

    ui.set_progress(total_steps, total_steps, "done");
    ui.set_phase(Phase::Complete);
    tracing::info!(
        changes = report.changes(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "cleaning completed"
    );

    Ok(report)
}

/// Execute one stage for one kind inside its own transaction
pub fn run_stage(
    conn: &mut Connection,
    kind: EntityKind,
    stage: Stage,
    references: &ReferenceNames,
    config: &CleanConfig,
    report: &mut KindReport,
) -> Result<()> {
    let tx = conn.transaction()?;

    let rows = match stage {
        Stage::Filter => {
            let outcome = remove_redundant(&tx, kind, &config.garbage_markers)?;
            report.removed += outcome.removed;
            report.detached += outcome.detached;
            outcome.removed
        }
        Stage::Correct => match references.for_kind(kind) {
            Some(list) => {
                let corrected = correct_spelling(&tx, kind, list, config.similarity_threshold)?;
                report.corrected += corrected;
                corrected
            }
            None => 0,
        },
        Stage::Normalize => {
            let normalized = normalize_case(&tx, kind)?;
            report.normalized += normalized;
            normalized
        }
        Stage::Collapse => {
            let outcome = collapse_duplicates(&tx, kind)?;
            report.collapsed += outcome.deleted;
            report.remapped += outcome.remapped;
            outcome.deleted
        }
    };

    tx.commit()?;
    tracing::info!(kind = %kind, stage = %stage, rows, "stage committed");
    Ok(())
}

/// Deduplicate `kinds` and sort them into cleaning order
fn ordered(kinds: &[EntityKind]) -> Result<Vec<EntityKind>> {
    let tables: Vec<&str> = kinds.iter().map(|k| k.table()).collect();
    Ok(DependencyResolver::new()
        .resolve(&tables)?
        .iter()
        .filter_map(|t| EntityKind::from_table(t.name))
        .collect())
}

#[cfg(test)]
pub(crate) mod test_support {
    use rusqlite::Connection;

    use crate::schema::ALL_TABLES;
    use crate::writer::generate_create_table;

    /// In-memory database with the full schema and foreign keys enforced
    pub fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        for table in ALL_TABLES {
            conn.execute(&generate_create_table(table), []).unwrap();
        }
        conn
    }

    /// Names of `table` in id order
    pub fn names(conn: &Connection, table: &str) -> Vec<String> {
        conn.prepare(&format!("SELECT name FROM {} ORDER BY id", table))
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap()
    }
}

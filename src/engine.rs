//! File-level driver for the rewrite stages.
//!
//! Each stage run is one full read of a file, an in-memory pipeline of
//! rewrite passes, and one full write-back at the end, never incremental
//! writes, so a crash leaves the file whole. The batch runner keeps going
//! past per-file failures and reports each file individually.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ResidualPolicy;
use crate::error::{PortError, PortResult};
use crate::rewrite::{constraints, enums, returning, schema};

/// The rewrite stages, in their documented run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Schema dialect mapper (pg-core → mysql-core vocabulary).
    Schema,
    /// Enum use-site normalizer.
    Enums,
    /// Returning-clause rewriter.
    Returning,
    /// Constraint-name shortener for generated DDL.
    Constraints,
}

impl Stage {
    /// Stage name used in console output.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Schema => "schema",
            Stage::Enums => "enums",
            Stage::Returning => "returning",
            Stage::Constraints => "constraints",
        }
    }

    /// What one rewrite of this stage is called, for count reporting.
    pub fn unit(&self) -> &'static str {
        match self {
            Stage::Schema => "mapping(s)",
            Stage::Enums => "enum reference(s)",
            Stage::Returning => ".returning() call(s)",
            Stage::Constraints => "constraint name(s)",
        }
    }
}

/// Counters from one file run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Rewrites performed.
    pub changes: usize,
    /// Residual `.returning(` occurrences (returning stage only).
    pub residual: usize,
}

/// Per-file outcome of a batch run.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: PortResult<RunStats>,
}

/// Options shared by every stage run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Report counts without writing anything back.
    pub dry_run: bool,
    /// What to do when `.returning(` occurrences survive a full pass.
    pub residual_policy: ResidualPolicy,
}

/// Run one stage over one file: read once, rewrite, write back once.
///
/// The write is skipped when the rewritten text is byte-identical to the
/// source, so re-running a stage over converted files is a filesystem
/// no-op.
pub fn run_file(stage: Stage, path: &Path, options: RunOptions) -> PortResult<RunStats> {
    let source = fs::read_to_string(path).map_err(|e| PortError::io(path, e))?;

    let (text, stats) = match stage {
        Stage::Schema => {
            let out = schema::rewrite_schema(&source);
            (out.text, RunStats { changes: out.changes, residual: 0 })
        }
        Stage::Enums => {
            let out = enums::rewrite_enum_refs(&source);
            (out.text, RunStats { changes: out.changes, residual: 0 })
        }
        Stage::Returning => {
            let out = returning::rewrite_returning(&source);
            (
                out.text,
                RunStats { changes: out.changes, residual: out.residual },
            )
        }
        Stage::Constraints => {
            let out = constraints::rewrite_constraints(&source);
            (out.text, RunStats { changes: out.changes, residual: 0 })
        }
    };

    if !options.dry_run && text != source {
        fs::write(path, &text).map_err(|e| PortError::io(path, e))?;
    }

    // The rewritten text is kept either way: there is no rollback, and
    // re-running after fixing the leftovers is the recovery path.
    if stats.residual > 0 && options.residual_policy == ResidualPolicy::Fail {
        return Err(PortError::residual(path, stats.residual));
    }

    Ok(stats)
}

/// Run one stage over a batch of files, continuing past per-file errors.
pub fn run_batch(stage: Stage, paths: &[PathBuf], options: RunOptions) -> Vec<FileReport> {
    paths
        .iter()
        .map(|path| FileReport {
            path: path.clone(),
            outcome: run_file(stage, path, options),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_run_file_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "schema.ts",
            "export const users = pgTable(\"users\", {});\n",
        );
        let stats = run_file(Stage::Schema, &path, RunOptions::default()).unwrap();
        assert_eq!(stats.changes, 1);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("mysqlTable"));
    }

    #[test]
    fn test_dry_run_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let source = "export const users = pgTable(\"users\", {});\n";
        let path = write(dir.path(), "schema.ts", source);
        let options = RunOptions { dry_run: true, ..Default::default() };
        let stats = run_file(Stage::Schema, &path, options).unwrap();
        assert_eq!(stats.changes, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), source);
    }

    #[test]
    fn test_residual_fails_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "db.ts",
            "  const rows = await db.insert(users).values(data).onDuplicateKeyUpdate(x).returning();\n",
        );
        let err = run_file(Stage::Returning, &path, RunOptions::default()).unwrap_err();
        assert!(matches!(err, PortError::Residual { count: 1, .. }));
    }

    #[test]
    fn test_residual_warn_policy_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "db.ts",
            "  const rows = await db.insert(users).values(data).onDuplicateKeyUpdate(x).returning();\n",
        );
        let options = RunOptions {
            residual_policy: ResidualPolicy::Warn,
            ..Default::default()
        };
        let stats = run_file(Stage::Returning, &path, options).unwrap();
        assert_eq!(stats.residual, 1);
    }

    #[test]
    fn test_batch_continues_past_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = write(
            dir.path(),
            "schema.ts",
            "export const roleEnum = pgEnum(\"role\", [\"a\"]);\n",
        );
        let missing = dir.path().join("nope.ts");
        let reports = run_batch(
            Stage::Schema,
            &[missing.clone(), good.clone()],
            RunOptions::default(),
        );
        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0].outcome, Err(PortError::Io { .. })));
        assert_eq!(reports[1].outcome.as_ref().unwrap().changes, 1);
        assert!(fs::read_to_string(&good).unwrap().contains("mysqlEnum"));
    }
}

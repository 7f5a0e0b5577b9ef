//! # driftcheck — schema drift reconciliation
//!
//! Compares a full dump of a live Postgres schema against the state a
//! directory of migration files claims to produce, and reports every
//! structural discrepancy: tables, columns, enum types, views, materialized
//! views, function signatures, row-level-security policies, triggers and
//! indexes.
//!
//! The extraction layer is pattern matching over known DDL statement shapes,
//! not a SQL parser; unrecognized statements are skipped. Migration files
//! replay in filename order, and function/policy create/drop events replay
//! in statement order, so an object created early and dropped later counts
//! as absent.
//!
//! ## Quick example
//!
//! ```
//! use driftcheck::reconcile_sources;
//!
//! let remote = "CREATE TABLE public.users (\n    id uuid NOT NULL,\n    email text\n);\n";
//! let migrations = ["CREATE TABLE users (\n    id uuid NOT NULL\n);\n"];
//!
//! let report = reconcile_sources(remote, &migrations);
//! assert!(report.has_differences());
//! assert_eq!(report.columns["users"].remote_only, vec!["email"]);
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod input;
pub mod model;
pub mod normalize;
pub mod reconcile;
pub mod replay;
pub mod report;

use extract::SchemaExtractor;
use reconcile::Report;

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{DriftError, DriftResult};
    pub use crate::extract::SchemaExtractor;
    pub use crate::model::*;
    pub use crate::reconcile::{Report, reconcile};
    pub use crate::replay::replay_migrations;
}

/// Reconcile a `public`-schema dump against ordered migration texts.
///
/// The dump side is extracted with the `public.` qualification prefix;
/// migration texts are taken as unqualified and must already be in applied
/// order.
pub fn reconcile_sources<S: AsRef<str>>(remote_sql: &str, migrations: &[S]) -> Report {
    reconcile_sources_with_prefix(remote_sql, migrations, "public.")
}

/// Same as [`reconcile_sources`], with an explicit dump qualification prefix.
pub fn reconcile_sources_with_prefix<S: AsRef<str>>(
    remote_sql: &str,
    migrations: &[S],
    schema_prefix: &str,
) -> Report {
    let live = SchemaExtractor::new(schema_prefix).extract(remote_sql);
    let expected = replay::replay_migrations(migrations);
    reconcile::reconcile(&live, &expected)
}

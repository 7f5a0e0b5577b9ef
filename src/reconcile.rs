//! Set-level comparison of the live model against the migration model.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FunctionSignature, IndexKey, PolicyKey, SchemaModel, TriggerKey};

/// Two-way difference for one object kind, both halves sorted.
#[derive(Debug, Clone, Serialize)]
pub struct KindDiff<K> {
    /// Present in the live dump, missing from the migration replay.
    pub remote_only: Vec<K>,
    /// Produced by the migration replay, missing from the live dump.
    pub migrations_only: Vec<K>,
}

impl<K> KindDiff<K> {
    pub fn is_clean(&self) -> bool {
        self.remote_only.is_empty() && self.migrations_only.is_empty()
    }
}

impl<K> Default for KindDiff<K> {
    fn default() -> Self {
        Self {
            remote_only: Vec::new(),
            migrations_only: Vec::new(),
        }
    }
}

/// Asymmetric column difference for one table.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnDiff {
    pub remote_only: Vec<String>,
    pub migrations_only: Vec<String>,
}

/// The structured reconciliation result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub types: KindDiff<String>,
    pub tables: KindDiff<String>,
    /// Only tables whose column sets differ appear here.
    pub columns: BTreeMap<String, ColumnDiff>,
    pub matviews: KindDiff<String>,
    pub views: KindDiff<String>,
    pub functions: KindDiff<FunctionSignature>,
    pub policies: KindDiff<PolicyKey>,
    /// Triggers on unqualified tables, diffed both ways.
    pub triggers: KindDiff<TriggerKey>,
    /// Triggers the migrations place on schema-qualified tables. A dump of
    /// a single schema cannot contain them, so they are listed for
    /// information and never counted as drift.
    pub qualified_triggers: Vec<TriggerKey>,
    pub indexes: KindDiff<IndexKey>,
}

impl Report {
    /// True when any true discrepancy exists. Every two-way diff and every
    /// column mismatch counts; qualified triggers do not.
    pub fn has_differences(&self) -> bool {
        !self.types.is_clean()
            || !self.tables.is_clean()
            || !self.columns.is_empty()
            || !self.matviews.is_clean()
            || !self.views.is_clean()
            || !self.functions.is_clean()
            || !self.policies.is_clean()
            || !self.triggers.is_clean()
            || !self.indexes.is_clean()
    }
}

fn diff_sets<K: Ord + Clone>(remote: &BTreeSet<K>, migrations: &BTreeSet<K>) -> KindDiff<K> {
    KindDiff {
        remote_only: remote.difference(migrations).cloned().collect(),
        migrations_only: migrations.difference(remote).cloned().collect(),
    }
}

/// Compare the live model against the replayed migration model.
pub fn reconcile(remote: &SchemaModel, migrations: &SchemaModel) -> Report {
    let remote_tables: BTreeSet<String> = remote.tables.keys().cloned().collect();
    let migration_tables: BTreeSet<String> = migrations.tables.keys().cloned().collect();

    let empty = BTreeSet::new();
    let mut columns = BTreeMap::new();
    for table in remote_tables.union(&migration_tables) {
        let remote_columns = remote.tables.get(table).unwrap_or(&empty);
        let migration_columns = migrations.tables.get(table).unwrap_or(&empty);
        if remote_columns != migration_columns {
            columns.insert(
                table.clone(),
                ColumnDiff {
                    remote_only: remote_columns.difference(migration_columns).cloned().collect(),
                    migrations_only: migration_columns
                        .difference(remote_columns)
                        .cloned()
                        .collect(),
                },
            );
        }
    }

    Report {
        types: diff_sets(&remote.enums, &migrations.enums),
        tables: diff_sets(&remote_tables, &migration_tables),
        columns,
        matviews: diff_sets(&remote.matviews, &migrations.matviews),
        views: diff_sets(&remote.views, &migrations.views),
        functions: diff_sets(&remote.functions, &migrations.functions),
        policies: diff_sets(&remote.policies, &migrations.policies),
        triggers: diff_sets(&remote.triggers, &migrations.triggers),
        qualified_triggers: migrations.qualified_triggers.iter().cloned().collect(),
        indexes: diff_sets(&remote.indexes, &migrations.indexes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(model: &mut SchemaModel, name: &str, columns: &[&str]) {
        model
            .tables
            .insert(name.into(), columns.iter().map(|c| c.to_string()).collect());
    }

    #[test]
    fn test_column_diff_is_symmetric_and_sparse() {
        let mut remote = SchemaModel::default();
        table(&mut remote, "t", &["a", "b"]);
        table(&mut remote, "same", &["x"]);

        let mut migrations = SchemaModel::default();
        table(&mut migrations, "t", &["a", "c"]);
        table(&mut migrations, "same", &["x"]);

        let report = reconcile(&remote, &migrations);
        assert_eq!(report.columns.len(), 1);
        let diff = &report.columns["t"];
        assert_eq!(diff.remote_only, vec!["b"]);
        assert_eq!(diff.migrations_only, vec!["c"]);
        assert!(report.has_differences());
    }

    #[test]
    fn test_identical_models_are_clean() {
        let mut remote = SchemaModel::default();
        table(&mut remote, "users", &["id", "email"]);
        remote.enums.insert("order_status".into());

        let report = reconcile(&remote, &remote.clone());
        assert!(!report.has_differences());
        assert!(report.columns.is_empty());
    }

    #[test]
    fn test_each_kind_flips_the_aggregate_flag() {
        let mut remote = SchemaModel::default();
        remote.views.insert("active_users".into());
        let report = reconcile(&remote, &SchemaModel::default());
        assert_eq!(report.views.remote_only, vec!["active_users"]);
        assert!(report.has_differences());

        let mut migrations = SchemaModel::default();
        migrations.indexes.insert(IndexKey::new("idx", "t"));
        let report = reconcile(&SchemaModel::default(), &migrations);
        assert_eq!(report.indexes.migrations_only, vec![IndexKey::new("idx", "t")]);
        assert!(report.has_differences());
    }

    #[test]
    fn test_qualified_triggers_never_count_as_drift() {
        let mut migrations = SchemaModel::default();
        migrations
            .qualified_triggers
            .insert(TriggerKey::new("on_signup", "auth.users"));

        let report = reconcile(&SchemaModel::default(), &migrations);
        assert!(report.triggers.is_clean());
        assert_eq!(
            report.qualified_triggers,
            vec![TriggerKey::new("on_signup", "auth.users")]
        );
        assert!(!report.has_differences());
    }

    #[test]
    fn test_missing_public_trigger_is_drift() {
        let mut remote = SchemaModel::default();
        remote.triggers.insert(TriggerKey::new("touch", "users"));

        let report = reconcile(&remote, &SchemaModel::default());
        assert_eq!(report.triggers.remote_only, vec![TriggerKey::new("touch", "users")]);
        assert!(report.has_differences());
    }
}

//! Chronological replay of migration files into one expected-state model.
//!
//! Files must arrive in applied order (filename order, see
//! [`crate::input::read_migrations`]). Most object kinds only ever
//! accumulate: nothing models `DROP TABLE` because tables are not dropped in
//! this workflow. Functions and policies are different, a later migration
//! routinely drops and recreates them, so those two kinds replay their
//! create/drop events in source order against the cumulative set.

use crate::extract::{EventKind, SchemaExtractor};
use crate::model::{SchemaModel, TriggerKey};

/// Fold an ordered collection of migration texts into one cumulative model.
pub fn replay_migrations<S: AsRef<str>>(files: &[S]) -> SchemaModel {
    let extractor = SchemaExtractor::migrations();
    let mut model = SchemaModel::default();

    for file in files {
        let sql = file.as_ref();

        for (table, columns) in extractor.tables(sql) {
            model.tables.entry(table).or_default().extend(columns);
        }
        for (table, column) in extractor.added_columns(sql) {
            model.tables.entry(table).or_default().insert(column);
        }

        model.enums.extend(extractor.enum_types(sql));
        model.views.extend(extractor.views(sql));
        model.matviews.extend(extractor.matviews(sql));

        // Event order matters: a drop then a recreate leaves the object
        // present, a create then a drop leaves it absent. Dropping a
        // signature that was never created is a no-op.
        for event in extractor.function_events(sql) {
            match event.kind {
                EventKind::Create => {
                    model.functions.insert(event.key);
                }
                EventKind::Drop => {
                    model.functions.remove(&event.key);
                }
            }
        }
        for event in extractor.policy_events(sql) {
            match event.kind {
                EventKind::Create => {
                    model.policies.insert(event.key);
                }
                EventKind::Drop => {
                    model.policies.remove(&event.key);
                }
            }
        }

        for trigger in extractor.triggers(sql) {
            let key = TriggerKey::new(&trigger.name, &trigger.table);
            if trigger.qualified {
                model.qualified_triggers.insert(key);
            } else {
                model.triggers.insert(key);
            }
        }
        model.indexes.extend(extractor.indexes(sql));
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionSignature, PolicyKey};

    fn sig(name: &str, args: &[&str]) -> FunctionSignature {
        FunctionSignature::new(name, args.iter().map(|a| a.to_string()).collect())
    }

    #[test]
    fn test_drop_then_recreate_leaves_function_present() {
        let file = "\
CREATE FUNCTION f(integer) RETURNS void;
DROP FUNCTION IF EXISTS f(integer);
CREATE FUNCTION f(integer) RETURNS void;
";
        let model = replay_migrations(&[file]);
        assert!(model.functions.contains(&sig("f", &["integer"])));
    }

    #[test]
    fn test_create_then_drop_leaves_function_absent() {
        let file = "\
CREATE FUNCTION f(integer) RETURNS void;
CREATE FUNCTION f(integer) RETURNS void;
DROP FUNCTION IF EXISTS f(integer);
";
        let model = replay_migrations(&[file]);
        assert!(model.functions.is_empty());
    }

    #[test]
    fn test_drop_of_absent_signature_is_noop() {
        let model = replay_migrations(&["DROP FUNCTION IF EXISTS g(text);"]);
        assert!(model.functions.is_empty());
    }

    #[test]
    fn test_drop_only_removes_exact_overload() {
        let file = "\
CREATE FUNCTION f(integer) RETURNS void;
CREATE FUNCTION f(text) RETURNS void;
DROP FUNCTION IF EXISTS f(integer);
";
        let model = replay_migrations(&[file]);
        assert!(!model.functions.contains(&sig("f", &["integer"])));
        assert!(model.functions.contains(&sig("f", &["text"])));
    }

    #[test]
    fn test_lifecycle_carries_across_files() {
        let first = "CREATE FUNCTION f(integer) RETURNS void;";
        let second = "DROP FUNCTION IF EXISTS f(integer);";
        let model = replay_migrations(&[first, second]);
        assert!(model.functions.is_empty());
    }

    #[test]
    fn test_policy_lifecycle() {
        let first = "CREATE POLICY p ON users;";
        let second = "\
DROP POLICY IF EXISTS p ON users;
CREATE POLICY \"p\" ON users;
";
        let model = replay_migrations(&[first, second]);
        assert!(model.policies.contains(&PolicyKey::new("p", "users")));

        let retracted = replay_migrations(&[first, "DROP POLICY IF EXISTS p ON users;"]);
        assert!(retracted.policies.is_empty());
    }

    #[test]
    fn test_columns_accumulate_across_files() {
        let first = "CREATE TABLE users (\n    id uuid\n);";
        let second = "ALTER TABLE users ADD COLUMN email text;";
        let model = replay_migrations(&[first, second]);
        let columns: Vec<&String> = model.tables["users"].iter().collect();
        assert_eq!(columns, ["email", "id"]);
    }

    #[test]
    fn test_table_facts_never_retract() {
        let file = "\
CREATE TABLE audit (\n    id bigint\n);
DROP TABLE audit;
";
        let model = replay_migrations(&[file]);
        assert!(model.tables.contains_key("audit"));
    }
}

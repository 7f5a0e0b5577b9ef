//! Statement-shape extraction from SQL text.
//!
//! This is deliberately not a SQL parser. Both inputs are tool-generated and
//! mostly well-formed, so each object kind is pulled out by one anchored
//! pattern per statement shape, compiled once per extractor. Anything that
//! does not match a known shape is silently skipped; favoring "never crash
//! on unexpected SQL" over completeness is the accepted tradeoff.
//!
//! The one knob is the schema-qualification prefix. A dump of the `public`
//! schema spells every object `public.users`; migration files spell the same
//! object `users`. The prefix is interpolated into each pattern so one
//! extractor handles either style:
//!
//! ```
//! use driftcheck::extract::SchemaExtractor;
//!
//! let dump = SchemaExtractor::new("public.");
//! let tables = dump.tables("CREATE TABLE public.users (\n    id uuid\n);\n");
//! assert!(tables.contains_key("users"));
//! ```

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use crate::model::{FunctionSignature, IndexKey, PolicyKey, SchemaModel, TriggerKey};
use crate::normalize::{escape_parens, normalize_type};

static CONSTRAINT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(CONSTRAINT|UNIQUE|PRIMARY|FOREIGN|CHECK)\b").unwrap());

/// Whether a lifecycle event creates or retracts an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Create,
    Drop,
}

/// A create or drop occurrence, tagged with its byte offset in the source
/// text so the replayer can fold events in statement order.
#[derive(Debug, Clone)]
pub struct SchemaEvent<K> {
    pub offset: usize,
    pub kind: EventKind,
    pub key: K,
}

/// A trigger occurrence, keeping whether the table reference was
/// schema-qualified as written.
#[derive(Debug, Clone)]
pub struct TriggerRef {
    pub name: String,
    /// The table reference as spelled in the statement.
    pub table: String,
    pub qualified: bool,
}

/// Pattern-matching extractor for the handful of DDL shapes this tool
/// understands.
///
/// Keyword casing follows what each producer actually emits: `pg_dump`
/// writes keywords upper-case, hand-written migrations are allowed to be
/// loose only where they are in the wild (functions, drops, ALTER TABLE).
pub struct SchemaExtractor {
    create_table: Regex,
    create_enum: Regex,
    create_view: Regex,
    create_matview: Regex,
    create_function: Regex,
    drop_function: Regex,
    create_policy: Regex,
    drop_policy: Regex,
    create_trigger: Regex,
    create_index: Regex,
    alter_table: Regex,
    add_column: Regex,
}

impl SchemaExtractor {
    /// Build an extractor for text whose objects carry `schema_prefix`, e.g.
    /// `SchemaExtractor::new("public.")` for a dump of the public schema.
    pub fn new(schema_prefix: &str) -> Self {
        let prefix = regex::escape(schema_prefix);
        Self {
            create_table: Regex::new(&format!(
                r"(?ms)^\s*CREATE TABLE {prefix}(\w+)\s*\((.*?)\)\s*;"
            ))
            .unwrap(),
            create_enum: Regex::new(&format!(
                r"(?m)^\s*CREATE TYPE\s+{prefix}(\w+)\s+AS\s+ENUM"
            ))
            .unwrap(),
            create_view: Regex::new(&format!(r"(?m)^\s*CREATE VIEW\s+{prefix}(\w+)\s+AS"))
                .unwrap(),
            create_matview: Regex::new(&format!(
                r"(?m)^\s*CREATE MATERIALIZED VIEW\s+{prefix}(\w+)\s+AS"
            ))
            .unwrap(),
            create_function: Regex::new(&format!(
                r"(?mi)^\s*CREATE\s+(?:OR\s+REPLACE\s+)?FUNCTION\s+{prefix}([\w.]+)\s*\(([^)]*)\)"
            ))
            .unwrap(),
            drop_function: Regex::new(r"(?mi)^\s*DROP FUNCTION IF EXISTS\s+([\w.]+)\s*\(([^)]*)\)")
                .unwrap(),
            create_policy: Regex::new(&format!(
                r#"(?m)^\s*CREATE POLICY\s+"?([^"\n]+)"?\s+ON\s+{prefix}([\w.]+)"#
            ))
            .unwrap(),
            drop_policy: Regex::new(
                r#"(?mi)^\s*DROP POLICY IF EXISTS\s+"?([^"\n]+)"?\s+ON\s+([\w.]+)"#,
            )
            .unwrap(),
            create_trigger: Regex::new(&format!(
                r"(?m)^\s*CREATE TRIGGER\s+(\w+)\s+.*?\s+ON\s+{prefix}([\w.]+)"
            ))
            .unwrap(),
            create_index: Regex::new(&format!(
                r"(?m)^\s*CREATE INDEX\s+(?:IF NOT EXISTS\s+)?(\w+)\s+ON\s+{prefix}([\w.]+)"
            ))
            .unwrap(),
            alter_table: Regex::new(r"(?is)ALTER TABLE\s+([\w.]+)\s+([^;]+);").unwrap(),
            add_column: Regex::new(r"(?i)ADD COLUMN(?: IF NOT EXISTS)?\s+(\w+)").unwrap(),
        }
    }

    /// Extractor for migration files, which spell objects unqualified.
    pub fn migrations() -> Self {
        Self::new("")
    }

    /// Extract the complete create-only model of one text.
    ///
    /// This is what the live dump side uses; drops never appear in a dump.
    /// `ALTER TABLE ... ADD COLUMN` is not folded in here, that statement
    /// only matters during migration replay.
    pub fn extract(&self, sql: &str) -> SchemaModel {
        let mut model = SchemaModel {
            tables: self.tables(sql),
            enums: self.enum_types(sql),
            views: self.views(sql),
            matviews: self.matviews(sql),
            functions: self.functions(sql),
            policies: self.policies(sql),
            indexes: self.indexes(sql),
            ..SchemaModel::default()
        };
        for trigger in self.triggers(sql) {
            let key = TriggerKey::new(&trigger.name, &trigger.table);
            if trigger.qualified {
                model.qualified_triggers.insert(key);
            } else {
                model.triggers.insert(key);
            }
        }
        model
    }

    /// Table name to column set for every `CREATE TABLE` block.
    pub fn tables(&self, sql: &str) -> BTreeMap<String, BTreeSet<String>> {
        let mut tables: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for caps in self.create_table.captures_iter(sql) {
            tables
                .entry(caps[1].to_string())
                .or_default()
                .extend(columns_from_body(&caps[2]));
        }
        tables
    }

    /// Enum type names from `CREATE TYPE ... AS ENUM`.
    pub fn enum_types(&self, sql: &str) -> BTreeSet<String> {
        self.create_enum
            .captures_iter(sql)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    pub fn views(&self, sql: &str) -> BTreeSet<String> {
        self.create_view
            .captures_iter(sql)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    pub fn matviews(&self, sql: &str) -> BTreeSet<String> {
        self.create_matview
            .captures_iter(sql)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Function signatures from create statements only.
    pub fn functions(&self, sql: &str) -> BTreeSet<FunctionSignature> {
        let escaped = escape_parens(sql);
        self.create_function
            .captures_iter(&escaped)
            .map(|caps| signature(&caps[1], &caps[2]))
            .collect()
    }

    /// Function create and drop events in source order.
    pub fn function_events(&self, sql: &str) -> Vec<SchemaEvent<FunctionSignature>> {
        let escaped = escape_parens(sql);
        let mut events = Vec::new();
        for caps in self.create_function.captures_iter(&escaped) {
            events.push(SchemaEvent {
                offset: caps.get(0).unwrap().start(),
                kind: EventKind::Create,
                key: signature(&caps[1], &caps[2]),
            });
        }
        for caps in self.drop_function.captures_iter(&escaped) {
            events.push(SchemaEvent {
                offset: caps.get(0).unwrap().start(),
                kind: EventKind::Drop,
                key: signature(&caps[1], &caps[2]),
            });
        }
        events.sort_by_key(|event| event.offset);
        events
    }

    /// Policies from create statements only.
    pub fn policies(&self, sql: &str) -> BTreeSet<PolicyKey> {
        self.create_policy
            .captures_iter(sql)
            .map(|caps| policy_key(&caps[1], &caps[2]))
            .collect()
    }

    /// Policy create and drop events in source order.
    pub fn policy_events(&self, sql: &str) -> Vec<SchemaEvent<PolicyKey>> {
        let mut events = Vec::new();
        for caps in self.create_policy.captures_iter(sql) {
            events.push(SchemaEvent {
                offset: caps.get(0).unwrap().start(),
                kind: EventKind::Create,
                key: policy_key(&caps[1], &caps[2]),
            });
        }
        for caps in self.drop_policy.captures_iter(sql) {
            events.push(SchemaEvent {
                offset: caps.get(0).unwrap().start(),
                kind: EventKind::Drop,
                key: policy_key(&caps[1], &caps[2]),
            });
        }
        events.sort_by_key(|event| event.offset);
        events
    }

    /// Trigger occurrences. Whatever sits between the trigger name and `ON`
    /// (timing, events) is skipped as opaque.
    pub fn triggers(&self, sql: &str) -> Vec<TriggerRef> {
        self.create_trigger
            .captures_iter(sql)
            .map(|caps| {
                let table = caps[2].to_string();
                TriggerRef {
                    name: caps[1].to_string(),
                    qualified: table.contains('.'),
                    table,
                }
            })
            .collect()
    }

    pub fn indexes(&self, sql: &str) -> BTreeSet<IndexKey> {
        self.create_index
            .captures_iter(sql)
            .map(|caps| IndexKey::new(&caps[1], last_segment(&caps[2])))
            .collect()
    }

    /// `(table, column)` pairs contributed by `ALTER TABLE ... ADD COLUMN`.
    pub fn added_columns(&self, sql: &str) -> Vec<(String, String)> {
        let mut added = Vec::new();
        for caps in self.alter_table.captures_iter(sql) {
            let table = last_segment(&caps[1]).to_string();
            for col in self.add_column.captures_iter(&caps[2]) {
                added.push((table.clone(), col[1].to_string()));
            }
        }
        added
    }
}

/// Column names from a `CREATE TABLE` body.
///
/// The body is split on top-level commas (paren-depth aware, so
/// `numeric(10,2)` and inline `CHECK (...)` clauses survive). Within each
/// segment, blank lines and `--` comment lines are dropped; segments opening
/// with a table-level constraint keyword are dropped whole; the first
/// whitespace-delimited, quote-stripped token of what remains is the column
/// name.
fn columns_from_body(body: &str) -> BTreeSet<String> {
    let mut columns = BTreeSet::new();
    for segment in split_top_level_commas(body) {
        let Some(line) = segment
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty() && !line.starts_with("--"))
        else {
            continue;
        };
        if CONSTRAINT_LINE.is_match(line) {
            continue;
        }
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let column = token.trim_matches('"');
        if column.is_empty() || column == ")" {
            continue;
        }
        columns.insert(column.to_string());
    }
    columns
}

/// Split on commas not nested inside parentheses.
fn split_top_level_commas(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Parse an argument list into normalized parameter types, in order.
///
/// Expects paren-escaped text, so a plain top-level comma split is safe.
/// `DEFAULT ...` and `= ...` suffixes are stripped; when more than one token
/// remains the first is taken to be a parameter name and dropped.
pub fn parse_arg_types(arg_list: &str) -> Vec<String> {
    static DEFAULT_SUFFIX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)\s+DEFAULT\s+").unwrap());

    if arg_list.trim().is_empty() {
        return Vec::new();
    }
    let mut types = Vec::new();
    for raw in split_top_level_commas(arg_list) {
        let part = DEFAULT_SUFFIX
            .splitn(raw.trim(), 2)
            .next()
            .unwrap_or("")
            .trim();
        let part = part.split('=').next().unwrap_or("").trim();
        let tokens: Vec<&str> = part.split_whitespace().collect();
        let arg_type = match tokens.len() {
            0 => continue,
            1 => tokens[0].to_string(),
            _ => tokens[1..].join(" "),
        };
        types.push(normalize_type(&arg_type));
    }
    types
}

/// Bare object name: the last path segment of a possibly-qualified reference.
fn last_segment(reference: &str) -> &str {
    reference.rsplit('.').next().unwrap_or(reference)
}

fn signature(raw_name: &str, raw_args: &str) -> FunctionSignature {
    FunctionSignature::new(last_segment(raw_name), parse_arg_types(raw_args))
}

fn policy_key(raw_name: &str, raw_table: &str) -> PolicyKey {
    PolicyKey::new(raw_name.trim(), last_segment(raw_table))
}

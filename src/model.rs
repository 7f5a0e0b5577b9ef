//! The extracted schema object model.
//!
//! Everything here is a derived fact pulled out of SQL text. The live-side
//! model is built once from a dump and never touched again; the
//! migration-side model is accumulated file by file during replay.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A function identified by name plus its full ordered argument-type list.
///
/// Two functions are the same object only when both name and argument types
/// match, which keeps overloads apart. Argument types are stored normalized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FunctionSignature {
    pub name: String,
    pub args: Vec<String>,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.args.join(", "))
    }
}

/// A row-level-security policy, keyed by name plus table.
///
/// The same policy name may exist on several tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PolicyKey {
    pub name: String,
    pub table: String,
}

impl PolicyKey {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ON {}", self.name, self.table)
    }
}

/// A trigger, keyed by name plus table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TriggerKey {
    pub name: String,
    pub table: String,
}

impl TriggerKey {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ON {}", self.name, self.table)
    }
}

/// An index, keyed by name plus table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IndexKey {
    pub name: String,
    pub table: String,
}

impl IndexKey {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ON {}", self.name, self.table)
    }
}

/// One side of the reconciliation: every fact extracted from a dump, or
/// accumulated by replaying migration files.
///
/// BTree collections keep emission deterministic and sorted, which is what
/// the report layer wants.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SchemaModel {
    /// Table name to its de-duplicated column set.
    pub tables: BTreeMap<String, BTreeSet<String>>,
    /// Enum type names.
    pub enums: BTreeSet<String>,
    pub views: BTreeSet<String>,
    pub matviews: BTreeSet<String>,
    pub functions: BTreeSet<FunctionSignature>,
    pub policies: BTreeSet<PolicyKey>,
    /// Triggers whose table reference was unqualified, or carried the dump's
    /// own schema prefix.
    pub triggers: BTreeSet<TriggerKey>,
    /// Triggers whose table reference was schema-qualified in the source
    /// text. The qualified spelling is kept for display. A single-schema
    /// dump cannot contain these, so they are reported informationally and
    /// never counted as drift.
    pub qualified_triggers: BTreeSet<TriggerKey>,
    pub indexes: BTreeSet<IndexKey>,
}

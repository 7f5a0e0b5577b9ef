//! Type-spelling canonicalization.
//!
//! Postgres spells the same type several ways depending on who emitted the
//! SQL: a dump says `timestamp with time zone` and `character varying(255)`
//! where a hand-written migration says `timestamptz` and `varchar`. Every
//! type string is funneled through [`normalize_type`] before comparison so
//! equivalent spellings collapse to one canonical form.

use regex::Regex;
use std::sync::LazyLock;

static SIZED_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z_]+)\s*\(\s*(\d+)\s*\)").unwrap());
static SIZED_VARCHAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"varchar_\d+").unwrap());
static PAREN_VARCHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"varchar\s*\(\s*\d+\s*\)").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Canonicalize a type spelling.
///
/// Lowercases, rewrites the long spellings to their short aliases, drops the
/// size from `varchar(N)` and `varchar_N` (a widened column is not drift),
/// and collapses whitespace runs to single spaces. Idempotent.
pub fn normalize_type(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    // Collapse whitespace before alias rewriting, otherwise a doubled space
    // inside `timestamp  with time zone` would survive one pass and break
    // idempotency.
    let collapsed = WHITESPACE.replace_all(&lowered, " ");
    let aliased = collapsed
        .replace("timestamp with time zone", "timestamptz")
        .replace("character varying", "varchar");
    let bare = SIZED_VARCHAR.replace_all(&aliased, "varchar");
    PAREN_VARCHAR.replace_all(&bare, "varchar").into_owned()
}

/// Rewrite `name(N)` occurrences into `name_N`.
///
/// Function argument lists are captured with an "everything up to the first
/// `)`" pattern, which a type's own size suffix such as `timestamp(3)` would
/// cut short. Running a whole SQL text through this transform first makes
/// that capture safe. Idempotent; anything that is not an
/// `identifier(digits)` shape passes through untouched.
pub fn escape_parens(sql: &str) -> String {
    SIZED_TYPE.replace_all(sql, "${1}_${2}").into_owned()
}

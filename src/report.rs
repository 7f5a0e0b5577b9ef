//! Report rendering for humans and machines.

use colored::*;
use std::fmt::Display;

use crate::reconcile::{KindDiff, Report};

/// Print the report in the two-lines-per-kind console layout.
pub fn print_text(report: &Report) {
    println!("{}", "=== RECONCILIATION ===".bold());

    print_kind("Types", &report.types);
    print_kind("Tables", &report.tables);

    println!();
    println!("{}", "Columns (remote vs migrations):".cyan());
    if report.columns.is_empty() {
        println!("  {}", "all tables match".green());
    } else {
        for (table, diff) in &report.columns {
            println!(
                "  {}: remote_only={} migrations_only={}",
                table.yellow(),
                format_list(&diff.remote_only),
                format_list(&diff.migrations_only)
            );
        }
    }

    print_kind("Materialized views", &report.matviews);
    print_kind("Views", &report.views);
    print_kind("Functions (name + arg types)", &report.functions);
    print_kind("Policies (name, table)", &report.policies);
    print_kind("Triggers (public tables only)", &report.triggers);

    println!();
    println!(
        "{}",
        "Triggers on schema-qualified tables (expected missing from the dump):".cyan()
    );
    println!(
        "  migrations_only_qualified: {}",
        format_list(&report.qualified_triggers)
    );

    print_kind("Indexes (name, table)", &report.indexes);

    println!();
    if report.has_differences() {
        println!("{}", "✗ Schema drift detected".red().bold());
    } else {
        println!("{}", "✓ Migrations and remote schema agree".green().bold());
    }
}

/// Serialize the whole report as pretty JSON.
pub fn to_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_default()
}

fn print_kind<K: Display>(label: &str, diff: &KindDiff<K>) {
    println!();
    println!("{}", format!("{label}:").cyan());
    println!("  remote_only: {}", format_list(&diff.remote_only));
    println!("  migrations_only: {}", format_list(&diff.migrations_only));
}

fn format_list<K: Display>(items: &[K]) -> String {
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FunctionSignature, SchemaModel};
    use crate::reconcile::reconcile;

    #[test]
    fn test_format_list() {
        let sigs = vec![
            FunctionSignature::new("f", vec!["integer".into()]),
            FunctionSignature::new("g", vec![]),
        ];
        assert_eq!(format_list(&sigs), "[f(integer), g()]");
        let none: Vec<String> = vec![];
        assert_eq!(format_list(&none), "[]");
    }

    #[test]
    fn test_json_roundtrips_through_serde() {
        let mut remote = SchemaModel::default();
        remote.enums.insert("order_status".into());
        let report = reconcile(&remote, &SchemaModel::default());

        let json: serde_json::Value = serde_json::from_str(&to_json(&report)).unwrap();
        assert_eq!(json["types"]["remote_only"][0], "order_status");
        assert_eq!(json["qualified_triggers"], serde_json::json!([]));
    }
}

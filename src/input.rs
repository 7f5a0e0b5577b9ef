//! Input loading: the remote dump text and the migration directory.

use std::fs;
use std::path::Path;

use crate::error::{DriftError, DriftResult};

/// One migration file, identified by its filename.
#[derive(Debug, Clone)]
pub struct Migration {
    pub name: String,
    pub sql: String,
}

/// Read the live schema dump. A missing path is fatal.
pub fn read_remote_schema(path: &Path) -> DriftResult<String> {
    if !path.exists() {
        return Err(DriftError::missing(path));
    }
    Ok(fs::read_to_string(path)?)
}

/// Read every `*.sql` file under `dir`, sorted by filename.
///
/// Filename order is assumed to equal applied order, which holds for the
/// usual timestamp-prefixed migration names.
pub fn read_migrations(dir: &Path) -> DriftResult<Vec<Migration>> {
    if !dir.is_dir() {
        return Err(DriftError::missing(dir));
    }
    let mut migrations = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("sql") {
            continue;
        }
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let sql = fs::read_to_string(&path)?;
        migrations.push(Migration { name, sql });
    }
    migrations.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(migrations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_inputs_are_fatal() {
        let missing = Path::new("definitely/not/here");
        assert!(matches!(
            read_remote_schema(missing),
            Err(DriftError::MissingInput { .. })
        ));
        assert!(matches!(
            read_migrations(missing),
            Err(DriftError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_migrations_come_back_in_filename_order() {
        let dir = std::env::temp_dir().join(format!("driftcheck-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("20240102_second.sql"), "CREATE TABLE b (\n    id int\n);").unwrap();
        fs::write(dir.join("20240101_first.sql"), "CREATE TABLE a (\n    id int\n);").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let migrations = read_migrations(&dir).unwrap();
        let names: Vec<&str> = migrations.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["20240101_first.sql", "20240102_second.sql"]);

        fs::remove_dir_all(&dir).unwrap();
    }
}

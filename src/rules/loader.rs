use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{Result, SortError};
use crate::models::Rule;

/// Column holding the pattern
pub const PATTERN_COLUMN: &str = "regexp";
/// Column holding the destination directory
pub const DESTINATION_COLUMN: &str = "dist";

/// Rules loaded from one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    pub rules: Vec<Rule>,
    /// Rows dropped because the pattern or destination was empty
    pub skipped_rows: usize,
}

impl RuleTable {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Load the ordered rules from a CSV file
pub fn load_rules(path: &Path) -> Result<Vec<Rule>> {
    load_rule_table(path).map(|table| table.rules)
}

/// Load the rules table, keeping track of skipped rows
pub fn load_rule_table(path: &Path) -> Result<RuleTable> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SortError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => SortError::ConfigMalformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;

    load_rules_from_reader(file, path)
}

/// Parse a rules table from any reader. `path` is only used in errors.
pub fn load_rules_from_reader<R: Read>(reader: R, path: &Path) -> Result<RuleTable> {
    let malformed = |reason: String| SortError::ConfigMalformed {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| malformed(format!("cannot read header row: {}", e)))?;
    let headers = normalize_headers(headers);

    for column in [PATTERN_COLUMN, DESTINATION_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(malformed(format!("missing required column '{}'", column)));
        }
    }
    reader.set_headers(headers);

    let mut table = RuleTable::default();
    for result in reader.deserialize::<Rule>() {
        let rule = result.map_err(|e| malformed(describe_csv_error(&e)))?;
        if rule.is_complete() {
            table.rules.push(rule);
        } else {
            table.skipped_rows += 1;
        }
    }

    tracing::debug!(
        path = %path.display(),
        rules = table.rules.len(),
        skipped = table.skipped_rows,
        "Parsed rules table"
    );

    Ok(table)
}

/// Strip a leading UTF-8 BOM and surrounding whitespace from header names
fn normalize_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim())
        .collect()
}

fn describe_csv_error(err: &csv::Error) -> String {
    match err.position() {
        Some(pos) => format!("line {}: {}", pos.line(), err),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn parse(content: &str) -> Result<RuleTable> {
        load_rules_from_reader(content.as_bytes(), Path::new("rules.csv"))
    }

    #[test]
    fn test_rules_in_row_order() {
        let table = parse("regexp,dist\n^img_,/out/images\n\\.pdf$,/out/docs\n.*\\.txt,/out/text\n").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.skipped_rows, 0);
        assert_eq!(
            table.rules,
            vec![
                Rule::new("^img_", "/out/images"),
                Rule::new(r"\.pdf$", "/out/docs"),
                Rule::new(r".*\.txt", "/out/text"),
            ]
        );
    }

    #[test]
    fn test_column_order_and_extra_columns() {
        let table = parse("note,dist,regexp\nphotos,/out/images,^img_\n").unwrap();
        assert_eq!(table.rules, vec![Rule::new("^img_", "/out/images")]);
    }

    #[test]
    fn test_quoted_pattern_with_comma() {
        let table = parse("regexp,dist\n\"^a{1,3}\\.log$\",/out/logs\n").unwrap();
        assert_eq!(table.rules[0].pattern, r"^a{1,3}\.log$");
    }

    #[test]
    fn test_incomplete_rows_skipped() {
        let table = parse("regexp,dist\n,/out/a\n^b,\n^c,/out/c\n").unwrap();

        assert_eq!(table.rules, vec![Rule::new("^c", "/out/c")]);
        assert_eq!(table.skipped_rows, 2);
    }

    #[test]
    fn test_invalid_pattern_is_not_checked() {
        let table = parse("regexp,dist\n([unclosed,/out/bad\n").unwrap();
        assert_eq!(table.rules[0].pattern, "([unclosed");
    }

    #[test]
    fn test_bom_in_header() {
        let table = parse("\u{feff}regexp,dist\n^img_,/out/images\n").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_header_only() {
        let table = parse("regexp,dist\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_missing_column() {
        let result = parse("pattern,destination\n^img_,/out/images\n");
        match result {
            Err(SortError::ConfigMalformed { reason, .. }) => {
                assert!(reason.contains("regexp"));
            }
            other => panic!("expected ConfigMalformed, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let result = parse("regexp,dist\n^img_,/out/images,extra\n");
        assert!(matches!(result, Err(SortError::ConfigMalformed { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rules.csv");
        fs::write(&path, "regexp,dist\n^img_,/out/images\n").unwrap();

        let rules = load_rules(&path).unwrap();
        assert_eq!(rules, vec![Rule::new("^img_", PathBuf::from("/out/images"))]);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.csv");

        let result = load_rules(&path);
        assert!(matches!(result, Err(SortError::ConfigNotFound { .. })));
        // Nothing was created
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}

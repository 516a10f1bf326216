use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

/// Raw tabular contents of a report file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of `name` for every row; short rows yield empty strings.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(move |row| row.get(idx).map(String::as_str).unwrap_or("")),
        )
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn read_report(path: &Path) -> Result<ReportTable> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    parse_report(&contents).with_context(|| format!("Malformed report {}", path.display()))
}

/// Parse comma-separated report text. A header with a `status` column is
/// required; blank lines are ignored. One pair of surrounding double quotes
/// is stripped from each field; embedded commas are not supported.
pub fn parse_report(contents: &str) -> Result<ReportTable> {
    let mut lines = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        bail!("missing header row");
    };
    let columns: Vec<String> = header
        .split(',')
        .map(|c| unquote(c.trim()).to_string())
        .collect();
    let Some(status_idx) = columns.iter().position(|c| c == "status") else {
        bail!("missing status column");
    };

    let mut rows = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<String> = line
            .split(',')
            .map(|f| unquote(f).to_string())
            .collect();
        if fields.len() > columns.len() {
            bail!(
                "line {}: expected {} fields, found {}",
                line_no + 1,
                columns.len(),
                fields.len()
            );
        }
        if fields.len() <= status_idx {
            bail!("line {}: missing status field", line_no + 1);
        }
        rows.push(fields);
    }

    Ok(ReportTable { columns, rows })
}

fn unquote(field: &str) -> &str {
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

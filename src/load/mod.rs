// src/load/mod.rs
pub mod utils;

use csv::ReaderBuilder;
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};
use tracing::{debug, info};

use crate::error::{Result, RoamingError};
use utils::{clean_header, clean_str, is_missing};

/// An in-memory copy of one export, in file order.
///
/// Cells are stored cleaned (trimmed, outer quotes removed). Missing-value
/// markers are normalised to the empty string, so downstream code only has
/// to test `cell.is_empty()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Header names that appeared more than once before renaming.
    repeated: Vec<String>,
}

impl Table {
    /// Build a table from already-split cells. Short rows are padded with
    /// missing cells; rows wider than the header are rejected. Repeated
    /// header names are renamed `X.1`, `X.2`, ... like `pandas.read_csv`.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(RoamingError::data_format("no header row"));
        }

        let headers: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let name = clean_header(h);
                if name.is_empty() {
                    format!("Unnamed: {}", i)
                } else {
                    name
                }
            })
            .collect();

        let (headers, repeated) = dedupe_headers(headers);

        let width = headers.len();
        let mut cleaned = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() > width {
                return Err(RoamingError::data_format(format!(
                    "row {} has {} fields, header has {}",
                    idx + 1,
                    row.len(),
                    width
                )));
            }
            let mut cells: Vec<String> = row
                .iter()
                .map(|raw| {
                    let c = clean_str(raw);
                    if is_missing(&c) {
                        String::new()
                    } else {
                        c
                    }
                })
                .collect();
            cells.resize(width, String::new());
            cleaned.push(cells);
        }

        Ok(Self {
            headers,
            rows: cleaned,
            repeated,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of `name` in the header, or a `DataFormat` error.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| RoamingError::data_format(format!("missing column `{}`", name)))
    }

    /// Cells of one column, top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Result<impl Iterator<Item = &'a str> + 'a> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| row[idx].as_str()))
    }

    /// Every required column must be present exactly once in the source header.
    pub fn require_columns(&self, required: &[&str]) -> Result<()> {
        let ambiguous: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| self.repeated.iter().any(|r| r == name))
            .collect();
        if !ambiguous.is_empty() {
            return Err(RoamingError::data_format(format!(
                "ambiguous required column(s): {}",
                ambiguous.join(", ")
            )));
        }

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| !self.headers.iter().any(|h| h == name))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RoamingError::data_format(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )))
        }
    }
}

/// Rename repeated names to `X.1`, `X.2`, ..., skipping names already taken.
/// Also returns the names that were repeated.
fn dedupe_headers(headers: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut taken: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut suffix: HashMap<String, usize> = HashMap::new();
    let mut repeated: Vec<String> = Vec::new();
    let mut out = Vec::with_capacity(headers.len());

    for name in headers {
        if taken.insert(name.clone()) {
            out.push(name);
            continue;
        }
        if !repeated.contains(&name) {
            repeated.push(name.clone());
        }
        let n = suffix.entry(name.clone()).or_insert(0);
        loop {
            *n += 1;
            let candidate = format!("{}.{}", name, n);
            if taken.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
        }
    }

    (out, repeated)
}

/// Parse comma-separated text with a header row from any byte source.
pub fn read_table<R: Read>(reader: R, required: &[&str]) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(RoamingError::data_format("no header row"));
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| match RoamingError::from(e) {
            RoamingError::DataFormat(msg) => {
                RoamingError::data_format(format!("record {}: {}", idx + 1, msg))
            }
            other => other,
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::new(headers, rows)?;
    table.require_columns(required)?;
    debug!(
        columns = table.headers().len(),
        rows = table.len(),
        "parsed table"
    );
    Ok(table)
}

/// Open `path` read-only, parse it and release the handle before returning.
#[tracing::instrument(level = "info", skip(path, required), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P, required: &[&str]) -> Result<Table> {
    let path = path.as_ref();
    if path.is_dir() {
        return Err(RoamingError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => RoamingError::NotFound {
            path: path.to_path_buf(),
        },
        _ => RoamingError::Io(e),
    })?;

    let table = read_table(BufReader::new(file), required)?;
    info!(rows = table.len(), "loaded table");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::{Cursor, Write};
    use tempfile::{tempdir, NamedTempFile};

    use crate::test_support::init_test_logging;

    const REQUIRED: &[&str] = &["Country Name", "Operator", "Number of SUBS"];

    #[test]
    fn load_preserves_row_order_and_ignores_extra_columns() -> Result<()> {
        init_test_logging();
        let content = "\
Date,Country Name,Operator,Number of SUBS,MCC
2024-01-01,France,Orange F,10,208
2024-01-01,Spain,Movistar,5,214
2024-01-01,France,SFR,3,208
";
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;

        let table = load_table(tmp.path(), REQUIRED)?;
        assert_eq!(table.len(), 3);
        let countries: Vec<&str> = table.column("Country Name")?.collect();
        assert_eq!(countries, vec!["France", "Spain", "France"]);
        assert_eq!(table.headers()[4], "MCC");
        Ok(())
    }

    #[test]
    fn missing_required_column_is_data_format() {
        let content = "Country Name,Number of SUBS\nFrance,10\n";
        let err = read_table(Cursor::new(content), REQUIRED).unwrap_err();
        assert!(err.is_data_format());
        assert!(err.to_string().contains("Operator"));
    }

    #[test]
    fn empty_input_is_data_format() {
        let err = read_table(Cursor::new(""), REQUIRED).unwrap_err();
        assert!(err.is_data_format());
    }

    #[test]
    fn header_only_yields_empty_table() -> Result<()> {
        let table = read_table(Cursor::new("Country Name,Operator,Number of SUBS\n"), REQUIRED)?;
        assert!(table.is_empty());
        Ok(())
    }

    #[test]
    fn short_rows_are_padded_and_markers_become_empty() -> Result<()> {
        let content = "Country Name,Operator,Number of SUBS\nFrance,NA\n\"Spain\",Movistar,N/A\n";
        let table = read_table(Cursor::new(content), REQUIRED)?;
        assert_eq!(table.rows()[0], vec!["France", "", ""]);
        assert_eq!(table.rows()[1], vec!["Spain", "Movistar", ""]);
        Ok(())
    }

    #[test]
    fn wide_rows_are_rejected() {
        let content = "Country Name,Operator,Number of SUBS\nFrance,Orange,1,extra\n";
        let err = read_table(Cursor::new(content), REQUIRED).unwrap_err();
        assert!(err.is_data_format());
    }

    #[test]
    fn repeated_required_header_is_ambiguous() {
        let content = "Country Name,Operator,Operator,Number of SUBS\n";
        let err = read_table(Cursor::new(content), REQUIRED).unwrap_err();
        assert!(err.is_data_format());
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn repeated_extra_headers_are_renamed() -> Result<()> {
        let content = "Country Name,Operator,Number of SUBS,Note,Note,Note.1,Note\nA,X,10,a,b,c,d\n";
        let table = read_table(Cursor::new(content), REQUIRED)?;
        assert_eq!(
            table.headers()[3..].to_vec(),
            vec!["Note", "Note.1", "Note.1.1", "Note.2"]
        );
        let notes: Vec<&str> = table.column("Note.2")?.collect();
        assert_eq!(notes, vec!["d"]);
        Ok(())
    }

    #[test]
    fn bom_and_blank_headers_are_cleaned() -> Result<()> {
        let content = "\u{feff}Country Name,Operator,Number of SUBS,\nFrance,Orange,1,\n";
        let table = read_table(Cursor::new(content), REQUIRED)?;
        assert_eq!(table.headers()[0], "Country Name");
        assert_eq!(table.headers()[3], "Unnamed: 3");
        Ok(())
    }

    #[test]
    fn missing_path_is_not_found() -> Result<()> {
        let dir = tempdir()?;
        let err = load_table(dir.path().join("absent.csv"), REQUIRED).unwrap_err();
        assert!(err.is_not_found());

        let err = load_table(dir.path(), REQUIRED).unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }
}

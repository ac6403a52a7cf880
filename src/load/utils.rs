/// Markers `pandas.read_csv` treats as NaN by default. Exports produced by
/// spreadsheet tooling use several of them for blank cells.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Header cells additionally lose a leading byte-order mark.
pub fn clean_header(raw: &str) -> String {
    clean_str(raw.trim_start_matches('\u{feff}'))
}

/// True when a cleaned cell holds no value.
pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell)
}

/// Parse a cleaned numeric cell. Returns `None` for anything that is not a
/// finite number.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

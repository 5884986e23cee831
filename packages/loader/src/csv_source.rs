//! CSV parsing into a [`Table`].
//!
//! Headers come from the first row. Every cell is trimmed; blank cells and
//! the usual spreadsheet null markers become nulls so that later passes
//! can treat "missing" uniformly.

use std::io::Read;

use crime_dash_report_models::Table;

use crate::LoadError;

/// Cell values that are read as null.
const NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Parses a header-plus-rows CSV document.
///
/// `label` names the source in errors and log lines.
///
/// # Errors
///
/// Returns [`LoadError::Csv`] if the document is not valid CSV and
/// [`LoadError::NoHeader`] if it has no header row.
pub fn parse_csv<R: Read>(label: &str, reader: R) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::csv(label, e))?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(LoadError::NoHeader {
            source_id: label.to_owned(),
        });
    }

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::csv(label, e))?;
        rows.push(record.iter().map(to_cell).collect());
    }

    log::debug!(
        "Parsed {} rows x {} columns from {label}",
        rows.len(),
        headers.len()
    );

    Ok(Table::from_rows(headers, rows))
}

fn to_cell(raw: &str) -> Option<String> {
    let value = raw.trim();
    if NULL_MARKERS.contains(&value) {
        None
    } else {
        Some(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_cells() {
        let csv = "INCIDENT_NUMBER,STREET,Lat\nI1, WASHINGTON ST ,42.35\nI2,,42.30\n";
        let table = parse_csv("test", csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.column_names().collect::<Vec<_>>(),
            vec!["INCIDENT_NUMBER", "STREET", "Lat"]
        );
        assert_eq!(table.value(0, "STREET"), Some("WASHINGTON ST"));
        assert_eq!(table.value(1, "STREET"), None);
    }

    #[test]
    fn reads_null_markers_as_null() {
        let csv = "SHOOTING,DISTRICT\nNaN,B2\nY,NA\n";
        let table = parse_csv("test", csv.as_bytes()).unwrap();

        assert_eq!(table.value(0, "SHOOTING"), None);
        assert_eq!(table.value(1, "SHOOTING"), Some("Y"));
        assert_eq!(table.value(1, "DISTRICT"), None);
    }

    #[test]
    fn keeps_quoted_newlines() {
        let csv = "STREET\n\"WASHINGTON ST\nBOSTON, MA 02118\"\n";
        let table = parse_csv("test", csv.as_bytes()).unwrap();
        assert_eq!(
            table.value(0, "STREET"),
            Some("WASHINGTON ST\nBOSTON, MA 02118")
        );
    }

    #[test]
    fn tolerates_ragged_rows() {
        let csv = "a,b,c\n1,2\n1,2,3,4\n";
        let table = parse_csv("test", csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, "c"), None);
        assert_eq!(table.value(1, "c"), Some("3"));
    }

    #[test]
    fn rejects_empty_document() {
        let err = parse_csv("empty.csv", "".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::NoHeader { .. }), "{err}");
    }

    #[test]
    fn rejects_invalid_utf8() {
        let bytes: &[u8] = b"a,b\n\xff\xfe,1\n";
        let err = parse_csv("bad.csv", bytes).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }), "{err}");
    }
}

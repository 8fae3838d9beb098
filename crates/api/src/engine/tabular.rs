//! CSV codec for bulk uploads and exports.

use catalog_core::tabular::TabularRow;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, thiserror::Error)]
pub enum TabularError {
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parse an uploaded file into rows keyed by its header row.
///
/// Blank lines and rows whose cells are all empty are skipped. Short rows
/// are allowed; missing trailing cells read as absent. An empty file parses
/// to zero rows.
///
/// Each row's `line` is the file line its record starts on (the header is
/// line 1), so skipped blank lines do not shift the numbering.
pub fn parse_rows(bytes: &[u8]) -> Result<Vec<TabularRow>, TabularError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map_or(index + 2, |position| position.line() as usize);
        let row = TabularRow::from_pairs(line, headers.iter().zip(record.iter()));
        if row.is_empty() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Serialize a header row plus data rows as CSV text.
pub fn write_rows<I>(headers: &[&str], rows: I) -> Result<String, TabularError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

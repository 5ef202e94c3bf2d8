//! FILENAME: core/table-export/src/csv_export.rs
//! PURPOSE: Serializes the filtered records of a table view as CSV text.
//! CONTEXT: The header row carries the column headers in registry order and
//! each record becomes one line with its values in the same order. Quoting
//! follows the `csv` crate: fields containing the delimiter, a quote or a
//! line break are quoted, quotes are doubled.

use records::{ColumnRegistry, Row};

use crate::error::ExportError;

/// Options for a CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Title written on its own line before the header row.
    pub title: Option<String>,
}

impl CsvOptions {
    pub fn new() -> Self {
        CsvOptions {
            delimiter: b',',
            title: None,
        }
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes `rows` as CSV. Fails with [`ExportError::EmptyExport`] when there
/// is no record to write, in which case no text is produced.
pub fn export_csv<'a, I>(rows: I, registry: &ColumnRegistry, options: &CsvOptions) -> Result<String, ExportError>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut rows = rows.into_iter().peekable();
    if rows.peek().is_none() {
        log::info!("csv export skipped: no rows");
        return Err(ExportError::EmptyExport);
    }

    // The title line has a single field, so record lengths may differ.
    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .flexible(options.title.is_some())
        .from_writer(Vec::new());

    if let Some(title) = &options.title {
        writer.write_record([title.as_str()])?;
    }

    writer.write_record(registry.headers())?;

    let mut count = 0usize;
    for row in rows {
        let record: Vec<String> = registry.iter().map(|c| c.value(row).to_string()).collect();
        writer.write_record(&record)?;
        count += 1;
    }

    writer.flush().map_err(csv::Error::from)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    let text = String::from_utf8(bytes).map_err(|e| ExportError::Encoding(e.to_string()))?;

    log::debug!("csv export: {} row(s), {} column(s)", count, registry.len());
    Ok(text)
}

/// File name for an export titled `title`: lowercase ASCII letters and
/// digits, other runs collapsed to `-`, with a `.csv` extension.
pub fn export_file_name(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("export");
    }
    slug.push_str(".csv");
    slug
}

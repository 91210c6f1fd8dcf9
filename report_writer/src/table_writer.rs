use csv::Writer;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{ReportError, Result};

/// File format of an exported table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    #[default]
    Xlsx,
    Csv,
}

impl TableFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TableFormat::Xlsx => "xlsx",
            TableFormat::Csv => "csv",
        }
    }
}

/// One table cell; numbers stay numeric in spreadsheets
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(text) => f.write_str(text),
            Cell::Number(number) => write!(f, "{}", number),
            Cell::Empty => Ok(()),
        }
    }
}

/// Writes one table from column labels and rows of cells
#[derive(Debug, Clone)]
pub struct TableWriter {
    columns: Vec<String>,
    format: TableFormat,
    sheet_name: Option<String>,
}

impl TableWriter {
    pub fn new<I, S>(columns: I, format: TableFormat) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            format,
            sheet_name: None,
        }
    }

    /// Worksheet name used for xlsx output
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    /// Write header plus `rows` to `path`, creating parent directories.
    /// An existing file is overwritten.
    pub fn write<P: AsRef<Path>>(&self, path: P, rows: &[Vec<Cell>]) -> Result<PathBuf> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }

        if let Some(row) = rows.iter().find(|r| r.len() != self.columns.len()) {
            return Err(ReportError::RowWidth {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }

        match self.format {
            TableFormat::Csv => self.write_csv(path, rows)?,
            TableFormat::Xlsx => self.write_xlsx(path, rows)?,
        }

        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path.to_path_buf())
    }

    fn write_csv(&self, path: &Path, rows: &[Vec<Cell>]) -> Result<()> {
        let mut wtr = Writer::from_path(path)?;
        wtr.write_record(&self.columns)?;
        for row in rows {
            wtr.write_record(row.iter().map(Cell::to_string))?;
        }
        wtr.flush().map_err(|e| ReportError::io(path, e))
    }

    fn write_xlsx(&self, path: &Path, rows: &[Vec<Cell>]) -> Result<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        if let Some(name) = &self.sheet_name {
            worksheet.set_name(name.as_str())?;
        }

        for (col, label) in self.columns.iter().enumerate() {
            worksheet.write_string(0, col as u16, label.as_str())?;
        }

        for (index, row) in rows.iter().enumerate() {
            let row_num = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col as u16, text.as_str())?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row_num, col as u16, *number)?;
                    }
                    Cell::Empty => {}
                }
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}

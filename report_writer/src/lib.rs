// Tabular export: the per-token wallet PnL sheet and wallet-list comparison

pub mod compare;
pub mod pnl_sheet;
pub mod table_writer;

pub use compare::{
    count_wallet_occurrences, list_input_files, read_wallet_list, write_occurrence_files,
    WalletOccurrences,
};
pub use pnl_sheet::{pnl_row, write_pnl_sheet, PNL_COLUMNS, PNL_SHEET_NAME};
pub use table_writer::{Cell, TableFormat, TableWriter};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("XLSX write error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("Spreadsheet read error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("Workbook {path} has no worksheets")]
    EmptyWorkbook { path: String },
    #[error("Row has {actual} cells, expected {expected}")]
    RowWidth { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

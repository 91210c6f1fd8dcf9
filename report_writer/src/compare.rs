use calamine::{open_workbook_auto, Data, Reader};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::table_writer::{Cell, TableFormat, TableWriter};
use crate::{ReportError, Result};

/// Extensions read as wallet lists
const LIST_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Per-wallet count of the lists containing it, in first-seen order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalletOccurrences {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl WalletOccurrences {
    /// Count `list` once, however many times it repeats a wallet
    pub fn add_list<I, S>(&mut self, list: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen_in_list = HashSet::new();

        for wallet in list {
            let wallet = wallet.into();
            if !seen_in_list.insert(wallet.clone()) {
                continue;
            }

            match self.counts.get_mut(&wallet) {
                Some(count) => *count += 1,
                None => {
                    self.counts.insert(wallet.clone(), 1);
                    self.order.push(wallet);
                }
            }
        }
    }

    pub fn count(&self, wallet: &str) -> usize {
        self.counts.get(wallet).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Wallets present in exactly `lists` lists
    pub fn in_exactly(&self, lists: usize) -> Vec<&str> {
        self.order
            .iter()
            .filter(|w| self.count(w) == lists)
            .map(String::as_str)
            .collect()
    }
}

/// Wallet lists (`.csv`, `.xlsx`, `.xls`) directly under `input_dir`, sorted by file name
pub fn list_input_files<P: AsRef<Path>>(input_dir: P) -> Result<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();
    let entries = fs::read_dir(input_dir).map_err(|e| ReportError::io(input_dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ReportError::io(input_dir, e))?.path();
        let is_list = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| LIST_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
            .unwrap_or(false);
        if path.is_file() && is_list {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// First column of every row after the header, blanks skipped.
/// Spreadsheets are read from their first worksheet.
pub fn read_wallet_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    if is_csv(path) {
        read_csv_wallets(path)
    } else {
        read_workbook_wallets(path)
    }
}

fn read_csv_wallets(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut wallets = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(wallet) = record.get(0).map(str::trim).filter(|w| !w.is_empty()) {
            wallets.push(wallet.to_string());
        }
    }

    Ok(wallets)
}

fn read_workbook_wallets(path: &Path) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ReportError::EmptyWorkbook {
            path: path.display().to_string(),
        })??;

    let wallets = range
        .rows()
        .skip(1)
        .filter_map(|row| match row.first() {
            None | Some(Data::Empty) => None,
            Some(Data::String(text)) => Some(text.trim().to_string()),
            Some(other) => Some(other.to_string()),
        })
        .filter(|wallet| !wallet.is_empty())
        .collect();

    Ok(wallets)
}

pub fn count_wallet_occurrences(files: &[PathBuf]) -> Result<WalletOccurrences> {
    let mut occurrences = WalletOccurrences::default();

    for file in files {
        let wallets = read_wallet_list(file)?;
        info!("Read {} wallets from {}", wallets.len(), file.display());
        occurrences.add_list(wallets);
    }

    Ok(occurrences)
}

/// Write `{i}OF{N}Wallets.{xlsx|csv}` for every i in 1..=total_lists
pub fn write_occurrence_files<P: AsRef<Path>>(
    output_dir: P,
    occurrences: &WalletOccurrences,
    total_lists: usize,
    format: TableFormat,
) -> Result<Vec<PathBuf>> {
    if total_lists == 0 {
        warn!("No wallet lists to compare");
        return Ok(Vec::new());
    }

    let mut written = Vec::with_capacity(total_lists);

    for i in 1..=total_lists {
        let rows: Vec<Vec<Cell>> = occurrences
            .in_exactly(i)
            .into_iter()
            .map(|w| vec![Cell::text(w)])
            .collect();

        let path = output_dir.as_ref().join(format!(
            "{}OF{}Wallets.{}",
            i,
            total_lists,
            format.extension()
        ));
        let path = TableWriter::new(["Wallet"], format)
            .with_sheet_name(format!("Wallets_{}_of_{}", i, total_lists))
            .write(&path, &rows)?;
        info!("Created file: {}", path.display());
        written.push(path);
    }

    Ok(written)
}

//! Загрузка прайса поставщика: архив с сайта -> таблица -> строки прайса

use crate::shared::config::FeedConfig;
use crate::shared::error::{SyncError, SyncResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use contracts::usecases::u508_sync_stocks::FeedRecord;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek};
use std::path::PathBuf;

/// Откуда брать прайс
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    /// Локальный .zip или .xls/.xlsx
    File(PathBuf),
}

pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new() -> SyncResult<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Скачать архив с остатками
    pub async fn download(&self, url: &str) -> SyncResult<Vec<u8>> {
        tracing::info!("Downloading supplier feed from {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::transport(url, status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        tracing::info!("Supplier feed downloaded: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Получить строки прайса из указанного источника
    pub async fn load(
        &self,
        source: &FeedSource,
        config: &FeedConfig,
    ) -> SyncResult<Vec<FeedRecord>> {
        let raw = match source {
            FeedSource::Url(url) => self.download(url).await?,
            FeedSource::File(path) => {
                tracing::info!("Reading supplier feed from {}", path.display());
                std::fs::read(path)
                    .map_err(|e| SyncError::Feed(format!("{}: {}", path.display(), e)))?
            }
        };

        let records = parse_feed(extract_spreadsheet(raw)?, config)?;
        tracing::info!("Supplier feed parsed: {} records", records.len());
        Ok(records)
    }
}

fn is_spreadsheet_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".xls") || lower.ends_with(".xlsx")
}

/// Достать таблицу из zip-архива.
///
/// Если на входе не архив или в архиве нет таблиц (xlsx сам является
/// zip-архивом), байты возвращаются как есть.
pub fn extract_spreadsheet(raw: Vec<u8>) -> SyncResult<Vec<u8>> {
    let found = match zip::ZipArchive::new(Cursor::new(raw.as_slice())) {
        Ok(mut archive) => find_spreadsheet(&mut archive)?,
        Err(_) => None,
    };
    Ok(found.unwrap_or(raw))
}

fn find_spreadsheet<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> SyncResult<Option<Vec<u8>>> {
    for idx in 0..archive.len() {
        let mut file = archive.by_index(idx)?;
        let name = file.name().to_string();
        if !file.is_file() || !is_spreadsheet_name(&name) {
            continue;
        }
        tracing::debug!("Using {} from supplier archive", name);
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| SyncError::Feed(format!("{}: {}", name, e)))?;
        return Ok(Some(contents));
    }
    Ok(None)
}

/// Разобрать таблицу прайса (.xls/.xlsx) в записи
pub fn parse_feed(spreadsheet: Vec<u8>, config: &FeedConfig) -> SyncResult<Vec<FeedRecord>> {
    let rows = read_first_sheet(spreadsheet)?;
    records_from_rows(&rows, config)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (*f as i64).to_string()
        }
        other => other.to_string().trim().to_string(),
    }
}

/// Прочитать первый лист таблицы в строки текста.
/// Индексы строк совпадают с номерами строк файла (с нуля).
pub fn read_first_sheet(spreadsheet: Vec<u8>) -> SyncResult<Vec<Vec<String>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(spreadsheet))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SyncError::Feed("spreadsheet has no worksheets".into()))??;

    let (first_row, first_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); first_row];
    for row in range.rows() {
        let mut cells = vec![String::new(); first_col];
        cells.extend(row.iter().map(cell_to_string));
        rows.push(cells);
    }
    Ok(rows)
}

fn cell_at(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

/// Разобрать строки таблицы в записи прайса.
///
/// Строка `config.header_row` содержит названия колонок; все строки ниже
/// становятся записями. Строки без кода товара пропускаются.
pub fn records_from_rows(
    rows: &[Vec<String>],
    config: &FeedConfig,
) -> SyncResult<Vec<FeedRecord>> {
    let header = rows.get(config.header_row).ok_or_else(|| {
        SyncError::Feed(format!(
            "header row {} is missing: sheet has {} rows",
            config.header_row,
            rows.len()
        ))
    })?;

    let column = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| SyncError::Feed(format!("column {:?} not found in header", name)))
    };
    let code_idx = column(config.code_column.as_str())?;
    let quantity_idx = column(config.quantity_column.as_str())?;
    let price_idx = column(config.price_column.as_str())?;

    let records = rows[config.header_row + 1..]
        .iter()
        .filter(|row| !cell_at(row, code_idx).is_empty())
        .map(|row| {
            let attributes: BTreeMap<String, String> = header
                .iter()
                .enumerate()
                .filter(|(idx, name)| {
                    !name.is_empty() && ![code_idx, quantity_idx, price_idx].contains(idx)
                })
                .map(|(idx, name)| (name.clone(), cell_at(row, idx)))
                .collect();

            FeedRecord {
                offer_code: cell_at(row, code_idx),
                quantity_raw: cell_at(row, quantity_idx),
                price_raw: cell_at(row, price_idx),
                attributes,
            }
        })
        .collect();

    Ok(records)
}

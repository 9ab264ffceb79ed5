//! Сверка прайса поставщика с каталогом маркетплейса

use crate::shared::error::{SyncError, SyncResult};
use crate::shared::price::normalize_price;
use contracts::usecases::u508_sync_stocks::{
    Currency, FeedRecord, PricePayloadEntry, StockPayloadEntry,
};
use std::collections::HashSet;

/// Количество в прайсе, означающее "больше десяти"
const PLENTY_MARKER: &str = ">10";
/// Сколько выставляем на маркетплейс вместо ">10"
const PLENTY_QUANTITY: i64 = 100;
/// Поставщик пишет "1" для зарезервированного товара, продавать его нельзя.
// TODO: подтвердить у владельца продукта, что "1" по-прежнему означает резерв
const RESERVED_MARKER: &str = "1";

/// Количество из прайса -> остаток для маркетплейса.
///
/// `">10"` -> 100, `"1"` -> 0, остальное разбирается как целое число.
/// Маркеры сравниваются буквально, без обрезки пробелов.
pub fn normalize_quantity(quantity_raw: &str) -> SyncResult<i64> {
    match quantity_raw {
        PLENTY_MARKER => Ok(PLENTY_QUANTITY),
        RESERVED_MARKER => Ok(0),
        _ => quantity_raw
            .parse::<i64>()
            .map_err(|e| SyncError::Format(format!("quantity {:?}: {}", quantity_raw, e))),
    }
}

/// Остатки для каждого известного маркетплейсу артикула.
///
/// Сначала идут артикулы, найденные в прайсе (в порядке строк прайса), затем
/// нулевые остатки для артикулов, которых в прайсе нет (в исходном порядке).
/// Каждый артикул попадает в результат ровно один раз; повторы кода в
/// прайсе после первого совпадения пропускаются. `offer_ids` не изменяется.
pub fn reconcile_stock(
    feed: &[FeedRecord],
    offer_ids: &[String],
    warehouse_id: Option<&str>,
    timestamp: Option<&str>,
) -> SyncResult<Vec<StockPayloadEntry>> {
    let mut unmatched: HashSet<&str> = offer_ids.iter().map(String::as_str).collect();
    let mut stocks = Vec::with_capacity(unmatched.len());

    let entry = |offer_code: &str, quantity: i64| StockPayloadEntry {
        offer_code: offer_code.to_string(),
        quantity,
        warehouse_id: warehouse_id.map(str::to_string),
        timestamp: timestamp.map(str::to_string),
    };

    for record in feed {
        if !unmatched.remove(record.offer_code.as_str()) {
            continue;
        }
        let quantity = normalize_quantity(&record.quantity_raw)?;
        stocks.push(entry(&record.offer_code, quantity));
    }

    let matched = stocks.len();

    for offer_id in offer_ids {
        if unmatched.remove(offer_id.as_str()) {
            stocks.push(entry(offer_id, 0));
        }
    }

    tracing::debug!(
        "Stock reconciliation: {} matched in feed, {} zero-filled",
        matched,
        stocks.len() - matched
    );

    Ok(stocks)
}

/// Цены только для артикулов, которые есть и в прайсе, и на маркетплейсе.
///
/// Артикулы без строки в прайсе цену не получают.
pub fn reconcile_prices(
    feed: &[FeedRecord],
    offer_ids: &[String],
) -> SyncResult<Vec<PricePayloadEntry>> {
    let known: HashSet<&str> = offer_ids.iter().map(String::as_str).collect();

    feed.iter()
        .filter(|record| known.contains(record.offer_code.as_str()))
        .map(|record| {
            Ok(PricePayloadEntry {
                offer_code: record.offer_code.clone(),
                unit_price: normalize_price(&record.price_raw)?,
                currency: Currency::Rub,
            })
        })
        .collect()
}

use super::catalog_pager::list_offer_identifiers;
use super::reconciler::{reconcile_prices, reconcile_stock};
use crate::shared::batch::split_into_batches;
use crate::shared::error::{SyncError, SyncResult};
use crate::shared::marketplaces::MarketplaceApi;
use contracts::usecases::u508_sync_stocks::{FeedRecord, SyncOutcome, SyncReport};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Executor для UseCase синхронизации остатков и цен
///
/// Прайс поставщика загружается один раз и разделяется между всеми целями.
#[derive(Clone)]
pub struct SyncExecutor {
    feed: Arc<Vec<FeedRecord>>,
}

impl SyncExecutor {
    pub fn new(feed: Vec<FeedRecord>) -> Self {
        Self {
            feed: Arc::new(feed),
        }
    }

    /// Синхронизировать цели по очереди. Ошибка одной цели не останавливает
    /// следующие; уже отправленные пачки не откатываются.
    pub async fn run_targets(&self, targets: &[Box<dyn MarketplaceApi>]) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            outcomes.push(self.run_target(target.as_ref()).await);
        }
        outcomes
    }

    /// Синхронизировать одну цель и разобрать результат для оператора
    pub async fn run_target(&self, api: &dyn MarketplaceApi) -> SyncOutcome {
        let session_id = Uuid::new_v4().to_string();
        let target = api.target_label();
        let span = tracing::info_span!(
            "sync",
            session_id = %session_id,
            marketplace = %api.marketplace(),
            target = %target
        );

        async {
            match self.sync_target(api, &session_id).await {
                Ok(report) => {
                    tracing::info!(
                        "Sync completed: {} stocks ({} in stock) in {} batches, {} prices in {} batches",
                        report.stocks.len(),
                        report.in_stock.len(),
                        report.stock_batches,
                        report.prices_sent,
                        report.price_batches
                    );
                    SyncOutcome::Completed(report)
                }
                Err(e) if e.is_recoverable() => {
                    let reason = operator_message(&e);
                    tracing::warn!("Sync skipped: {}", reason);
                    SyncOutcome::Skipped { target, reason }
                }
                Err(e) => {
                    tracing::error!("Sync failed: {}", e);
                    SyncOutcome::Failed {
                        target,
                        error: e.to_string(),
                    }
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Выполнить синхронизацию цели: каталог -> остатки -> цены
    pub async fn sync_target(
        &self,
        api: &dyn MarketplaceApi,
        session_id: &str,
    ) -> SyncResult<SyncReport> {
        let target = api.target_label();
        let limits = api.batch_limits();
        tracing::info!("Starting {} sync for session: {}", target, session_id);

        // Один общий неизменяемый список артикулов для остатков и цен
        let offer_ids = list_offer_identifiers(api).await?;

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let warehouse_id = api.warehouse_id();
        let stocks = reconcile_stock(
            &self.feed,
            &offer_ids,
            warehouse_id.as_deref(),
            Some(&timestamp),
        )?;

        let mut stock_batches = 0;
        for batch in split_into_batches(&stocks, limits.stock_batch_size) {
            api.submit_stock_batch(batch).await?;
            stock_batches += 1;
            tracing::info!(
                "Stock batch {} sent: {} items",
                stock_batches,
                batch.len()
            );
        }

        let prices = reconcile_prices(&self.feed, &offer_ids)?;

        let mut price_batches = 0;
        for batch in split_into_batches(&prices, limits.price_batch_size) {
            api.submit_price_batch(batch).await?;
            price_batches += 1;
            tracing::info!(
                "Price batch {} sent: {} items",
                price_batches,
                batch.len()
            );
        }

        let in_stock = stocks.iter().filter(|s| s.is_in_stock()).cloned().collect();

        Ok(SyncReport {
            session_id: session_id.to_string(),
            target,
            stocks,
            in_stock,
            stock_batches,
            prices_sent: prices.len(),
            price_batches,
        })
    }
}

fn operator_message(error: &SyncError) -> String {
    match error {
        SyncError::Timeout(details) => format!("Превышено время ожидания: {}", details),
        SyncError::Connectivity(details) => format!("Ошибка соединения: {}", details),
        other => other.to_string(),
    }
}

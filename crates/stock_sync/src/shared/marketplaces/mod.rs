use crate::shared::error::SyncResult;
use async_trait::async_trait;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u508_sync_stocks::{PricePayloadEntry, StockPayloadEntry};

/// Как маркетплейс сообщает, есть ли следующая страница каталога
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageProgress {
    /// Непрозрачный токен следующей страницы (Яндекс Маркет).
    /// Пустой или отсутствующий токен означает последнюю страницу.
    NextToken(Option<String>),

    /// Курсор по последнему id и общее количество товаров (OZON).
    /// Страницы заканчиваются, когда получено `total` товаров.
    Counted { last_id: String, total: usize },
}

/// Одна страница каталога маркетплейса
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub offer_ids: Vec<String>,
    pub progress: PageProgress,
}

/// Лимиты пачек на запись для конкретного аккаунта
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub stock_batch_size: usize,
    pub price_batch_size: usize,
}

/// Трейт для клиента маркетплейса.
///
/// Одна реализация обслуживает одну цель синхронизации: аккаунт OZON
/// или одну кампанию Яндекс Маркета со своим складом.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    fn marketplace(&self) -> MarketplaceType;

    /// Название цели для логов и отчета ("Ozon", "Яндекс Маркет FBS")
    fn target_label(&self) -> String;

    fn batch_limits(&self) -> BatchLimits;

    /// Склад, который подставляется в остатки
    fn warehouse_id(&self) -> Option<String> {
        None
    }

    /// Получить страницу каталога. Пустой курсор запрашивает первую страницу.
    async fn fetch_catalog_page(&self, cursor: &str) -> SyncResult<CatalogPage>;

    async fn submit_stock_batch(&self, batch: &[StockPayloadEntry]) -> SyncResult<()>;

    async fn submit_price_batch(&self, batch: &[PricePayloadEntry]) -> SyncResult<()>;
}

//! Запоминающая реализация MarketplaceApi для тестов пейджера и executor'а

use crate::shared::error::SyncResult;
use crate::shared::marketplaces::{BatchLimits, CatalogPage, MarketplaceApi, PageProgress};
use async_trait::async_trait;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u508_sync_stocks::{PricePayloadEntry, StockPayloadEntry};
use std::collections::VecDeque;
use std::sync::Mutex;

pub(crate) struct RecordingMarketplace {
    pub label: String,
    pub limits: BatchLimits,
    pub warehouse: Option<String>,
    pages: Mutex<VecDeque<SyncResult<CatalogPage>>>,
    stock_responses: Mutex<VecDeque<SyncResult<()>>>,
    price_responses: Mutex<VecDeque<SyncResult<()>>>,
    cursors: Mutex<Vec<String>>,
    stock_batches: Mutex<Vec<Vec<StockPayloadEntry>>>,
    price_batches: Mutex<Vec<Vec<PricePayloadEntry>>>,
}

impl RecordingMarketplace {
    pub fn with_pages(pages: Vec<SyncResult<CatalogPage>>) -> Self {
        Self {
            label: "Test".to_string(),
            limits: BatchLimits {
                stock_batch_size: 2,
                price_batch_size: 2,
            },
            warehouse: None,
            pages: Mutex::new(VecDeque::from(pages)),
            stock_responses: Mutex::new(VecDeque::new()),
            price_responses: Mutex::new(VecDeque::new()),
            cursors: Mutex::new(Vec::new()),
            stock_batches: Mutex::new(Vec::new()),
            price_batches: Mutex::new(Vec::new()),
        }
    }

    /// Каталог из одной страницы с указанными артикулами
    pub fn with_catalog(offer_ids: &[&str]) -> Self {
        Self::with_pages(vec![Ok(CatalogPage {
            offer_ids: offer_ids.iter().map(|s| s.to_string()).collect(),
            progress: PageProgress::NextToken(None),
        })])
    }

    pub fn with_stock_responses(self, responses: Vec<SyncResult<()>>) -> Self {
        *self.stock_responses.lock().unwrap() = VecDeque::from(responses);
        self
    }

    pub fn with_price_responses(self, responses: Vec<SyncResult<()>>) -> Self {
        *self.price_responses.lock().unwrap() = VecDeque::from(responses);
        self
    }

    pub fn cursors(&self) -> Vec<String> {
        self.cursors.lock().unwrap().clone()
    }

    pub fn stock_batches(&self) -> Vec<Vec<StockPayloadEntry>> {
        self.stock_batches.lock().unwrap().clone()
    }

    pub fn price_batches(&self) -> Vec<Vec<PricePayloadEntry>> {
        self.price_batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketplaceApi for RecordingMarketplace {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::Ozon
    }

    fn target_label(&self) -> String {
        self.label.clone()
    }

    fn batch_limits(&self) -> BatchLimits {
        self.limits
    }

    fn warehouse_id(&self) -> Option<String> {
        self.warehouse.clone()
    }

    async fn fetch_catalog_page(&self, cursor: &str) -> SyncResult<CatalogPage> {
        self.cursors.lock().unwrap().push(cursor.to_string());
        self.pages.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(CatalogPage {
                offer_ids: Vec::new(),
                progress: PageProgress::NextToken(None),
            })
        })
    }

    async fn submit_stock_batch(&self, batch: &[StockPayloadEntry]) -> SyncResult<()> {
        self.stock_batches.lock().unwrap().push(batch.to_vec());
        self.stock_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    async fn submit_price_batch(&self, batch: &[PricePayloadEntry]) -> SyncResult<()> {
        self.price_batches.lock().unwrap().push(batch.to_vec());
        self.price_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

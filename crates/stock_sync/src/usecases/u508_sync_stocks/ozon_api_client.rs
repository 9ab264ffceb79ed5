use crate::shared::config::OzonConfig;
use crate::shared::error::{SyncError, SyncResult};
use crate::shared::marketplaces::{BatchLimits, CatalogPage, MarketplaceApi, PageProgress};
use async_trait::async_trait;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u508_sync_stocks::{PricePayloadEntry, StockPayloadEntry};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const OZON_API_BASE: &str = "https://api-seller.ozon.ru";

/// Максимальный размер страницы /v2/product/list
pub const PRODUCT_LIST_LIMIT: i32 = 1000;

/// HTTP-клиент для работы с OZON Seller API
pub struct OzonApiClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    api_key: String,
    warehouse_id: Option<String>,
    limits: BatchLimits,
    api_log: Option<PathBuf>,
}

impl OzonApiClient {
    pub fn new(config: &OzonConfig) -> SyncResult<Self> {
        Self::with_base_url(config, OZON_API_BASE)
    }

    pub fn with_base_url(config: &OzonConfig, base_url: &str) -> SyncResult<Self> {
        if config.client_id.trim().is_empty() {
            return Err(SyncError::Config(
                "Client-Id is required for OZON API".into(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(SyncError::Config("Api-Key is required for OZON API".into()));
        }

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            api_key: config.api_key.clone(),
            warehouse_id: config.warehouse_id.clone(),
            limits: BatchLimits {
                stock_batch_size: config.stock_batch_size,
                price_batch_size: config.price_batch_size,
            },
            api_log: None,
        })
    }

    /// Дублировать запросы и ответы в `<dir>/ozon_api_requests.log`
    pub fn with_api_log(mut self, dir: PathBuf) -> Self {
        self.api_log = Some(dir.join("ozon_api_requests.log"));
        self
    }

    /// Записать в лог-файл
    fn log_to_file(&self, message: &str) {
        let Some(path) = &self.api_log else {
            return;
        };
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }

    /// POST с JSON-телом; любой не-2xx статус превращается в SyncError::Transport
    async fn post<B, R>(&self, endpoint: &str, request_body: &B) -> SyncResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let body = serde_json::to_string(request_body).map_err(|e| SyncError::Decode {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;
        self.log_to_file(&format!(
            "=== REQUEST ===\nPOST {}\nClient-Id: {}\nApi-Key: ****\nBody: {}",
            url, self.client_id, body
        ));

        let response = self
            .client
            .post(&url)
            .header("Client-Id", &self.client_id)
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!("OZON API request {} failed: {}", endpoint, body);
            return Err(SyncError::transport(endpoint, status.as_u16(), body));
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        let preview: String = body.chars().take(500).collect();
        tracing::debug!("OZON API {} response preview: {}", endpoint, preview);

        serde_json::from_str::<R>(&body).map_err(|e| {
            tracing::error!("Failed to parse OZON API response. Error: {}", e);
            SyncError::Decode {
                endpoint: endpoint.to_string(),
                message: format!("{}. Response: {}", e, preview),
            }
        })
    }

    /// Получить страницу списка товаров через POST /v2/product/list
    pub async fn fetch_product_list(&self, last_id: &str) -> SyncResult<OzonProductListResponse> {
        let request_body = OzonProductListRequest {
            filter: OzonProductListFilter {
                visibility: "ALL".to_string(),
            },
            last_id: last_id.to_string(),
            limit: PRODUCT_LIST_LIMIT,
        };
        self.post("/v2/product/list", &request_body).await
    }

    /// Обновить остатки через POST /v1/product/import/stocks (не больше 100 товаров)
    pub async fn update_stocks(&self, stocks: &[StockPayloadEntry]) -> SyncResult<serde_json::Value> {
        let request_body = OzonStocksRequest {
            stocks: stocks.iter().map(OzonStockItem::from).collect(),
        };
        self.post("/v1/product/import/stocks", &request_body).await
    }

    /// Обновить цены через POST /v1/product/import/prices (не больше 1000 товаров)
    pub async fn update_prices(&self, prices: &[PricePayloadEntry]) -> SyncResult<serde_json::Value> {
        let request_body = OzonPricesRequest {
            prices: prices.iter().map(OzonPriceItem::from).collect(),
        };
        self.post("/v1/product/import/prices", &request_body).await
    }
}

#[async_trait]
impl MarketplaceApi for OzonApiClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::Ozon
    }

    fn target_label(&self) -> String {
        MarketplaceType::Ozon.display_name().to_string()
    }

    fn batch_limits(&self) -> BatchLimits {
        self.limits
    }

    fn warehouse_id(&self) -> Option<String> {
        self.warehouse_id.clone()
    }

    async fn fetch_catalog_page(&self, cursor: &str) -> SyncResult<CatalogPage> {
        let response = self.fetch_product_list(cursor).await?;
        let result = response.result;
        Ok(CatalogPage {
            offer_ids: result.items.into_iter().map(|item| item.offer_id).collect(),
            progress: PageProgress::Counted {
                last_id: result.last_id,
                total: result.total.max(0) as usize,
            },
        })
    }

    async fn submit_stock_batch(&self, batch: &[StockPayloadEntry]) -> SyncResult<()> {
        self.update_stocks(batch).await.map(|_| ())
    }

    async fn submit_price_batch(&self, batch: &[PricePayloadEntry]) -> SyncResult<()> {
        self.update_prices(batch).await.map(|_| ())
    }
}

// ============================================================================
// Request/Response structures для OZON API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListRequest {
    pub filter: OzonProductListFilter,
    pub last_id: String,
    pub limit: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListFilter {
    pub visibility: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResponse {
    pub result: OzonProductListResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListResult {
    #[serde(default)]
    pub items: Vec<OzonProductListItem>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub last_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonProductListItem {
    #[serde(default)]
    pub product_id: i64,
    pub offer_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonStocksRequest {
    pub stocks: Vec<OzonStockItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OzonStockItem {
    pub offer_id: String,
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
}

impl From<&StockPayloadEntry> for OzonStockItem {
    fn from(entry: &StockPayloadEntry) -> Self {
        Self {
            offer_id: entry.offer_code.clone(),
            stock: entry.quantity,
            warehouse_id: entry.warehouse_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OzonPricesRequest {
    pub prices: Vec<OzonPriceItem>,
}

/// Цена в OZON передается строкой
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OzonPriceItem {
    pub auto_action_enabled: String,
    pub currency_code: String,
    pub offer_id: String,
    pub old_price: String,
    pub price: String,
}

impl From<&PricePayloadEntry> for OzonPriceItem {
    fn from(entry: &PricePayloadEntry) -> Self {
        Self {
            auto_action_enabled: "UNKNOWN".to_string(),
            currency_code: entry.currency.code().to_string(),
            offer_id: entry.offer_code.clone(),
            old_price: "0".to_string(),
            price: entry.unit_price.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::usecases::u508_sync_stocks::Currency;

    #[test]
    fn test_price_item_wire_format() {
        let item = OzonPriceItem::from(&PricePayloadEntry {
            offer_code: "A-1".into(),
            unit_price: 24570,
            currency: Currency::Rub,
        });
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({
                "auto_action_enabled": "UNKNOWN",
                "currency_code": "RUB",
                "offer_id": "A-1",
                "old_price": "0",
                "price": "24570"
            })
        );
    }

    #[test]
    fn test_stock_item_omits_missing_warehouse() {
        let item = OzonStockItem::from(&StockPayloadEntry {
            offer_code: "A-1".into(),
            quantity: 100,
            warehouse_id: None,
            timestamp: None,
        });
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            serde_json::json!({ "offer_id": "A-1", "stock": 100 })
        );
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config = OzonConfig::default();
        assert!(matches!(
            OzonApiClient::new(&config),
            Err(SyncError::Config(_))
        ));
    }
}

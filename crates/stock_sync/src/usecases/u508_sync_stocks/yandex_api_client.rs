use crate::shared::config::{YandexCampaignConfig, YandexConfig};
use crate::shared::error::{SyncError, SyncResult};
use crate::shared::marketplaces::{BatchLimits, CatalogPage, MarketplaceApi, PageProgress};
use async_trait::async_trait;
use contracts::enums::marketplace_type::MarketplaceType;
use contracts::usecases::u508_sync_stocks::{Currency, PricePayloadEntry, StockPayloadEntry};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const YANDEX_API_BASE: &str = "https://api.partner.market.yandex.ru";

/// Максимальный размер страницы offer-mapping-entries
pub const OFFER_MAPPING_LIMIT: i32 = 200;

/// HTTP-клиент для работы с Yandex Market Partner API в рамках одной кампании
pub struct YandexApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    campaign: YandexCampaignConfig,
    limits: BatchLimits,
    api_log: Option<PathBuf>,
}

impl YandexApiClient {
    pub fn new(config: &YandexConfig, campaign: &YandexCampaignConfig) -> SyncResult<Self> {
        Self::with_base_url(config, campaign, YANDEX_API_BASE)
    }

    pub fn with_base_url(
        config: &YandexConfig,
        campaign: &YandexCampaignConfig,
        base_url: &str,
    ) -> SyncResult<Self> {
        if config.token.trim().is_empty() {
            return Err(SyncError::Config(
                "Bearer token is required for Yandex Market API".into(),
            ));
        }
        if campaign.campaign_id.trim().is_empty() {
            return Err(SyncError::Config(format!(
                "Campaign ID is required for Yandex Market campaign {}",
                campaign.label
            )));
        }

        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            campaign: campaign.clone(),
            limits: BatchLimits {
                stock_batch_size: config.stock_batch_size,
                price_batch_size: config.price_batch_size,
            },
            api_log: None,
        })
    }

    /// Дублировать запросы и ответы в `<dir>/yandex_api_requests.log`
    pub fn with_api_log(mut self, dir: PathBuf) -> Self {
        self.api_log = Some(dir.join("yandex_api_requests.log"));
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

    fn campaign_endpoint(&self, tail: &str) -> String {
        format!("/campaigns/{}/{}", self.campaign.campaign_id, tail)
    }

    async fn send<R>(&self, request: reqwest::RequestBuilder, endpoint: &str) -> SyncResult<R>
    where
        R: DeserializeOwned,
    {
        let response = request
            .header("Authorization", format!("Bearer {}", &self.token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!("Yandex Market API request {} failed: {}", endpoint, body);
            return Err(SyncError::transport(endpoint, status.as_u16(), body));
        }

        let body = response.text().await?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));

        let preview: String = body.chars().take(500).collect();
        tracing::debug!("Yandex Market API {} response preview: {}", endpoint, preview);

        serde_json::from_str::<R>(&body).map_err(|e| {
            tracing::error!("Failed to parse Yandex Market API response. Error: {}", e);
            SyncError::Decode {
                endpoint: endpoint.to_string(),
                message: format!("{}. Response: {}", e, preview),
            }
        })
    }

    async fn send_json<B, R>(
        &self,
        method: Method,
        endpoint: &str,
        request_body: &B,
    ) -> SyncResult<R>
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
            "=== REQUEST ===\n{} {}\nAuthorization: Bearer ****\nBody: {}",
            method, url, body
        ));

        let request = self.client.request(method, &url).body(body);
        self.send(request, endpoint).await
    }

    /// Получить страницу сопоставлений офферов кампании
    /// Endpoint: GET /campaigns/{campaignId}/offer-mapping-entries
    pub async fn fetch_offer_mapping_entries(
        &self,
        page_token: &str,
    ) -> SyncResult<YandexOfferMappingResponse> {
        let endpoint = self.campaign_endpoint("offer-mapping-entries");
        let url = format!("{}{}", self.base_url, endpoint);

        #[derive(Serialize)]
        struct YandexListQueryParams<'a> {
            limit: i32,
            #[serde(skip_serializing_if = "Option::is_none")]
            page_token: Option<&'a str>,
        }

        let query = YandexListQueryParams {
            limit: OFFER_MAPPING_LIMIT,
            page_token: (!page_token.is_empty()).then_some(page_token),
        };

        let token_preview: String = page_token.chars().take(50).collect();
        self.log_to_file(&format!(
            "=== REQUEST ===\nGET {}\nAuthorization: Bearer ****\nQuery: limit={}, page_token={:?}",
            url, query.limit, token_preview
        ));

        let request = self.client.get(&url).query(&query);
        self.send(request, &endpoint).await
    }

    /// Обновить остатки: PUT /campaigns/{campaignId}/offers/stocks (не больше 2000 SKU)
    pub async fn update_stocks(&self, stocks: &[StockPayloadEntry]) -> SyncResult<serde_json::Value> {
        let endpoint = self.campaign_endpoint("offers/stocks");
        let fallback_updated_at = chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        let request_body = YandexStocksRequest {
            skus: stocks
                .iter()
                .map(|entry| {
                    YandexSkuStock::from_entry(
                        entry,
                        &self.campaign.warehouse_id,
                        &fallback_updated_at,
                    )
                })
                .collect(),
        };
        self.send_json(Method::PUT, &endpoint, &request_body).await
    }

    /// Обновить цены: POST /campaigns/{campaignId}/offer-prices/updates
    pub async fn update_prices(&self, prices: &[PricePayloadEntry]) -> SyncResult<serde_json::Value> {
        let endpoint = self.campaign_endpoint("offer-prices/updates");
        let request_body = YandexPricesRequest {
            offers: prices.iter().map(YandexOfferPrice::from).collect(),
        };
        self.send_json(Method::POST, &endpoint, &request_body).await
    }
}

#[async_trait]
impl MarketplaceApi for YandexApiClient {
    fn marketplace(&self) -> MarketplaceType {
        MarketplaceType::YandexMarket
    }

    fn target_label(&self) -> String {
        format!(
            "{} {}",
            MarketplaceType::YandexMarket.display_name(),
            self.campaign.label
        )
    }

    fn batch_limits(&self) -> BatchLimits {
        self.limits
    }

    fn warehouse_id(&self) -> Option<String> {
        Some(self.campaign.warehouse_id.clone())
    }

    async fn fetch_catalog_page(&self, cursor: &str) -> SyncResult<CatalogPage> {
        let response = self.fetch_offer_mapping_entries(cursor).await?;
        let result = response.result;
        Ok(CatalogPage {
            offer_ids: result
                .offer_mapping_entries
                .into_iter()
                .map(|entry| entry.offer.shop_sku)
                .collect(),
            progress: PageProgress::NextToken(result.paging.next_page_token),
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
// Request/Response structures для Yandex Market API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub result: YandexOfferMappingResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingResult {
    #[serde(rename = "offerMappingEntries", default)]
    pub offer_mapping_entries: Vec<YandexOfferMappingEntry>,
    #[serde(default)]
    pub paging: YandexPaging,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOfferMappingEntry {
    pub offer: YandexOffer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexOffer {
    #[serde(rename = "shopSku")]
    pub shop_sku: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YandexPaging {
    #[serde(rename = "nextPageToken", default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexStocksRequest {
    pub skus: Vec<YandexSkuStock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YandexSkuStock {
    pub sku: String,
    /// Числовой id склада, если он задан числом; иначе передается как есть
    #[serde(rename = "warehouseId")]
    pub warehouse_id: serde_json::Value,
    pub items: Vec<YandexStockItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YandexStockItem {
    pub count: i64,
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl YandexSkuStock {
    fn from_entry(
        entry: &StockPayloadEntry,
        campaign_warehouse: &str,
        fallback_updated_at: &str,
    ) -> Self {
        let warehouse = entry.warehouse_id.as_deref().unwrap_or(campaign_warehouse);
        let warehouse_id = warehouse
            .trim()
            .parse::<i64>()
            .map(serde_json::Value::from)
            .unwrap_or_else(|_| serde_json::Value::String(warehouse.to_string()));

        Self {
            sku: entry.offer_code.clone(),
            warehouse_id,
            items: vec![YandexStockItem {
                count: entry.quantity,
                item_type: "FIT".to_string(),
                updated_at: entry
                    .timestamp
                    .clone()
                    .unwrap_or_else(|| fallback_updated_at.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexPricesRequest {
    pub offers: Vec<YandexOfferPrice>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YandexOfferPrice {
    pub id: String,
    pub price: YandexPrice,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YandexPrice {
    pub value: i64,
    #[serde(rename = "currencyId")]
    pub currency_id: String,
}

/// Яндекс Маркет обозначает рубль кодом RUR
fn yandex_currency_code(currency: Currency) -> &'static str {
    match currency {
        Currency::Rub => "RUR",
    }
}

impl From<&PricePayloadEntry> for YandexOfferPrice {
    fn from(entry: &PricePayloadEntry) -> Self {
        Self {
            id: entry.offer_code.clone(),
            price: YandexPrice {
                value: entry.unit_price,
                currency_id: yandex_currency_code(entry.currency).to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sku_stock_wire_format() {
        let entry = StockPayloadEntry {
            offer_code: "W-1".into(),
            quantity: 100,
            warehouse_id: Some("12345".into()),
            timestamp: Some("2024-03-01T10:00:00Z".into()),
        };
        let sku = YandexSkuStock::from_entry(&entry, "999", "unused");
        assert_eq!(
            serde_json::to_value(&sku).unwrap(),
            serde_json::json!({
                "sku": "W-1",
                "warehouseId": 12345,
                "items": [{ "count": 100, "type": "FIT", "updatedAt": "2024-03-01T10:00:00Z" }]
            })
        );
    }

    #[test]
    fn test_sku_stock_falls_back_to_campaign_warehouse_and_now() {
        let entry = StockPayloadEntry {
            offer_code: "W-2".into(),
            quantity: 0,
            warehouse_id: None,
            timestamp: None,
        };
        let sku = YandexSkuStock::from_entry(&entry, "wh-main", "2024-03-01T00:00:00Z");
        assert_eq!(sku.warehouse_id, serde_json::json!("wh-main"));
        assert_eq!(sku.items[0].updated_at, "2024-03-01T00:00:00Z");
    }

    #[test]
    fn test_price_uses_rur_on_the_wire() {
        let price = YandexOfferPrice::from(&PricePayloadEntry {
            offer_code: "W-1".into(),
            unit_price: 24570,
            currency: Currency::Rub,
        });
        assert_eq!(
            serde_json::to_value(&price).unwrap(),
            serde_json::json!({ "id": "W-1", "price": { "value": 24570, "currencyId": "RUR" } })
        );
    }
}

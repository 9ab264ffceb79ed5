use super::error::{SyncError, SyncResult};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub feed: FeedConfig,
    #[serde(default)]
    pub ozon: OzonConfig,
    #[serde(default)]
    pub yandex: YandexConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Прайс поставщика: откуда скачивать и как читать таблицу
#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub url: String,
    /// Номер строки заголовка (с нуля); выше нее в файле шапка поставщика
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    #[serde(default = "default_code_column")]
    pub code_column: String,
    #[serde(default = "default_quantity_column")]
    pub quantity_column: String,
    #[serde(default = "default_price_column")]
    pub price_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OzonConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub warehouse_id: Option<String>,
    #[serde(default = "default_ozon_stock_batch")]
    pub stock_batch_size: usize,
    #[serde(default = "default_ozon_price_batch")]
    pub price_batch_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct YandexConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_yandex_stock_batch")]
    pub stock_batch_size: usize,
    #[serde(default = "default_yandex_price_batch")]
    pub price_batch_size: usize,
    #[serde(default)]
    pub campaigns: Vec<YandexCampaignConfig>,
}

/// Кампания Яндекс Маркета (FBS, DBS и т.п.) со своим складом
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct YandexCampaignConfig {
    pub label: String,
    #[serde(default)]
    pub campaign_id: String,
    #[serde(default)]
    pub warehouse_id: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggingConfig {
    /// Писать сырые запросы/ответы API в отдельные файлы рядом с логом
    #[serde(default)]
    pub api_log: bool,
}

fn default_header_row() -> usize {
    17
}

fn default_code_column() -> String {
    "Код".to_string()
}

fn default_quantity_column() -> String {
    "Количество".to_string()
}

fn default_price_column() -> String {
    "Цена".to_string()
}

fn default_ozon_stock_batch() -> usize {
    100
}

fn default_ozon_price_batch() -> usize {
    900
}

fn default_yandex_stock_batch() -> usize {
    2000
}

fn default_yandex_price_batch() -> usize {
    500
}

impl Default for OzonConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            api_key: String::new(),
            warehouse_id: None,
            stock_batch_size: default_ozon_stock_batch(),
            price_batch_size: default_ozon_price_batch(),
        }
    }
}

impl Default for YandexConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            stock_batch_size: default_yandex_stock_batch(),
            price_batch_size: default_yandex_price_batch(),
            campaigns: Vec::new(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[feed]
url = "https://timeworld.ru/upload/files/ostatki.zip"
header_row = 17

[ozon]
stock_batch_size = 100
price_batch_size = 900

[yandex]
stock_batch_size = 2000
price_batch_size = 500

[[yandex.campaigns]]
label = "FBS"

[[yandex.campaigns]]
label = "DBS"
"#;

/// Load configuration
///
/// Search order:
/// 1. Explicit path from the command line
/// 2. config.toml next to the executable
/// 3. Embedded default config
///
/// Environment variables are applied on top of whichever file was used.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match explicit {
        Some(path) => {
            tracing::info!("Loading config from: {}", path.display());
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<Config>(&contents)?
        }
        None => load_next_to_exe()?,
    };

    config.apply_env(|key| std::env::var(key).ok());
    config.validate()?;
    Ok(config)
}

fn load_next_to_exe() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                return Ok(toml::from_str(&contents)?);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

impl Config {
    /// Секреты и идентификаторы из окружения перекрывают значения из файла.
    /// Имена переменных совпадают с теми, что использовались в скриптах выгрузки.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SELLER_TOKEN") {
            self.ozon.api_key = v;
        }
        if let Some(v) = lookup("CLIENT_ID") {
            self.ozon.client_id = v;
        }
        if let Some(v) = lookup("MARKET_TOKEN") {
            self.yandex.token = v;
        }

        for (label, campaign_var, warehouse_var) in [
            ("FBS", "FBS_ID", "WAREHOUSE_FBS_ID"),
            ("DBS", "DBS_ID", "WAREHOUSE_DBS_ID"),
        ] {
            let campaign_id = lookup(campaign_var);
            let warehouse_id = lookup(warehouse_var);
            if campaign_id.is_none() && warehouse_id.is_none() {
                continue;
            }

            let idx = match self
                .yandex
                .campaigns
                .iter()
                .position(|c| c.label.eq_ignore_ascii_case(label))
            {
                Some(idx) => idx,
                None => {
                    self.yandex.campaigns.push(YandexCampaignConfig {
                        label: label.to_string(),
                        campaign_id: String::new(),
                        warehouse_id: String::new(),
                    });
                    self.yandex.campaigns.len() - 1
                }
            };

            let campaign = &mut self.yandex.campaigns[idx];
            if let Some(v) = campaign_id {
                campaign.campaign_id = v;
            }
            if let Some(v) = warehouse_id {
                campaign.warehouse_id = v;
            }
        }
    }

    pub fn validate(&self) -> SyncResult<()> {
        for (name, size) in [
            ("ozon.stock_batch_size", self.ozon.stock_batch_size),
            ("ozon.price_batch_size", self.ozon.price_batch_size),
            ("yandex.stock_batch_size", self.yandex.stock_batch_size),
            ("yandex.price_batch_size", self.yandex.price_batch_size),
        ] {
            if size == 0 {
                return Err(SyncError::Config(format!("{} must be greater than 0", name)));
            }
        }
        if self.feed.url.trim().is_empty() {
            return Err(SyncError::Config("feed.url is empty".into()));
        }
        Ok(())
    }

    pub fn validate_ozon(&self) -> SyncResult<()> {
        if self.ozon.client_id.trim().is_empty() {
            return Err(SyncError::Config(
                "Client-Id is required for OZON API (ozon.client_id or CLIENT_ID)".into(),
            ));
        }
        if self.ozon.api_key.trim().is_empty() {
            return Err(SyncError::Config(
                "Api-Key is required for OZON API (ozon.api_key or SELLER_TOKEN)".into(),
            ));
        }
        Ok(())
    }

    pub fn validate_yandex(&self) -> SyncResult<()> {
        if self.yandex.token.trim().is_empty() {
            return Err(SyncError::Config(
                "Bearer token is required for Yandex Market API (yandex.token or MARKET_TOKEN)"
                    .into(),
            ));
        }
        if self.yandex.campaigns.is_empty() {
            return Err(SyncError::Config("no Yandex Market campaigns configured".into()));
        }
        for campaign in &self.yandex.campaigns {
            if campaign.campaign_id.trim().is_empty() {
                return Err(SyncError::Config(format!(
                    "campaign_id is missing for Yandex campaign {}",
                    campaign.label
                )));
            }
            if campaign.warehouse_id.trim().is_empty() {
                return Err(SyncError::Config(format!(
                    "warehouse_id is missing for Yandex campaign {}",
                    campaign.label
                )));
            }
        }
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

/// Остаток одного оффера для отправки на маркетплейс
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPayloadEntry {
    pub offer_code: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    /// Время актуальности остатка (ISO 8601, UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl StockPayloadEntry {
    pub fn is_in_stock(&self) -> bool {
        self.quantity != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "RUB")]
    Rub,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rub => "RUB",
        }
    }
}

/// Цена одного оффера для отправки на маркетплейс
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePayloadEntry {
    pub offer_code: String,
    pub unit_price: i64,
    #[serde(default)]
    pub currency: Currency,
}

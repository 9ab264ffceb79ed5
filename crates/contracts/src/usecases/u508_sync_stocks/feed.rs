use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Строка прайса поставщика (одна строка таблицы остатков)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    /// Код товара поставщика, совпадает с артикулом оффера на маркетплейсе
    pub offer_code: String,

    /// Количество как в прайсе: "7", ">10", "1"
    pub quantity_raw: String,

    /// Цена как в прайсе: "24'570.00 руб."
    pub price_raw: String,

    /// Остальные колонки строки (наименование, модель и т.п.), не участвуют в сверке
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl FeedRecord {
    pub fn new(
        offer_code: impl Into<String>,
        quantity_raw: impl Into<String>,
        price_raw: impl Into<String>,
    ) -> Self {
        Self {
            offer_code: offer_code.into(),
            quantity_raw: quantity_raw.into(),
            price_raw: price_raw.into(),
            attributes: BTreeMap::new(),
        }
    }
}

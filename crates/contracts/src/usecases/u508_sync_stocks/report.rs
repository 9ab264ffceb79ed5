use super::payload::StockPayloadEntry;
use serde::{Deserialize, Serialize};

/// Итог синхронизации одной цели (аккаунта или кампании маркетплейса)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub session_id: String,
    pub target: String,
    /// Все остатки, отправленные на маркетплейс (включая нулевые)
    pub stocks: Vec<StockPayloadEntry>,
    /// Только ненулевые остатки, для отчета
    pub in_stock: Vec<StockPayloadEntry>,
    pub stock_batches: usize,
    pub prices_sent: usize,
    pub price_batches: usize,
}

/// Результат запуска синхронизации цели
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Синхронизация завершена
    Completed(SyncReport),

    /// Цель пропущена из-за таймаута или потери соединения
    Skipped { target: String, reason: String },

    /// Цель завершилась ошибкой
    Failed { target: String, error: String },
}

impl SyncOutcome {
    pub fn target(&self) -> &str {
        match self {
            SyncOutcome::Completed(report) => &report.target,
            SyncOutcome::Skipped { target, .. } | SyncOutcome::Failed { target, .. } => target,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SyncOutcome::Completed(_))
    }
}

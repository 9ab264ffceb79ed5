//! Ошибки синхронизации остатков

use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Маркетплейс ответил не-2xx статусом либо запрос не удалось выполнить
    #[error("{endpoint} request failed{}: {body}", status_suffix(.status))]
    Transport {
        endpoint: String,
        status: Option<u16>,
        body: String,
    },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection error: {0}")]
    Connectivity(String),

    /// Цена или количество из прайса не приводятся к числу
    #[error("invalid number format: {0}")]
    Format(String),

    #[error("failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },

    #[error("supplier feed error: {0}")]
    Feed(String),

    #[error("configuration error: {0}")]
    Config(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with status {}", code))
        .unwrap_or_default()
}

impl SyncError {
    pub fn transport(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        SyncError::Transport {
            endpoint: endpoint.into(),
            status: Some(status),
            body: body.into(),
        }
    }

    /// Таймаут и обрыв соединения не роняют весь запуск: цель пропускается
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SyncError::Timeout(_) | SyncError::Connectivity(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Timeout(e.to_string())
        } else if e.is_connect() {
            SyncError::Connectivity(e.to_string())
        } else {
            SyncError::Transport {
                endpoint: e
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_else(|| "unknown".into()),
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            }
        }
    }
}

impl From<zip::result::ZipError> for SyncError {
    fn from(e: zip::result::ZipError) -> Self {
        SyncError::Feed(format!("archive: {}", e))
    }
}

impl From<calamine::Error> for SyncError {
    fn from(e: calamine::Error) -> Self {
        SyncError::Feed(format!("spreadsheet: {}", e))
    }
}

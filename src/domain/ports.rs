use crate::domain::model::{
    CatalogItem, MessageResponse, PrescriptionRecord, RefillSuggestion, ResetTicket,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;

/// 藥品目錄來源（遠端 API 或離線示範資料）
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>>;
    fn source_name(&self) -> &str;
}

#[async_trait]
pub trait PrescriptionSource: Send + Sync {
    async fn my_prescriptions(&self) -> Result<Vec<PrescriptionRecord>>;
}

#[async_trait]
pub trait RefillSource: Send + Sync {
    async fn refill_suggestions(&self) -> Result<Vec<RefillSuggestion>>;
}

/// 外送人員帳號的密碼重設服務
#[async_trait]
pub trait DeliveryAccountService: Send + Sync {
    async fn forgot_password(&self, email: &str) -> Result<ResetTicket>;
    async fn reset_password(&self, token: &str, otp: &str, password: &str)
        -> Result<MessageResponse>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// 每次狀態轉換後送給通知端的訊息（對應前端的 toast）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.level, self.message)
    }
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

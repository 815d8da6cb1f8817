use crate::domain::money::{deserialize_amount, parse_amount};
use crate::utils::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 可購買的藥品，由目錄服務建立，在工作階段內不可變
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub prescription_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CatalogItem {
    pub fn new(id: &str, name: &str, price: Decimal, prescription_required: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            prescription_required,
            notes: None,
            image: None,
        }
    }

    /// 從 `/api/medicines` 的單筆記錄轉換，缺少必要欄位時拒絕
    pub fn from_payload(value: &serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| StoreError::malformed("medicine", "expected a JSON object"))?;

        let id = required_str(obj, "_id", "medicine")?;
        let name = required_str(obj, "name", "medicine")?;

        let price = match obj.get("price") {
            None | Some(serde_json::Value::Null) => {
                return Err(StoreError::malformed(
                    "medicine",
                    format!("{}: missing price", id),
                ))
            }
            Some(raw) => parse_amount(raw).ok_or_else(|| {
                StoreError::malformed("medicine", format!("{}: invalid price {}", id, raw))
            })?,
        };
        if price < Decimal::ZERO {
            return Err(StoreError::malformed(
                "medicine",
                format!("{}: negative price {}", id, price),
            ));
        }

        let prescription_required = match obj.get("prescriptionRequired") {
            None | Some(serde_json::Value::Null) => false,
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(StoreError::malformed(
                    "medicine",
                    format!("{}: prescriptionRequired must be a boolean, got {}", id, other),
                ))
            }
        };

        Ok(Self {
            id,
            name,
            price,
            prescription_required,
            notes: optional_str(obj, "notes"),
            image: optional_str(obj, "image"),
        })
    }
}

/// 購物車中的一行；數量恆大於等於 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrescriptionStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl PrescriptionStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub id: String,
    pub status: PrescriptionStatus,
    pub doctor_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PrescriptionRecord {
    /// 從 `/api/prescriptions/my-prescriptions` 的單筆記錄轉換
    pub fn from_payload(value: &serde_json::Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| StoreError::malformed("prescription", "expected a JSON object"))?;

        let id = required_str(obj, "_id", "prescription")?;

        let raw_status = obj
            .get("validation")
            .and_then(|v| v.get("status"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                StoreError::malformed("prescription", format!("{}: missing validation.status", id))
            })?;
        let status = PrescriptionStatus::parse(raw_status).ok_or_else(|| {
            StoreError::malformed(
                "prescription",
                format!("{}: unknown status '{}'", id, raw_status),
            )
        })?;

        let raw_created = required_str(obj, "createdAt", "prescription")?;
        let created_at = DateTime::parse_from_rfc3339(&raw_created)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                StoreError::malformed(
                    "prescription",
                    format!("{}: invalid createdAt '{}': {}", id, raw_created, e),
                )
            })?;

        let doctor_name = obj
            .get("doctor")
            .and_then(|d| d.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string);

        Ok(Self {
            id,
            status,
            doctor_name,
            created_at,
        })
    }
}

/// 最新建立的處方決定購物車所附的處方狀態
pub fn latest_prescription_status(records: &[PrescriptionRecord]) -> Option<PrescriptionStatus> {
    records
        .iter()
        .max_by_key(|r| r.created_at)
        .map(|r| r.status)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefillSuggestion {
    pub message: String,
}

/// 忘記密碼回應
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTicket {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentProvider {
    Razorpay,
    Stripe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Initiated,
    Success,
    Failed,
    Refunded,
}

fn default_currency() -> String {
    "INR".to_string()
}

/// 由外部金流流程寫入的付款記錄，本程式只讀不寫
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub order_id: String,
    pub provider: PaymentProvider,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub status: PaymentStatus,
    #[serde(default)]
    pub meta: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaymentRecord {
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| StoreError::malformed("payment", e.to_string()))
    }

    pub fn is_final(&self) -> bool {
        !matches!(self.status, PaymentStatus::Initiated)
    }

    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

fn required_str(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
    entity: &str,
) -> Result<String> {
    match obj.get(key).and_then(|v| v.as_str()) {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        Some(_) => Err(StoreError::malformed(entity, format!("empty '{}'", key))),
        None => Err(StoreError::malformed(
            entity,
            format!("missing or non-string '{}'", key),
        )),
    }
}

fn optional_str(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Disbursement channel. Stored and serialized in snake_case.
///
/// `Qris` is only reachable through updates: new payments must use one of
/// the three standard channels, but existing records may be switched to
/// QRIS afterwards.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Display, EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    EWallet,
    Qris,
}

impl PaymentMethod {
    /// Human-readable label used on printed receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::EWallet => "E-Wallet",
            PaymentMethod::Qris => "QRIS",
        }
    }
}

/// A disbursement event. Soft-deleted rows keep their data for audit but
/// never appear in listings or lookups.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "PMB-001",
        "employee_id": "KRY-001",
        "paid_at": "2026-01-31",
        "method": "bank_transfer",
        "receipt_path": null,
        "created_at": "2026-01-31T09:00:00Z",
        "updated_at": "2026-01-31T09:00:00Z"
    })
)]
pub struct PaymentRecord {
    #[schema(example = "PMB-001")]
    pub id: String,

    #[schema(example = "KRY-001")]
    pub employee_id: String,

    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub paid_at: NaiveDate,

    #[schema(example = "bank_transfer")]
    pub method: PaymentMethod,

    #[schema(example = "storage/receipts/PMB-001.txt", nullable = true)]
    pub receipt_path: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn method_round_trips_through_snake_case() {
        assert_eq!(PaymentMethod::BankTransfer.to_string(), "bank_transfer");
        assert_eq!(PaymentMethod::EWallet.to_string(), "e_wallet");
        assert_eq!(
            PaymentMethod::from_str("bank_transfer").unwrap(),
            PaymentMethod::BankTransfer
        );
        assert_eq!(PaymentMethod::from_str("qris").unwrap(), PaymentMethod::Qris);
        assert!(PaymentMethod::from_str("cheque").is_err());
    }

    #[test]
    fn method_labels_match_receipt_wording() {
        assert_eq!(PaymentMethod::BankTransfer.label(), "Bank Transfer");
        assert_eq!(PaymentMethod::EWallet.label(), "E-Wallet");
        assert_eq!(PaymentMethod::Qris.label(), "QRIS");
    }
}

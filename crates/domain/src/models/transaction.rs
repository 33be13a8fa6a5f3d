//! Billing transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::default_currency;
use crate::repository::{Resource, Scoping};
use crate::services::ServiceError;

text_enum!(
    TransactionStatus, "transaction status" {
        Pending => "pending",
        Paid => "paid",
        Failed => "failed",
        Refunded => "refunded",
    }
);

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub company_id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub amount_cents: i64,
    pub currency: String,
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub description: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    pub subscription_id: Option<Uuid>,
    #[validate(range(min = 1, message = "Amount must be positive"))]
    pub amount_cents: i64,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    #[serde(default)]
    pub status: TransactionStatus,
    #[validate(length(max = 50, message = "Payment method must be at most 50 characters"))]
    pub payment_method: Option<String>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(skip)]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTransactionRequest {
    pub status: Option<TransactionStatus>,
    #[validate(length(max = 50, message = "Payment method must be at most 50 characters"))]
    pub payment_method: Option<String>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[serde(skip)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Resource for Transaction {
    type Create = CreateTransactionRequest;
    type Update = UpdateTransactionRequest;

    const LABEL: &'static str = "transaction";
    const SCOPING: Scoping = Scoping::Tenant;

    fn id(&self) -> Uuid {
        self.id
    }

    fn company_id(&self) -> Option<Uuid> {
        Some(self.company_id)
    }

    fn prepare_create(
        input: &mut CreateTransactionRequest,
        _company_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        input.currency = input.currency.to_uppercase();
        if input.status == TransactionStatus::Paid {
            input.paid_at = Some(now);
        }
        Ok(())
    }

    fn prepare_update(
        input: &mut UpdateTransactionRequest,
        now: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        if input.status == Some(TransactionStatus::Paid) {
            input.paid_at = Some(now);
        }
        Ok(())
    }

    fn is_noop_update(input: &UpdateTransactionRequest) -> bool {
        input.status.is_none() && input.payment_method.is_none() && input.description.is_none()
    }

    fn materialize(
        id: Uuid,
        company_id: Option<Uuid>,
        input: &CreateTransactionRequest,
        now: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id,
            company_id: company_id.unwrap_or_default(),
            subscription_id: input.subscription_id,
            amount_cents: input.amount_cents,
            currency: input.currency.clone(),
            status: input.status,
            payment_method: input.payment_method.clone(),
            description: input.description.clone(),
            paid_at: input.paid_at,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: &UpdateTransactionRequest, now: DateTime<Utc>) {
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(method) = &input.payment_method {
            self.payment_method = Some(method.clone());
        }
        if let Some(description) = &input.description {
            self.description = Some(description.clone());
        }
        if let Some(at) = input.paid_at {
            self.paid_at = Some(at);
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_must_be_positive() {
        let req: CreateTransactionRequest =
            serde_json::from_str(r#"{"amount_cents":0}"#).unwrap();
        assert!(req.validate().is_err());
        assert_eq!(req.currency, "BRL");
        assert_eq!(req.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_paid_status_stamps_paid_at() {
        let now = Utc::now();
        let mut req: CreateTransactionRequest =
            serde_json::from_str(r#"{"amount_cents":9900,"currency":"usd","status":"paid"}"#)
                .unwrap();
        Transaction::prepare_create(&mut req, None, now).unwrap();
        assert_eq!(req.currency, "USD");
        assert_eq!(req.paid_at, Some(now));

        let mut update = UpdateTransactionRequest {
            status: Some(TransactionStatus::Refunded),
            ..Default::default()
        };
        Transaction::prepare_update(&mut update, now).unwrap();
        assert!(update.paid_at.is_none());
    }
}

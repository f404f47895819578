// payment.rs - Execution side: moves money once the guardrails approve.
//
// The engine makes no promise about what happens here. If execution fails
// the idempotency key stays committed; reconciliation is the caller's job.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sap_policy::PaymentIntent;

/// Failed executions surface as [`ExecutionError`], so a receipt only ever
/// reports success.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptStatus {
    Success,
}

/// Proof of an executed payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub id: String,
    pub status: ReceiptStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Bank Connection Timeout")]
    Timeout,
}

/// Something that can execute an approved payment.
#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    async fn execute(&self, intent: &PaymentIntent) -> Result<TransactionReceipt, ExecutionError>;
}

/// Simulated bank: waits, then fails with probability `failure_rate`.
#[derive(Debug, Clone)]
pub struct MockPaymentService {
    latency: Duration,
    failure_rate: f64,
}

impl MockPaymentService {
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }
}

impl Default for MockPaymentService {
    fn default() -> Self {
        Self::new(Duration::from_millis(800), 0.1)
    }
}

#[async_trait]
impl PaymentExecutor for MockPaymentService {
    async fn execute(&self, intent: &PaymentIntent) -> Result<TransactionReceipt, ExecutionError> {
        tracing::info!(
            currency = %intent.currency,
            amount = intent.amount,
            beneficiary = %intent.beneficiary,
            "connecting to bank"
        );

        // Decide up front: the thread-local RNG must not live across the await.
        let (fails, suffix) = {
            let mut rng = rand::thread_rng();
            let suffix: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(8)
                .map(|c| char::from(c).to_ascii_lowercase())
                .collect();
            (rng.gen_bool(self.failure_rate), suffix)
        };

        tokio::time::sleep(self.latency).await;

        if fails {
            return Err(ExecutionError::Timeout);
        }
        Ok(TransactionReceipt {
            id: format!("txn_{}", suffix),
            status: ReceiptStatus::Success,
            timestamp: Utc::now(),
        })
    }
}

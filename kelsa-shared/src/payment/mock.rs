/// In-process gateway for tests and local runs
///
/// Issues sequential order IDs (`order_mock_1`, `order_mock_2`, ...) and
/// records every accepted request. Can be switched into a failing or unconfigured
/// mode.

use super::gateway::{GatewayError, GatewayOrder, PaymentGateway};
use async_trait::async_trait;
use std::sync::Mutex;

/// A request the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

#[derive(Debug, Clone)]
enum Mode {
    Accept,
    Reject { code: String, message: String },
    Unconfigured,
}

#[derive(Debug)]
pub struct MockGateway {
    mode: Mutex<Mode>,
    requests: Mutex<Vec<OrderRequest>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            mode: Mutex::new(Mode::Accept),
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every following order with the given gateway error
    pub fn reject_with(&self, code: &str, message: &str) {
        *self.mode.lock().unwrap_or_else(|p| p.into_inner()) = Mode::Reject {
            code: code.to_string(),
            message: message.to_string(),
        };
    }

    /// Behaves as if credentials were missing
    pub fn unconfigure(&self) {
        *self.mode.lock().unwrap_or_else(|p| p.into_inner()) = Mode::Unconfigured;
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<OrderRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        amount: u64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let mode = self.mode.lock().unwrap_or_else(|p| p.into_inner()).clone();
        match mode {
            Mode::Unconfigured => return Err(GatewayError::NotConfigured("RAZORPAY_KEY_ID")),
            Mode::Reject { code, message } => return Err(GatewayError::Rejected { code, message }),
            Mode::Accept => {}
        }

        let mut requests = self.requests.lock().unwrap_or_else(|p| p.into_inner());
        requests.push(OrderRequest {
            amount,
            currency: currency.to_string(),
            receipt: receipt.to_string(),
        });

        Ok(GatewayOrder {
            id: format!("order_mock_{}", requests.len()),
            amount,
            currency: currency.to_string(),
        })
    }
}

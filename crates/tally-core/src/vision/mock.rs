//! Mock vision backend for testing
//!
//! Returns a fixed extracted bill regardless of the image, so flows can be
//! exercised without network access or an API key.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{RawBill, RawLineItem, RawSummary};

use super::VisionBackend;

/// Deterministic vision backend
#[derive(Clone, Default)]
pub struct MockVision {
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockVision {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create an unreachable mock backend
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }
}

#[async_trait]
impl VisionBackend for MockVision {
    async fn extract_bill(&self, _image_data: &[u8]) -> Result<RawBill> {
        Ok(RawBill {
            items: vec![
                RawLineItem {
                    name: "Masala Dosa".to_string(),
                    rate: Decimal::new(850, 2),
                    price: Decimal::new(1700, 2),
                },
                RawLineItem {
                    name: "Filter Coffee".to_string(),
                    rate: Decimal::new(300, 2),
                    price: Decimal::new(900, 2),
                },
                RawLineItem {
                    name: "Gulab Jamun".to_string(),
                    rate: Decimal::new(500, 2),
                    price: Decimal::new(500, 2),
                },
            ],
            summary: Some(RawSummary {
                subtotal: Decimal::new(3100, 2),
                tax: Decimal::new(310, 2),
                service_charge: Decimal::new(155, 2),
                discounts: Decimal::ZERO,
                total: Decimal::new(3565, 2),
            }),
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

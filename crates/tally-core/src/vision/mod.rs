//! Vision-service abstraction for receipt extraction
//!
//! This module provides a backend-agnostic interface for turning a receipt
//! photo into a structured [`RawBill`](crate::models::RawBill).
//!
//! # Architecture
//!
//! - `VisionBackend` trait: defines the extraction interface
//! - `VisionClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockVision`
//!
//! # Configuration
//!
//! Environment variables:
//! - `VISION_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for the gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-2.5-flash)

mod gemini;
mod mock;
pub mod parsing;

pub use gemini::GeminiBackend;
pub use mock::MockVision;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawBill;

/// Trait defining the interface for all vision backends
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Extract the structured bill from a receipt image
    async fn extract_bill(&self, image_data: &[u8]) -> Result<RawBill>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete vision client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum VisionClient {
    /// Google Gemini vision API
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockVision),
}

impl VisionClient {
    /// Create a vision client from environment variables
    ///
    /// Checks `VISION_BACKEND` to determine which backend to use:
    /// - `gemini` (default): Uses GEMINI_API_KEY and GEMINI_MODEL
    /// - `mock`: Deterministic backend for tests and development
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("VISION_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(VisionClient::Gemini),
            "mock" => Some(VisionClient::Mock(MockVision::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown VISION_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(VisionClient::Gemini)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        VisionClient::Mock(MockVision::new())
    }
}

#[async_trait]
impl VisionBackend for VisionClient {
    async fn extract_bill(&self, image_data: &[u8]) -> Result<RawBill> {
        match self {
            VisionClient::Gemini(b) => b.extract_bill(image_data).await,
            VisionClient::Mock(b) => b.extract_bill(image_data).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            VisionClient::Gemini(b) => b.health_check().await,
            VisionClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            VisionClient::Gemini(b) => b.model(),
            VisionClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            VisionClient::Gemini(b) => b.host(),
            VisionClient::Mock(b) => b.host(),
        }
    }
}

//! Tally Core Library
//!
//! The bill reconciliation and assignment engine behind the `tally` CLI:
//! - Exact decimal money math with lenient boundary parsing
//! - Receipt normalization: vision output into unit-priced line items
//! - A session ledger with the assign/skip/split flow and exact undo
//! - Proportional charge reconciliation with cent-level correction
//! - Bill editing with full regeneration of downstream totals
//! - Pluggable vision backends (Gemini, mock) for receipt extraction
//!
//! The engine is fully synchronous and memory-only; the async boundary is
//! the single vision-service round trip per receipt.

pub mod error;
pub mod ledger;
pub mod models;
pub mod money;
pub mod normalize;
pub mod split;
pub mod summary;
pub mod vision;

pub use error::{Error, Result};
pub use ledger::{
    consolidate_items, live_totals, ActionLogEntry, EditTotals, Ledger, MAX_PEOPLE, MIN_PEOPLE,
};
pub use models::{
    BillRow, BillSnapshot, ChargeSummary, Discount, EditedCharges, ItemId, LineItem,
    NormalizedBill, Person, PersonId, PersonTotal, RawBill, RawLineItem, RawSummary,
    ReconciledTotals, SaveOutcome, SplitInfo, SubtotalMismatch,
};
pub use normalize::normalize_bill;
pub use summary::render_settlement;
pub use vision::{GeminiBackend, MockVision, VisionBackend, VisionClient};

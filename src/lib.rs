#![doc(test(attr(deny(warnings))))]

//! FinTrack Core offers the ledger, aggregation, and budget-tracking
//! primitives that power higher level personal-finance frontends.

pub mod budget;
pub mod config;
pub mod errors;
pub mod insights;
pub mod ledger;
pub mod report;
pub mod storage;
pub mod time;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("FinTrack Core tracing initialized.");
    });
}

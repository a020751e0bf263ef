//! Reconciliation engine
//!
//! Pure merge of fetch outcomes into renderable state, plus the clock that
//! supplies cache-busting tokens.

pub mod clock;
pub mod reconcile;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reconcile::{ChartRef, ReconciledModel, ReconciledState, reconcile};

//! Background track reconciliation.

/// Trim or loop a decoded track to the timeline length.
pub mod reconcile;

pub mod ledger;
pub mod rates;

pub use ledger::{CostEntry, CostLedger, LedgerSummary, TierTotals};
pub use rates::{RateTable, TierRate, calculate_cost};

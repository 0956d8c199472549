use serde::{Deserialize, Serialize};

use crate::calendar::MonthKey;
use crate::decimal::{Money, Rate};
use crate::engine::AllocationOutcome;

/// the single current-month snapshot dashboards consume
///
/// receivable is contractual demand (sum of eligible tenants' rates),
/// independent of whether anything was ever invoiced; invoiced, received
/// and outstanding come from the recognized amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentMetrics {
    pub month: MonthKey,
    pub total_receivable: Money,
    pub invoiced: Money,
    pub received: Money,
    pub outstanding: Money,
    /// received over receivable as a percentage, zero when nothing is
    /// receivable
    pub collection_rate: Rate,
}

impl RentMetrics {
    /// metrics for one grid month, `None` if the month is outside the
    /// analyzed window
    pub fn for_month(outcome: &AllocationOutcome, month: MonthKey) -> Option<RentMetrics> {
        let summary = outcome.summaries.iter().find(|s| s.month == month)?;

        let receivable = outcome.monthly_demand;
        Some(RentMetrics {
            month,
            total_receivable: receivable,
            invoiced: summary.total_recognized,
            received: summary.total_paid,
            outstanding: summary.total_unpaid,
            collection_rate: Rate::from_ratio(summary.total_paid, receivable),
        })
    }

    /// metrics for the reference month of the run
    pub fn current(outcome: &AllocationOutcome) -> RentMetrics {
        Self::for_month(outcome, outcome.reference_month)
            .expect("reference month is always on the grid")
    }
}

use serde::{Deserialize, Serialize};

use crate::allocation::resolver::TenantAllocation;
use crate::calendar::{MonthGrid, MonthKey};
use crate::decimal::Money;

/// cross-tenant totals for one calendar month
///
/// the only allocation output that crosses to dashboards. draft amounts
/// count in total_recognized but in neither settlement split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub total_recognized: Money,
    pub total_paid: Money,
    pub total_unpaid: Money,
    pub contributing_tenants: u32,
}

/// folds resolved per-tenant allocations into a dense per-month series
pub struct MonthlyAggregator<'a> {
    grid: &'a MonthGrid,
}

impl<'a> MonthlyAggregator<'a> {
    pub fn new(grid: &'a MonthGrid) -> Self {
        Self { grid }
    }

    /// one summary per grid month, zero months included, so dashboards
    /// always get a gap-free series
    pub fn aggregate(&self, allocations: &[TenantAllocation]) -> Vec<MonthlySummary> {
        self.grid
            .months()
            .iter()
            .map(|grid_month| {
                let mut summary = MonthlySummary {
                    month: grid_month.key,
                    total_recognized: Money::ZERO,
                    total_paid: Money::ZERO,
                    total_unpaid: Money::ZERO,
                    contributing_tenants: 0,
                };

                for allocation in allocations {
                    let resolved = match allocation.months.get(&grid_month.key) {
                        Some(resolved) => resolved,
                        None => continue,
                    };
                    if resolved.amount.is_zero() {
                        continue;
                    }

                    let split = resolved.combined_split();
                    summary.total_recognized += resolved.amount;
                    summary.total_paid += split.paid;
                    summary.total_unpaid += split.unpaid;
                    summary.contributing_tenants += 1;
                }

                summary
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{CapResolver, MonthContribution};
    use crate::calendar::AnalysisWindow;
    use crate::types::{IssuedState, PaymentState, TenantId};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn contribution(
        tenant_id: TenantId,
        month: MonthKey,
        amount: Money,
        payment_state: PaymentState,
        issued_state: IssuedState,
    ) -> MonthContribution {
        MonthContribution {
            tenant_id,
            month,
            amount,
            source_record: Uuid::new_v4(),
            payment_state,
            issued_state,
            capped: false,
        }
    }

    #[test]
    fn test_dense_series_includes_zero_months() {
        let grid = MonthGrid::build(d(2024, 6, 1), AnalysisWindow::new(1, 1)).unwrap();
        let aggregator = MonthlyAggregator::new(&grid);

        let summaries = aggregator.aggregate(&[]);
        assert_eq!(summaries.len(), 3);
        for summary in &summaries {
            assert_eq!(summary.total_recognized, Money::ZERO);
            assert_eq!(summary.contributing_tenants, 0);
        }
        // ordered by month
        assert_eq!(summaries[0].month, MonthKey::new(2024, 5));
        assert_eq!(summaries[2].month, MonthKey::new(2024, 7));
    }

    #[test]
    fn test_totals_sum_across_tenants_with_splits() {
        let grid = MonthGrid::build(d(2024, 6, 1), AnalysisWindow::new(0, 0)).unwrap();
        let resolver = CapResolver::new(&grid);
        let june = MonthKey::new(2024, 6);

        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let allocations = vec![
            resolver.resolve(
                tenant_a,
                Money::from_major(3_500),
                vec![contribution(
                    tenant_a,
                    june,
                    Money::from_major(3_500),
                    PaymentState::Paid,
                    IssuedState::Issued,
                )],
            ),
            resolver.resolve(
                tenant_b,
                Money::from_major(2_000),
                vec![contribution(
                    tenant_b,
                    june,
                    Money::from_major(2_000),
                    PaymentState::Unpaid,
                    IssuedState::Issued,
                )],
            ),
        ];

        let aggregator = MonthlyAggregator::new(&grid);
        let summaries = aggregator.aggregate(&allocations);

        assert_eq!(summaries.len(), 1);
        let june_summary = &summaries[0];
        assert_eq!(june_summary.total_recognized, Money::from_major(5_500));
        assert_eq!(june_summary.total_paid, Money::from_major(3_500));
        assert_eq!(june_summary.total_unpaid, Money::from_major(2_000));
        assert_eq!(june_summary.contributing_tenants, 2);
    }

    #[test]
    fn test_draft_counts_in_recognized_but_no_split() {
        let grid = MonthGrid::build(d(2024, 6, 1), AnalysisWindow::new(0, 0)).unwrap();
        let resolver = CapResolver::new(&grid);
        let june = MonthKey::new(2024, 6);
        let tenant = Uuid::new_v4();

        let allocation = resolver.resolve(
            tenant,
            Money::from_major(1_000),
            vec![contribution(
                tenant,
                june,
                Money::from_major(1_000),
                PaymentState::Unpaid,
                IssuedState::Draft,
            )],
        );

        let aggregator = MonthlyAggregator::new(&grid);
        let summaries = aggregator.aggregate(&[allocation]);

        assert_eq!(summaries[0].total_recognized, Money::from_major(1_000));
        assert_eq!(summaries[0].total_paid, Money::ZERO);
        assert_eq!(summaries[0].total_unpaid, Money::ZERO);
        assert_eq!(summaries[0].contributing_tenants, 1);
    }

    #[test]
    fn test_redistributed_amounts_flow_into_splits() {
        // tenant capped in june; moved money keeps its paid state
        let grid = MonthGrid::build(d(2024, 6, 1), AnalysisWindow::new(0, 1)).unwrap();
        let resolver = CapResolver::new(&grid);
        let june = MonthKey::new(2024, 6);
        let tenant = Uuid::new_v4();
        let rate = Money::from_major(2_000);

        let allocation = resolver.resolve(
            tenant,
            rate,
            vec![
                contribution(
                    tenant,
                    june,
                    Money::from_major(3_000),
                    PaymentState::Paid,
                    IssuedState::Issued,
                ),
            ],
        );

        let aggregator = MonthlyAggregator::new(&grid);
        let summaries = aggregator.aggregate(&[allocation]);

        let total_paid: Money = summaries.iter().map(|s| s.total_paid).sum();
        let total: Money = summaries.iter().map(|s| s.total_recognized).sum();
        // all 3000 was paid cash, so the splits say so across both months
        assert_eq!(total, Money::from_major(3_000));
        assert_eq!(total_paid, Money::from_major(3_000));

        // splits never exceed what was recognized
        for summary in summaries {
            assert!(summary.total_paid + summary.total_unpaid <= summary.total_recognized);
        }
    }
}

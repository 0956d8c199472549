use crate::allocation::coverage::month_overlap;
use crate::allocation::MonthContribution;
use crate::calendar::MonthGrid;
use crate::decimal::Money;
use crate::types::BillingRecord;

/// converts one billing record into per-month contributions
///
/// contributions are always derived from the tenant's monthly rate, never
/// from the record's face amount: a record that fully spans a month
/// recognizes exactly one month of rent no matter what is printed on it,
/// and partial coverage recognizes a day-weighted share of the rate.
pub struct Apportioner<'a> {
    grid: &'a MonthGrid,
}

impl<'a> Apportioner<'a> {
    pub fn new(grid: &'a MonthGrid) -> Self {
        Self { grid }
    }

    /// one contribution per month the record's coverage touches
    pub fn apportion(&self, record: &BillingRecord, monthly_rate: Money) -> Vec<MonthContribution> {
        let mut contributions = Vec::new();

        for month in self.grid.months() {
            let overlap = match month_overlap(&record.coverage, month) {
                Some(overlap) => overlap,
                None => continue,
            };

            let amount = if overlap.full_month {
                monthly_rate
            } else {
                monthly_rate.prorate_days(overlap.overlap_days, overlap.month_days)
            };

            // clamp against anomalies; one record never exceeds the rate
            // in one month, and zero-day or negative intermediates never
            // reach the sums
            let amount = amount.min(monthly_rate).max(Money::ZERO);
            if amount.is_zero() {
                continue;
            }

            contributions.push(MonthContribution {
                tenant_id: record.tenant_id,
                month: month.key,
                amount,
                source_record: record.id,
                payment_state: record.payment_state,
                issued_state: record.issued_state,
                capped: false,
            });
        }

        contributions
    }
}

//! the allocation pipeline: overlap -> apportion -> resolve -> aggregate

pub mod aggregate;
pub mod apportion;
pub mod coverage;
pub mod resolver;

pub use aggregate::{MonthlyAggregator, MonthlySummary};
pub use apportion::Apportioner;
pub use coverage::{month_overlap, CoverageOverlap};
pub use resolver::{CapResolver, ResolvedMonth, TenantAllocation};

use serde::{Deserialize, Serialize};

use crate::calendar::MonthKey;
use crate::decimal::Money;
use crate::types::{IssuedState, PaymentState, RecordId, TenantId};

/// one record's contribution to one calendar month
///
/// ephemeral: created fresh on every run, scaled in place by the resolver,
/// discarded after aggregation. never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthContribution {
    pub tenant_id: TenantId,
    pub month: MonthKey,
    pub amount: Money,
    pub source_record: RecordId,
    pub payment_state: PaymentState,
    pub issued_state: IssuedState,
    pub capped: bool,
}

impl MonthContribution {
    /// which settlement bucket this contribution's money belongs to
    pub fn bucket(&self) -> SettlementBucket {
        match (self.issued_state, self.payment_state) {
            (IssuedState::Draft, _) => SettlementBucket::Draft,
            (IssuedState::Issued, PaymentState::Paid) => SettlementBucket::Paid,
            (IssuedState::Issued, PaymentState::Unpaid) => SettlementBucket::Unpaid,
        }
    }
}

/// settlement bucket of a contribution's money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementBucket {
    Paid,
    Unpaid,
    Draft,
}

/// paid / unpaid / draft composition of a month's amount
///
/// paid means paid AND issued; unpaid means issued but not paid; draft
/// means not issued. the three buckets always sum to the month amount
/// they describe, exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StateSplit {
    pub paid: Money,
    pub unpaid: Money,
    pub draft: Money,
}

impl StateSplit {
    pub const ZERO: StateSplit = StateSplit {
        paid: Money::ZERO,
        unpaid: Money::ZERO,
        draft: Money::ZERO,
    };

    pub fn total(&self) -> Money {
        self.paid + self.unpaid + self.draft
    }

    pub fn add(&mut self, bucket: SettlementBucket, amount: Money) {
        match bucket {
            SettlementBucket::Paid => self.paid += amount,
            SettlementBucket::Unpaid => self.unpaid += amount,
            SettlementBucket::Draft => self.draft += amount,
        }
    }

    /// sum the split of a batch of contributions
    pub fn of_contributions(contributions: &[MonthContribution]) -> StateSplit {
        let mut split = StateSplit::ZERO;
        for c in contributions {
            split.add(c.bucket(), c.amount);
        }
        split
    }

    /// scale this composition so its buckets sum to exactly `target`
    ///
    /// each bucket keeps its proportional share; the rounding crumb is
    /// swept into the largest bucket (paid wins ties, then unpaid) so the
    /// result is deterministic and sums to target exactly. a zero split
    /// scaled to a non-zero target puts everything in unpaid.
    pub fn scaled_to(&self, target: Money) -> StateSplit {
        let total = self.total();
        if total.is_zero() {
            return StateSplit {
                paid: Money::ZERO,
                unpaid: target,
                draft: Money::ZERO,
            };
        }

        let mut scaled = StateSplit {
            paid: self.paid.prorate(target.as_decimal(), total.as_decimal()),
            unpaid: self.unpaid.prorate(target.as_decimal(), total.as_decimal()),
            draft: self.draft.prorate(target.as_decimal(), total.as_decimal()),
        };

        let crumb = target - scaled.total();
        if !crumb.is_zero() {
            if scaled.paid >= scaled.unpaid && scaled.paid >= scaled.draft {
                scaled.paid += crumb;
            } else if scaled.unpaid >= scaled.draft {
                scaled.unpaid += crumb;
            } else {
                scaled.draft += crumb;
            }
        }
        scaled
    }
}

impl std::ops::Add for StateSplit {
    type Output = StateSplit;

    fn add(self, other: StateSplit) -> StateSplit {
        StateSplit {
            paid: self.paid + other.paid,
            unpaid: self.unpaid + other.unpaid,
            draft: self.draft + other.draft,
        }
    }
}

impl std::ops::AddAssign for StateSplit {
    fn add_assign(&mut self, other: StateSplit) {
        self.paid += other.paid;
        self.unpaid += other.unpaid;
        self.draft += other.draft;
    }
}

impl std::ops::Sub for StateSplit {
    type Output = StateSplit;

    fn sub(self, other: StateSplit) -> StateSplit {
        StateSplit {
            paid: self.paid - other.paid,
            unpaid: self.unpaid - other.unpaid,
            draft: self.draft - other.draft,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bucket_classification() {
        let contribution = |payment_state, issued_state| MonthContribution {
            tenant_id: uuid::Uuid::new_v4(),
            month: MonthKey::new(2024, 3),
            amount: Money::from_major(100),
            source_record: uuid::Uuid::new_v4(),
            payment_state,
            issued_state,
            capped: false,
        };

        assert_eq!(
            contribution(PaymentState::Paid, IssuedState::Issued).bucket(),
            SettlementBucket::Paid
        );
        assert_eq!(
            contribution(PaymentState::Unpaid, IssuedState::Issued).bucket(),
            SettlementBucket::Unpaid
        );
        // a paid draft is not settled cash
        assert_eq!(
            contribution(PaymentState::Paid, IssuedState::Draft).bucket(),
            SettlementBucket::Draft
        );
    }

    #[test]
    fn test_scaled_split_sums_to_target_exactly() {
        let split = StateSplit {
            paid: Money::from_decimal(dec!(1000)),
            unpaid: Money::from_decimal(dec!(500)),
            draft: Money::from_decimal(dec!(166.67)),
        };

        let target = Money::from_decimal(dec!(1111.11));
        let scaled = split.scaled_to(target);
        assert_eq!(scaled.total(), target);

        // proportions survive within rounding
        assert!(scaled.paid > scaled.unpaid);
        assert!(scaled.unpaid > scaled.draft);
    }

    #[test]
    fn test_zero_split_scales_into_unpaid() {
        let scaled = StateSplit::ZERO.scaled_to(Money::from_major(250));
        assert_eq!(scaled.unpaid, Money::from_major(250));
        assert_eq!(scaled.paid, Money::ZERO);
        assert_eq!(scaled.draft, Money::ZERO);
    }
}

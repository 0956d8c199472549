use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::allocation::{MonthContribution, StateSplit};
use crate::calendar::{MonthGrid, MonthKey};
use crate::decimal::Money;
use crate::issues::UnresolvedOverflow;
use crate::types::TenantId;

/// one month of a tenant's allocation after capping and redistribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMonth {
    pub month: MonthKey,
    /// recognized amount for the month, never above the monthly rate
    pub amount: Money,
    pub was_capped: bool,
    pub was_redistributed: bool,
    /// synthetic amount moved in from capped months, kept visible rather
    /// than merged into any record's amount
    pub redistributed_amount: Money,
    pub redistributed_split: StateSplit,
    /// excess attributed to this month that fit nowhere in the window
    pub unresolved_overflow: Money,
    /// settlement composition of the record-level detail
    pub split: StateSplit,
    /// record-level detail; sums to `amount - redistributed_amount`
    pub contributions: Vec<MonthContribution>,
}

impl ResolvedMonth {
    /// composition of the whole month amount, record detail plus
    /// redistributed additions
    pub fn combined_split(&self) -> StateSplit {
        self.split + self.redistributed_split
    }
}

/// a tenant's fully resolved window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantAllocation {
    pub tenant_id: TenantId,
    pub monthly_rate: Money,
    pub months: BTreeMap<MonthKey, ResolvedMonth>,
    /// pre-cap demand summed over all months
    pub raw_total: Money,
    /// recognized amount summed over all months after redistribution
    pub resolved_total: Money,
    /// demand that fit nowhere in the window
    pub unresolved_total: Money,
}

impl TenantAllocation {
    /// report rows for overflow that could not be placed
    pub fn overflow_rows(&self) -> Vec<UnresolvedOverflow> {
        self.months
            .values()
            .filter(|m| m.unresolved_overflow.is_positive())
            .map(|m| UnresolvedOverflow {
                tenant_id: self.tenant_id,
                month: m.month,
                amount: m.unresolved_overflow,
            })
            .collect()
    }
}

/// caps each month of one tenant at the monthly rate and moves the pooled
/// overflow into months with spare capacity
///
/// all ordering is by month key and record id; record insertion order
/// never influences the result, so reruns are reproducible regardless of
/// how documents were entered.
pub struct CapResolver<'a> {
    grid: &'a MonthGrid,
}

impl<'a> CapResolver<'a> {
    pub fn new(grid: &'a MonthGrid) -> Self {
        Self { grid }
    }

    pub fn resolve(
        &self,
        tenant_id: TenantId,
        monthly_rate: Money,
        contributions: Vec<MonthContribution>,
    ) -> TenantAllocation {
        // 1. bucket by month, deterministically ordered
        let mut by_month: BTreeMap<MonthKey, Vec<MonthContribution>> = BTreeMap::new();
        for c in contributions {
            by_month.entry(c.month).or_default().push(c);
        }
        for batch in by_month.values_mut() {
            batch.sort_by_key(|c| c.source_record);
        }

        let raw_total: Money = by_month
            .values()
            .flatten()
            .map(|c| c.amount)
            .sum();

        // 2/3. cap over-full months, scale their record detail, and note
        // spare capacity elsewhere
        let mut months: BTreeMap<MonthKey, ResolvedMonth> = BTreeMap::new();
        let mut available: BTreeMap<MonthKey, Money> = BTreeMap::new();
        let mut excess: BTreeMap<MonthKey, Money> = BTreeMap::new();
        let mut total_excess = Money::ZERO;
        let mut excess_pool_split = StateSplit::ZERO;

        for (month, mut batch) in by_month {
            let raw: Money = batch.iter().map(|c| c.amount).sum();
            let raw_split = StateSplit::of_contributions(&batch);

            let resolved = if raw > monthly_rate {
                let over = raw - monthly_rate;
                scale_contributions(&mut batch, monthly_rate, raw);

                let capped_split = raw_split.scaled_to(monthly_rate);
                excess_pool_split += raw_split - capped_split;
                excess.insert(month, over);
                total_excess += over;

                ResolvedMonth {
                    month,
                    amount: monthly_rate,
                    was_capped: true,
                    was_redistributed: false,
                    redistributed_amount: Money::ZERO,
                    redistributed_split: StateSplit::ZERO,
                    unresolved_overflow: Money::ZERO,
                    split: capped_split,
                    contributions: batch,
                }
            } else {
                if raw < monthly_rate {
                    available.insert(month, monthly_rate - raw);
                }
                ResolvedMonth {
                    month,
                    amount: raw,
                    was_capped: false,
                    was_redistributed: false,
                    redistributed_amount: Money::ZERO,
                    redistributed_split: StateSplit::ZERO,
                    unresolved_overflow: Money::ZERO,
                    split: raw_split,
                    contributions: batch,
                }
            };
            months.insert(month, resolved);
        }

        // grid months the tenant has no contributions in are still
        // capacity for redistribution
        for grid_month in self.grid.months() {
            if !months.contains_key(&grid_month.key) {
                available.insert(grid_month.key, monthly_rate);
            }
        }

        // 4/5. pool the excess and pour it into spare capacity,
        // proportionally to each month's available space
        let mut unresolved_total = Money::ZERO;
        if total_excess.is_positive() {
            let total_space: Money = available.values().copied().sum();
            let to_place = total_excess.min(total_space);

            if to_place.is_positive() {
                let gains = proportional_fill(&available, to_place, total_space);
                for (month, gain) in gains {
                    let entry = months.entry(month).or_insert_with(|| ResolvedMonth {
                        month,
                        amount: Money::ZERO,
                        was_capped: false,
                        was_redistributed: false,
                        redistributed_amount: Money::ZERO,
                        redistributed_split: StateSplit::ZERO,
                        unresolved_overflow: Money::ZERO,
                        split: StateSplit::ZERO,
                        contributions: Vec::new(),
                    });
                    entry.amount += gain;
                    entry.was_redistributed = true;
                    entry.redistributed_amount += gain;
                    // synthetic amounts inherit the settlement mix of
                    // what was capped out
                    entry.redistributed_split += excess_pool_split.scaled_to(gain);
                }
            }

            // residual that fit nowhere is attributed back to the capped
            // months, proportional to each month's share of the excess
            let residual = total_excess - to_place;
            if residual.is_positive() {
                unresolved_total = residual;
                attribute_residual(&mut months, &excess, residual, total_excess);
            }
        }

        let resolved_total: Money = months.values().map(|m| m.amount).sum();

        TenantAllocation {
            tenant_id,
            monthly_rate,
            months,
            raw_total,
            resolved_total,
            unresolved_total,
        }
    }
}

/// scale record detail down to the capped total, proportionally to each
/// record's share of the raw total
///
/// the batch is already sorted by record id; the last contribution absorbs
/// the rounding crumb so the detail sums to `capped` exactly.
fn scale_contributions(batch: &mut [MonthContribution], capped: Money, raw: Money) {
    let mut assigned = Money::ZERO;
    let last = batch.len() - 1;
    for (i, c) in batch.iter_mut().enumerate() {
        let scaled = if i == last {
            capped - assigned
        } else {
            c.amount.prorate(capped.as_decimal(), raw.as_decimal())
        };
        c.amount = scaled;
        c.capped = true;
        assigned += scaled;
    }
}

/// split `to_place` across months proportionally to their available space
///
/// every gain stays within its month's space. rounding crumbs are swept in
/// month order into whatever room is left, so the gains sum to `to_place`
/// exactly.
fn proportional_fill(
    available: &BTreeMap<MonthKey, Money>,
    to_place: Money,
    total_space: Money,
) -> Vec<(MonthKey, Money)> {
    let mut gains: Vec<(MonthKey, Money)> = Vec::new();
    let mut placed = Money::ZERO;

    for (&month, &space) in available {
        let gain = to_place
            .prorate(space.as_decimal(), total_space.as_decimal())
            .min(space);
        if gain.is_positive() {
            gains.push((month, gain));
            placed += gain;
        } else {
            gains.push((month, Money::ZERO));
        }
    }

    let mut leftover = to_place - placed;
    if leftover.is_positive() {
        for (month, gain) in gains.iter_mut() {
            if !leftover.is_positive() {
                break;
            }
            let room = available[month] - *gain;
            let extra = leftover.min(room);
            if extra.is_positive() {
                *gain += extra;
                leftover -= extra;
            }
        }
    }

    gains.retain(|(_, gain)| gain.is_positive());
    gains
}

/// hand residual overflow back to the capped months it came from
fn attribute_residual(
    months: &mut BTreeMap<MonthKey, ResolvedMonth>,
    excess: &BTreeMap<MonthKey, Money>,
    residual: Money,
    total_excess: Money,
) {
    let mut assigned = Money::ZERO;
    let last_index = excess.len() - 1;
    for (i, (month, &over)) in excess.iter().enumerate() {
        let share = if i == last_index {
            residual - assigned
        } else {
            residual.prorate(over.as_decimal(), total_excess.as_decimal())
        };
        assigned += share;
        if let Some(resolved) = months.get_mut(month) {
            resolved.unresolved_overflow = share;
        }
    }
}

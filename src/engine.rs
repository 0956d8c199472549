use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::allocation::{
    Apportioner, CapResolver, MonthContribution, MonthlyAggregator, MonthlySummary,
    TenantAllocation,
};
use crate::calendar::{MonthGrid, MonthKey};
use crate::config::AllocationConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::input::{normalize_records, normalize_tenants, BillingDocument, TenantDocument};
use crate::issues::{DataQualityIssue, IssueLog, UnresolvedOverflow};
use crate::lifecycle::eligible_tenants;
use crate::types::TenantId;

/// everything one allocation run produces
///
/// best-effort totals travel together with the problems found along the
/// way; callers decide whether to warn, block, or proceed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationOutcome {
    pub reference_month: MonthKey,
    pub summaries: Vec<MonthlySummary>,
    pub overflow: Vec<UnresolvedOverflow>,
    pub issues: Vec<DataQualityIssue>,
    /// contractual demand per month: sum of eligible tenants' rates
    pub monthly_demand: Money,
    pub eligible_tenants: u32,
}

impl AllocationOutcome {
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// the rent recognition engine
///
/// a pure, synchronous computation over an in-memory snapshot: one batched
/// read upstream, no I/O here, no clocks except the injected reference
/// date. identical inputs always produce identical output.
pub struct RentRecognitionEngine {
    config: AllocationConfig,
}

impl RentRecognitionEngine {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(AllocationConfig::standard())
    }

    /// allocate the snapshot around an explicit reference date
    pub fn allocate(
        &self,
        tenants: &[TenantDocument],
        records: &[BillingDocument],
        reference: NaiveDate,
    ) -> Result<AllocationOutcome> {
        self.config.validate()?;
        let grid = MonthGrid::build(reference, self.config.window)?;

        info!(
            "allocating {} tenants, {} records over {} months around {}",
            tenants.len(),
            records.len(),
            grid.len(),
            grid.reference_key()
        );

        let mut issues = IssueLog::new();

        // normalize, then filter to the statuses rent is recognized for;
        // nothing past this point consults lifecycle status again
        let all_tenants = normalize_tenants(tenants, &mut issues);
        let eligible = eligible_tenants(&all_tenants);
        let known: BTreeSet<TenantId> = all_tenants.iter().map(|t| t.id).collect();
        let rates: BTreeMap<TenantId, Money> =
            eligible.iter().map(|t| (t.id, t.monthly_rate)).collect();
        let monthly_demand: Money = rates.values().copied().sum();

        let billing = normalize_records(records, &rates, &known, &mut issues);
        debug!(
            "{} of {} records survived normalization, {} tenants eligible",
            billing.len(),
            records.len(),
            rates.len()
        );

        // apportion each record to months, then resolve tenant by tenant;
        // tenants are shared-nothing, so this loop is a parallel map in
        // waiting
        let apportioner = Apportioner::new(&grid);
        let mut per_tenant: BTreeMap<TenantId, Vec<MonthContribution>> = BTreeMap::new();
        for record in &billing {
            let rate = rates[&record.tenant_id];
            per_tenant
                .entry(record.tenant_id)
                .or_default()
                .extend(apportioner.apportion(record, rate));
        }

        let resolver = CapResolver::new(&grid);
        let allocations: Vec<TenantAllocation> = per_tenant
            .into_iter()
            .map(|(tenant_id, contributions)| {
                resolver.resolve(tenant_id, rates[&tenant_id], contributions)
            })
            .collect();

        let mut overflow: Vec<UnresolvedOverflow> = Vec::new();
        for allocation in &allocations {
            overflow.extend(allocation.overflow_rows());
        }

        let summaries = MonthlyAggregator::new(&grid).aggregate(&allocations);

        let issues = issues.take();
        if !overflow.is_empty() {
            warn!(
                "{} overflow rows could not be placed inside the window",
                overflow.len()
            );
        }
        if !issues.is_empty() {
            warn!("{} records or tenants excluded as data-quality issues", issues.len());
        }

        Ok(AllocationOutcome {
            reference_month: grid.reference_key(),
            summaries,
            overflow,
            issues,
            monthly_demand,
            eligible_tenants: rates.len() as u32,
        })
    }

    /// allocate using the injected clock as the reference date
    pub fn allocate_now(
        &self,
        tenants: &[TenantDocument],
        records: &[BillingDocument],
        time: &SafeTimeProvider,
    ) -> Result<AllocationOutcome> {
        self.allocate(tenants, records, time.now().date_naive())
    }
}

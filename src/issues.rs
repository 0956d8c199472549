use serde::{Deserialize, Serialize};

use crate::calendar::MonthKey;
use crate::decimal::Money;
use crate::types::{RecordId, TenantId};

/// classification of a data-quality problem
///
/// these are never errors: a bad document is excluded from allocation and
/// reported, not thrown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingCoverageDate,
    InvertedCoverage,
    UnparseableDate,
    UnparseableAmount,
    NegativeFaceAmount,
    NonPositiveRate,
    UnparseableId,
    UnknownTenant,
    ArithmeticGuard,
}

/// one excluded-and-reported document
///
/// excluded_amount carries the record's face amount so dashboards can show
/// how much money was left unplaced instead of silently under-reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub record: Option<RecordId>,
    pub tenant: Option<TenantId>,
    pub kind: IssueKind,
    pub detail: String,
    pub excluded_amount: Option<Money>,
}

/// overflow that could not be placed anywhere in the analysis window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedOverflow {
    pub tenant_id: TenantId,
    pub month: MonthKey,
    pub amount: Money,
}

/// accumulating collector for data-quality issues during a run
#[derive(Debug, Default)]
pub struct IssueLog {
    issues: Vec<DataQualityIssue>,
}

impl IssueLog {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn record(&mut self, issue: DataQualityIssue) {
        self.issues.push(issue);
    }

    pub fn take(&mut self) -> Vec<DataQualityIssue> {
        std::mem::take(&mut self.issues)
    }

    pub fn issues(&self) -> &[DataQualityIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// total face amount excluded from allocation so far
    pub fn excluded_total(&self) -> Money {
        self.issues
            .iter()
            .filter_map(|i| i.excluded_amount)
            .sum()
    }
}

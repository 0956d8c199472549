use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{AllocationError, Result};
use crate::lifecycle::LifecycleStatus;

/// unique identifier for a tenant
pub type TenantId = Uuid;

/// unique identifier for a billing record
pub type RecordId = Uuid;

/// whether a billing record has been settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Unpaid,
    Paid,
}

/// whether a billing record has been issued to the tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssuedState {
    Draft,
    Issued,
}

/// inclusive date range covered by a billing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// create a span, rejecting inverted bounds
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AllocationError::InvalidCoverageSpan { start, end });
        }
        Ok(DateSpan { start, end })
    }

    /// inclusive day count
    pub fn days(&self) -> u32 {
        (self.end - self.start).num_days() as u32 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// a tenant as the engine sees it, normalized and validated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub monthly_rate: Money,
    pub status: LifecycleStatus,
    pub company: Option<String>,
}

/// a billing record with canonical dates and amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub coverage: DateSpan,
    pub face_amount: Money,
    pub payment_state: PaymentState,
    pub issued_state: IssuedState,
}

impl BillingRecord {
    /// paid means settled cash: paid and actually issued
    pub fn is_paid(&self) -> bool {
        self.payment_state == PaymentState::Paid && self.issued_state == IssuedState::Issued
    }

    pub fn is_draft(&self) -> bool {
        self.issued_state == IssuedState::Draft
    }
}

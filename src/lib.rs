pub mod allocation;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod input;
pub mod issues;
pub mod lifecycle;
pub mod metrics;
pub mod types;

// re-export key types
pub use decimal::{Money, Rate};
pub use errors::{AllocationError, Result};
pub use allocation::{
    Apportioner, CapResolver, MonthContribution, MonthlyAggregator, MonthlySummary,
    ResolvedMonth, SettlementBucket, StateSplit, TenantAllocation,
};
pub use calendar::{AnalysisWindow, CalendarMonth, MonthGrid, MonthKey};
pub use config::AllocationConfig;
pub use engine::{AllocationOutcome, RentRecognitionEngine};
pub use input::{AmountValue, BillingDocument, DateValue, TenantDocument};
pub use issues::{DataQualityIssue, IssueKind, IssueLog, UnresolvedOverflow};
pub use lifecycle::LifecycleStatus;
pub use metrics::RentMetrics;
pub use types::{
    BillingRecord, DateSpan, IssuedState, PaymentState, RecordId, Tenant, TenantId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

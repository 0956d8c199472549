use chrono::NaiveDate;
use thiserror::Error;

use crate::lifecycle::LifecycleStatus;

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("analysis window too wide: {months} months exceeds maximum {max}")]
    WindowTooWide {
        months: u32,
        max: u32,
    },

    #[error("date out of range: {message}")]
    DateOutOfRange {
        message: String,
    },

    #[error("invalid coverage span: start {start} after end {end}")]
    InvalidCoverageSpan {
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("invalid transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: LifecycleStatus,
        to: LifecycleStatus,
    },

    #[error("departure date required to resign a tenant")]
    MissingDepartureDate,

    #[error("departure date {departure} is in the future")]
    DepartureInFuture {
        departure: NaiveDate,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, AllocationError>;

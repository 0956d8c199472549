use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{AllocationError, Result};
use crate::types::Tenant;

/// tenant lifecycle status
///
/// the housing workflow moves a tenant through
/// pending_assignment -> pending -> housed -> pending_resign -> resigned,
/// with terminated reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    PendingAssignment,
    Pending,
    Housed,
    PendingResign,
    Resigned,
    Terminated,
}

impl LifecycleStatus {
    /// fixed transition table; terminal states have no outgoing edges
    pub fn can_transition_to(&self, to: LifecycleStatus) -> bool {
        use LifecycleStatus::*;
        matches!(
            (self, to),
            (PendingAssignment, Pending)
                | (PendingAssignment, Terminated)
                | (Pending, Housed)
                | (Pending, Terminated)
                | (Housed, PendingResign)
                | (Housed, Terminated)
                | (PendingResign, Resigned)
                | (PendingResign, Terminated)
        )
    }

    /// validate and perform a transition
    ///
    /// resigning requires a departure date that is past-or-today; any edge
    /// not in the table is rejected.
    pub fn transition(
        &self,
        to: LifecycleStatus,
        departure: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<LifecycleStatus> {
        if !self.can_transition_to(to) {
            return Err(AllocationError::InvalidTransition { from: *self, to });
        }

        if *self == LifecycleStatus::PendingResign && to == LifecycleStatus::Resigned {
            let departure = departure.ok_or(AllocationError::MissingDepartureDate)?;
            if departure > today {
                return Err(AllocationError::DepartureInFuture { departure });
            }
        }

        Ok(to)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleStatus::Resigned | LifecycleStatus::Terminated)
    }

    /// whether rent is recognized for a tenant in this status
    ///
    /// only tenants actually occupying housing accrue recognized rent:
    /// housed, or housed-and-leaving (pending_resign). not-yet-housed and
    /// terminal states are excluded from all allocation.
    pub fn is_allocation_eligible(&self) -> bool {
        matches!(self, LifecycleStatus::Housed | LifecycleStatus::PendingResign)
    }
}

/// boundary filter: the allocation engine only ever sees tenants that pass
/// this, so the engine core never consults lifecycle status itself
pub fn eligible_tenants(tenants: &[Tenant]) -> Vec<&Tenant> {
    tenants
        .iter()
        .filter(|t| t.status.is_allocation_eligible())
        .collect()
}

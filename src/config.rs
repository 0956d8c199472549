use serde::{Deserialize, Serialize};

use crate::calendar::{AnalysisWindow, MAX_GRID_MONTHS};
use crate::errors::{AllocationError, Result};

/// allocation run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    pub window: AnalysisWindow,
}

impl AllocationConfig {
    /// the dashboard default: 3 months back, 8 months forward
    pub fn standard() -> Self {
        Self {
            window: AnalysisWindow::default(),
        }
    }

    /// the last twelve months ending at the reference month
    pub fn trailing_year() -> Self {
        Self {
            window: AnalysisWindow::new(11, 0),
        }
    }

    /// an explicit window around the reference month
    pub fn around(months_before: u32, months_after: u32) -> Self {
        Self {
            window: AnalysisWindow::new(months_before, months_after),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.total_months() > MAX_GRID_MONTHS {
            return Err(AllocationError::InvalidConfiguration {
                message: format!(
                    "window of {} months exceeds maximum {}",
                    self.window.total_months(),
                    MAX_GRID_MONTHS
                ),
            });
        }
        Ok(())
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self::standard()
    }
}

use crate::calendar::CalendarMonth;
use crate::types::DateSpan;

/// how a coverage span intersects one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageOverlap {
    /// inclusive day count of the intersection
    pub overlap_days: u32,
    /// day count of the month itself
    pub month_days: u32,
    /// the span covers the month wall to wall
    pub full_month: bool,
}

/// intersect a coverage span with a calendar month
///
/// returns `None` when the two do not touch; callers skip that month
/// entirely rather than booking a zero contribution.
pub fn month_overlap(span: &DateSpan, month: &CalendarMonth) -> Option<CoverageOverlap> {
    let overlap_start = span.start.max(month.starts_on);
    let overlap_end = span.end.min(month.ends_on);

    if overlap_start > overlap_end {
        return None;
    }

    Some(CoverageOverlap {
        overlap_days: (overlap_end - overlap_start).num_days() as u32 + 1,
        month_days: month.days(),
        full_month: span.start <= month.starts_on && span.end >= month.ends_on,
    })
}

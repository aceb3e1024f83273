use chrono::NaiveDate;

pub const MAX_DAYS_PER_WEEK: u32 = 7;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    #[error("calendar end {end} must fall after start {start}")]
    EmptyPeriod { start: NaiveDate, end: NaiveDate },
    #[error("teaching days per week must be between 1 and 7 (found {0})")]
    DaysPerWeek(u32),
}

/// Estimated teaching days between two dates once vacation weeks are removed.
///
/// Partial weeks count fractionally and the result is truncated, never negative.
pub fn operating_days_between(
    start: NaiveDate,
    end: NaiveDate,
    vacation_weeks: u32,
    days_per_week: u32,
) -> Result<u32, CalendarError> {
    if end <= start {
        return Err(CalendarError::EmptyPeriod { start, end });
    }
    if days_per_week == 0 || days_per_week > MAX_DAYS_PER_WEEK {
        return Err(CalendarError::DaysPerWeek(days_per_week));
    }

    let weeks = (end - start).num_days() as f64 / 7.0;
    let presence_weeks = weeks - f64::from(vacation_weeks);
    let days = (presence_weeks * f64::from(days_per_week)).trunc();
    Ok(days.max(0.0) as u32)
}

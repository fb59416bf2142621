//! Calendar month grid. Pure derivation: a flat entity list in, a
//! weeks-by-seven-days grid out.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

#[derive(Debug, Clone)]
pub struct CalendarCell<T> {
    pub date: NaiveDate,
    /// False for the leading/trailing days padding the grid to full weeks.
    pub in_month: bool,
    pub is_today: bool,
    pub entries: Vec<T>,
}

#[derive(Debug, Clone)]
pub struct MonthGrid<T> {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<CalendarCell<T>>>,
}

impl<T> MonthGrid<T> {
    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell<T>> {
        self.weeks.iter().flatten()
    }
}

/// Builds the grid for one month: from the Sunday on or before the 1st to
/// the Saturday on or after the last day, walked day by day.
///
/// `date_of` must return the entity's calendar day; callers bucketing UTC
/// instants pass `|e| e.timestamp.date_naive()` so entity and cell compare
/// by UTC day components rather than by instant. Entities dated outside
/// the visible grid land in no cell.
///
/// Returns `None` for an invalid year/month.
pub fn month_grid<T, F>(
    year: i32,
    month: u32,
    today: NaiveDate,
    items: &[T],
    date_of: F,
) -> Option<MonthGrid<T>>
where
    T: Clone,
    F: Fn(&T) -> NaiveDate,
{
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = last_day_of_month(year, month)?;

    let start = first - Duration::days(first.weekday().num_days_from_sunday() as i64);
    let end = last + Duration::days((6 - last.weekday().num_days_from_sunday()) as i64);

    let mut weeks = Vec::new();
    let mut week: Vec<CalendarCell<T>> = Vec::with_capacity(7);
    let mut day = start;
    while day <= end {
        let entries: Vec<T> = items
            .iter()
            .filter(|item| date_of(item) == day)
            .cloned()
            .collect();
        week.push(CalendarCell {
            date: day,
            in_month: day.month() == month && day.year() == year,
            is_today: day == today,
            entries,
        });
        if week.len() == 7 {
            weeks.push(std::mem::take(&mut week));
        }
        day = day + Duration::days(1);
    }

    debug_assert!(week.is_empty());
    debug_assert_eq!(start.weekday(), Weekday::Sun);
    debug_assert_eq!(end.weekday(), Weekday::Sat);

    Some(MonthGrid { year, month, weeks })
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    Some(first_of_next - Duration::days(1))
}

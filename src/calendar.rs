//! Month grid construction and month arithmetic.

use chrono::{Datelike, Local};

use crate::store::EventStore;
use crate::types::{CELLS_PER_GRID, CalendarDate, DAYS_PER_WEEK, DateKey, GridCell, MonthGrid};

/// Check if a year is a leap year (proleptic Gregorian).
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Number of days in a 0-based month.
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    match month0 {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if is_leap_year(year) => 29,
        1 => 28,
        _ => 30,
    }
}

/// Move the displayed month by `delta` months, landing on day 1.
pub fn shift_month(anchor: CalendarDate, delta: i32) -> CalendarDate {
    let total = anchor.year() * 12 + anchor.month0() as i32 + delta;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12) as u32;
    CalendarDate::new(year, month0, 1).unwrap_or_else(|| anchor.first_of_month())
}

/// Build the 42-day Monday-first grid containing `reference`'s month.
///
/// Leading days come from the tail of the previous month, trailing days are
/// numbered 1, 2, 3… from the start of the next month.
pub fn generate_month_days(reference: CalendarDate) -> MonthGrid {
    let first = reference.first_of_month();
    let last = reference.last_of_month();
    let starting_day = first.iso_weekday();

    let mut days = Vec::with_capacity(CELLS_PER_GRID);

    // Walk back from the day before the 1st, then restore ascending order
    let mut lead = first;
    for _ in 1..starting_day {
        lead = lead.pred();
        days.push(lead);
    }
    days.reverse();

    let mut day = first;
    loop {
        days.push(day);
        if day == last {
            break;
        }
        day = day.succ();
    }

    let mut trail = last;
    while days.len() < CELLS_PER_GRID {
        trail = trail.succ();
        days.push(trail);
    }

    MonthGrid {
        anchor: reference,
        days,
    }
}

impl MonthGrid {
    pub fn first(&self) -> Option<CalendarDate> {
        self.days.first().copied()
    }

    pub fn last(&self) -> Option<CalendarDate> {
        self.days.last().copied()
    }

    /// Days that belong to the displayed month.
    pub fn current_month_days(&self) -> impl Iterator<Item = CalendarDate> + '_ {
        self.days.iter().copied().filter(|d| d.same_month(self.anchor))
    }

    /// Resolve every cell for rendering.
    pub fn cells(
        &self,
        selected: Option<CalendarDate>,
        today: CalendarDate,
        store: &EventStore,
    ) -> Vec<GridCell> {
        self.days
            .iter()
            .map(|&date| GridCell {
                date,
                in_current_month: date.same_month(self.anchor),
                is_selected: selected == Some(date),
                is_today: date == today,
                events: store.lookup(&DateKey::from_date(date)).to_vec(),
            })
            .collect()
    }

    /// Split into six rows of seven days.
    pub fn weeks(&self) -> std::slice::Chunks<'_, CalendarDate> {
        self.days.chunks(DAYS_PER_WEEK)
    }
}

/// Today's local date, respecting AGENDA_TEST_TIME for testing.
pub fn get_today_date() -> CalendarDate {
    if let Ok(test_time) = std::env::var("AGENDA_TEST_TIME")
        && let Some(date) = crate::formatter::parse_date_key(&test_time)
    {
        return date;
    }
    let now = Local::now().date_naive();
    CalendarDate::new(now.year(), now.month0(), now.day())
        .unwrap_or_else(|| CalendarDate::from_naive(now))
}

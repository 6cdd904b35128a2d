//! Type definitions and constants for the agenda.

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, Days, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A calendar day in local wall-clock terms.
///
/// Months are 0-based (0 = January). Equality is by calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// Build a date from year, 0-based month and day. `None` if the day does not exist
    /// or the year is outside `YEAR_MIN..=YEAR_MAX`.
    pub fn new(year: i32, month0: u32, day: u32) -> Option<Self> {
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month0.checked_add(1)?, day).map(Self)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// 0-based month (0 = January).
    pub fn month0(self) -> u32 {
        self.0.month0()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// ISO weekday: Monday = 1 … Sunday = 7.
    pub fn iso_weekday(self) -> u32 {
        self.0.weekday().number_from_monday()
    }

    pub fn first_of_month(self) -> Self {
        Self(self.0 - Days::new(u64::from(self.0.day0())))
    }

    pub fn last_of_month(self) -> Self {
        let days = crate::calendar::days_in_month(self.year(), self.month0());
        Self(self.first_of_month().0 + Days::new(u64::from(days - 1)))
    }

    /// The following calendar day.
    pub fn succ(self) -> Self {
        Self(self.0 + Days::new(1))
    }

    /// The preceding calendar day.
    pub fn pred(self) -> Self {
        Self(self.0 - Days::new(1))
    }

    /// Whether both dates fall in the same month of the same year.
    pub fn same_month(self, other: Self) -> bool {
        self.year() == other.year() && self.month0() == other.month0()
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::formatter::format_date(*self, DateFormat::IsoDate))
    }
}

/// Canonical `YYYY-MM-DD` identifier of a calendar day, used as the event store key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn from_date(date: CalendarDate) -> Self {
        Self(crate::formatter::format_date(date, DateFormat::IsoDate))
    }

    /// Parse and canonicalize a key. `None` unless it names a real day.
    pub fn parse(s: &str) -> Option<Self> {
        crate::formatter::parse_date_key(s).map(Self::from_date)
    }

    /// Rebuild the calendar day this key names.
    pub fn to_date(&self) -> Option<CalendarDate> {
        crate::formatter::parse_date_key(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One annotation on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Creation timestamp in milliseconds, unique within its day.
    pub id: i64,
    /// Time of day as `HH:MM`.
    pub time: String,
    pub description: String,
}

/// Which event is being edited and where it lived before the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingContext {
    pub id: i64,
    pub time: String,
    pub description: String,
    pub original_date: DateKey,
}

/// Fixed output representations of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateFormat {
    /// Full month name and year (`Enero 2024`).
    #[value(name = "month-year")]
    MonthYear,
    /// `yyyy-MM-dd`.
    #[value(name = "iso")]
    IsoDate,
    /// Unpadded day of month.
    #[value(name = "day")]
    DayOfMonth,
    /// `dd/MM/yyyy`.
    #[value(name = "european")]
    EuropeanDate,
}

impl DateFormat {
    /// Pattern token for this format.
    pub fn pattern(self) -> &'static str {
        match self {
            DateFormat::MonthYear => "MMMM yyyy",
            DateFormat::IsoDate => "yyyy-MM-dd",
            DateFormat::DayOfMonth => "d",
            DateFormat::EuropeanDate => "dd/MM/yyyy",
        }
    }

    pub fn from_pattern(pattern: &str) -> Option<Self> {
        [
            DateFormat::MonthYear,
            DateFormat::IsoDate,
            DateFormat::DayOfMonth,
            DateFormat::EuropeanDate,
        ]
        .into_iter()
        .find(|f| f.pattern() == pattern)
    }
}

/// Fixed 42-cell Monday-first view of one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    /// Any day of the displayed month.
    pub anchor: CalendarDate,
    pub days: Vec<CalendarDate>,
}

/// What the presentation layer needs to draw one grid cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    pub date: CalendarDate,
    pub in_current_month: bool,
    pub is_selected: bool,
    pub is_today: bool,
    pub events: Vec<Event>,
}

/// Runtime context resolved from arguments and environment.
#[derive(Clone, Debug)]
pub struct AgendaContext {
    /// Today's date for highlighting and defaults.
    pub today: CalendarDate,
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// Directory holding the persisted event store.
    pub data_dir: PathBuf,
    /// Terminal width used to truncate event lines.
    pub width: usize,
}

// Constants for grid layout
pub const CELLS_PER_GRID: usize = 42; // 6 weeks × 7 days
pub const DAYS_PER_WEEK: usize = 7;
pub const CELL_WIDTH: usize = 4;
pub const GRID_WIDTH: usize = CELL_WIDTH * DAYS_PER_WEEK;
pub const DEFAULT_WIDTH: usize = 80;

pub const YEAR_MIN: i32 = 1;
pub const YEAR_MAX: i32 = 9999;

/// Key under which the whole event store is persisted.
pub const STORAGE_KEY: &str = "calendarEvents";

pub const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Column headers, Monday first.
pub const WEEKDAY_LETTERS: [&str; 7] = ["L", "M", "X", "J", "V", "S", "D"];

// ANSI color codes
pub const COLOR_RESET: &str = "\x1b[0m";
pub const COLOR_REVERSE: &str = "\x1b[7m";
pub const COLOR_UNDERLINE: &str = "\x1b[4m";
pub const COLOR_DIM: &str = "\x1b[90m";
pub const COLOR_GREEN: &str = "\x1b[92m";
pub const COLOR_TEAL: &str = "\x1b[96m";
pub const COLOR_SAND_YELLOW: &str = "\x1b[93m";

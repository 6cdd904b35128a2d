//! Date formatting and terminal rendering of the month grid and events.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::calendar::generate_month_days;
use crate::session::ModalView;
use crate::store::EventStore;
use crate::types::{
    AgendaContext, CELL_WIDTH, COLOR_DIM, COLOR_GREEN, COLOR_RESET, COLOR_REVERSE,
    COLOR_SAND_YELLOW, COLOR_TEAL, COLOR_UNDERLINE, CalendarDate, DAYS_PER_WEEK, DateFormat,
    DateKey, Event, GRID_WIDTH, GridCell, MONTH_NAMES, WEEKDAY_LETTERS,
};

/// Render a date in one of the fixed formats.
pub fn format_date(date: CalendarDate, format: DateFormat) -> String {
    match format {
        DateFormat::MonthYear => format!("{} {}", get_month_name(date.month0()), date.year()),
        DateFormat::IsoDate => format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month0() + 1,
            date.day()
        ),
        DateFormat::DayOfMonth => date.day().to_string(),
        DateFormat::EuropeanDate => format!(
            "{:02}/{:02}/{:04}",
            date.day(),
            date.month0() + 1,
            date.year()
        ),
    }
}

/// Render a date from a pattern token (`MMMM yyyy`, `yyyy-MM-dd`, `d`, `dd/MM/yyyy`).
///
/// Unknown tokens are a caller bug: debug builds assert, release builds fall
/// back to the raw debug representation.
pub fn format_with_pattern(date: CalendarDate, pattern: &str) -> String {
    match DateFormat::from_pattern(pattern) {
        Some(format) => format_date(date, format),
        None => {
            debug_assert!(false, "unknown date pattern: {pattern:?}");
            tracing::error!(pattern, "unknown date pattern");
            format!("{:?}", date)
        }
    }
}

/// Rebuild a date from the three dash-separated parts of a `YYYY-MM-DD` key.
pub fn parse_date_key(key: &str) -> Option<CalendarDate> {
    let mut parts = key.trim().split('-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() || !(1..=12).contains(&month) {
        return None;
    }
    CalendarDate::new(year, month - 1, day)
}

/// Parse a date typed by the user: `YYYY-MM-DD` or `dd/MM/yyyy`.
pub fn parse_user_date(s: &str) -> Option<CalendarDate> {
    if let Some(date) = parse_date_key(s) {
        return Some(date);
    }
    let mut parts = s.trim().split('/');
    let day = parts.next()?.parse::<u32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let year = parts.next()?.parse::<i32>().ok()?;
    if parts.next().is_some() || !(1..=12).contains(&month) {
        return None;
    }
    CalendarDate::new(year, month - 1, day)
}

/// Month name for a 0-based month.
pub fn get_month_name(month0: u32) -> &'static str {
    MONTH_NAMES[(month0 % 12) as usize]
}

/// Parse month from string (numeric 1-12 or name in Spanish/English). Returns 1-12.
pub fn parse_month(s: &str) -> Option<u32> {
    if let Ok(n) = s.parse::<u32>()
        && (1..=12).contains(&n)
    {
        return Some(n);
    }

    let s_lower = s.to_lowercase();
    if let Some(idx) = MONTH_NAMES
        .iter()
        .position(|name| name.to_lowercase() == s_lower)
    {
        return Some(idx as u32 + 1);
    }

    let month_names: [(&str, u32); 24] = [
        // English full names
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("april", 4),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("september", 9),
        ("october", 10),
        ("november", 11),
        ("december", 12),
        // Short forms (shared where Spanish and English agree)
        ("jan", 1),
        ("ene", 1),
        ("feb", 2),
        ("mar", 3),
        ("apr", 4),
        ("abr", 4),
        ("jun", 6),
        ("jul", 7),
        ("aug", 8),
        ("ago", 8),
        ("sep", 9),
        ("oct", 10),
    ];
    month_names
        .iter()
        .find(|(name, _)| *name == s_lower)
        .map(|(_, num)| *num)
}

/// Format the month header (`Marzo 2024`) centered over the grid.
pub fn format_month_header(date: CalendarDate, width: usize, color: bool) -> String {
    let centered = center_text(&format_date(date, DateFormat::MonthYear), width);
    if color {
        format!("{}{}{}", COLOR_TEAL, centered, COLOR_RESET)
    } else {
        centered
    }
}

/// Center text within a specified width, accounting for Unicode character widths.
pub fn center_text(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width >= width {
        return text.to_string();
    }
    let total_padding = width - text_width;
    let left_padding = total_padding.div_ceil(2);
    let right_padding = total_padding - left_padding;
    format!(
        "{}{}{}",
        " ".repeat(left_padding),
        text,
        " ".repeat(right_padding)
    )
}

/// Format weekday header row, Monday first.
pub fn format_weekday_headers(color: bool) -> String {
    let mut result = String::new();
    if color {
        result.push_str(COLOR_SAND_YELLOW);
    }
    for letter in WEEKDAY_LETTERS {
        result.push_str(&format!("{:>3} ", letter));
    }
    if color {
        result.push_str(COLOR_RESET);
    }
    result
}

/// Format one grid cell, `CELL_WIDTH` columns wide.
///
/// Plain output opens the selected day with `[`, prefixes days of other
/// months with `.` and ends days with events with `*`. A selected day without
/// events is closed with `]`.
/// Color priority: selected > today > other month > regular
pub fn format_cell(cell: &GridCell, color: bool) -> String {
    let day = format!("{:>2}", cell.date.day());
    let marker = if cell.events.is_empty() { ' ' } else { '*' };

    if !color {
        let prefix = if cell.is_selected {
            '['
        } else if !cell.in_current_month {
            '.'
        } else {
            ' '
        };
        let suffix = if cell.is_selected && cell.events.is_empty() {
            ']'
        } else {
            marker
        };
        return format!("{}{}{}", prefix, day, suffix);
    }

    let styled_day = if cell.is_selected {
        format!("{}{}{}", COLOR_REVERSE, day, COLOR_RESET)
    } else if cell.is_today {
        format!("{}{}{}", COLOR_UNDERLINE, day, COLOR_RESET)
    } else if !cell.in_current_month {
        format!("{}{}{}", COLOR_DIM, day, COLOR_RESET)
    } else {
        day
    };
    let styled_marker = if cell.events.is_empty() {
        " ".to_string()
    } else {
        format!("{}{}{}", COLOR_GREEN, marker, COLOR_RESET)
    };
    format!(" {}{}", styled_day, styled_marker)
}

/// Format the month as a header, a weekday row and six week rows.
pub fn format_month_grid(
    ctx: &AgendaContext,
    anchor: CalendarDate,
    selected: Option<CalendarDate>,
    store: &EventStore,
) -> Vec<String> {
    let grid = generate_month_days(anchor);
    let cells = grid.cells(selected, ctx.today, store);

    let mut lines = Vec::with_capacity(8);
    lines.push(format_month_header(anchor, GRID_WIDTH, ctx.color));
    lines.push(format_weekday_headers(ctx.color));

    for week in cells.chunks(DAYS_PER_WEEK) {
        let mut line = String::with_capacity(CELL_WIDTH * DAYS_PER_WEEK);
        for cell in week {
            line.push_str(&format_cell(cell, ctx.color));
        }
        lines.push(line);
    }

    lines
}

/// Format an event as `HH:MM - description [id]`, cut to `width` columns.
pub fn format_event_line(event: &Event, width: usize) -> String {
    let line = format!("{} - {} [{}]", event.time, event.description, event.id);
    truncate_to_width(&line, width)
}

/// Cut text to at most `width` display columns, ending with `…` when shortened.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Format the events of one day under a `dd/MM/yyyy` heading.
pub fn format_day_events(ctx: &AgendaContext, key: &DateKey, events: &[Event]) -> Vec<String> {
    let heading = key
        .to_date()
        .map(|d| format_date(d, DateFormat::EuropeanDate))
        .unwrap_or_else(|| key.to_string());
    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(if ctx.color {
        format!("{}{}{}", COLOR_SAND_YELLOW, heading, COLOR_RESET)
    } else {
        heading
    });
    for event in events {
        lines.push(format!(
            "  {}",
            format_event_line(event, ctx.width.saturating_sub(2))
        ));
    }
    lines
}

/// Format the create/edit panel.
pub fn format_modal(view: &ModalView, width: usize) -> Vec<String> {
    let title = format!("{} - {}", view.title, view.date_label);
    vec![
        truncate_to_width(&title, width),
        truncate_to_width(&format!("Hora: {}", view.time), width),
        truncate_to_width(&format!("Descripción: {}", view.description), width),
        format!("[{}]", view.action_label),
    ]
}

/// Print the month grid followed by every event of the month.
pub fn print_month(
    ctx: &AgendaContext,
    anchor: CalendarDate,
    selected: Option<CalendarDate>,
    store: &EventStore,
) {
    for line in format_month_grid(ctx, anchor, selected, store) {
        println!("{}", line);
    }

    let buckets = store.events_in_month(anchor);
    if !buckets.is_empty() {
        println!();
    }
    for (key, events) in buckets {
        print_day_events(ctx, key, events);
    }
}

/// Print the events stored under one day.
pub fn print_day_events(ctx: &AgendaContext, key: &DateKey, events: &[Event]) {
    for line in format_day_events(ctx, key, events) {
        println!("{}", line);
    }
}

pub fn print_modal(ctx: &AgendaContext, view: &ModalView) {
    for line in format_modal(view, ctx.width) {
        println!("{}", line);
    }
}

//! Command-line argument parsing using clap.
//!
//! Month display follows the cal convention: `show [month] [year]`

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::calendar::get_today_date;
use crate::error::{AgendaError, AgendaResult};
use crate::formatter::{parse_month, parse_user_date};
use crate::types::{AgendaContext, CalendarDate, DEFAULT_WIDTH, DateFormat, YEAR_MAX, YEAR_MIN};

#[derive(Parser, Debug)]
#[command(name = "agenda")]
#[command(about = "Personal agenda: month calendar with per-day events", long_about = None)]
#[command(version)]
#[command(after_help = HELP_MESSAGE)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the event store (default: $AGENDA_DATA_DIR or the user data dir).
    #[arg(long, global = true, value_name = "dir", value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Disable colorized output.
    #[arg(long, global = true, help_heading = "Output options")]
    pub no_color: bool,

    /// More log output on stderr (repeatable).
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count, help_heading = "Output options")]
    pub verbose: u8,

    /// Less log output on stderr (repeatable).
    #[arg(short = 'q', long, global = true, action = clap::ArgAction::Count, help_heading = "Output options")]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display a month with its events (default: current month).
    Show {
        /// Month (1-12 or name), or a 4-digit year when alone.
        #[arg(value_name = "month")]
        month_arg: Option<String>,

        /// Year (1-9999).
        #[arg(value_name = "year")]
        year_arg: Option<String>,

        /// Move the displayed month by this many months.
        #[arg(long, default_value_t = 0, allow_negative_numbers = true, value_name = "months")]
        shift: i32,

        /// Highlight a day and list its events (YYYY-MM-DD or dd/MM/yyyy).
        #[arg(short = 's', long, value_name = "date")]
        select: Option<String>,
    },

    /// Add an event to a day.
    Add {
        #[arg(value_name = "date")]
        date: String,

        /// Time of day (HH:MM).
        #[arg(value_name = "time")]
        time: String,

        #[arg(value_name = "description", num_args = 1.., trailing_var_arg = true)]
        description: Vec<String>,
    },

    /// Change an event's day, time or description.
    Edit {
        #[arg(value_name = "date")]
        date: String,

        #[arg(value_name = "id")]
        id: i64,

        /// Move the event to another day.
        #[arg(long = "date", value_name = "date")]
        new_date: Option<String>,

        #[arg(long, value_name = "time")]
        time: Option<String>,

        #[arg(long, value_name = "text")]
        description: Option<String>,
    },

    /// Delete an event.
    Delete {
        #[arg(value_name = "date")]
        date: String,

        #[arg(value_name = "id")]
        id: i64,
    },

    /// List events of one day, or of every day.
    List {
        #[arg(value_name = "date")]
        date: Option<String>,
    },

    /// Print a date in one of the fixed formats.
    Format {
        #[arg(value_name = "date")]
        date: String,

        #[arg(long = "as", default_value = "month-year", value_name = "format")]
        format: DateFormat,
    },
}

/// Help message displayed with --help.
const HELP_MESSAGE: &str = "Keep a personal agenda of timed notes per day.

Without any arguments, display the current month.

Examples:
  agenda                               Display current month
  agenda show 3 2024                   Display March 2024
  agenda show --shift -1               Display previous month
  agenda add 2024-03-15 09:00 Standup  Add an event
  agenda edit 2024-03-15 <id> --date 2024-03-16
  agenda delete 2024-03-16 <id>        Delete an event
  agenda list 15/03/2024               List events of a day
  agenda format 2024-01-05 --as european";

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }
}

impl AgendaContext {
    pub fn new(args: &Args) -> AgendaResult<Self> {
        let today = get_today_date();
        let color = !args.no_color && std::io::stdout().is_terminal();
        let data_dir = resolve_data_dir(args.data_dir.as_ref())?;
        let width = get_terminal_width().unwrap_or(DEFAULT_WIDTH);

        Ok(AgendaContext {
            today,
            color,
            data_dir,
            width,
        })
    }
}

/// Data directory: --data-dir, then AGENDA_DATA_DIR, then `<user data dir>/agenda`.
pub fn resolve_data_dir(flag: Option<&PathBuf>) -> AgendaResult<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.clone());
    }
    if let Ok(dir) = std::env::var("AGENDA_DATA_DIR")
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("agenda"))
        .ok_or(AgendaError::NoDataDir)
}

/// Parse a date argument, `YYYY-MM-DD` or `dd/MM/yyyy`.
pub fn parse_date_arg(s: &str) -> AgendaResult<CalendarDate> {
    parse_user_date(s).ok_or_else(|| AgendaError::InvalidDate(s.to_string()))
}

/// Calculate the displayed month from positional arguments.
///
/// Argument patterns:
/// - no args: month of `today`
/// - 1 arg: year (4 digits) or month (1-2 digits or name)
/// - 2 args: month year
pub fn get_display_date(
    month_arg: Option<&str>,
    year_arg: Option<&str>,
    today: CalendarDate,
) -> AgendaResult<CalendarDate> {
    let (year, month) = match (month_arg, year_arg) {
        (None, None) => return Ok(today.first_of_month()),
        (Some(val), None) => {
            if let Ok(num) = val.parse::<i32>()
                && (1000..=YEAR_MAX).contains(&num)
            {
                (num, today.month0() + 1)
            } else {
                let month = parse_month(val)
                    .ok_or_else(|| AgendaError::InvalidArgument(format!("Invalid argument: {val}")))?;
                (today.year(), month)
            }
        }
        (Some(month_str), Some(year_str)) => {
            let month = parse_month(month_str)
                .ok_or_else(|| AgendaError::InvalidArgument(format!("Invalid month: {month_str}")))?;
            let year = year_str
                .parse::<i32>()
                .map_err(|_| AgendaError::InvalidArgument(format!("Invalid year: {year_str}")))?;
            (year, month)
        }
        (None, Some(_)) => {
            return Err(AgendaError::InvalidArgument(
                "Invalid argument combination".to_string(),
            ));
        }
    };

    if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
        return Err(AgendaError::InvalidArgument(format!(
            "Invalid year: {year} (must be {YEAR_MIN}-{YEAR_MAX})"
        )));
    }
    CalendarDate::new(year, month - 1, 1)
        .ok_or_else(|| AgendaError::InvalidDate(format!("{year}-{month}")))
}

/// Install the stderr log subscriber. RUST_LOG wins over -v/-q.
pub fn init_tracing(verbose: u8, quiet: u8) -> AgendaResult<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| AgendaError::InvalidArgument(format!("invalid RUST_LOG / log filter: {e}")))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Get terminal width using terminal_size crate.
fn get_terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(w, _)| w.0 as usize)
}

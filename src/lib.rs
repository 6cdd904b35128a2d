//! Personal agenda: a Monday-first month calendar with timed notes per day.
//!
//! Features:
//! - Fixed 42-day month grid including adjacent-month days
//! - Create, edit, move and delete events per day
//! - Event store persisted as JSON in a local data directory

pub mod args;
pub mod calendar;
pub mod error;
pub mod formatter;
pub mod session;
pub mod storage;
pub mod store;
pub mod types;

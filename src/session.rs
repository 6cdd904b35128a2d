//! Selection and edit flow: which month is shown, which day is picked and
//! what the user has typed so far.

use tracing::debug;

use crate::calendar::shift_month;
use crate::formatter::format_date;
use crate::store::{EventStore, start_edit};
use crate::types::{CalendarDate, DateFormat, DateKey, EditingContext, Event};

/// Where the user is in the create/edit flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Idle,
    DaySelected {
        date: CalendarDate,
    },
    Creating {
        date: CalendarDate,
        time: String,
        description: String,
    },
    Editing {
        date: CalendarDate,
        time: String,
        description: String,
        context: EditingContext,
    },
}

/// Contents of the create/edit panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub title: &'static str,
    pub date_label: String,
    pub action_label: &'static str,
    pub time: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    current: CalendarDate,
    selection: Selection,
}

impl Session {
    /// Start idle, showing the month of `today`.
    pub fn new(today: CalendarDate) -> Self {
        Self {
            current: today,
            selection: Selection::Idle,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Any day of the displayed month.
    pub fn current_month(&self) -> CalendarDate {
        self.current
    }

    pub fn selected_date(&self) -> Option<CalendarDate> {
        match &self.selection {
            Selection::Idle => None,
            Selection::DaySelected { date }
            | Selection::Creating { date, .. }
            | Selection::Editing { date, .. } => Some(*date),
        }
    }

    pub fn editing(&self) -> Option<&EditingContext> {
        match &self.selection {
            Selection::Editing { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Show the month `delta` months away.
    pub fn navigate(&mut self, delta: i32) {
        self.current = shift_month(self.current, delta);
    }

    /// Pick a day, dropping any draft in progress.
    pub fn select_day(&mut self, date: CalendarDate) {
        debug!(date = %date, "day selected");
        self.selection = Selection::DaySelected { date };
    }

    /// Retarget the draft to another day, keeping what has been typed.
    pub fn move_to(&mut self, new_date: CalendarDate) {
        match &mut self.selection {
            Selection::Idle => {}
            Selection::DaySelected { date }
            | Selection::Creating { date, .. }
            | Selection::Editing { date, .. } => *date = new_date,
        }
    }

    pub fn set_time(&mut self, value: &str) {
        self.update_draft(|time, _| *time = value.to_string());
    }

    pub fn set_description(&mut self, value: &str) {
        self.update_draft(|_, description| *description = value.to_string());
    }

    fn update_draft(&mut self, apply: impl FnOnce(&mut String, &mut String)) {
        match &mut self.selection {
            Selection::Idle => {}
            Selection::DaySelected { date } => {
                let date = *date;
                let mut time = String::new();
                let mut description = String::new();
                apply(&mut time, &mut description);
                self.selection = Selection::Creating {
                    date,
                    time,
                    description,
                };
            }
            Selection::Creating {
                time, description, ..
            }
            | Selection::Editing {
                time, description, ..
            } => apply(time, description),
        }
    }

    /// Open `event` stored under `key` for editing. Returns false for a malformed key.
    pub fn begin_edit(&mut self, key: &DateKey, event: &Event) -> bool {
        let Some((date, context)) = start_edit(key, event) else {
            return false;
        };
        debug!(date = %key, id = event.id, "editing event");
        self.selection = Selection::Editing {
            date,
            time: context.time.clone(),
            description: context.description.clone(),
            context,
        };
        true
    }

    /// Commit the draft into `store`.
    ///
    /// On success the session returns to idle and the new store is handed
    /// back for persisting. An incomplete draft leaves everything as is.
    pub fn save(&mut self, store: &EventStore, now_millis: i64) -> Option<EventStore> {
        let next = match &self.selection {
            Selection::Idle => None,
            Selection::DaySelected { date } => store.upsert(Some(*date), "", "", None, now_millis),
            Selection::Creating {
                date,
                time,
                description,
            } => store.upsert(Some(*date), time, description, None, now_millis),
            Selection::Editing {
                date,
                time,
                description,
                context,
            } => store.upsert(Some(*date), time, description, Some(context), now_millis),
        }?;
        self.selection = Selection::Idle;
        Some(next)
    }

    /// Close the panel, discarding the draft.
    pub fn cancel(&mut self) {
        self.selection = Selection::Idle;
    }

    /// Derive the create/edit panel, if a day is selected.
    pub fn modal(&self) -> Option<ModalView> {
        let (date, time, description, editing) = match &self.selection {
            Selection::Idle => return None,
            Selection::DaySelected { date } => (*date, "", "", false),
            Selection::Creating {
                date,
                time,
                description,
            } => (*date, time.as_str(), description.as_str(), false),
            Selection::Editing {
                date,
                time,
                description,
                ..
            } => (*date, time.as_str(), description.as_str(), true),
        };
        Some(ModalView {
            title: if editing { "Editar Evento" } else { "Nuevo Evento" },
            date_label: format_date(date, DateFormat::EuropeanDate),
            action_label: if editing { "Actualizar" } else { "Guardar" },
            time: time.to_string(),
            description: description.to_string(),
        })
    }
}

//! Agenda CLI application.
//!
//! # Usage
//! ```ignore
//! agenda                                   // Current month
//! agenda show 2 2026                       // February 2026
//! agenda add 2026-02-18 09:00 Standup      // New event
//! agenda edit 2026-02-18 <id> --time 10:00 // Change an event
//! agenda delete 2026-02-18 <id>            // Remove an event
//! ```

use tracing::{error, info};

use agenda::args::{Args, Command, get_display_date, init_tracing, parse_date_arg};
use agenda::error::{AgendaError, AgendaResult};
use agenda::formatter::{format_date, format_event_line, print_day_events, print_modal, print_month};
use agenda::session::Session;
use agenda::storage::{FileStore, load_events, persist_events};
use agenda::store::EventStore;
use agenda::types::{AgendaContext, DateKey};

fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.verbose, args.quiet).and_then(|()| run(&args)) {
        eprintln!("agenda: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> AgendaResult<()> {
    let ctx = AgendaContext::new(args)?;

    match &args.command {
        None => show(&ctx, None, None, 0, None),
        Some(Command::Show {
            month_arg,
            year_arg,
            shift,
            select,
        }) => show(
            &ctx,
            month_arg.as_deref(),
            year_arg.as_deref(),
            *shift,
            select.as_deref(),
        ),
        Some(Command::Add {
            date,
            time,
            description,
        }) => add(&ctx, date, time, &description.join(" ")),
        Some(Command::Edit {
            date,
            id,
            new_date,
            time,
            description,
        }) => edit(
            &ctx,
            date,
            *id,
            new_date.as_deref(),
            time.as_deref(),
            description.as_deref(),
        ),
        Some(Command::Delete { date, id }) => delete(&ctx, date, *id),
        Some(Command::List { date }) => list(&ctx, date.as_deref()),
        Some(Command::Format { date, format }) => {
            println!("{}", format_date(parse_date_arg(date)?, *format));
            Ok(())
        }
    }
}

fn show(
    ctx: &AgendaContext,
    month_arg: Option<&str>,
    year_arg: Option<&str>,
    shift: i32,
    select: Option<&str>,
) -> AgendaResult<()> {
    let anchor = get_display_date(month_arg, year_arg, ctx.today)?;
    let storage = FileStore::open(&ctx.data_dir)?;
    let store = load_events(&storage);

    let mut session = Session::new(anchor);
    session.navigate(shift);
    if let Some(select) = select {
        session.select_day(parse_date_arg(select)?);
    }

    print_month(ctx, session.current_month(), session.selected_date(), &store);

    if let Some(selected) = session.selected_date() {
        let key = DateKey::from_date(selected);
        println!();
        print_day_events(ctx, &key, store.lookup(&key));
    }
    Ok(())
}

fn add(ctx: &AgendaContext, date: &str, time: &str, description: &str) -> AgendaResult<()> {
    let storage = FileStore::open(&ctx.data_dir)?;
    let store = load_events(&storage);

    let mut session = Session::new(ctx.today);
    session.select_day(parse_date_arg(date)?);
    session.set_time(time);
    session.set_description(description);
    save(ctx, &storage, &store, session)
}

fn edit(
    ctx: &AgendaContext,
    date: &str,
    id: i64,
    new_date: Option<&str>,
    time: Option<&str>,
    description: Option<&str>,
) -> AgendaResult<()> {
    let storage = FileStore::open(&ctx.data_dir)?;
    let store = load_events(&storage);

    let key = DateKey::from_date(parse_date_arg(date)?);
    let event = store
        .find(&key, id)
        .cloned()
        .ok_or_else(|| AgendaError::EventNotFound {
            date: key.to_string(),
            id,
        })?;

    let mut session = Session::new(ctx.today);
    session.begin_edit(&key, &event);
    if let Some(new_date) = new_date {
        session.move_to(parse_date_arg(new_date)?);
    }
    if let Some(time) = time {
        session.set_time(time);
    }
    if let Some(description) = description {
        session.set_description(description);
    }
    save(ctx, &storage, &store, session)
}

/// Show the panel, commit the draft and persist the result.
fn save(
    ctx: &AgendaContext,
    storage: &FileStore,
    store: &EventStore,
    mut session: Session,
) -> AgendaResult<()> {
    if let Some(view) = session.modal() {
        print_modal(ctx, &view);
    }
    let target = session.selected_date();
    let editing_id = session.editing().map(|e| e.id);

    let now_millis = chrono::Utc::now().timestamp_millis();
    let Some(next) = session.save(store, now_millis) else {
        info!("incomplete event, nothing saved");
        return Ok(());
    };

    commit(storage, &next)?;

    if let Some(date) = target {
        let key = DateKey::from_date(date);
        let saved = match editing_id {
            Some(id) => next.find(&key, id),
            None => next.lookup(&key).last(),
        };
        if let Some(event) = saved {
            println!("{}", format_event_line(event, ctx.width));
        }
    }
    Ok(())
}

fn delete(ctx: &AgendaContext, date: &str, id: i64) -> AgendaResult<()> {
    let storage = FileStore::open(&ctx.data_dir)?;
    let store = load_events(&storage);

    let key = DateKey::from_date(parse_date_arg(date)?);
    if store.find(&key, id).is_none() {
        return Err(AgendaError::EventNotFound {
            date: key.to_string(),
            id,
        });
    }
    commit(&storage, &store.remove(&key, id))
}

fn list(ctx: &AgendaContext, date: Option<&str>) -> AgendaResult<()> {
    let storage = FileStore::open(&ctx.data_dir)?;
    let store = load_events(&storage);

    match date {
        Some(date) => {
            let key = DateKey::from_date(parse_date_arg(date)?);
            print_day_events(ctx, &key, store.lookup(&key));
        }
        None => {
            for key in store.keys() {
                print_day_events(ctx, key, store.lookup(key));
            }
        }
    }
    Ok(())
}

/// Persist after a mutation, logging any failure.
fn commit(storage: &FileStore, store: &EventStore) -> AgendaResult<()> {
    persist_events(storage, store).inspect_err(|err| {
        error!(error = %err, "failed to persist events");
    })
}

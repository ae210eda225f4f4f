//! Terminal Front End
//!
//! Line commands for the live admin dashboard and the screen they act on.

use chrono::NaiveDate;
use std::fmt::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::actions::AdminActions;
use crate::api::EventInput;
use crate::dashboard::AdminDashboard;
use crate::domain::time::parse_date;
use crate::domain::AdminAction;
use crate::export::bookings_csv;
use crate::live::ConnectionState;
use crate::modal::Prompter;
use crate::view::{admin, Region};

pub const HELP: &str = "\
Commands:
  refresh [region]                 reload one region or all of them
  date YYYY-MM-DD | next | prev    change the calendar date
  book <table>                     book a table
  occupy <table>                   mark a table occupied by walk-ins
  free <table>                     free a table
  status <booking> <action>        confirm | cancel | complete | reopen
  event add <title> | <when> | <description>
  event edit <id> <title> | <when> | <description>
  event delete <id>
  discount <guest>                 set a guest's personal discount
  note <guest> <text>              save a note about a guest
  search [query]                   filter guests by name or phone
  export [file]                    write the day's bookings as CSV
  show | help | quit";

/// One parsed command line
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    Quit,
    Show,
    Refresh(Option<Region>),
    Date(NaiveDate),
    NextDay,
    PrevDay,
    Book(u32),
    Occupy(u32),
    Free(u32),
    Status { booking_id: i64, action: AdminAction },
    AddEvent(EventInput),
    EditEvent(i64, EventInput),
    DeleteEvent(i64),
    Discount(i64),
    Note { guest_id: i64, text: String },
    Search(String),
    Export(Option<PathBuf>),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Not a number: {0}")]
    Number(String),

    #[error("Not a date (YYYY-MM-DD): {0}")]
    Date(String),

    #[error("Unknown region: {0}")]
    Region(String),

    #[error("Unknown action: {0}")]
    Action(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "show" => Ok(Command::Show),
            "refresh" => match rest {
                "" => Ok(Command::Refresh(None)),
                name => Region::parse(name)
                    .map(|r| Command::Refresh(Some(r)))
                    .ok_or_else(|| CommandError::Region(name.to_string())),
            },
            "date" => parse_date(rest)
                .map(Command::Date)
                .ok_or_else(|| CommandError::Date(rest.to_string())),
            "next" => Ok(Command::NextDay),
            "prev" => Ok(Command::PrevDay),
            "book" => number(rest, "book <table>").map(Command::Book),
            "occupy" => number(rest, "occupy <table>").map(Command::Occupy),
            "free" => number(rest, "free <table>").map(Command::Free),
            "status" => {
                const USAGE: &str = "status <booking> <action>";
                let (id, action) = rest.split_once(' ').ok_or(CommandError::Usage(USAGE))?;
                let action = action.trim();
                Ok(Command::Status {
                    booking_id: number(id, USAGE)?,
                    action: AdminAction::parse(action)
                        .ok_or_else(|| CommandError::Action(action.to_string()))?,
                })
            }
            "event" => parse_event(rest),
            "discount" => number(rest, "discount <guest>").map(Command::Discount),
            "note" => {
                const USAGE: &str = "note <guest> <text>";
                let (id, text) = rest.split_once(' ').ok_or(CommandError::Usage(USAGE))?;
                Ok(Command::Note {
                    guest_id: number(id, USAGE)?,
                    text: text.trim().to_string(),
                })
            }
            "search" => Ok(Command::Search(rest.to_string())),
            "export" => Ok(Command::Export(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn number<T: FromStr>(s: &str, usage: &'static str) -> Result<T, CommandError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    s.parse().map_err(|_| CommandError::Number(s.to_string()))
}

fn parse_event(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "event add|edit|delete ...";
    let (verb, args) = match rest.split_once(' ') {
        Some((verb, args)) => (verb, args.trim()),
        None => (rest, ""),
    };

    match verb {
        "add" => event_input(args).map(Command::AddEvent),
        "edit" => {
            let (id, fields) = args.split_once(' ').ok_or(CommandError::Usage(USAGE))?;
            Ok(Command::EditEvent(number(id, USAGE)?, event_input(fields)?))
        }
        "delete" => number(args, "event delete <id>").map(Command::DeleteEvent),
        _ => Err(CommandError::Usage(USAGE)),
    }
}

fn event_input(fields: &str) -> Result<EventInput, CommandError> {
    let mut parts = fields.splitn(3, '|').map(str::trim);
    match (parts.next(), parts.next()) {
        (Some(title), Some(datetime)) if !title.is_empty() => Ok(EventInput {
            title: title.to_string(),
            datetime: datetime.to_string(),
            description: parts.next().unwrap_or_default().to_string(),
        }),
        _ => Err(CommandError::Usage("event add <title> | <when> | <description>")),
    }
}

/// Whether the command loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Runs admin commands against the dashboard
pub struct AdminConsole {
    dashboard: Arc<AdminDashboard>,
    actions: AdminActions,
    prompter: Arc<dyn Prompter>,
}

impl AdminConsole {
    pub fn new(dashboard: Arc<AdminDashboard>, prompter: Arc<dyn Prompter>) -> Self {
        let actions = AdminActions::new(Arc::clone(dashboard.dispatcher()), Arc::clone(&prompter));
        Self {
            dashboard,
            actions,
            prompter,
        }
    }

    /// Every admin region followed by the active notices
    pub fn screen(&self, live: ConnectionState) -> String {
        let dispatcher = self.dashboard.dispatcher();
        let mut out = format!(
            "== {} admin | {} | live: {} ==\n",
            dispatcher.venue().name,
            dispatcher.admin_state().date().format("%Y-%m-%d"),
            live
        );
        for region in Region::ADMIN {
            if let Some(content) = dispatcher.regions().get(region) {
                out.push('\n');
                out.push_str(&content);
            }
        }
        let notices = admin::render_notices(&self.dashboard.notices());
        if !notices.is_empty() {
            let _ = write!(out, "\n{}", notices);
        }
        out
    }

    pub async fn execute(&self, command: Command) -> Flow {
        let dispatcher = self.dashboard.dispatcher();
        let outcome = match command {
            Command::Quit => return Flow::Quit,
            Command::Help => {
                println!("{}", HELP);
                return Flow::Continue;
            }
            Command::Show => return Flow::Continue,
            Command::Refresh(Some(region)) => {
                dispatcher.refresh(region).await;
                return Flow::Continue;
            }
            Command::Refresh(None) => {
                self.dashboard.load().await;
                return Flow::Continue;
            }
            Command::Date(date) => {
                self.actions.set_date(date).await;
                return Flow::Continue;
            }
            Command::NextDay => {
                self.actions.change_date(1).await;
                return Flow::Continue;
            }
            Command::PrevDay => {
                self.actions.change_date(-1).await;
                return Flow::Continue;
            }
            Command::Search(query) => {
                self.actions.search_guests(&query);
                return Flow::Continue;
            }
            Command::Export(path) => {
                self.export(path).await;
                return Flow::Continue;
            }
            Command::Book(table_no) => self.actions.book_table(table_no).await,
            Command::Occupy(table_no) => self.actions.occupy_table(table_no).await,
            Command::Free(table_no) => self.actions.free_table(table_no).await,
            Command::Status { booking_id, action } => {
                self.actions.change_booking_status(booking_id, action).await
            }
            Command::AddEvent(input) => self.actions.save_event(None, input).await,
            Command::EditEvent(id, input) => self.actions.save_event(Some(id), input).await,
            Command::DeleteEvent(id) => self.actions.delete_event(id).await,
            Command::Discount(guest_id) => self.actions.set_guest_discount(guest_id).await,
            Command::Note { guest_id, text } => {
                self.actions.save_guest_notes(guest_id, &text).await
            }
        };
        tracing::debug!(?outcome, "Command finished");
        Flow::Continue
    }

    async fn export(&self, path: Option<PathBuf>) {
        let state = self.dashboard.dispatcher().admin_state();
        if state.calendar().is_empty() {
            self.prompter.alert("No data to export").await;
            return;
        }
        let path = path.unwrap_or_else(|| {
            PathBuf::from(format!("bookings_{}.csv", state.date().format("%Y-%m-%d")))
        });

        let result = bookings_csv(state.calendar())
            .map_err(|e| e.to_string())
            .and_then(|csv| std::fs::write(&path, csv).map_err(|e| e.to_string()));
        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Bookings exported");
                self.prompter
                    .alert(&format!("Exported to {}", path.display()))
                    .await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Export failed");
                self.prompter.alert(&format!("Export failed: {}", e)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::FakeBackend;
    use crate::api::AdminBooking;
    use crate::config::Config;
    use crate::domain::BookingStatus;
    use crate::modal::{Answer, ScriptedPrompter};
    use crate::refresh::Dispatcher;
    use crate::view::RegionStore;
    use std::time::Duration;

    #[test]
    fn test_parse_table_commands() {
        assert_eq!("book 3".parse::<Command>(), Ok(Command::Book(3)));
        assert_eq!("  occupy   7 ".parse::<Command>(), Ok(Command::Occupy(7)));
        assert_eq!("free x".parse::<Command>(), Err(CommandError::Number("x".to_string())));
        assert_eq!("free".parse::<Command>(), Err(CommandError::Usage("free <table>")));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(
            "status 12 close".parse::<Command>(),
            Ok(Command::Status {
                booking_id: 12,
                action: AdminAction::Complete
            })
        );
        assert_eq!(
            "status 12 archive".parse::<Command>(),
            Err(CommandError::Action("archive".to_string()))
        );
    }

    #[test]
    fn test_parse_event_commands() {
        assert_eq!(
            "event add Jazz night | 2026-10-20 21:00 | Live band".parse::<Command>(),
            Ok(Command::AddEvent(EventInput {
                title: "Jazz night".to_string(),
                description: "Live band".to_string(),
                datetime: "2026-10-20 21:00".to_string(),
            }))
        );
        assert!(matches!(
            "event edit 4 Quiz | 2026-10-21 20:00".parse::<Command>(),
            Ok(Command::EditEvent(4, _))
        ));
        assert_eq!("event delete 4".parse::<Command>(), Ok(Command::DeleteEvent(4)));
        assert!("event add | 2026-10-20".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!("refresh".parse::<Command>(), Ok(Command::Refresh(None)));
        assert_eq!("refresh tables".parse::<Command>(), Ok(Command::Refresh(Some(Region::Tables))));
        assert_eq!(
            "date 2026-10-20".parse::<Command>(),
            Ok(Command::Date(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()))
        );
        assert_eq!("search".parse::<Command>(), Ok(Command::Search(String::new())));
        assert_eq!(
            "note 5 likes the corner".parse::<Command>(),
            Ok(Command::Note {
                guest_id: 5,
                text: "likes the corner".to_string()
            })
        );
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "dance".parse::<Command>(),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }

    fn console(backend: &Arc<FakeBackend>) -> (AdminConsole, Arc<ScriptedPrompter>) {
        let dispatcher = Arc::new(Dispatcher::new(
            backend.clone(),
            Arc::new(RegionStore::new()),
            &Config::default(),
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
        ));
        let dashboard = Arc::new(AdminDashboard::new(dispatcher, Duration::from_millis(3000)));
        let prompter = Arc::new(ScriptedPrompter::new(Vec::<Answer>::new()));
        (AdminConsole::new(dashboard, prompter.clone()), prompter)
    }

    #[tokio::test]
    async fn test_screen_lists_regions() {
        let backend = Arc::new(FakeBackend::new());
        let (console, _) = console(&backend);
        assert_eq!(console.execute(Command::Refresh(None)).await, Flow::Continue);

        let screen = console.screen(ConnectionState::Open);
        assert!(screen.starts_with("== Filin Lounge Bar admin | 2026-10-16 | live: open =="));
        assert!(screen.contains("Tables on 2026-10-16"));
        assert!(screen.contains("No guests found"));
        assert_eq!(console.execute(Command::Quit).await, Flow::Quit);
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let backend = Arc::new(FakeBackend::new());
        *backend.bookings.lock().unwrap() = vec![AdminBooking {
            id: 1,
            booking_at: NaiveDate::from_ymd_opt(2026, 10, 16)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap(),
            table_no: 2,
            guests: 3,
            client_name: Some("Oleg".to_string()),
            status: BookingStatus::Confirmed,
        }];
        let (console, prompter) = console(&backend);

        console.execute(Command::Export(None)).await;
        assert_eq!(prompter.alerts(), vec!["No data to export"]);

        console.execute(Command::Refresh(Some(Region::Calendar))).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("day.csv");
        console.execute(Command::Export(Some(path.clone()))).await;

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("1;18:00;2;3;Oleg;Confirmed"));
    }
}

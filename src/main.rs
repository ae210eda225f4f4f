//! Tablebook CLI
//!
//! Terminal front end for the booking backend:
//! - Live admin dashboard
//! - One-shot region snapshots
//! - Guest pages, booking and cancellation
//! - CSV export of a day's bookings

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use tablebook::actions::{ActionOutcome, BookingForm, GuestActions};
use tablebook::console::{AdminConsole, Command, CommandError, Flow};
use tablebook::domain::time::{now_local, parse_date};
use tablebook::export::bookings_csv;
use tablebook::host::{ConsoleHost, HostUser};
use tablebook::modal::{ConsolePrompter, LineInput, Prompter};
use tablebook::{
    config, logging, AdminDashboard, Backend, BackendClient, Config, Dispatcher,
    NotificationListener, Region, RegionStore, WsConnector,
};

#[derive(Parser)]
#[command(name = "tablebook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Restaurant table booking client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/tablebook/config.toml or ./tablebook.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overriding the config
    #[arg(long, global = true)]
    pub backend_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Live admin dashboard
    Admin {
        /// Calendar date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Print one region once
    Snapshot {
        /// Region name (stats, tables, calendar, events, guests, home, promotions, menu, contacts, bookings)
        region: String,
        /// Calendar date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// Telegram user id, required for guest regions
        #[arg(long)]
        telegram_id: Option<i64>,
    },

    /// Show the guest pages
    Guest {
        #[command(flatten)]
        identity: Identity,
        /// Only this page
        #[arg(short, long)]
        page: Option<String>,
    },

    /// Book a table as a guest
    Book {
        #[command(flatten)]
        identity: Identity,
        /// Phone number, +7XXXXXXXXXX
        #[arg(long)]
        phone: String,
        /// Date and time (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        at: String,
        /// Table number
        #[arg(long)]
        table: u32,
        /// Number of guests
        #[arg(long, default_value = "2")]
        guests: u32,
        /// Comment for the staff
        #[arg(long)]
        comment: Option<String>,
    },

    /// Cancel one of your bookings
    Cancel {
        booking_id: i64,
        #[command(flatten)]
        identity: Identity,
    },

    /// Export a day's bookings as CSV
    Export {
        /// Date (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Identity the host would normally supply
#[derive(Args)]
pub struct Identity {
    /// Telegram user id
    #[arg(long)]
    pub telegram_id: i64,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
}

impl Identity {
    fn into_user(self) -> HostUser {
        HostUser {
            id: self.telegram_id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            photo_url: None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.backend_url {
        config.backend.base_url = url;
    }

    if let Commands::Config { output } = &cli.command {
        let content = config::generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    logging::init(&config.logging)?;
    tracing::info!("Tablebook v{}", env!("CARGO_PKG_VERSION"));

    let backend: Arc<dyn Backend> = Arc::new(BackendClient::new(&config.backend)?);

    match cli.command {
        Commands::Admin { date } => run_admin(&config, backend, date_arg(date)?).await,
        Commands::Snapshot {
            region,
            date,
            telegram_id,
        } => run_snapshot(&config, backend, &region, date_arg(date)?, telegram_id).await,
        Commands::Guest { identity, page } => run_guest(&config, backend, identity, page).await,
        Commands::Book {
            identity,
            phone,
            at,
            table,
            guests,
            comment,
        } => {
            let form = BookingForm {
                phone,
                date_time: at,
                table_no: table,
                guests,
                comment,
            };
            run_book(&config, backend, identity, form).await
        }
        Commands::Cancel {
            booking_id,
            identity,
        } => run_cancel(&config, backend, identity, booking_id).await,
        Commands::Export { date, output } => {
            run_export(&config, backend, date_arg(date)?, output).await
        }
        Commands::Config { .. } => Ok(()),
    }
}

fn date_arg(date: Option<String>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(s) => parse_date(&s).with_context(|| format!("invalid date: {} (use YYYY-MM-DD)", s)),
        None => Ok(now_local().date()),
    }
}

fn dispatcher(config: &Config, backend: Arc<dyn Backend>, date: NaiveDate) -> Arc<Dispatcher> {
    Arc::new(Dispatcher::new(
        backend,
        Arc::new(RegionStore::new()),
        config,
        date,
    ))
}

async fn run_admin(config: &Config, backend: Arc<dyn Backend>, date: NaiveDate) -> anyhow::Result<()> {
    let dispatcher = dispatcher(config, backend, date);
    let regions = Arc::clone(dispatcher.regions());
    let dashboard = Arc::new(AdminDashboard::new(dispatcher, config.guest.notice_ttl()));

    let input = LineInput::stdin();
    let prompter: Arc<dyn Prompter> = Arc::new(ConsolePrompter::new(Arc::clone(&input)));
    let console = AdminConsole::new(Arc::clone(&dashboard), prompter);

    dashboard.load().await;

    let url = config.live.ws_url(&config.backend.base_url);
    let listener = Arc::new(NotificationListener::new(
        url,
        &config.live,
        Arc::new(WsConnector),
        dashboard.clone(),
    ));
    let mut live_state = listener.state();
    let _live = listener.spawn();

    let mut changes = regions.subscribe();
    println!("{}", console.screen(*live_state.borrow()));
    println!("Type 'help' for commands.");

    loop {
        let expiry = dashboard.next_notice_expiry();
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line else { break };
                match line.parse::<Command>() {
                    Ok(command) => {
                        if console.execute(command).await == Flow::Quit {
                            break;
                        }
                    }
                    Err(CommandError::Empty) => {}
                    Err(e) => eprintln!("{}", e),
                }
                changes.borrow_and_update();
                println!("{}", console.screen(*live_state.borrow()));
            }
            Ok(()) = changes.changed() => {
                println!("{}", console.screen(*live_state.borrow_and_update()));
            }
            _ = notice_expired(expiry) => {
                println!("{}", console.screen(*live_state.borrow()));
            }
            Ok(()) = live_state.changed() => {
                let state = *live_state.borrow_and_update();
                tracing::debug!(%state, "Live channel state changed");
            }
        }
    }

    tracing::info!("Admin session closed");
    Ok(())
}

/// Resolves once the earliest notice has expired; never when none are shown
async fn notice_expired(expiry: Option<tokio::time::Instant>) {
    match expiry {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

async fn run_snapshot(
    config: &Config,
    backend: Arc<dyn Backend>,
    region: &str,
    date: NaiveDate,
    telegram_id: Option<i64>,
) -> anyhow::Result<()> {
    let Some(region) = Region::parse(region) else {
        bail!("unknown region: {}", region);
    };
    let dispatcher = dispatcher(config, backend, date);
    if !region.is_admin() {
        let Some(id) = telegram_id else {
            bail!("--telegram-id is required for the {} page", region);
        };
        dispatcher.update_guest(|s| {
            s.set_user(Some(HostUser {
                id,
                ..Default::default()
            }))
        });
    }

    if !dispatcher.refresh(region).await {
        bail!("could not load {} from {}", region, config.backend.base_url);
    }
    print!("{}", dispatcher.regions().get(region).unwrap_or_default());
    Ok(())
}

async fn run_guest(
    config: &Config,
    backend: Arc<dyn Backend>,
    identity: Identity,
    page: Option<String>,
) -> anyhow::Result<()> {
    let pages = match page {
        Some(name) => match Region::parse(&name).filter(|r| Region::GUEST.contains(r)) {
            Some(region) => vec![region],
            None => bail!("unknown page: {}", name),
        },
        None => Region::GUEST.to_vec(),
    };

    let dispatcher = dispatcher(config, backend, now_local().date());
    dispatcher.update_guest(|s| s.set_user(Some(identity.into_user())));
    if !dispatcher.refresh_guest().await {
        bail!("could not load guest pages from {}", config.backend.base_url);
    }

    for region in pages {
        println!("## {}", region);
        print!("{}", dispatcher.regions().get(region).unwrap_or_default());
        println!();
    }
    Ok(())
}

fn guest_actions(config: &Config, dispatcher: Arc<Dispatcher>, user: HostUser) -> GuestActions {
    let input = LineInput::stdin();
    GuestActions::new(
        dispatcher,
        Arc::new(ConsolePrompter::new(input)),
        Arc::new(ConsoleHost::new(Some(user))),
        &config.backend.base_url,
    )
}

async fn run_book(
    config: &Config,
    backend: Arc<dyn Backend>,
    identity: Identity,
    form: BookingForm,
) -> anyhow::Result<()> {
    let user = identity.into_user();
    let dispatcher = dispatcher(config, backend, now_local().date());
    dispatcher.update_guest(|s| s.set_user(Some(user.clone())));
    let actions = guest_actions(config, Arc::clone(&dispatcher), user);

    let outcome = actions.create_booking(form).await;
    let status = dispatcher
        .regions()
        .get(Region::BookingForm)
        .unwrap_or_default();
    match outcome {
        ActionOutcome::Done => {
            println!("{}", status);
            Ok(())
        }
        _ => bail!("{}", status),
    }
}

async fn run_cancel(
    config: &Config,
    backend: Arc<dyn Backend>,
    identity: Identity,
    booking_id: i64,
) -> anyhow::Result<()> {
    let user = identity.into_user();
    let dispatcher = dispatcher(config, backend, now_local().date());
    dispatcher.update_guest(|s| s.set_user(Some(user.clone())));
    if !dispatcher.refresh_guest().await {
        bail!("could not load your bookings from {}", config.backend.base_url);
    }

    let actions = guest_actions(config, dispatcher, user);
    match actions.cancel_booking(booking_id).await {
        ActionOutcome::Done | ActionOutcome::Declined => Ok(()),
        ActionOutcome::Invalid(message) | ActionOutcome::Failed(message) => bail!(message),
    }
}

async fn run_export(
    config: &Config,
    backend: Arc<dyn Backend>,
    date: NaiveDate,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let dispatcher = dispatcher(config, backend, date);
    if !dispatcher.refresh(Region::Calendar).await {
        bail!("could not load bookings for {}", date);
    }

    let state = dispatcher.admin_state();
    let csv = bookings_csv(state.calendar())?;
    match output {
        Some(path) => {
            std::fs::write(&path, csv).with_context(|| format!("writing {}", path.display()))?;
            println!(
                "Exported {} bookings to {}",
                state.calendar().len(),
                path.display()
            );
        }
        None => print!("{}", csv),
    }
    Ok(())
}

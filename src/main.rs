mod completion;
mod config;
mod google;
mod oauth;
mod operator;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use clap::{CommandFactory, Parser, Subcommand};
use completion::CompletionRequest;
use gcal_core::error::FAILURE_EXIT_CODE;
use gcal_core::{
    CommandRouter, CommandSpec, CredentialStore, GcalError, GcalResult, Request, SessionManager,
    Verb,
};
use google::GoogleCalendar;
use oauth::HttpTokenEndpoint;
use operator::ConsoleOperator;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const PROGRAM: &str = "gcal";

/// Log filter, in `EnvFilter` syntax.
const LOG_ENV: &str = "GCAL_LOG";

#[derive(Parser)]
#[command(name = "gcal", version)]
#[command(about = "List, add and delete Google Calendar events")]
#[command(after_help = "Use `--` before an event name that starts with a dash: \
    gcal add events primary -- -1:1-")]
struct Cli {
    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List calendars, or the next upcoming events of a calendar
    ///
    /// gcal list calendars
    /// gcal list events <calendar-id>
    List {
        /// What to list: calendars | events
        object: Option<String>,

        /// Calendar id (for events)
        args: Vec<String>,
    },
    /// Add an event starting in 30 minutes and lasting an hour
    ///
    /// gcal add events <calendar-id> <event name...>
    Add {
        /// What to add: events
        object: Option<String>,

        /// Calendar id, then the event name
        args: Vec<String>,
    },
    /// Delete an event
    ///
    /// gcal delete events <calendar-id> <event-id>
    Delete {
        /// What to delete: events
        object: Option<String>,

        /// Calendar id, then the event id
        args: Vec<String>,
    },
}

impl Commands {
    fn into_spec(self) -> GcalResult<CommandSpec> {
        let (verb, object, args) = match self {
            Commands::List { object, args } => (Verb::List, object, args),
            Commands::Add { object, args } => (Verb::Add, object, args),
            Commands::Delete { object, args } => (Verb::Delete, object, args),
        };
        CommandSpec::from_parts(verb, object.as_deref(), args)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Some(request) = completion::from_env(PROGRAM) {
        match request {
            CompletionRequest::Complete(candidates) => {
                for candidate in candidates {
                    println!("{}", candidate);
                }
            }
            CompletionRequest::Install(line) => println!("{}", line),
        }
        return ExitCode::SUCCESS;
    }

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        if let Err(e) = write_help(&mut std::io::stdout()) {
            eprintln!("Failed to print help: {}", e);
            return ExitCode::from(FAILURE_EXIT_CODE);
        }
        return ExitCode::SUCCESS;
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        }
    }
}

fn write_help(out: &mut impl Write) -> io::Result<()> {
    Cli::command().write_help(out)?;
    out.flush()
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,gcal=debug,gcal_core=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {}", e);
    }
}

async fn run(command: Commands) -> Result<()> {
    let spec = command.into_spec()?;

    // Usage mistakes must never lead to a sign-in prompt.
    Request::resolve(&spec, Utc::now())?;

    let dir = config::config_dir()?;
    let client_config = config::load_client_config(&config::credentials_path(&dir))?;

    let mut sessions = SessionManager::new(
        CredentialStore::new(config::token_path(&dir)),
        HttpTokenEndpoint::new(),
        ConsoleOperator,
    );
    let handle = sessions.get_handle(client_config).await?;
    debug!(?handle, "Session ready");

    // Resolved again so a slow sign-in does not shift the new event's times.
    let calendar = GoogleCalendar::new(&handle);
    let outcome = CommandRouter::new(&calendar)
        .dispatch(spec, Utc::now())
        .await?;

    print!("{}", outcome);
    Ok(())
}

fn exit_code(e: &anyhow::Error) -> u8 {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<GcalError>())
        .map(GcalError::exit_code)
        .unwrap_or(FAILURE_EXIT_CODE)
}

//! flipdeck - flashcard study queue
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use flipdeck::cli::config_cmd::ConfigOptions;
use flipdeck::cli::list::ListOptions;
use flipdeck::cli::queue_cmd::{QueueAction, QueueOptions};
use flipdeck::cli::reset::ResetOptions;
use flipdeck::cli::select::{SelectAction, SelectOptions};
use flipdeck::cli::stats::StatsOptions;
use flipdeck::cli::study::{StudyAction, StudyOptions};
use flipdeck::config::{crash_log_path, Config};
use flipdeck::deck::{DeckFile, DeckSource, NoDeck, SourceDeck};
use flipdeck::error::exit_codes;
use flipdeck::{
    CardStatus, ConfigCommand, DebouncedStore, FileSnapshotStore, Identity, ListCommand,
    QueueCommand, ResetCommand, SelectCommand, StatsCommand, StudyCommand, StudySession,
};

// =============================================================================
// CLI Definition
// =============================================================================

/// flipdeck - study flashcards from the terminal
#[derive(Parser)]
#[command(name = "flipdeck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, short, global = true)]
    json: bool,
    /// Suppress output
    #[arg(long, short, global = true)]
    quiet: bool,
    /// Current user; progress is stored separately per user
    #[arg(long, env = "FLIPDECK_USER", global = true)]
    user: Option<String>,
    /// Deck file (JSON array of {question, answer})
    #[arg(long, global = true)]
    deck: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the card at the head of the queue
    Show,
    /// Turn the current card over
    Flip,
    /// Mark the current card as known
    Known,
    /// Mark the current card as not known
    Unknown,
    /// Toggle whether a card is selected for study
    Select {
        /// Card id
        id: u32,
    },
    /// Select every card
    SelectAll,
    /// Deselect every card
    DeselectAll,
    /// Select only cards in the given group
    Filter {
        #[arg(value_enum)]
        group: FilterGroup,
    },
    /// Shuffle the current queue
    Shuffle,
    /// Rebuild the queue from the selected cards
    Rebuild {
        /// Shuffle the rebuilt queue
        #[arg(long, conflicts_with = "no_shuffle")]
        shuffle: bool,
        /// Keep the rebuilt queue ordered
        #[arg(long)]
        no_shuffle: bool,
    },
    /// Erase all progress and start over from the deck
    Reset {
        /// Confirm the reset
        #[arg(long, short)]
        yes: bool,
    },
    /// Show mastery progress
    Stats,
    /// List cards
    List {
        /// Only cards with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Only selected cards
        #[arg(long)]
        selected: bool,
        /// Maximum number of cards
        #[arg(long, short)]
        limit: Option<usize>,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterGroup {
    Learned,
    Unlearned,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    New,
    Learning,
    Learned,
}

impl From<StatusArg> for CardStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::New => CardStatus::New,
            StatusArg::Learning => CardStatus::Learning,
            StatusArg::Learned => CardStatus::Learned,
        }
    }
}

/// Deck chosen on the command line or in config.
enum CliDeck {
    File(DeckFile),
    Missing(NoDeck),
}

impl DeckSource for CliDeck {
    fn load_deck(&self) -> flipdeck::Result<SourceDeck> {
        match self {
            CliDeck::File(file) => file.load_deck(),
            CliDeck::Missing(none) => none.load_deck(),
        }
    }
}

type CliSession = StudySession<DebouncedStore<FileSnapshotStore>, CliDeck>;

// =============================================================================
// Main
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("flipdeck error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Log to stderr, filtered by `FLIPDECK_LOG` (default `warn`).
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_env("FLIPDECK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

/// Set up the global panic handler.
///
/// On panic, appends to `~/.flipdeck/crash.log` and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("flipdeck panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = Config::load_from_cwd(&cwd);

    if let Commands::Config = cli.command {
        let cmd = ConfigCommand::new(config, &cwd);
        let output = cmd.run();
        print_output(cmd.format_output(
            &output,
            &ConfigOptions {
                json: cli.json,
                quiet: cli.quiet,
            },
        ));
        return Ok(success_to_exit_code(output.success));
    }

    let deck = match cli.deck.or_else(|| config.deck_path(&cwd)) {
        Some(path) => CliDeck::File(DeckFile::new(path)),
        None => CliDeck::Missing(NoDeck),
    };
    let identity = Identity::from_current_user(cli.user);
    let store = DebouncedStore::new(FileSnapshotStore::new()?, config.debounce());
    let mut session = StudySession::open(store, deck, &identity, &config)?;

    let code = dispatch(&mut session, cli.command, cli.json, cli.quiet);

    // Writes are debounced; make sure the last one lands before exit.
    session.flush()?;
    Ok(code)
}

fn dispatch(session: &mut CliSession, command: Commands, json: bool, quiet: bool) -> ExitCode {
    match command {
        Commands::Show => run_study(session, StudyAction::Show, json, quiet),
        Commands::Flip => run_study(session, StudyAction::Flip, json, quiet),
        Commands::Known => run_study(session, StudyAction::Known, json, quiet),
        Commands::Unknown => run_study(session, StudyAction::Unknown, json, quiet),
        Commands::Select { id } => run_select(session, SelectAction::Toggle(id), json, quiet),
        Commands::SelectAll => run_select(session, SelectAction::All, json, quiet),
        Commands::DeselectAll => run_select(session, SelectAction::None, json, quiet),
        Commands::Filter { group } => {
            let action = match group {
                FilterGroup::Learned => SelectAction::Learned,
                FilterGroup::Unlearned => SelectAction::Unlearned,
            };
            run_select(session, action, json, quiet)
        }
        Commands::Shuffle => run_queue(session, QueueAction::Shuffle, json, quiet),
        Commands::Rebuild {
            shuffle,
            no_shuffle,
        } => {
            let shuffle = match (shuffle, no_shuffle) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            run_queue(session, QueueAction::Rebuild { shuffle }, json, quiet)
        }
        Commands::Reset { yes } => run_reset(session, yes, json, quiet),
        Commands::Stats => run_stats(session, json, quiet),
        Commands::List {
            status,
            selected,
            limit,
        } => run_list(
            session,
            ListOptions {
                json,
                quiet,
                status: status.map(CardStatus::from),
                selected_only: selected,
                limit,
            },
        ),
        // Handled before the session opens.
        Commands::Config => success_to_exit_code(true),
    }
}

// =============================================================================
// Command Runners
// =============================================================================

fn run_study(session: &mut CliSession, action: StudyAction, json: bool, quiet: bool) -> ExitCode {
    let mut cmd = StudyCommand::new(session);
    let output = cmd.run(action);
    print_output(cmd.format_output(&output, &StudyOptions { json, quiet }));
    success_to_exit_code(output.success)
}

fn run_select(
    session: &mut CliSession,
    action: SelectAction,
    json: bool,
    quiet: bool,
) -> ExitCode {
    let mut cmd = SelectCommand::new(session);
    let output = cmd.run(action);
    print_output(cmd.format_output(&output, &SelectOptions { json, quiet }));
    success_to_exit_code(output.success)
}

fn run_queue(session: &mut CliSession, action: QueueAction, json: bool, quiet: bool) -> ExitCode {
    let mut cmd = QueueCommand::new(session);
    let output = cmd.run(action);
    print_output(cmd.format_output(&output, &QueueOptions { json, quiet }));
    success_to_exit_code(output.success)
}

fn run_reset(session: &mut CliSession, yes: bool, json: bool, quiet: bool) -> ExitCode {
    let options = ResetOptions { json, quiet, yes };
    let mut cmd = ResetCommand::new(session);
    let output = cmd.run(&options);
    print_output(cmd.format_output(&output, &options));
    success_to_exit_code(output.success)
}

fn run_stats(session: &CliSession, json: bool, quiet: bool) -> ExitCode {
    let cmd = StatsCommand::new(session);
    let output = cmd.run();
    print_output(cmd.format_output(&output, &StatsOptions { json, quiet }));
    success_to_exit_code(output.success)
}

fn run_list(session: &CliSession, options: ListOptions) -> ExitCode {
    let cmd = ListCommand::new(session);
    let output = cmd.run(&options);
    print_output(cmd.format_output(&output, &options));
    success_to_exit_code(output.success)
}

fn print_output(formatted: String) {
    if !formatted.is_empty() {
        print!("{}", formatted);
        if !formatted.ends_with('\n') {
            println!();
        }
    }
}

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

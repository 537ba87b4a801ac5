use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;

use querylens_log::config::{DEFAULT_CONFIG_PATH, DEFAULT_LOG_PATH};
use querylens_log::{DEFAULT_CHUNK_SIZE, ProxyConfig, QueryLog, ReadPolicy};
use querylens_tui::{
    Action, AppState, Event, EventHandler, KeyBindings, KeyContext, QueryLogScreen, Tui,
};
use querylens_types::{FilterCriteria, QueryOutcome};

mod output;

/// querylens - browse and filter dnscrypt-proxy query logs
#[derive(Parser, Debug)]
#[command(name = "querylens")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Query log to read (overrides the proxy config)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// dnscrypt-proxy configuration
    /// [default: /usr/local/etc/dnscrypt-proxy/dnscrypt-proxy.toml]
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only show queries whose domain contains this text
    #[arg(long)]
    domain: Option<String>,

    /// Only show queries of this type (A, AAAA, MX, ...)
    #[arg(long = "type", value_name = "TYPE")]
    query_type: Option<String>,

    /// Only show queries from clients whose address contains this text
    #[arg(long)]
    client: Option<String>,

    /// Maximum records to show, clamped to 10..=1000 (default 100)
    #[arg(long, value_name = "N", allow_hyphen_values = true)]
    entries: Option<String>,

    /// Bytes read per step when scanning backwards
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Load the whole log into memory instead of reading it in chunks
    #[arg(long)]
    whole_file: bool,

    /// Stop after examining this many lines
    #[arg(long, value_name = "LINES")]
    max_scan: Option<usize>,

    /// Re-run the query every SECONDS in the viewer
    #[arg(long, value_name = "SECONDS")]
    refresh: Option<u64>,

    /// Print matching records as a table and exit
    #[arg(long, conflicts_with_all = ["json", "clear"])]
    print: bool,

    /// Print matching records as JSON and exit
    #[arg(long, conflicts_with = "clear")]
    json: bool,

    /// Truncate the query log and exit (requires --yes)
    #[arg(long)]
    clear: bool,

    /// Confirm --clear
    #[arg(long, requires = "clear")]
    yes: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing for debugging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let LogSource {
        log,
        logging_enabled,
        ignored_types,
    } = open_log(&args)?;
    let criteria = criteria_from_args(&args);

    if args.clear {
        if !args.yes {
            anyhow::bail!(
                "Refusing to clear {} without --yes",
                log.path().display()
            );
        }
        log.clear()
            .with_context(|| format!("Failed to clear {}", log.path().display()))?;
        println!("Cleared {}", log.path().display());
        return Ok(());
    }

    if args.print || args.json {
        let outcome = log
            .query(&criteria)
            .with_context(|| format!("Failed to query {}", log.path().display()))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        } else {
            print!("{}", output::render_table(&outcome));
        }
        return Ok(());
    }

    let refresh = args.refresh.filter(|s| *s > 0).map(Duration::from_secs);
    let state = AppState::new(log.path().to_path_buf(), logging_enabled, &criteria)
        .with_ignored_types(ignored_types);
    run_app(log, state, refresh).await
}

/// The log to read, plus what the proxy config says about it
struct LogSource {
    log: QueryLog,

    /// Proxy logging switch, when the path came from its config or the default
    logging_enabled: Option<bool>,

    /// Query types the proxy does not log (empty with `--log-file`)
    ignored_types: Vec<String>,
}

/// Resolve the log path and read policy
fn open_log(args: &Args) -> Result<LogSource> {
    let config = load_proxy_config(args.config.as_deref())?;

    let (path, logging_enabled, ignored_types) = match &args.log_file {
        Some(path) => (path.clone(), None, Vec::new()),
        None => (
            config
                .as_ref()
                .and_then(ProxyConfig::log_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH)),
            config.as_ref().map(ProxyConfig::is_logging_enabled),
            config
                .as_ref()
                .map(|c| c.ignored_query_types().to_vec())
                .unwrap_or_default(),
        ),
    };

    let policy = if args.whole_file {
        ReadPolicy::WholeFile
    } else {
        ReadPolicy::Chunked {
            chunk_size: args.chunk_size,
        }
    };
    tracing::debug!(path = %path.display(), ?policy, "Using query log");

    let log = QueryLog::new(path)
        .with_policy(policy)
        .with_max_scan(args.max_scan);
    Ok(LogSource {
        log,
        logging_enabled,
        ignored_types,
    })
}

/// An explicit config must load; the default location is optional
fn load_proxy_config(explicit: Option<&Path>) -> Result<Option<ProxyConfig>> {
    if let Some(path) = explicit {
        let config = ProxyConfig::load(path)
            .with_context(|| format!("Failed to load proxy config {}", path.display()))?;
        return Ok(Some(config));
    }

    let path = Path::new(DEFAULT_CONFIG_PATH);
    if !path.exists() {
        return Ok(None);
    }
    match ProxyConfig::load(path) {
        Ok(config) => Ok(Some(config)),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring proxy config");
            Ok(None)
        }
    }
}

fn criteria_from_args(args: &Args) -> FilterCriteria {
    let mut criteria = FilterCriteria::new().with_max_entries_input(args.entries.as_deref());
    if let Some(domain) = &args.domain {
        criteria = criteria.with_domain(domain.clone());
    }
    if let Some(query_type) = &args.query_type {
        criteria = criteria.with_query_type(query_type.clone());
    }
    if let Some(client) = &args.client {
        criteria = criteria.with_client(client.clone());
    }
    criteria
}

/// Results of work running off the event loop
enum InternalAction {
    QueryFinished {
        generation: u64,
        criteria: FilterCriteria,
        result: std::result::Result<QueryOutcome, String>,
    },
    ClearFinished(std::result::Result<(), String>),
}

async fn run_app(log: QueryLog, mut state: AppState, refresh: Option<Duration>) -> Result<()> {
    let log = Arc::new(log);

    // Create action channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(refresh);
    let keybindings = KeyBindings::new();

    spawn_query(&log, &mut state, &internal_tx);
    render(&mut tui, &mut state)?;

    // Main event loop
    loop {
        tokio::select! {
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        let action = if state.ui_state.confirm_clear_visible {
                            keybindings.get_action(KeyContext::ConfirmClear, &key)
                        } else if state.ui_state.editing.is_some() {
                            keybindings.get_filter_input_action(&key)
                        } else {
                            keybindings.get_action(KeyContext::Viewer, &key)
                        };

                        if let Some(action) = action {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Tick => {
                        let _ = action_tx.send(Action::Tick);
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        state.show_error(e);
                    }
                }
            }

            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &log, &internal_tx, action);
            }

            Some(internal) = internal_rx.recv() => {
                match internal {
                    InternalAction::QueryFinished { generation, criteria, result } => {
                        state.finish_query(generation, &criteria, result);
                    }
                    InternalAction::ClearFinished(Ok(())) => {
                        state.show_notice("Query log cleared".to_string());
                        spawn_query(&log, &mut state, &internal_tx);
                    }
                    InternalAction::ClearFinished(Err(msg)) => {
                        state.show_error(msg);
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    events.shutdown();
    tui.restore()?;

    Ok(())
}

fn handle_action(
    state: &mut AppState,
    log: &Arc<QueryLog>,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    action: Action,
) {
    match action {
        Action::Quit => {
            state.should_quit = true;
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }

        Action::ScrollUp(n) => state.scroll_up(n),
        Action::ScrollDown(n) => state.scroll_down(n),
        Action::PageUp => state.page_up(),
        Action::PageDown => state.page_down(),
        Action::ScrollToTop => state.scroll_to_top(),
        Action::ScrollToBottom => state.scroll_to_bottom(),

        Action::EditField(field) => {
            state.ui_state.help_visible = false;
            state.start_edit(field);
        }
        Action::InputChar(c) => state.input_char(c),
        Action::InputBackspace => state.input_backspace(),
        Action::InputClear => state.input_clear(),
        Action::CancelInput => state.cancel_input(),
        Action::ApplyInput => {
            if state.apply_input() {
                spawn_query(log, state, internal_tx);
            }
        }

        Action::NextQueryType => {
            state.next_query_type();
            spawn_query(log, state, internal_tx);
        }
        Action::PrevQueryType => {
            state.prev_query_type();
            spawn_query(log, state, internal_tx);
        }
        Action::MoreEntries => {
            state.more_entries();
            spawn_query(log, state, internal_tx);
        }
        Action::FewerEntries => {
            state.fewer_entries();
            spawn_query(log, state, internal_tx);
        }
        Action::ResetFilters => {
            state.reset_filters();
            spawn_query(log, state, internal_tx);
        }

        Action::Refresh => {
            state.dismiss_error();
            spawn_query(log, state, internal_tx);
        }
        Action::Tick => {
            // Skip auto-refresh while a scan is still running
            if !state.loading {
                spawn_query(log, state, internal_tx);
            }
        }

        Action::RequestClear => {
            state.ui_state.help_visible = false;
            state.ui_state.confirm_clear_visible = true;
        }
        Action::ConfirmClear => {
            state.ui_state.confirm_clear_visible = false;
            spawn_clear(log, internal_tx);
        }
        Action::CancelClear => {
            state.ui_state.confirm_clear_visible = false;
        }

        Action::DismissError => {
            if state.ui_state.help_visible {
                state.ui_state.help_visible = false;
            } else {
                state.dismiss_error();
            }
        }
        Action::Render => {}
    }
}

/// Run the current criteria against the log on the blocking pool
fn spawn_query(
    log: &Arc<QueryLog>,
    state: &mut AppState,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
) {
    let (generation, criteria) = state.begin_query();
    let log = Arc::clone(log);
    let tx = internal_tx.clone();

    tokio::task::spawn_blocking(move || {
        let result = log.query(&criteria).map_err(|e| e.to_string());
        let _ = tx.send(InternalAction::QueryFinished {
            generation,
            criteria,
            result,
        });
    });
}

fn spawn_clear(log: &Arc<QueryLog>, internal_tx: &mpsc::UnboundedSender<InternalAction>) {
    let log = Arc::clone(log);
    let tx = internal_tx.clone();

    tokio::task::spawn_blocking(move || {
        let result = log
            .clear()
            .map_err(|e| format!("Failed to clear query log: {}", e));
        let _ = tx.send(InternalAction::ClearFinished(result));
    });
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal()
        .draw(|frame| QueryLogScreen::render(frame, state))?;
    Ok(())
}

// ============================================================================
// NavScope - mutual fund NAV comparison in the terminal
// ============================================================================
// Sign in locally, browse and filter the mfapi.in fund catalog, pick 2 to 4
// funds and chart their NAV histories on one shared date axis.
//
// Architecture: a synchronous TUI event loop (render -> input -> update)
// sharing Arc<Mutex<App>> with one background worker thread. The worker owns
// a tokio runtime and services fetch commands sent over mpsc channels, so
// network I/O never blocks the interface.
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use navscope::api::{fetch_all_funds, fetch_many_details};
use navscope::app::App;
use navscope::models::{Fund, FundDetail};
use navscope::state::{AuthStore, SelectionStore};
use navscope::storage::LocalStore;
use navscope::ui::{events::EventHandler, render};

// ============================================================================
// Worker commands and results
// ============================================================================
// The event loop sends commands to the worker thread; the worker executes
// the async fetches and reports back over the result channel.
// ============================================================================

/// Commands sent to the background worker.
#[derive(Debug, Clone)]
enum AppCommand {
    /// Fetch the full fund catalog.
    LoadCatalog,

    /// Fetch NAV histories for the selected funds. All requests go out
    /// concurrently; one failure fails the batch.
    LoadComparison { codes: Vec<u32> },
}

/// Results sent back by the worker.
#[derive(Debug)]
enum AppResult {
    CatalogLoaded(Vec<Fund>),
    CatalogFailed(String),
    ComparisonLoaded(Vec<FundDetail>),
    ComparisonFailed(String),
}

// ============================================================================
// Logging
// ============================================================================
// println! is useless once the alternate screen is up, so logs go to a
// daily-rotated file under the per-user data directory. Level via RUST_LOG
// (default: debug for navscope, info for dependencies).
// ============================================================================

fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_dir()
        .context("Could not determine the user data directory")?
        .join("navscope")
        .join("logs");
    std::fs::create_dir_all(&log_dir).context("Failed to create the log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "navscope.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navscope=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Entry point
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("Warning: failed to initialize logging: {}", e);
    });

    info!("NavScope starting up");

    // Restore the persisted session and selection before the TUI starts
    let store = LocalStore::open_default()?;
    let auth = AuthStore::load(store.clone());
    let selection = SelectionStore::load(store);
    let app = Arc::new(Mutex::new(App::new(auth, selection)));

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, app.clone());

    // A restored session skips the login screen, so kick off the catalog
    // fetch immediately.
    {
        let app_lock = app.lock().unwrap();
        if app_lock.auth.is_authenticated() {
            let _ = command_tx.send(AppCommand::LoadCatalog);
        }
    }

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app.clone(), &events, command_tx, result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background worker
// ============================================================================

/// Worker thread servicing async fetches so the UI never blocks.
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    app: Arc<Mutex<App>>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = %e, "Failed to create tokio runtime, worker unavailable");
                return;
            }
        };

        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::LoadCatalog => {
                    {
                        let mut app_lock = app.lock().unwrap();
                        app_lock.start_loading(Some("Loading mutual funds...".to_string()));
                    }

                    let result = runtime.block_on(fetch_all_funds());
                    match result {
                        Ok(funds) => {
                            info!(funds = funds.len(), "Catalog loaded");
                            let _ = result_tx.send(AppResult::CatalogLoaded(funds));
                        }
                        Err(e) => {
                            error!(error = ?e, "Failed to load catalog");
                            let _ = result_tx.send(AppResult::CatalogFailed(format!(
                                "Failed to load funds: {}",
                                e
                            )));
                        }
                    }

                    app.lock().unwrap().stop_loading();
                }

                AppCommand::LoadComparison { codes } => {
                    {
                        let mut app_lock = app.lock().unwrap();
                        app_lock.start_loading(Some(format!(
                            "Loading NAV history for {} funds...",
                            codes.len()
                        )));
                    }

                    let result = runtime.block_on(fetch_many_details(&codes));
                    match result {
                        Ok(details) => {
                            info!(funds = details.len(), "Comparison details loaded");
                            let _ = result_tx.send(AppResult::ComparisonLoaded(details));
                        }
                        Err(e) => {
                            error!(error = ?e, "Failed to load comparison details");
                            let _ = result_tx.send(AppResult::ComparisonFailed(format!(
                                "Failed to load fund details: {}",
                                e
                            )));
                        }
                    }

                    app.lock().unwrap().stop_loading();
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

// ============================================================================
// Event loop
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // Drain worker results without blocking
        while let Ok(result) = result_rx.try_recv() {
            let mut app_lock = app.lock().unwrap();
            match result {
                AppResult::CatalogLoaded(funds) => app_lock.set_catalog(funds),
                AppResult::CatalogFailed(message) => app_lock.catalog_failed(message),
                AppResult::ComparisonLoaded(details) => app_lock.comparison_loaded(details),
                AppResult::ComparisonFailed(message) => app_lock.comparison_failed(message),
            }
        }

        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        if let Ok(event) = events.next() {
            let mut app_lock = app.lock().unwrap();
            handle_event(&mut app_lock, event, &command_tx);
        }
    }

    Ok(())
}

// ============================================================================
// Event dispatch
// ============================================================================

/// Routes a key event according to the active screen.
fn handle_event(app: &mut App, event: navscope::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use navscope::ui::events::{
        get_char_from_event, is_backspace_event, is_category_event, is_clear_filters_event,
        is_clear_selection_event, is_down_event, is_enter_event, is_escape_event,
        is_fund_house_event, is_logout_event, is_nav_range_event, is_quit_event, is_retry_event,
        is_scheme_type_event, is_search_event, is_select_event, is_tab_event, is_text_char_event,
        is_up_event, Event,
    };
    use navscope::app::LoginField;

    match event {
        // ========================================
        // Login screen: free-form typing, so no single-letter shortcuts
        // ========================================
        Event::Key(_) if app.is_on_login() && is_escape_event(&event) => {
            info!("User quit from login screen");
            app.quit();
        }

        Event::Key(_) if app.is_on_login() && is_tab_event(&event) => {
            app.focus_next_login_field();
        }

        Event::Key(_) if app.is_on_login() && is_enter_event(&event) => {
            // Enter advances from email to password, then submits
            if app.login_focus == LoginField::Email && app.login_password.is_empty() {
                app.focus_next_login_field();
            } else if app.submit_login() {
                info!("Login accepted");
                if app.catalog.is_empty() {
                    let _ = command_tx.send(AppCommand::LoadCatalog);
                }
            }
        }

        Event::Key(_) if app.is_on_login() && is_backspace_event(&event) => {
            app.login_field_mut().pop();
        }

        Event::Key(_) if app.is_on_login() && is_text_char_event(&event) => {
            if let Some(c) = get_char_from_event(&event) {
                app.login_field_mut().push(c);
            }
        }

        // ========================================
        // Modal input (search / NAV range)
        // ========================================
        Event::Key(_) if app.is_in_input_mode() && is_escape_event(&event) => {
            app.cancel_input();
        }

        Event::Key(_) if app.is_in_input_mode() && is_enter_event(&event) => {
            app.submit_input();
        }

        Event::Key(_) if app.is_in_input_mode() && is_backspace_event(&event) => {
            app.input_backspace();
        }

        Event::Key(_) if app.is_in_input_mode() && is_text_char_event(&event) => {
            if let Some(c) = get_char_from_event(&event) {
                app.append_input_char(c);
            }
        }

        // ========================================
        // Quit: two-step confirmation on the main screens
        // ========================================
        Event::Key(_) if is_quit_event(&event) && (app.is_on_funds() || app.is_on_comparison()) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                app.request_quit();
            }
        }

        // ========================================
        // Fund selection screen
        // ========================================
        Event::Key(_) if app.is_on_funds() && is_up_event(&event) => {
            app.cancel_quit();
            app.navigate_up();
        }

        Event::Key(_) if app.is_on_funds() && is_down_event(&event) => {
            app.cancel_quit();
            app.navigate_down();
        }

        Event::Key(_) if app.is_on_funds() && is_select_event(&event) => {
            app.cancel_quit();
            app.toggle_under_cursor();
        }

        Event::Key(_) if app.is_on_funds() && is_enter_event(&event) => {
            app.cancel_quit();
            if app.show_comparison() {
                info!(funds = app.selection.len(), "User opened comparison");
                let _ = command_tx.send(AppCommand::LoadComparison {
                    codes: app.selection.scheme_codes(),
                });
            }
        }

        Event::Key(_) if app.is_on_funds() && is_search_event(&event) => {
            app.cancel_quit();
            app.start_search_input();
        }

        Event::Key(_) if app.is_on_funds() && is_category_event(&event) => {
            app.cancel_quit();
            app.cycle_category();
        }

        Event::Key(_) if app.is_on_funds() && is_fund_house_event(&event) => {
            app.cancel_quit();
            app.cycle_fund_house();
        }

        Event::Key(_) if app.is_on_funds() && is_scheme_type_event(&event) => {
            app.cancel_quit();
            app.cycle_scheme_type();
        }

        Event::Key(_) if app.is_on_funds() && is_nav_range_event(&event) => {
            app.cancel_quit();
            app.start_nav_range_input();
        }

        Event::Key(_) if app.is_on_funds() && is_clear_filters_event(&event) => {
            app.cancel_quit();
            app.clear_filters();
        }

        Event::Key(_) if app.is_on_funds() && is_clear_selection_event(&event) => {
            app.cancel_quit();
            app.selection.clear();
        }

        Event::Key(_) if app.is_on_funds() && is_retry_event(&event) => {
            app.cancel_quit();
            if app.catalog_error.is_some() {
                info!("User retried catalog load");
                let _ = command_tx.send(AppCommand::LoadCatalog);
            }
        }

        Event::Key(_) if app.is_on_funds() && is_logout_event(&event) => {
            info!("User logged out");
            app.cancel_quit();
            app.logout();
        }

        // ========================================
        // Comparison screen
        // ========================================
        Event::Key(_) if app.is_on_comparison() && is_escape_event(&event) => {
            app.cancel_quit();
            app.show_funds();
        }

        Event::Key(_) if app.is_on_comparison() && is_retry_event(&event) => {
            app.cancel_quit();
            if app.show_comparison() {
                info!("User retried comparison load");
                let _ = command_tx.send(AppCommand::LoadComparison {
                    codes: app.selection.scheme_codes(),
                });
            }
        }

        // Any other key disarms the quit confirmation
        Event::Key(_) => {
            app.cancel_quit();
        }

        Event::Tick => {}
    }
}

// ============================================================================
// Terminal setup and teardown
// ============================================================================
// Raw mode + alternate screen for the TUI. The terminal is restored in
// main() on both the success and the error path.
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;

    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;

    terminal.show_cursor()?;

    Ok(())
}

// ============================================================================
// Structure : App
// ============================================================================
// Central application state for the TUI. All screens read from App and every
// mutation goes through its methods, mirroring the route guards the original
// views enforced: Login is public-only, Funds needs a session, Comparison
// needs a session plus at least two selected funds.
// ============================================================================

use tracing::{debug, info};

use crate::engine::{align, ComparisonTable, Facets, FundFilter};
use crate::models::{Fund, FundDetail};
use crate::state::{AuthStore, SelectionStore};

/// The screens of the application (one active at a time).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Email/password form; the only screen reachable without a session.
    Login,
    /// Catalog browsing, filtering and fund selection.
    Funds,
    /// Multi-series NAV chart of the selected funds.
    Comparison,
    /// Modal text entry (search string or NAV range) over the Funds screen.
    Input,
}

/// What the modal input buffer is being captured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTarget {
    Search,
    NavRange,
}

/// Which login form field currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

pub struct App {
    pub running: bool,
    pub current_screen: Screen,

    pub auth: AuthStore,
    pub selection: SelectionStore,

    // Login form
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginField,
    pub login_error: Option<String>,

    // Catalog and filtering. `filtered` holds catalog indices so the large
    // list is never cloned; `facets` derives from the unfiltered catalog
    // exactly once per load.
    pub catalog: Vec<Fund>,
    pub facets: Facets,
    pub filter: FundFilter,
    pub filtered: Vec<usize>,
    pub catalog_error: Option<String>,

    /// Cursor position within `filtered`.
    pub cursor: usize,

    // Modal input state (prompt + buffer)
    pub input_target: InputTarget,
    pub input_buffer: String,
    pub input_prompt: String,

    // Comparison view. `comparison_funds` keeps the detail-level metadata
    // (fund house, scheme type, latest NAV and its date) in chart order so
    // the legend can show it alongside each series.
    pub comparison: Option<ComparisonTable>,
    pub comparison_funds: Vec<Fund>,
    pub comparison_error: Option<String>,

    pub is_loading: bool,
    pub loading_message: Option<String>,

    /// Two-step quit confirmation: first 'q' arms it, second quits,
    /// anything else disarms.
    pub confirm_quit: bool,
}

impl App {
    /// Builds the app from the stores restored at startup. The initial
    /// screen follows the persisted session: straight to Funds when one
    /// exists, Login otherwise.
    pub fn new(auth: AuthStore, selection: SelectionStore) -> Self {
        let current_screen = if auth.is_authenticated() {
            Screen::Funds
        } else {
            Screen::Login
        };

        Self {
            running: true,
            current_screen,
            auth,
            selection,
            login_email: String::new(),
            login_password: String::new(),
            login_focus: LoginField::Email,
            login_error: None,
            catalog: Vec::new(),
            facets: Facets::default(),
            filter: FundFilter::default(),
            filtered: Vec::new(),
            catalog_error: None,
            cursor: 0,
            input_target: InputTarget::Search,
            input_buffer: String::new(),
            input_prompt: String::new(),
            comparison: None,
            comparison_funds: Vec::new(),
            comparison_error: None,
            is_loading: false,
            loading_message: None,
            confirm_quit: false,
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    // ========================================================================
    // Login / logout
    // ========================================================================

    pub fn is_on_login(&self) -> bool {
        self.current_screen == Screen::Login
    }

    /// Submits the login form. On success the form is wiped and the app
    /// moves to the Funds screen; the caller triggers the catalog load.
    pub fn submit_login(&mut self) -> bool {
        let email = self.login_email.clone();
        let password = self.login_password.clone();
        let ok = self.auth.login(&email, &password);
        if ok {
            self.login_email.clear();
            self.login_password.clear();
            self.login_error = None;
            self.login_focus = LoginField::Email;
            self.current_screen = Screen::Funds;
        } else {
            self.login_error = Some("Email and password are required".to_string());
        }
        ok
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.comparison = None;
        self.comparison_funds.clear();
        self.comparison_error = None;
        self.current_screen = Screen::Login;
    }

    /// Active login field buffer, for typing and backspace.
    pub fn login_field_mut(&mut self) -> &mut String {
        match self.login_focus {
            LoginField::Email => &mut self.login_email,
            LoginField::Password => &mut self.login_password,
        }
    }

    pub fn focus_next_login_field(&mut self) {
        self.login_focus = match self.login_focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Installs a freshly fetched catalog: facets are derived here, once,
    /// and the filtered view is rebuilt.
    pub fn set_catalog(&mut self, catalog: Vec<Fund>) {
        info!(funds = catalog.len(), "Catalog installed");
        self.facets = Facets::derive(&catalog);
        self.catalog = catalog;
        self.catalog_error = None;
        self.refresh_filtered();
    }

    pub fn catalog_failed(&mut self, message: String) {
        self.catalog_error = Some(message);
    }

    /// Recomputes the filtered index list and clamps the cursor. Called
    /// only when the filter or the catalog changes.
    fn refresh_filtered(&mut self) {
        self.filtered = self.filter.apply_indices(&self.catalog);
        if self.cursor >= self.filtered.len() {
            self.cursor = self.filtered.len().saturating_sub(1);
        }
        debug!(visible = self.filtered.len(), "Filtered view refreshed");
    }

    /// The fund under the cursor, if any.
    pub fn fund_under_cursor(&self) -> Option<&Fund> {
        self.filtered
            .get(self.cursor)
            .and_then(|&i| self.catalog.get(i))
    }

    pub fn navigate_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn navigate_down(&mut self) {
        let max = self.filtered.len().saturating_sub(1);
        self.cursor = (self.cursor + 1).min(max);
    }

    /// Toggles the fund under the cursor in or out of the selection.
    pub fn toggle_under_cursor(&mut self) {
        if let Some(fund) = self.fund_under_cursor().cloned() {
            self.selection.toggle(fund);
        }
    }

    // ========================================================================
    // Filters
    // ========================================================================

    pub fn cycle_category(&mut self) {
        self.filter.category = cycle(&self.facets.categories, self.filter.category.take());
        self.refresh_filtered();
    }

    pub fn cycle_fund_house(&mut self) {
        self.filter.fund_house = cycle(&self.facets.fund_houses, self.filter.fund_house.take());
        self.refresh_filtered();
    }

    pub fn cycle_scheme_type(&mut self) {
        self.filter.scheme_type = cycle(&self.facets.scheme_types, self.filter.scheme_type.take());
        self.refresh_filtered();
    }

    pub fn clear_filters(&mut self) {
        self.filter = FundFilter::default();
        self.refresh_filtered();
    }

    /// Parses a "min-max" range (either side may be empty) into the NAV
    /// bound predicates. Garbage on a side clears that bound.
    pub fn set_nav_range(&mut self, text: &str) {
        let (min_text, max_text) = match text.split_once('-') {
            Some(pair) => pair,
            None => (text, ""),
        };
        self.filter.min_nav = min_text.trim().parse::<f64>().ok();
        self.filter.max_nav = max_text.trim().parse::<f64>().ok();
        self.refresh_filtered();
    }

    // ========================================================================
    // Modal input (search / NAV range)
    // ========================================================================

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::Input
    }

    pub fn start_search_input(&mut self) {
        self.current_screen = Screen::Input;
        self.input_target = InputTarget::Search;
        self.input_prompt = "Search: ".to_string();
        self.input_buffer = self.filter.search_text.clone().unwrap_or_default();
    }

    pub fn start_nav_range_input(&mut self) {
        self.current_screen = Screen::Input;
        self.input_target = InputTarget::NavRange;
        self.input_prompt = "NAV range (min-max): ".to_string();
        self.input_buffer.clear();
    }

    pub fn append_input_char(&mut self, c: char) {
        self.input_buffer.push(c);
        self.apply_live_input();
    }

    pub fn input_backspace(&mut self) {
        self.input_buffer.pop();
        self.apply_live_input();
    }

    // The search filter tracks every keystroke; facet lists never change
    // here, only the linear catalog scan reruns. The NAV range applies on
    // submit instead.
    fn apply_live_input(&mut self) {
        if self.input_target == InputTarget::Search {
            self.filter.search_text = if self.input_buffer.is_empty() {
                None
            } else {
                Some(self.input_buffer.clone())
            };
            self.refresh_filtered();
        }
    }

    pub fn cancel_input(&mut self) {
        if self.input_target == InputTarget::Search {
            // Abandoning the search clears what was typed live
            self.filter.search_text = None;
            self.refresh_filtered();
        }
        self.input_buffer.clear();
        self.input_prompt.clear();
        self.current_screen = Screen::Funds;
    }

    pub fn submit_input(&mut self) {
        let value = std::mem::take(&mut self.input_buffer);
        match self.input_target {
            InputTarget::Search => {
                self.filter.search_text = if value.is_empty() { None } else { Some(value) };
                self.refresh_filtered();
            }
            InputTarget::NavRange => self.set_nav_range(&value),
        }
        self.input_prompt.clear();
        self.current_screen = Screen::Funds;
    }

    // ========================================================================
    // Screen transitions
    // ========================================================================

    pub fn is_on_funds(&self) -> bool {
        self.current_screen == Screen::Funds
    }

    pub fn is_on_comparison(&self) -> bool {
        self.current_screen == Screen::Comparison
    }

    pub fn show_funds(&mut self) {
        self.current_screen = Screen::Funds;
    }

    /// Enters the comparison screen. Guarded like the original route: fewer
    /// than two selected funds bounces straight back to fund selection.
    /// Returns true when the caller should kick off the detail fetch.
    pub fn show_comparison(&mut self) -> bool {
        if !self.selection.can_compare() {
            debug!(
                selected = self.selection.len(),
                "Comparison refused, need at least 2 funds"
            );
            self.current_screen = Screen::Funds;
            return false;
        }
        self.current_screen = Screen::Comparison;
        self.comparison = None;
        self.comparison_funds.clear();
        self.comparison_error = None;
        true
    }

    /// Installs fetched details: the aligned comparison table for the chart,
    /// and the enriched fund records for the legend.
    pub fn comparison_loaded(&mut self, details: Vec<FundDetail>) {
        self.comparison = Some(align(&details));
        self.comparison_funds = details.into_iter().map(|d| d.fund).collect();
        self.comparison_error = None;
    }

    pub fn comparison_failed(&mut self, message: String) {
        self.comparison = None;
        self.comparison_funds.clear();
        self.comparison_error = Some(message);
    }
}

/// Advances an exact-match facet predicate through its value list:
/// unset -> first -> ... -> last -> unset.
fn cycle(values: &[String], current: Option<String>) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    match current {
        None => Some(values[0].clone()),
        Some(value) => {
            let next = values.iter().position(|v| *v == value).map(|i| i + 1)?;
            values.get(next).cloned()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;

    fn temp_store(tag: &str) -> LocalStore {
        let dir = std::env::temp_dir().join(format!(
            "navscope-app-test-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        LocalStore::open(dir).unwrap()
    }

    fn fresh_app(tag: &str) -> App {
        let store = temp_store(tag);
        App::new(AuthStore::load(store.clone()), SelectionStore::load(store))
    }

    fn catalog() -> Vec<Fund> {
        let mut funds = Vec::new();
        for (code, name, house, category) in [
            (1u32, "Axis Bluechip Fund", "Axis", "Equity"),
            (2, "HDFC Liquid Fund", "HDFC", "Debt"),
            (3, "Axis Small Cap Fund", "Axis", "Equity"),
        ] {
            let mut f = Fund::new(code, name);
            f.fund_house = Some(house.to_string());
            f.scheme_category = Some(category.to_string());
            funds.push(f);
        }
        funds
    }

    #[test]
    fn test_starts_on_login_without_session() {
        let app = fresh_app("login-screen");
        assert_eq!(app.current_screen, Screen::Login);
    }

    #[test]
    fn test_login_flow() {
        let mut app = fresh_app("login-flow");
        app.login_email = "a@b.com".to_string();
        app.login_password = "x".to_string();

        assert!(app.submit_login());
        assert_eq!(app.current_screen, Screen::Funds);
        assert_eq!(app.auth.session().unwrap().name, "a");
    }

    #[test]
    fn test_login_rejected_keeps_screen() {
        let mut app = fresh_app("login-reject");
        app.login_password = "x".to_string();

        assert!(!app.submit_login());
        assert_eq!(app.current_screen, Screen::Login);
        assert!(app.login_error.is_some());
    }

    #[test]
    fn test_logout_returns_to_login() {
        let mut app = fresh_app("logout");
        app.login_email = "a@b.com".to_string();
        app.login_password = "x".to_string();
        app.submit_login();

        app.logout();
        assert_eq!(app.current_screen, Screen::Login);
        assert!(!app.auth.is_authenticated());
    }

    #[test]
    fn test_comparison_requires_two_funds() {
        let mut app = fresh_app("compare-guard");
        app.set_catalog(catalog());

        app.selection.add(Fund::new(1, "A"));
        assert!(!app.show_comparison());
        assert_eq!(app.current_screen, Screen::Funds);

        app.selection.add(Fund::new(2, "B"));
        assert!(app.show_comparison());
        assert_eq!(app.current_screen, Screen::Comparison);
    }

    #[test]
    fn test_comparison_keeps_fund_metadata_for_legend() {
        use crate::models::{FundDetail, NavEntry};

        let mut app = fresh_app("compare-meta");
        app.selection.add(Fund::new(1, "A"));
        app.selection.add(Fund::new(2, "B"));
        assert!(app.show_comparison());

        let mut fund = Fund::new(1, "Axis Bluechip Fund");
        fund.fund_house = Some("Axis Mutual Fund".to_string());
        fund.scheme_type = Some("Open Ended".to_string());
        fund.nav = Some(58.43);
        fund.date = Some("30-08-2026".to_string());

        app.comparison_loaded(vec![
            FundDetail::new(fund, vec![NavEntry::new("30-08-2026", "58.43")]),
            FundDetail::new(Fund::new(2, "B"), vec![NavEntry::new("30-08-2026", "12.0")]),
        ]);

        assert_eq!(app.comparison_funds.len(), 2);
        let first = &app.comparison_funds[0];
        assert_eq!(first.fund_house.as_deref(), Some("Axis Mutual Fund"));
        assert_eq!(first.scheme_type.as_deref(), Some("Open Ended"));
        assert_eq!(first.nav, Some(58.43));
        assert_eq!(first.date.as_deref(), Some("30-08-2026"));

        // A failed reload must not leave stale legend metadata behind
        app.comparison_failed("boom".to_string());
        assert!(app.comparison_funds.is_empty());
    }

    #[test]
    fn test_toggle_under_cursor() {
        let mut app = fresh_app("toggle");
        app.set_catalog(catalog());

        app.toggle_under_cursor();
        assert_eq!(app.selection.scheme_codes(), vec![1]);

        // Toggling the same fund removes it
        app.toggle_under_cursor();
        assert!(app.selection.is_empty());
    }

    #[test]
    fn test_live_search_narrows_and_cancel_restores() {
        let mut app = fresh_app("search");
        app.set_catalog(catalog());
        assert_eq!(app.filtered.len(), 3);

        app.start_search_input();
        for c in "liquid".chars() {
            app.append_input_char(c);
        }
        assert_eq!(app.filtered.len(), 1);

        app.cancel_input();
        assert_eq!(app.filtered.len(), 3);
        assert_eq!(app.current_screen, Screen::Funds);
    }

    #[test]
    fn test_facet_cycle_wraps() {
        let mut app = fresh_app("cycle");
        app.set_catalog(catalog());

        app.cycle_category();
        assert_eq!(app.filter.category.as_deref(), Some("Debt"));
        app.cycle_category();
        assert_eq!(app.filter.category.as_deref(), Some("Equity"));
        app.cycle_category();
        assert_eq!(app.filter.category, None);
    }

    #[test]
    fn test_nav_range_parsing() {
        let mut app = fresh_app("navrange");
        app.set_catalog(catalog());

        app.set_nav_range("10-100");
        assert_eq!(app.filter.min_nav, Some(10.0));
        assert_eq!(app.filter.max_nav, Some(100.0));

        app.set_nav_range("10-");
        assert_eq!(app.filter.min_nav, Some(10.0));
        assert_eq!(app.filter.max_nav, None);

        app.set_nav_range("-50");
        assert_eq!(app.filter.min_nav, None);
        assert_eq!(app.filter.max_nav, Some(50.0));

        app.set_nav_range("");
        assert_eq!(app.filter.min_nav, None);
        assert_eq!(app.filter.max_nav, None);
    }

    #[test]
    fn test_cursor_clamps_when_filter_narrows() {
        let mut app = fresh_app("clamp");
        app.set_catalog(catalog());
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.cursor, 2);

        app.start_search_input();
        for c in "hdfc".chars() {
            app.append_input_char(c);
        }
        assert_eq!(app.filtered.len(), 1);
        assert_eq!(app.cursor, 0);
    }
}

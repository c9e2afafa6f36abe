// ============================================================================
// Event handling
// ============================================================================
// Polls the terminal for key events with a 250ms timeout; a timeout becomes
// a Tick so the event loop keeps drawing while fetches run in the background.
// The predicate helpers keep the dispatch in main.rs readable.
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Application-level events.
#[derive(Debug, Clone)]
pub enum Event {
    /// Key pressed
    Key(KeyEvent),

    /// Regular tick (no input within the poll window)
    Tick,
}

/// Polling event reader.
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Reads the next event, blocking for at most 250ms.
    pub fn next(&self) -> Result<Event> {
        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                CrosstermEvent::Key(key) => {
                    // Some platforms deliver Press and Release; only Press
                    // counts, anything else degrades to a tick.
                    if key.kind == KeyEventKind::Press {
                        Ok(Event::Key(key))
                    } else {
                        Ok(Event::Tick)
                    }
                }
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Key predicates
// ============================================================================

fn is_char(event: &Event, c: char) -> bool {
    if let Event::Key(key) = event {
        key.code == KeyCode::Char(c)
    } else {
        false
    }
}

/// 'q': quit (two-step confirmation handled by the app state).
pub fn is_quit_event(event: &Event) -> bool {
    is_char(event, 'q')
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Esc)
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Enter)
}

pub fn is_tab_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Tab)
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if key.code == KeyCode::Backspace)
}

/// Arrow up or 'k' (vim).
pub fn is_up_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if matches!(key.code, KeyCode::Up | KeyCode::Char('k')))
}

/// Arrow down or 'j' (vim).
pub fn is_down_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if matches!(key.code, KeyCode::Down | KeyCode::Char('j')))
}

/// Space: toggle the fund under the cursor in/out of the selection.
pub fn is_select_event(event: &Event) -> bool {
    is_char(event, ' ')
}

/// '/': open the search input.
pub fn is_search_event(event: &Event) -> bool {
    is_char(event, '/')
}

/// 'c': cycle the category facet.
pub fn is_category_event(event: &Event) -> bool {
    is_char(event, 'c')
}

/// 'f': cycle the fund house facet.
pub fn is_fund_house_event(event: &Event) -> bool {
    is_char(event, 'f')
}

/// 't': cycle the scheme type facet.
pub fn is_scheme_type_event(event: &Event) -> bool {
    is_char(event, 't')
}

/// 'n': open the NAV range input.
pub fn is_nav_range_event(event: &Event) -> bool {
    is_char(event, 'n')
}

/// 'x': clear every filter.
pub fn is_clear_filters_event(event: &Event) -> bool {
    is_char(event, 'x')
}

/// 'C' (shift): clear the whole selection.
pub fn is_clear_selection_event(event: &Event) -> bool {
    is_char(event, 'C')
}

/// 'L' (shift): log out.
pub fn is_logout_event(event: &Event) -> bool {
    is_char(event, 'L')
}

/// 'r': retry the failed fetch on the current screen.
pub fn is_retry_event(event: &Event) -> bool {
    is_char(event, 'r')
}

/// Any printable character, for text entry in input mode and the login form.
pub fn is_text_char_event(event: &Event) -> bool {
    matches!(event, Event::Key(key) if matches!(key.code, KeyCode::Char(c) if !c.is_control()))
}

pub fn get_char_from_event(event: &Event) -> Option<char> {
    if let Event::Key(key) = event {
        if let KeyCode::Char(c) = key.code {
            return Some(c);
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()))
    }

    #[test]
    fn test_quit_is_lowercase_only() {
        assert!(is_quit_event(&key('q')));
        assert!(!is_quit_event(&key('Q')));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_selection_vs_clear_selection_case() {
        assert!(is_category_event(&key('c')));
        assert!(!is_clear_selection_event(&key('c')));
        assert!(is_clear_selection_event(&key('C')));
    }

    #[test]
    fn test_text_char_excludes_control() {
        assert!(is_text_char_event(&key('a')));
        assert!(is_text_char_event(&key(' ')));
        let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::empty()));
        assert!(!is_text_char_event(&enter));
    }

    #[test]
    fn test_get_char() {
        assert_eq!(get_char_from_event(&key('z')), Some('z'));
        assert_eq!(get_char_from_event(&Event::Tick), None);
    }
}

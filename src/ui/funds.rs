// ============================================================================
// Fund selection screen
// ============================================================================
// The catalog list with its filter and selection summaries. Only the visible
// window of the (very large) catalog is turned into list items each frame;
// the cursor lives in App, the highlight in a per-frame ListState.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::state::MAX_FUNDS;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header: user + selection summary
            Constraint::Length(3), // filter summary
            Constraint::Min(0),    // fund list
            Constraint::Length(3), // footer
        ])
        .split(frame.size())
        .to_vec();

    render_header(frame, app, chunks[0]);
    render_filter_bar(frame, app, chunks[1]);

    if let Some(error) = &app.catalog_error {
        render_error(frame, error, chunks[2]);
    } else if app.is_loading && app.catalog.is_empty() {
        render_loading(frame, app, chunks[2]);
    } else {
        render_fund_list(frame, app, chunks[2]);
    }

    if app.is_in_input_mode() {
        render_input_footer(frame, app, chunks[3]);
    } else {
        render_footer(frame, app, chunks[3]);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" NavScope ")
        .title_alignment(Alignment::Center);

    let user = app
        .auth
        .session()
        .map(|s| s.name.as_str())
        .unwrap_or("?");

    let mut spans = vec![
        Span::styled(user, Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw("  |  "),
        Span::styled(
            format!("{} of {} funds selected", app.selection.len(), MAX_FUNDS),
            Style::default().fg(Color::White),
        ),
    ];

    if app.selection.can_compare() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            "[Enter] Compare",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            "select at least 2 to compare",
            Style::default().fg(Color::Gray),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Filters ({} match) ", app.filtered.len()));

    let facet = |label: &str, value: &Option<String>| -> Span<'static> {
        match value {
            Some(v) => Span::styled(
                format!("{}: {}  ", label, v),
                Style::default().fg(Color::Yellow),
            ),
            None => Span::styled(format!("{}: all  ", label), Style::default().fg(Color::Gray)),
        }
    };

    let search = match &app.filter.search_text {
        Some(text) => Span::styled(
            format!("search: \"{}\"  ", text),
            Style::default().fg(Color::Yellow),
        ),
        None => Span::styled("search: -  ".to_string(), Style::default().fg(Color::Gray)),
    };

    let nav = match (app.filter.min_nav, app.filter.max_nav) {
        (None, None) => Span::styled("nav: any".to_string(), Style::default().fg(Color::Gray)),
        (min, max) => Span::styled(
            format!(
                "nav: {}..{}",
                min.map(|v| v.to_string()).unwrap_or_default(),
                max.map(|v| v.to_string()).unwrap_or_default()
            ),
            Style::default().fg(Color::Yellow),
        ),
    };

    let line = Line::from(vec![
        search,
        facet("category", &app.filter.category),
        facet("house", &app.filter.fund_house),
        facet("type", &app.filter.scheme_type),
        nav,
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// The slice of the filtered list worth materializing for a viewport of
/// `height` rows: at most `height` entries, always containing the cursor
/// (pinned to the bottom edge once it scrolls past the first page). Keeps
/// per-frame item construction O(viewport) instead of O(catalog).
fn visible_window(len: usize, cursor: usize, height: usize) -> (usize, usize) {
    if len == 0 || height == 0 {
        return (0, 0);
    }
    let cursor = cursor.min(len - 1);
    let start = (cursor + 1).saturating_sub(height);
    let end = (start + height).min(len);
    (start, end)
}

fn render_fund_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Funds ");

    if app.filtered.is_empty() {
        let message = if app.catalog.is_empty() {
            "No catalog loaded"
        } else {
            "No funds match the current filters"
        };
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, Style::default().fg(Color::Gray))),
        ])
        .block(block)
        .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    // Only the rows that can actually appear get built; the catalog has
    // tens of thousands of entries when unfiltered.
    let viewport = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_window(app.filtered.len(), app.cursor, viewport);

    let items: Vec<ListItem> = app.filtered[start..end]
        .iter()
        .map(|&i| {
            let fund = &app.catalog[i];
            let selected = app.selection.contains(fund.scheme_code);

            let marker = if selected { "[x]" } else { "[ ]" };
            let style = if selected {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };

            ListItem::new(format!(
                " {} {:<8} {}",
                marker, fund.scheme_code, fund.scheme_name
            ))
            .style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        );

    let mut state = ListState::default();
    state.select(Some(app.cursor.saturating_sub(start)));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Funds ");

    let message = app
        .loading_message
        .as_deref()
        .unwrap_or("Loading mutual funds...");

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Yellow))),
    ])
    .block(block)
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, error: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error ");

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(error, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[r]",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Try again"),
        ]),
    ])
    .block(block)
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled("[Space]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Select  "),
            Span::styled("[/]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Search  "),
            Span::styled("[c/f/t]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Facets  "),
            Span::styled("[n]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" NAV  "),
            Span::styled("[x]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Reset  "),
            Span::styled("[C]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Unselect all  "),
            Span::styled("[L]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" Logout  "),
            Span::styled("[q]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw(" Quit"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            &app.input_prompt,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(&app.input_buffer, Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Apply  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::visible_window;

    #[test]
    fn test_visible_window_first_page() {
        assert_eq!(visible_window(40_000, 0, 20), (0, 20));
        assert_eq!(visible_window(40_000, 19, 20), (0, 20));
    }

    #[test]
    fn test_visible_window_pins_cursor_to_bottom_edge() {
        assert_eq!(visible_window(40_000, 20, 20), (1, 21));
        assert_eq!(visible_window(40_000, 39_999, 20), (39_980, 40_000));
    }

    #[test]
    fn test_visible_window_never_exceeds_viewport() {
        for cursor in [0, 7, 500, 39_999] {
            let (start, end) = visible_window(40_000, cursor, 20);
            assert!(end - start <= 20);
            assert!((start..end).contains(&cursor));
        }
    }

    #[test]
    fn test_visible_window_short_list_fits_entirely() {
        assert_eq!(visible_window(5, 3, 20), (0, 5));
    }

    #[test]
    fn test_visible_window_degenerate_inputs() {
        assert_eq!(visible_window(0, 0, 20), (0, 0));
        assert_eq!(visible_window(10, 4, 0), (0, 0));
        // Cursor past the end clamps rather than slicing out of bounds
        assert_eq!(visible_window(10, 99, 4), (6, 10));
    }
}

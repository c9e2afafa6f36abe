// ============================================================================
// Login screen
// ============================================================================
// Email/password form in a centered box. This is a local-only check: the
// fields just need to be non-empty, so the screen states as much.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, LoginField};

pub fn render(frame: &mut Frame, app: &App) {
    let area = centered_box(frame.size(), 54, 14);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" NavScope - Sign in ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // intro
            Constraint::Length(2), // email
            Constraint::Length(2), // password
            Constraint::Length(2), // error line
            Constraint::Min(0),    // help
        ])
        .split(inner)
        .to_vec();

    let intro = Paragraph::new(Line::from(Span::styled(
        "Local session only, no account needed",
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(intro, chunks[0]);

    frame.render_widget(
        field_line("Email", &app.login_email, app.login_focus == LoginField::Email, false),
        chunks[1],
    );
    frame.render_widget(
        field_line(
            "Password",
            &app.login_password,
            app.login_focus == LoginField::Password,
            true,
        ),
        chunks[2],
    );

    if let Some(error) = &app.login_error {
        let error_line = Paragraph::new(Line::from(Span::styled(
            error.as_str(),
            Style::default().fg(Color::Red),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(error_line, chunks[3]);
    }

    let help = Paragraph::new(Line::from(vec![
        Span::styled("[Tab]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Switch field  "),
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Sign in  "),
        Span::styled("[ESC]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Quit"),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(help, chunks[4]);
}

fn field_line<'a>(label: &'a str, value: &'a str, focused: bool, mask: bool) -> Paragraph<'a> {
    let shown = if mask {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };

    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let mut spans = vec![
        Span::styled(format!("{:>9}: ", label), label_style),
        Span::raw(shown),
    ];
    if focused {
        spans.push(Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ));
    }

    Paragraph::new(Line::from(spans))
}

/// Centers a fixed-size box inside the terminal area.
fn centered_box(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

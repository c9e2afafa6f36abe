// ============================================================================
// Comparison screen
// ============================================================================
// Renders the aligned comparison table as one line chart with a dataset per
// fund. Gaps in a fund's history simply leave its line without points on
// those dates. Loading and failure get full-pane messages; failure offers a
// manual retry, never an automatic one.
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::engine::ComparisonTable;
use crate::models::Fund;

/// One color per selected fund, in selection order.
const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Green,
    Color::Yellow,
    Color::Red,
    Color::Magenta,
    Color::Blue,
];

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();

    if let Some(error) = &app.comparison_error {
        render_error(frame, error, area);
        return;
    }

    let table = match &app.comparison {
        Some(table) => table,
        None => {
            render_loading(frame, app, area);
            return;
        }
    };

    if table.is_empty() {
        render_message(frame, "No overlapping NAV data to chart", area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2 + table.labels.len() as u16), // legend
            Constraint::Min(0),                                // chart
            Constraint::Length(3),                             // footer
        ])
        .split(area)
        .to_vec();

    render_legend(frame, table, &app.comparison_funds, chunks[0]);
    render_chart(frame, table, chunks[1]);
    render_footer(frame, chunks[2]);
}

/// One line per series: colored marker, label, then the detail-level
/// metadata (house, type, latest NAV with its date) when the fetch
/// provided it.
fn render_legend(frame: &mut Frame, table: &ComparisonTable, funds: &[Fund], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Fund Comparison ")
        .title_alignment(Alignment::Center);

    let lines: Vec<Line> = table
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let color = SERIES_COLORS[i % SERIES_COLORS.len()];
            let mut spans = vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::raw(label.as_str()),
            ];
            if let Some(details) = funds.get(i).and_then(legend_details) {
                spans.push(Span::styled(
                    format!("  {}", details),
                    Style::default().fg(Color::Gray),
                ));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn legend_details(fund: &Fund) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(house) = &fund.fund_house {
        parts.push(house.clone());
    }
    if let Some(scheme_type) = &fund.scheme_type {
        parts.push(scheme_type.clone());
    }
    if let Some(nav) = fund.nav {
        parts.push(match &fund.date {
            Some(date) => format!("NAV {:.4} on {}", nav, date),
            None => format!("NAV {:.4}", nav),
        });
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("[{}]", parts.join(" | ")))
    }
}

fn render_chart(frame: &mut Frame, table: &ComparisonTable, area: Rect) {
    // One point series per fund; built up front so the datasets can borrow
    let series: Vec<Vec<(f64, f64)>> = (0..table.labels.len())
        .map(|i| table.series_points(i))
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, points)| {
            Dataset::default()
                .name(table.labels[i].as_str())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(points)
        })
        .collect();

    let (min_nav, max_nav) = table.value_bounds().unwrap_or((0.0, 1.0));
    // 5% breathing room on the vertical axis
    let margin = (max_nav - min_nav).max(f64::EPSILON) * 0.05;
    let y_min = (min_nav - margin).max(0.0);
    let y_max = max_nav + margin;

    let first_date = table.rows.first().map(|r| r.date.as_str()).unwrap_or("");
    let last_date = table.rows.last().map(|r| r.date.as_str()).unwrap_or("");

    let x_axis = Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, (table.rows.len().saturating_sub(1)) as f64])
        .labels(vec![
            Span::raw(first_date),
            Span::raw(last_date),
        ]);

    let y_axis = Axis::default()
        .title("NAV")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" NAV history - last {} dates ", table.rows.len())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = Line::from(vec![
        Span::styled("[ESC]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Back to selection  "),
        Span::styled("[r]", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" Reload"),
    ]);

    let paragraph = Paragraph::new(vec![line]).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_loading(frame: &mut Frame, app: &App, area: Rect) {
    let message = app
        .loading_message
        .as_deref()
        .unwrap_or("Loading fund comparison...");
    render_message(frame, message, area);
}

fn render_message(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Fund Comparison ");

    let paragraph = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled("[ESC] Back", Style::default().fg(Color::Gray))),
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
        Line::from(Span::styled(
            "Failed to load fund details",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(error, Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "[r]",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" Try again   "),
            Span::styled("[ESC]", Style::default().fg(Color::Gray)),
            Span::raw(" Back"),
        ]),
    ])
    .block(block)
    .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::legend_details;
    use crate::models::Fund;

    #[test]
    fn test_legend_details_full_metadata() {
        let mut fund = Fund::new(120503, "Axis Bluechip Fund");
        fund.fund_house = Some("Axis Mutual Fund".to_string());
        fund.scheme_type = Some("Open Ended".to_string());
        fund.nav = Some(58.4321);
        fund.date = Some("30-08-2026".to_string());

        assert_eq!(
            legend_details(&fund).as_deref(),
            Some("[Axis Mutual Fund | Open Ended | NAV 58.4321 on 30-08-2026]")
        );
    }

    #[test]
    fn test_legend_details_partial_and_absent() {
        let mut fund = Fund::new(1, "F");
        assert_eq!(legend_details(&fund), None);

        fund.nav = Some(12.0);
        assert_eq!(legend_details(&fund).as_deref(), Some("[NAV 12.0000]"));
    }
}

//! Full-screen dashboard layout.
//!
//! ```text
//! Market closed   Filter: last > 100            Mon Oct 19 14:02:11 2026
//! Dow 38123.50 (+0.42%)   S&P 500 ...   NASDAQ ...
//! Tokyo ...   HK ...   London ...   10-Year Yield ...
//! Euro ...   Yen ...   Oil ...   Gold ...
//!
//! Ticker▲    Last   Change  Change%  ...
//! AAPL     187.50    +1.25   +0.67%  ...
//! ...
//! Add tickers: MSFT_
//! ```

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use crate::market::{Column, MarketSnapshot, MARKET_ROWS};

use super::dashboard::{format_cell, format_percent, format_price, MISSING};
use super::screen::{Overlay, View};

/// Rows not available to quotes: status, three market rows, a blank,
/// the table header and the prompt.
pub const CHROME_ROWS: u16 = 7;

pub const TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

const HELP: &str = "\
Market dashboard

  +        Add stocks to the list
  -        Remove stocks from the list
  o        Change column sort order
  g        Group stocks by advancing/declining issues
  f        Set a filter
  F        Clear the filter
  p        Pause or resume market data updates
  ?  h     Show this help screen
  PgDn PgUp  Scroll the quotes list
  q  Esc   Quit

Press any key to continue...";

/// Quote rows that fit in a terminal `height` rows tall.
pub fn visible_rows(height: u16) -> usize {
    height.saturating_sub(CHROME_ROWS) as usize
}

pub fn draw(f: &mut Frame, view: &View<'_>) {
    if view.overlay == Overlay::Help {
        draw_help(f);
        return;
    }

    let area = f.area();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status
            Constraint::Length(3), // market
            Constraint::Length(1), // blank
            Constraint::Min(1),    // quotes table
            Constraint::Length(1), // prompt
        ])
        .split(area);

    draw_status(f, view, rows[0]);
    draw_market(f, view.market, rows[1]);
    draw_quotes(f, view, rows[3]);
    if let Overlay::Prompt {
        label,
        text,
        cursor,
    } = &view.overlay
    {
        draw_prompt(f, label, text, *cursor, rows[4]);
    }
}

fn draw_help(f: &mut Frame) {
    let area = f.area();
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(HELP).wrap(Wrap { trim: false }), area);
}

fn draw_status(f: &mut Frame, view: &View<'_>, area: Rect) {
    let (state, color) = if view.market.open {
        ("Market open", Color::Green)
    } else {
        ("Market closed", Color::Yellow)
    };
    let mut left = vec![Span::styled(
        state,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )];
    if !view.filter.is_empty() {
        left.push(Span::raw(format!("   Filter: {}", view.filter)));
    }
    f.render_widget(Paragraph::new(Line::from(left)), area);

    let mut right = Vec::new();
    if view.paused {
        right.push(Span::styled(
            "PAUSED ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }
    right.push(Span::raw(view.clock.format(TIME_FORMAT).to_string()));
    f.render_widget(
        Paragraph::new(Line::from(right)).alignment(Alignment::Right),
        area,
    );
}

fn draw_market(f: &mut Frame, market: &MarketSnapshot, area: Rect) {
    let lines: Vec<Line> = MARKET_ROWS
        .iter()
        .map(|row| {
            let mut spans = Vec::new();
            for (i, (label, symbol)) in row.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw("   "));
                }
                spans.push(Span::styled(
                    *label,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(" "));
                match market.get(symbol) {
                    Some(q) => spans.push(Span::styled(
                        format!("{} ({})", format_price(q.last), format_percent(q.change_percent)),
                        change_style(q.change),
                    )),
                    None => spans.push(Span::raw(MISSING)),
                }
            }
            Line::from(spans)
        })
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn draw_quotes(f: &mut Frame, view: &View<'_>, area: Rect) {
    let selected = match view.overlay {
        Overlay::Columns { selected } => Some(selected),
        _ => None,
    };

    let header = Row::new(Column::ALL.iter().map(|&column| {
        let mut title = column.header().to_string();
        if column == view.sort_column {
            title.push(if view.ascending { '▲' } else { '▼' });
        }
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if selected == Some(column) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        Cell::from(title).style(style)
    }));

    let body_rows = area.height.saturating_sub(1) as usize;
    let rows = view
        .quotes
        .iter()
        .skip(view.offset)
        .take(body_rows)
        .map(|quote| {
            Row::new(Column::ALL.iter().map(|&column| Cell::from(format_cell(quote, column))))
                .style(change_style(quote.change))
        });

    let widths = Column::ALL.iter().map(|c| Constraint::Length(c.width()));
    let table = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(table, area);
}

fn draw_prompt(f: &mut Frame, label: &str, text: &str, cursor: usize, area: Rect) {
    let line = Line::from(vec![
        Span::styled(label, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(text),
    ]);
    f.render_widget(Paragraph::new(line), area);

    let column = (label.chars().count() + cursor) as u16;
    f.set_cursor_position(Position::new(
        area.x + column.min(area.width.saturating_sub(1)),
        area.y,
    ));
}

fn change_style(change: f64) -> Style {
    if change < 0.0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

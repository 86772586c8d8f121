use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
};

use super::app::App;
use super::pages::{ListingPage, Page};
use crate::internal::models::FetchState;
use crate::internal::notification::NotificationKind;
use crate::utils::text::truncate;

/// Body on every row but the last, which holds the status bar. A failed
/// page gives up its first body row to the error line.
#[tracing::instrument(level = "trace", skip(app, f))]
pub fn draw(app: &App, f: &mut Frame) {
    let page = match app.stack().top() {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("nothing to draw: {e}");
            return;
        }
    };

    let error = match page.state() {
        FetchState::Failed(message) => Some(message.as_str()),
        _ => None,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(u16::from(error.is_some())),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    if let Some(message) = error {
        render_error_line(message, f, chunks[0]);
    }
    render_page(page, f, chunks[1]);
    render_status_bar(app, page, f, chunks[2]);
}

fn render_error_line(message: &str, f: &mut Frame, area: Rect) {
    let text = truncate(&format!("error: {message}"), area.width as usize).to_string();
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Red)),
        area,
    );
}

fn render_page(page: &Page, f: &mut Frame, area: Rect) {
    let lines: Vec<Line> = match page {
        Page::Listing(listing) => listing_lines(listing),
        Page::Detail(detail) => text_lines(detail.wrapper().visible()),
        Page::Thread(thread) => text_lines(thread.wrapper().visible()),
    };

    f.render_widget(Paragraph::new(lines), area);
}

fn listing_lines(listing: &ListingPage) -> Vec<Line<'static>> {
    listing
        .visible_rows()
        .into_iter()
        .map(|row| match row.selected {
            true => Line::styled(row.text, Style::default().add_modifier(Modifier::REVERSED)),
            false => Line::raw(row.text),
        })
        .collect()
}

fn text_lines(lines: &[String]) -> Vec<Line<'_>> {
    lines.iter().map(|l| Line::raw(l.as_str())).collect()
}

fn render_status_bar(app: &App, page: &Page, f: &mut Frame, area: Rect) {
    let width = area.width as usize;
    let base = Style::default().add_modifier(Modifier::REVERSED);

    let (text, style) = match (app.command_text(), app.notification()) {
        (Some(command), _) => (command.to_string(), base),
        (None, Some(notification)) => {
            let style = match notification.kind() {
                NotificationKind::Info => base,
                NotificationKind::Error => base.fg(Color::Red),
            };
            (format!("  {}", notification.message()), style)
        }
        (None, None) => (page.status_line(), base),
    };

    let text = truncate(&text, width).to_string();
    f.render_widget(Paragraph::new(text).style(style), area);
}

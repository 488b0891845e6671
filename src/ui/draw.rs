use anyhow::Result;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState,
};
use ratatui::{Frame, Terminal};
use tui_widgets::popup::Popup;

use crate::config::RgbColor;
use crate::db::ContactListEntry;

use super::app::{App, Focus};
use super::form::FormField;
use super::views::View;

const LIST_HELP: &str = "j/k: select  Enter: edit  a: add contact  /: filter  F2: menu  q: quit";
const FILTER_HELP: &str = "Type to filter  Enter: apply  Esc: back  Up/Down: select";
const FORM_HELP: &str = "Tab: next field  Left/Right: pick option  Enter: save  F8: delete  Esc: cancel";
const DRAWER_HELP: &str = "j/k: select  Enter: open  Esc/F2: close";
const DASHBOARD_HELP: &str = "F2: menu  q: quit";
const CONFIRM_HELP: &str = "y/Enter: confirm  n/Esc: cancel";

const TABLE_HEADERS: [&str; 5] = ["First Name", "Last Name", "Email", "Status", "Company"];
const FILTER_PLACEHOLDER: &str = "Filter by name...";

pub fn render<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    terminal.draw(|frame| draw_frame(frame, app))?;
    Ok(())
}

fn draw_frame(frame: &mut Frame<'_>, app: &mut App) {
    let size = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_header(frame, layout[0], app);
    draw_body(frame, layout[1], app);
    draw_footer(frame, layout[2], app);
    draw_confirm_modal(frame, size, app);
}

fn draw_header(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut spans: Vec<Span> = vec![
        Span::styled(" = ", selection_style(app)),
        Span::styled(" CRMX ", header_text_style(app)),
    ];
    for view in View::ALL {
        let style = if view == app.view {
            selection_style(app)
        } else {
            header_text_style(app)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", view.title()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_body(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    if app.drawer_open {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(16), Constraint::Min(0)])
            .split(area);
        draw_drawer(frame, chunks[0], app);
        draw_view(frame, chunks[1], app);
    } else {
        draw_view(frame, area, app);
    }
}

fn draw_view(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    match app.view {
        View::List => draw_list_view(frame, area, app),
        View::Dashboard => draw_dashboard(frame, area, app),
    }
}

fn draw_drawer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let items: Vec<ListItem> = View::ALL
        .iter()
        .map(|view| {
            // The entry whose destination matches the current location is
            // marked and emphasized.
            let marker = if *view == app.view { "*" } else { " " };
            let style = if *view == app.view {
                header_text_style(app)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(
                format!("{} {}", marker, view.label()),
                style,
            )))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.drawer_index));

    let list = List::new(items)
        .highlight_style(selection_style(app))
        .highlight_symbol(" ");
    frame.render_stateful_widget(list, inner, &mut state);
}

fn draw_list_view(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    draw_toolbar(frame, chunks[0], app);

    if app.form.is_editing() {
        // The table gets twice the flexible width allocated to the form.
        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(2), Constraint::Fill(1)])
            .split(chunks[1]);
        draw_table(frame, content[0], app);
        draw_form(frame, content[1], app);
    } else {
        draw_table(frame, chunks[1], app);
    }
}

fn draw_toolbar(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(18)])
        .split(area);

    let filter_active = matches!(app.focus, Focus::Filter);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, filter_active));
    let inner = block.inner(chunks[0]);
    frame.render_widget(block, chunks[0]);

    if inner.width > 0 && inner.height > 0 {
        let value = app.filter.value();
        let line = if value.is_empty() && !filter_active {
            Line::from(Span::styled(
                FILTER_PLACEHOLDER,
                Style::default().add_modifier(Modifier::DIM),
            ))
        } else {
            Line::from(Span::raw(value.to_string()))
        };
        frame.render_widget(Paragraph::new(line), inner);

        if filter_active {
            let x = inner.x.saturating_add(app.filter.visual_cursor() as u16);
            frame.set_cursor_position((x.min(inner.x + inner.width.saturating_sub(1)), inner.y));
        }
    }

    let button = Paragraph::new("a: Add contact")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(app, false)),
        );
    frame.render_widget(button, chunks[1]);
}

fn draw_table(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = matches!(app.focus, Focus::List);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, active));

    if app.contacts.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width > 0 && inner.height > 0 {
            frame.render_widget(Paragraph::new("No contacts"), inner);
        }
        return;
    }

    let header = Row::new(TABLE_HEADERS.iter().map(|h| Cell::from(*h)))
        .style(header_text_style(app));

    let rows: Vec<Row> = app
        .contacts
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(entry.first_name.clone()),
                Cell::from(entry.last_name.clone()),
                Cell::from(entry.email.clone()),
                Cell::from(entry.status_name.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(entry.company_name.clone().unwrap_or_else(|| "-".to_string())),
            ])
        })
        .collect();

    let widths = column_widths(&app.contacts)
        .into_iter()
        .map(Constraint::Length)
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(selection_style(app));

    let mut state = TableState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Columns auto-size to their widest cell (or header).
fn column_widths(entries: &[ContactListEntry]) -> [u16; 5] {
    let mut widths = TABLE_HEADERS.map(|h| h.chars().count() as u16);
    for entry in entries {
        let cells = [
            entry.first_name.as_str(),
            entry.last_name.as_str(),
            entry.email.as_str(),
            entry.status_name.as_deref().unwrap_or("-"),
            entry.company_name.as_deref().unwrap_or("-"),
        ];
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count() as u16);
        }
    }
    widths
}

fn draw_form(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let active = matches!(app.focus, Focus::Form);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, active));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let label_width = FormField::ALL
        .iter()
        .map(|f| f.label().len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    let mut cursor = None;

    for field in FormField::ALL {
        let focused = active && field == app.form.focus();
        let label_style = if focused {
            selection_style(app)
        } else {
            header_text_style(app)
        };

        let mut spans = vec![
            Span::styled(
                format!("{:<width$}", field.label(), width = label_width),
                label_style,
            ),
            Span::raw(" "),
        ];

        if let Some(input) = app.form.text_input(field) {
            if focused {
                cursor = Some((
                    lines.len(),
                    label_width + 1 + input.visual_cursor(),
                ));
            }
            spans.push(Span::raw(input.value().to_string()));
        } else {
            spans.push(Span::raw(format!(
                "< {} >",
                app.form.selector_label(field)
            )));
        }

        if let Some(message) = app.form.error_for(field) {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(message.to_string(), error_style(app)));
        }

        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(button_row(app));

    frame.render_widget(Paragraph::new(lines), inner);

    if let Some((line_index, column)) = cursor {
        let x = inner.x.saturating_add(column as u16);
        let y = inner.y.saturating_add(line_index as u16);
        frame.set_cursor_position((x.min(inner.x + inner.width.saturating_sub(1)), y));
    }
}

fn button_row(app: &App) -> Line<'static> {
    // Save is the primary action, delete is the destructive one.
    Line::from(vec![
        Span::styled("[ Save ]", selection_style(app)),
        Span::raw("  "),
        Span::styled("[ Delete ]", error_style(app)),
        Span::raw("  "),
        Span::raw("[ Cancel ]"),
    ])
}

fn draw_dashboard(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, true));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} contacts", app.contact_count),
            header_text_style(app),
        )),
        Line::from(""),
    ];

    for count in &app.company_counts {
        let name = count.company_name.as_deref().unwrap_or("(no company)");
        lines.push(Line::from(format!("{:<28} {:>5}", name, count.contacts)));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let message: String = if app.confirm_modal.is_some() {
        CONFIRM_HELP.to_string()
    } else if app.drawer_open {
        DRAWER_HELP.to_string()
    } else {
        match (app.view, app.focus) {
            (View::Dashboard, _) => DASHBOARD_HELP.to_string(),
            (View::List, Focus::Form) => {
                let errors = app.form.errors().len();
                if errors == 0 {
                    FORM_HELP.to_string()
                } else {
                    format!("{} field(s) need attention", errors)
                }
            }
            (View::List, Focus::Filter) => FILTER_HELP.to_string(),
            (View::List, Focus::List) => app
                .status
                .clone()
                .unwrap_or_else(|| LIST_HELP.to_string()),
        }
    };

    let colors = app.ui_colors();
    let style = Style::default()
        .fg(color(colors.status_fg))
        .bg(color(colors.status_bg));

    let background = Block::default().style(Style::default().bg(color(colors.status_bg)));
    frame.render_widget(background, area);
    frame.render_widget(Paragraph::new(message).style(style), area);
}

fn draw_confirm_modal(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(modal) = app.confirm_modal.as_ref() else {
        return;
    };

    let lines = vec![
        Line::from(modal.message.clone()),
        Line::from("".to_string()),
        Line::from(CONFIRM_HELP.to_string()),
    ];
    let body = Text::from(lines);

    let title_line = Line::from(Span::styled(
        modal.title.clone(),
        header_text_style(app),
    ));
    let popup = Popup::new(body)
        .title(title_line)
        .border_style(border_style(app, true));

    frame.render_stateful_widget_ref(popup, area, &mut app.modal_popup);
}

fn color(c: RgbColor) -> ratatui::style::Color {
    ratatui::style::Color::Rgb(c.r, c.g, c.b)
}

fn border_style(app: &App, active: bool) -> Style {
    let style = Style::default().fg(color(app.ui_colors().border));
    if active {
        style.add_modifier(Modifier::BOLD)
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

fn selection_style(app: &App) -> Style {
    let colors = app.ui_colors();
    Style::default()
        .fg(color(colors.selection_fg))
        .bg(color(colors.selection_bg))
}

fn header_text_style(app: &App) -> Style {
    Style::default()
        .fg(color(app.ui_colors().status_fg))
        .add_modifier(Modifier::BOLD)
}

fn error_style(app: &App) -> Style {
    Style::default().fg(color(app.ui_colors().error_fg))
}

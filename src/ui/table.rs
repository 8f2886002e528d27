use crate::app::{App, InputMode, LoadState};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use unicode_width::UnicodeWidthStr;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Layout: header(2) + controls(3) + table(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ──
    let mut header_spans = vec![Span::styled(
        " Product Catalog",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if app.table.is_loading() {
        header_spans.push(Span::styled(
            format!("   {} Loading...", SPINNER[app.tick % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ));
    } else if app.has_pending_query() {
        header_spans.push(Span::styled(
            "   ...",
            Style::default().fg(Color::DarkGray),
        ));
    } else if let Some(at) = app.table.updated_at {
        header_spans.push(Span::styled(
            format!("   updated {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let header = Paragraph::new(Line::from(header_spans))
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(header, chunks[0]);

    // ── Controls: search | category | sort ──
    let controls = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
        ])
        .split(chunks[1]);

    let query = &app.table.query;
    let search_style = match app.input_mode {
        InputMode::Editing => Style::default().fg(Color::Yellow),
        InputMode::Normal => Style::default().fg(Color::DarkGray),
    };
    let search_label = if app.input_mode == InputMode::Editing {
        " Search (Enter/Esc to finish): "
    } else {
        " Search (/): "
    };
    let search_bar = Paragraph::new(format!("{}{}", search_label, query.search))
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(search_style)
                .title(" Search Product "),
        );
    frame.render_widget(search_bar, controls[0]);

    if app.input_mode == InputMode::Editing {
        let cursor_x = controls[0].x
            + 1
            + search_label.width() as u16
            + query.search.width() as u16;
        let cursor_y = controls[0].y + 1;
        frame.set_cursor_position((cursor_x.min(controls[0].right().saturating_sub(2)), cursor_y));
    }

    let category_text = if query.category.is_empty() {
        "All Categories"
    } else {
        query.category.as_str()
    };
    let category = Paragraph::new(format!(" {}", category_text))
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Category (c) "),
        );
    frame.render_widget(category, controls[1]);

    let sort = Paragraph::new(format!(" {}", query.sort.label()))
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Sort (s) "),
        );
    frame.render_widget(sort, controls[2]);

    // ── Table ──
    let image_width = (area.width as usize).saturating_sub(6 + 30 + 24 + 12 + 12);
    let rows: Vec<Row> = app
        .table
        .products
        .iter()
        .map(|p| {
            let id = p.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
            Row::new(vec![
                Cell::from(id).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate_str(&p.name, 30)),
                Cell::from(truncate_str(&p.category, 24)),
                Cell::from(format!("{:>10}", p.price_label()))
                    .style(Style::default().fg(Color::Yellow)),
                Cell::from(truncate_str(&p.image, image_width))
                    .style(Style::default().fg(Color::Blue)),
            ])
        })
        .collect();

    let title = if app.table.load_state == LoadState::Idle {
        " Products ".to_string()
    } else {
        format!(" Products [{}] ", app.table.products.len())
    };
    let page_info = format!(" page {} ([ / ]) ", query.page);

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(30),
            Constraint::Length(24),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["ID", "Name", "Category", "Price", "Image"])
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title)
            .title_bottom(Line::from(page_info).alignment(Alignment::Right)),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");

    let mut table_state = TableState::default();
    if !app.table.products.is_empty() {
        table_state.select(Some(app.table.selected));
    }
    frame.render_stateful_widget(table, chunks[2], &mut table_state);

    // ── Status bar ──
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let status_style = if app.table.last_error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let status_line = Line::from(vec![
        Span::styled(" ↑↓", key),
        Span::raw(" Navigate  "),
        Span::styled("Enter", key),
        Span::raw(" View  "),
        Span::styled("r", key),
        Span::raw(" Refresh  "),
        Span::styled("?", key),
        Span::raw(" Help  "),
        Span::styled("q", key),
        Span::raw(" Quit  "),
        Span::styled(&app.status_msg, status_style),
    ]);
    frame.render_widget(Paragraph::new(status_line), chunks[3]);
}

/// Truncate a string to `max_width` display columns, adding "…" if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        result.push(c);
        used += w;
    }
    result.push('…');
    result
}

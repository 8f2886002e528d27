use crate::app::{App, DetailsState};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    let details = match &app.details {
        Some(d) => d,
        None => return,
    };

    // Layout: content(min) + status(1)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let label = Style::default().fg(Color::DarkGray);
    let lines = match &details.state {
        DetailsState::Loading => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" Loading product {}...", details.id),
                Style::default().fg(Color::Yellow),
            )),
        ],
        DetailsState::Loaded(product) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" {}", product.name),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(" ID:       ", label),
                Span::styled(details.id.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(vec![
                Span::styled(" Category: ", label),
                Span::styled(&product.category, Style::default().fg(Color::Cyan)),
            ]),
            Line::from(vec![
                Span::styled(" Price:    ", label),
                Span::styled(product.price_label(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(vec![
                Span::styled(" Image:    ", label),
                Span::styled(
                    &product.image,
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                ),
            ]),
        ],
        DetailsState::NotFound => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" Product {} was not found in the catalog.", details.id),
                Style::default().fg(Color::Red),
            )),
        ],
        DetailsState::Failed(msg) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(" Failed to load product {}.", details.id),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(format!(" {}", msg), label)),
        ],
    };

    let content = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Product Details "),
    );
    frame.render_widget(content, chunks[0]);

    // ── Status bar ──
    let key = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut spans = vec![Span::styled(" Esc", key), Span::raw(" Back  ")];
    if app.details_image().is_some() {
        spans.push(Span::styled("o", key));
        spans.push(Span::raw(" Open Image  "));
    }
    spans.push(Span::styled("?", key));
    spans.push(Span::raw(" Help  "));
    spans.push(Span::styled(&app.status_msg, label));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
}

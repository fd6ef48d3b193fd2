use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use resume_chat::{BusyKind, Sender};

use crate::app::App;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    if app.orchestrator.is_open() {
        render_chat(app, frame, body_area);
    } else {
        render_closed(app, frame, body_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = match app.orchestrator.busy_kind() {
        None => String::new(),
        Some(BusyKind::Sending) => " [sending]".to_string(),
        Some(BusyKind::Summarizing) => " [summarizing]".to_string(),
        Some(BusyKind::GeneratingQuestions) => " [generating questions]".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" Chat with the Resume ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("({})", app.model), Style::default().fg(Color::DarkGray)),
        Span::styled(status, Style::default().fg(Color::Yellow)),
    ]);

    frame.render_widget(Paragraph::new(title), area);
}

fn render_closed(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "Chat is hidden.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Press Esc or Enter to open it."),
    ];

    // A pending reply keeps running while the panel is hidden
    if app.is_loading() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "A reply is still on its way.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(
        Paragraph::new(Text::from(lines)).centered().block(block),
        area,
    );
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let features_height = if app.features_collapsed { 0 } else { 3 };

    let [features_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(features_height),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    if features_height > 0 {
        render_features(app, frame, features_area);
    }
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_features(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = if app.is_loading() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    };
    let label_style = if app.is_loading() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let buttons = Line::from(vec![
        Span::styled(" ^S ", key_style),
        Span::styled(" Summarize Resume   ", label_style),
        Span::styled(" ^G ", key_style),
        Span::styled(" Generate Interview Questions ", label_style),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Features (^F to collapse) ");

    frame.render_widget(Paragraph::new(buttons).centered().block(block), area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let transcript = app.orchestrator.transcript();

    let text = if transcript.is_empty() && !app.is_loading() {
        Text::from(vec![
            Line::default(),
            Line::from("Ask me anything about my resume!").centered(),
            Line::from(Span::styled(
                "e.g., \"How many years of experience do you have?\"",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        ])
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in transcript {
            let (label, color) = match msg.sender {
                Sender::User => ("You:", Color::Cyan),
                Sender::Assistant => ("AI:", Color::Yellow),
            };
            lines.push(Line::from(Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            if msg.text.is_empty() {
                lines.push(Line::from(Span::styled(
                    "(no text returned)",
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                )));
            }
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.is_loading() {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let (title, border_color) = if app.orchestrator.busy_kind() == Some(BusyKind::Sending) {
        (" Sending... ", Color::DarkGray)
    } else if app.is_loading() {
        (" Waiting for reply... ", Color::DarkGray)
    } else {
        (" Ask a question about my resume... ", Color::Yellow)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor visible; inner width excludes borders
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 || app.cursor < inner_width {
        0
    } else {
        app.cursor - inner_width + 1
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if !app.is_loading() {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.orchestrator.is_open() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" hide ", label_style),
            Span::styled(" ^C ", key_style),
            Span::styled(" quit ", label_style),
        ]
    } else {
        vec![
            Span::styled(" Esc ", key_style),
            Span::styled(" open chat ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

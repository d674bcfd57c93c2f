use crate::application::{App, Phase, WizardFault};
use crate::domain::{AnswerKey, Step, REASON_MAX_CHARS, REASON_MIN_CHARS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

const NO_TOKEN_MESSAGE: &str =
    "Kein Zugangscode gefunden. Bitte nutzen Sie den Link aus der E-Mail.";
const GENERIC_ERROR_MESSAGE: &str =
    "Ein Fehler ist aufgetreten oder der Server ist nicht erreichbar.";
const DUPLICATE_MESSAGE: &str =
    "Zu dieser Anfrage liegen bereits Angaben vor. Eine erneute Übermittlung ist nicht möglich.";

pub fn render_ui(f: &mut Frame, app: &App) {
    match app.wizard.phase() {
        Phase::Resolving => render_loading(f),
        Phase::BlockedNoToken => render_notice(f, "Ups!", NO_TOKEN_MESSAGE, Color::Red),
        Phase::BlockedError => render_notice(f, "Ups!", error_message(app), Color::Red),
        Phase::AlreadySubmitted => render_already_submitted(f, app),
        Phase::JustSubmitted => render_notice(
            f,
            "Vielen Dank!",
            "Ihre Daten wurden erfolgreich übermittelt. Wir melden uns in Kürze bei Ihnen.",
            Color::Green,
        ),
        Phase::InProgress => render_wizard(f, app),
    }
}

fn error_message(app: &App) -> &'static str {
    match app.wizard.fault() {
        Some(WizardFault::Duplicate) => DUPLICATE_MESSAGE,
        _ => GENERIC_ERROR_MESSAGE,
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn render_loading(f: &mut Frame) {
    let area = centered(f.area(), 40, 3);
    let loading = Paragraph::new("Einen Moment bitte ...")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(loading, area);
}

fn render_notice(f: &mut Frame, title: &str, message: &str, accent: Color) {
    let area = centered(f.area(), 64, 9);
    let text = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "q: beenden",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let notice = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(accent)));
    f.render_widget(notice, area);
}

fn render_already_submitted(f: &mut Frame, app: &App) {
    let message = match app.wizard.submitted_at() {
        Some(at) => format!(
            "Wir haben Ihre Angaben zu dieser Anfrage bereits am {} erhalten.",
            at.format("%d.%m.%Y")
        ),
        None => "Wir haben Ihre Angaben zu dieser Anfrage bereits erhalten.".to_string(),
    };
    render_notice(f, "Bereits empfangen", &message, Color::Blue);
}

fn render_wizard(f: &mut Frame, app: &App) {
    let Some(step) = app.wizard.current_step() else {
        return;
    };
    let area = centered(f.area(), 72, f.area().height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    render_header(f, step, chunks[0]);
    render_progress(f, step, chunks[1]);
    render_question(f, step, chunks[2]);
    if step == Step::Reason {
        render_reason(f, app, chunks[3]);
    } else {
        render_options(f, app, step, chunks[3]);
    }
    render_footer(f, app, step, chunks[4]);
}

fn render_header(f: &mut Frame, step: Step, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " ANFRAGE ",
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Schritt {}/{}", step.number(), Step::TOTAL),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    f.render_widget(header, area);
}

fn render_progress(f: &mut Frame, step: Step, area: Rect) {
    let ratio = f64::from(step.number()) / f64::from(Step::TOTAL);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Blue).bg(Color::Gray))
        .ratio(ratio)
        .label("");
    f.render_widget(gauge, area);
}

fn render_question(f: &mut Frame, step: Step, area: Rect) {
    let question = step.question();
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            question.title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            question.prompt,
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(text), area);
}

fn render_options(f: &mut Frame, app: &App, step: Step, area: Rect) {
    let chosen = app.wizard.answer(step.answer_key());
    let items: Vec<ListItem> = step
        .question()
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let selected = option.value == chosen;
            let marker = if selected { "●" } else { "○" };
            let mut label_style = Style::default();
            if option.highlighted {
                label_style = label_style.fg(Color::Blue);
            }
            if i == app.option_cursor {
                label_style = label_style.add_modifier(Modifier::REVERSED);
            }

            let mut lines = vec![Line::from(vec![
                Span::raw(format!(" {} {marker} ", i + 1)),
                Span::styled(option.label, label_style),
            ])];
            if let Some(subtitle) = option.subtitle {
                let subtitle_style = if option.highlighted {
                    Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                lines.push(Line::from(Span::styled(
                    format!("       {subtitle}"),
                    subtitle_style,
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    f.render_widget(List::new(items), area);
}

fn render_reason(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let reason = app.wizard.answer(AnswerKey::ReasonText);
    let body = if reason.is_empty() {
        Paragraph::new(Step::Reason.question().placeholder.unwrap_or_default())
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(format!("{reason}▏"))
    };
    f.render_widget(
        body.wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    let len = app.wizard.reason_len();
    let (hint, hint_style) = if len >= REASON_MIN_CHARS {
        ("Bereit zum Senden".to_string(), Style::default().fg(Color::Green))
    } else {
        (
            format!("Min. {REASON_MIN_CHARS} Zeichen"),
            Style::default().fg(Color::DarkGray),
        )
    };
    let counter = Paragraph::new(Line::from(vec![
        Span::styled(hint, hint_style),
        Span::raw("  "),
        Span::styled(
            format!("{len}/{REASON_MAX_CHARS}"),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    f.render_widget(counter, chunks[1]);
}

fn render_footer(f: &mut Frame, app: &App, step: Step, area: Rect) {
    let mut spans = Vec::new();
    if step.previous().is_some() {
        spans.push(Span::styled(
            "← Esc: Zurück",
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw("    "));
    }

    if step == Step::Reason {
        let label = if app.wizard.is_submitting() {
            " Sende... "
        } else {
            " Enter: Absenden "
        };
        let style = if app.wizard.can_submit() {
            Style::default().fg(Color::White).bg(Color::Black).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
    } else {
        spans.push(Span::styled(
            "↑↓: wählen  Enter/1-4: bestätigen  q: beenden",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));
    f.render_widget(footer, area);
}

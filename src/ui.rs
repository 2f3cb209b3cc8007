use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::pattern::Phase;
use crate::util::format_session_time;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Inhale => Color::Green,
        Phase::Hold => Color::Yellow,
        Phase::Exhale => Color::Blue,
    }
}

/// Circle radius in rows for the current phase: grow through inhale, hold
/// steady, shrink through exhale.
fn circle_radius(phase: Phase, progress: f64, max: f64) -> f64 {
    let min = max * 0.5;
    match phase {
        Phase::Inhale => min + (max - min) * progress,
        Phase::Hold => max,
        Phase::Exhale => max - (max - min) * progress,
    }
}

/// Render a filled circle as text rows. Columns count double since
/// terminal cells are roughly twice as tall as they are wide.
fn circle_lines(radius: f64) -> Vec<String> {
    let r = radius.max(1.0);
    let rows = r as i32;
    let half_width = (r * 2.0) as i32;
    let mut lines = Vec::with_capacity((rows * 2 + 1) as usize);
    for y in -rows..=rows {
        let mut line = String::new();
        for x in -half_width..=half_width {
            let dx = x as f64 / 2.0;
            let dy = y as f64;
            line.push(if dx * dx + dy * dy <= r * r { '█' } else { ' ' });
        }
        lines.push(line.trim_end().to_string());
    }
    lines
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Session => render_session(self, area, buf),
            AppState::PatternSelect => render_pattern_select(self, area, buf),
        }
    }
}

fn render_session(app: &App, area: Rect, buf: &mut Buffer) {
    let scheduler = &app.scheduler;
    let active = scheduler.is_active();
    let phase = scheduler.current_phase();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Gray);
    let hint_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // pattern line
            Constraint::Min(7),    // breathing circle
            Constraint::Length(1), // instruction
            Constraint::Length(1), // gauge
            Constraint::Length(1), // stats
            Constraint::Length(1), // padding
            Constraint::Length(1), // controls
        ])
        .split(area);

    let title = if active {
        format!("{} breathing pattern", scheduler.active_pattern().name)
    } else {
        format!("Current pattern: {}", scheduler.active_pattern().name)
    };
    Paragraph::new(Span::styled(title, bold_style))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let circle_area = chunks[1];
    let max_radius = (circle_area.height.saturating_sub(1) as f64 / 2.0).min(7.0);
    let radius = if active {
        circle_radius(phase, scheduler.phase_progress(), max_radius)
    } else {
        max_radius * 0.75
    };
    let circle_style = if active {
        Style::default().fg(phase_color(phase))
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let lines = circle_lines(radius);
    let widest = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    let height = lines.len() as u16;
    let text: Vec<Line> = lines
        .into_iter()
        .map(|l| Line::styled(l, circle_style))
        .collect();
    Paragraph::new(text).render(centered_rect(circle_area, widest, height), buf);

    let instruction = if scheduler.is_restarting() {
        Span::styled("Resetting...", dim_style)
    } else if active {
        Span::styled(
            phase.instruction(),
            Style::default()
                .fg(phase_color(phase))
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("Ready to breathe mindfully?", bold_style)
    };
    Paragraph::new(instruction)
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    if active {
        let gauge_area = centered_rect(chunks[3], chunks[3].width.min(40), 1);
        Gauge::default()
            .ratio(scheduler.phase_progress())
            .label(phase.to_string())
            .gauge_style(Style::default().fg(phase_color(phase)))
            .render(gauge_area, buf);

        let stats = format!(
            "Cycles: {}   Time: {}",
            scheduler.cycle_count(),
            format_session_time(scheduler.elapsed_seconds())
        );
        Paragraph::new(Span::styled(stats, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }

    let controls = if active {
        "(space) stop | (r) restart | (p) patterns | (esc) quit"
    } else {
        "(space) start | (p) patterns | (esc) quit"
    };
    Paragraph::new(Span::styled(controls, hint_style))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
}

fn render_pattern_select(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(0),    // pattern list
            Constraint::Length(5), // selected pattern info
            Constraint::Length(3), // instructions
        ])
        .split(area);

    let title = Paragraph::new("Breathing Pattern Settings")
        .block(Block::default().borders(Borders::ALL).title("Patterns"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    title.render(chunks[0], buf);

    let rows: Vec<Line> = app
        .library
        .iter()
        .enumerate()
        .map(|(idx, pattern)| {
            let selected = idx == app.library.selected_index();
            let marker = if selected { "> " } else { "  " };
            let style = if selected {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!("{}{}", marker, pattern.name), style)
        })
        .collect();
    Paragraph::new(rows)
        .block(Block::default().borders(Borders::ALL).title("Select Pattern"))
        .render(chunks[1], buf);

    let selected = app.library.selected();
    let info = vec![
        Line::styled(
            selected.description.clone(),
            Style::default().fg(Color::Gray),
        ),
        Line::styled(selected.summary(), Style::default().fg(Color::Gray)),
    ];
    Paragraph::new(info)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(selected.name.clone()),
        )
        .render(chunks[2], buf);

    let instructions = Paragraph::new("↑/↓ select | (enter) apply | (esc) back")
        .block(Block::default().borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        )
        .alignment(Alignment::Center);
    instructions.render(chunks[3], buf);
}

//! Frame rendering for the control panel.
//!
//! One frame = header with the connectivity indicator, the status pane
//! (status line, version, OS, privileges hint, last-updated), the controls
//! footer, the single-slot alert toast, and (when open) the confirmation
//! modal drawn over everything else.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::state::{ActionKind, ControllerState, Modal, Severity};
use crate::theme::theme;
use crate::util::capitalize_first;

/// Render one frame of the panel from the controller-owned state.
pub fn ui(f: &mut Frame, state: &ControllerState) {
    let th = theme();
    let area = f.area();

    let bg = Block::default().style(Style::default().bg(th.base));
    f.render_widget(bg, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    render_header(f, state, chunks[0]);
    render_status(f, state, chunks[1]);
    render_controls(f, state, chunks[2]);
    render_alert(f, state, chunks[3]);

    if let Modal::Confirm { action } = state.modal {
        render_confirm(f, action, area);
    }
}

fn render_header(f: &mut Frame, state: &ControllerState, area: Rect) {
    let th = theme();
    let (conn_text, conn_color) = if state.online {
        ("Connected", th.green)
    } else {
        ("Disconnected", th.red)
    };
    let auto = if state.auto_refresh_enabled {
        "auto-refresh on"
    } else {
        "auto-refresh off"
    };
    let mut segs = vec![
        Span::styled("● ", Style::default().fg(conn_color)),
        Span::styled(conn_text, Style::default().fg(conn_color)),
        Span::styled(format!("   {auto}"), Style::default().fg(th.subtext0)),
    ];
    if state.busy() {
        segs.push(Span::styled(
            "   ⟳ working…",
            Style::default().fg(th.sapphire),
        ));
    }
    let header = Paragraph::new(Line::from(segs)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.overlay1))
            .title(Span::styled(
                " dockman — Docker control panel ",
                Style::default().fg(th.lavender).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(header, area);
}

fn render_status(f: &mut Frame, state: &ControllerState, area: Rect) {
    let th = theme();
    let mut lines: Vec<Line> = Vec::new();

    match &state.snapshot {
        Some(snap) if snap.installed => {
            lines.push(Line::from(Span::styled(
                "✔ Docker is installed",
                Style::default().fg(th.green).add_modifier(Modifier::BOLD),
            )));
            let version = snap
                .version
                .clone()
                .unwrap_or_else(|| "Version information not available".to_string());
            lines.push(Line::from(Span::styled(
                version,
                Style::default().fg(th.text),
            )));
        }
        Some(_) => {
            lines.push(Line::from(Span::styled(
                "✘ Docker is not installed",
                Style::default().fg(th.red).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::raw("")));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Waiting for first status…",
                Style::default().fg(th.subtext0),
            )));
            lines.push(Line::from(Span::raw("")));
        }
    }

    if let Some(os) = state.snapshot.as_ref().and_then(|s| s.os.as_deref()) {
        lines.push(Line::from(Span::styled(
            format!("Os: {}", capitalize_first(os)),
            Style::default().fg(th.subtext0),
        )));
    }
    if state
        .snapshot
        .as_ref()
        .and_then(|s| s.requires_privileges)
        .unwrap_or(false)
    {
        lines.push(Line::from(Span::styled(
            "Server reports elevated privileges are required",
            Style::default().fg(th.yellow),
        )));
    }
    if let Some(stamp) = &state.last_updated {
        lines.push(Line::from(Span::styled(
            format!("Last updated: {stamp}"),
            Style::default().fg(th.subtext0),
        )));
    }

    let title = if state.busy() {
        " Status (refreshing…) "
    } else {
        " Status "
    };
    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.overlay1))
            .title(Span::styled(title, Style::default().fg(th.sapphire))),
    );
    f.render_widget(panel, area);
}

fn render_controls(f: &mut Frame, state: &ControllerState, area: Rect) {
    let th = theme();
    let hint = |key: &str, label: &str, enabled: bool| -> Vec<Span<'static>> {
        let (key_style, label_style) = if enabled {
            (
                Style::default().fg(th.sapphire).add_modifier(Modifier::BOLD),
                Style::default().fg(th.text),
            )
        } else {
            (
                Style::default().fg(th.overlay1),
                Style::default().fg(th.overlay1).add_modifier(Modifier::DIM),
            )
        };
        vec![
            Span::styled(format!("[{key}] "), key_style),
            Span::styled(format!("{label}  "), label_style),
        ]
    };

    let mut segs: Vec<Span> = Vec::new();
    segs.extend(hint(
        "i",
        "install",
        state.action_enabled(ActionKind::Install),
    ));
    segs.extend(hint("u", "update", state.action_enabled(ActionKind::Update)));
    segs.extend(hint(
        "x",
        "uninstall",
        state.action_enabled(ActionKind::Uninstall),
    ));
    segs.extend(hint("r", "refresh", state.refresh_enabled()));
    segs.extend(hint("a", "auto-refresh", true));
    segs.extend(hint("q", "quit", true));

    let bar = Paragraph::new(Line::from(segs)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.overlay1))
            .style(Style::default().bg(th.mantle)),
    );
    f.render_widget(bar, area);
}

fn render_alert(f: &mut Frame, state: &ControllerState, area: Rect) {
    let th = theme();
    let Some(alert) = &state.alert else {
        return;
    };
    let color = match alert.severity {
        Severity::Success => th.green,
        Severity::Warning => th.yellow,
        Severity::Danger => th.red,
    };
    let toast = Paragraph::new(Line::from(Span::styled(
        alert.message.clone(),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(toast, area);
}

fn render_confirm(f: &mut Frame, action: ActionKind, area: Rect) {
    let th = theme();
    let border = if action == ActionKind::Uninstall {
        th.red
    } else {
        th.lavender
    };
    let rect = centered_rect(area, 60, 6);
    f.render_widget(Clear, rect);
    let lines = vec![
        Line::from(Span::styled(
            action.prompt(),
            Style::default().fg(th.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw("")),
        Line::from(vec![
            Span::styled("[y] ", Style::default().fg(th.green)),
            Span::styled("confirm   ", Style::default().fg(th.text)),
            Span::styled("[n] ", Style::default().fg(th.red)),
            Span::styled("cancel", Style::default().fg(th.text)),
        ]),
    ];
    let dialog = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(th.mantle))
            .title(Span::styled(
                " Confirm ",
                Style::default().fg(border).add_modifier(Modifier::BOLD),
            )),
    );
    f.render_widget(dialog, rect);
}

/// Center a `width`-percent by `height`-rows rectangle inside `area`.
fn centered_rect(area: Rect, width_pct: u16, height: u16) -> Rect {
    let width = area.width.saturating_mul(width_pct) / 100;
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width,
        height: height.min(area.height),
    }
}

use crate::app::{App, Mode};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// 渲染状态栏（Helix 风格）
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mode_text = match app.mode {
        Mode::Normal => ("NORMAL", Color::Green),
        Mode::Dialog => ("DIALOG", Color::Magenta),
        Mode::Help => ("HELP", Color::Blue),
        Mode::Detail => ("DETAIL", Color::Cyan),
    };

    let user = match app.identity() {
        Some(identity) => format!(" {} ({}) ", identity.name, identity.role.label()),
        None => " não autenticado ".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", mode_text.0),
            Style::default()
                .fg(Color::Black)
                .bg(mode_text.1)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {} |", app.view.title())),
        Span::styled(user, Style::default().fg(Color::Cyan)),
        Span::raw(format!(
            "| {} tarefas | {} usuários | {} projetos | ? ajuda",
            app.store.board().task_count(),
            app.users.len(),
            app.projects.len()
        )),
    ]);

    f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Black)), area);
}

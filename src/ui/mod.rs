mod dashboard;
mod detail;
pub mod dialogs;
pub mod help;
mod kanban;
pub mod login;
mod projects;
mod statusbar;
mod tasks;
pub mod text_input;
mod users;

pub use dashboard::status_entries;

use crate::app::{App, Mode, View};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Tabs;
use ratatui::Frame;

/// 主渲染函数
pub fn render(f: &mut Frame, app: &App) {
    if app.view == View::Login {
        login::render(f, f.area(), &app.login);
    } else {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // 标签栏
                Constraint::Min(0),    // 主内容区域
                Constraint::Length(1), // 状态栏
            ])
            .split(f.area());

        render_tabs(f, chunks[0], app);
        match app.view {
            View::Dashboard => dashboard::render(f, chunks[1], app),
            View::Kanban => kanban::render(f, chunks[1], app),
            View::Tasks => tasks::render(f, chunks[1], app),
            View::Users => users::render(f, chunks[1], app),
            View::Projects => projects::render(f, chunks[1], app),
            View::Login => {}
        }
        statusbar::render(f, chunks[2], app);
    }

    if app.mode == Mode::Detail {
        detail::render(f, f.area(), app);
    }

    // 渲染对话框（如果有）
    if let Some(dialog) = &app.dialog {
        dialogs::render_dialog(f, dialog);
    }

    // 渲染帮助面板（如果处于帮助模式）
    if app.mode == Mode::Help {
        help::render(f, f.area());
    }

    // 渲染通知栏（如果有通知）
    if let Some(ref notification) = app.notification {
        render_notification(f, f.area(), notification);
    }
}

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = View::TABS
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!("{} {}", i + 1, view.title())))
        .collect();
    let selected = View::TABS.iter().position(|v| *v == app.view).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(41, 98, 218))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("│"));
    f.render_widget(tabs, area);
}

/// 渲染通知栏
fn render_notification(f: &mut Frame, area: Rect, notification: &crate::app::Notification) {
    use crate::app::NotificationLevel;
    use ratatui::widgets::{Block, Borders, Paragraph};

    // 通知栏占据顶部 3 行
    let notification_area = Rect {
        x: area.x,
        y: area.y,
        width: area.width,
        height: area.height.min(3),
    };

    // 根据级别选择颜色
    let (bg_color, fg_color, prefix) = match notification.level {
        NotificationLevel::Info => (Color::Blue, Color::White, "ℹ"),
        NotificationLevel::Success => (Color::Green, Color::White, "✓"),
        NotificationLevel::Warning => (Color::Yellow, Color::Black, "⚠"),
        NotificationLevel::Error => (Color::Red, Color::White, "✗"),
    };

    let content = Line::from(vec![
        Span::styled(format!(" {} ", prefix), Style::default().fg(fg_color).bg(bg_color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(&notification.message, Style::default().fg(fg_color)),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(bg_color))
        .style(Style::default().bg(bg_color));

    f.render_widget(Paragraph::new(content).block(block), notification_area);
}

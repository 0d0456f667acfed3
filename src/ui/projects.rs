use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};
use taskpro::models::{Project, ProjectStatus};

/// 每个项目卡片的高度
const CARD_HEIGHT: u16 = 7;

fn status_color(status: ProjectStatus) -> Color {
    match status {
        ProjectStatus::Pending => Color::Yellow,
        ProjectStatus::InProgress => Color::Blue,
        ProjectStatus::Done => Color::Green,
    }
}

/// 渲染项目列表（卡片 + 进度条）
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let projects = app.projects.all();
    if projects.is_empty() {
        f.render_widget(
            Paragraph::new("Nenhum projeto. Pressione 'a' para criar.")
                .style(Style::default().fg(Color::Gray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(ratatui::widgets::BorderType::Rounded),
                ),
            area,
        );
        return;
    }

    // 只显示能放下的卡片，选中项保持可见
    let per_page = (area.height / CARD_HEIGHT).max(1) as usize;
    let selected = app.project_row.min(projects.len() - 1);
    let first = (selected + 1).saturating_sub(per_page);
    let visible = &projects[first..projects.len().min(first + per_page)];

    let constraints: Vec<Constraint> = visible
        .iter()
        .map(|_| Constraint::Length(CARD_HEIGHT))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (offset, project) in visible.iter().enumerate() {
        render_card(f, chunks[offset], project, first + offset == selected);
    }
}

fn render_card(f: &mut Frame, area: Rect, project: &Project, selected: bool) {
    let border = if selected { Color::White } else { Color::DarkGray };
    let block = Block::default()
        .title(Line::from(vec![
            Span::styled(
                format!(" {} ", project.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("[{}] ", project.status.label()),
                Style::default().fg(status_color(project.status)),
            ),
        ]))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // 描述
            Constraint::Length(1), // 成员和日期
            Constraint::Length(1), // 进度条
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(project.description.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray)),
        rows[0],
    );

    let due = project
        .due_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string());
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("Membros: ", Style::default().fg(Color::Yellow)),
            Span::raw(project.members.join(", ")),
            Span::styled("  Prazo: ", Style::default().fg(Color::Yellow)),
            Span::raw(due),
        ])),
        rows[1],
    );

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(status_color(project.status)))
        .percent(project.progress())
        .label(format!(
            "{}% ({}/{} tarefas)",
            project.progress(),
            project.tasks_completed,
            project.tasks_total
        ));
    f.render_widget(gauge, rows[2]);
}

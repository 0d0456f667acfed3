use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use taskpro::models::SubtaskStatus;

use super::dialogs::centered_rect;
use super::kanban::priority_color;

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), Style::default().fg(Color::Yellow)),
        Span::raw(value),
    ])
}

/// 渲染任务详情弹窗（包含子任务）
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(task) = app.detail() else {
        return;
    };

    let popup = centered_rect(80, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ", task.title))
        .title_alignment(ratatui::layout::Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // 字段
            Constraint::Min(3),    // 子任务
            Constraint::Length(1), // 帮助
        ])
        .split(inner);

    let status = app
        .store
        .column_of(&task.id)
        .map(|c| c.title.clone())
        .unwrap_or_default();
    let completed = task
        .completed_date
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string());
    let lines = vec![
        Line::from(vec![
            Span::styled(format!("{:<14}", "Prioridade"), Style::default().fg(Color::Yellow)),
            Span::styled(task.priority.label(), Style::default().fg(priority_color(task.priority))),
        ]),
        field("Status", status),
        field("Departamentos", task.departments_label()),
        field("Responsáveis", task.assignees_label()),
        field("Vencimento", task.due_date.format("%d/%m/%Y").to_string()),
        field("Criada em", task.created_at.format("%d/%m/%Y").to_string()),
        field("Concluída em", completed),
        Line::from(""),
        Line::from(task.description.as_str()),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), chunks[0]);

    let (done, total) = task.subtask_progress();
    let items: Vec<ListItem> = task
        .subtasks
        .iter()
        .map(|sub| {
            let (mark, color) = match sub.status {
                SubtaskStatus::Pending => ("[ ]", Color::Gray),
                SubtaskStatus::InProgress => ("[~]", Color::Yellow),
                SubtaskStatus::Done => ("[x]", Color::Green),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", mark), Style::default().fg(color)),
                Span::raw(sub.title.as_str()),
                Span::styled(
                    format!("  {} · {}", sub.status.label(), sub.due_date.format("%d/%m/%Y")),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Subtarefas ({}/{}) ", done, total))
                .borders(Borders::TOP),
        )
        .highlight_style(Style::default().bg(Color::Rgb(41, 98, 218)).add_modifier(Modifier::BOLD));
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(app.subtask_row.min(total - 1)));
    }
    f.render_stateful_widget(list, chunks[1], &mut state);

    f.render_widget(
        Paragraph::new("a nova  e editar  d excluir  espaço status  y copiar  Esc fechar")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(ratatui::layout::Alignment::Center),
        chunks[2],
    );
}

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use taskpro::dashboard::MONTH_LABELS;
use taskpro::query::{SortField, TaskQuery};

use super::kanban::priority_color;

fn header_label(field: SortField, query: &TaskQuery) -> String {
    let name = match field {
        SortField::Title => "Título",
        SortField::Priority => "Prioridade",
        SortField::Department => "Departamentos",
        SortField::DueDate => "Vencimento",
        SortField::CreatedAt => "Criada",
        SortField::Status => "Status",
    };
    if query.sort_field == field {
        format!("{} {}", name, query.direction.arrow())
    } else {
        name.to_string()
    }
}

/// 当前筛选条件的摘要
pub fn filter_summary(query: &TaskQuery) -> String {
    let mut parts = Vec::new();
    if !query.search.is_empty() {
        parts.push(format!("busca: \"{}\"", query.search));
    }
    if let Some(dept) = &query.department {
        parts.push(format!("departamento: {}", dept));
    }
    if let Some(status) = &query.status {
        parts.push(format!("status: {}", status));
    }
    if let Some(priority) = query.priority {
        parts.push(format!("prioridade: {}", priority.label()));
    }
    if let Some(month) = query.month {
        let label = (month as usize)
            .checked_sub(1)
            .and_then(|i| MONTH_LABELS.get(i))
            .copied()
            .unwrap_or("?");
        parts.push(format!("mês: {}", label));
    }
    if let Some(year) = query.year {
        parts.push(format!("ano: {}", year));
    }
    if parts.is_empty() {
        "sem filtros".to_string()
    } else {
        parts.join(" · ")
    }
}

/// 渲染任务表格
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let rows = app.task_rows();
    let query = &app.task_query;

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Filtros: ", Style::default().fg(Color::Yellow)),
            Span::raw(filter_summary(query)),
            Span::styled(
                format!("  ({} tarefas)", rows.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        chunks[0],
    );

    let header = Row::new(
        SortField::ALL
            .iter()
            .map(|field| Cell::from(header_label(*field, query))),
    )
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            let task = row.task;
            let due_style = if app.store.is_overdue(&task.id) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(task.title.as_str()),
                Cell::from(Span::styled(
                    task.priority.label(),
                    Style::default().fg(priority_color(task.priority)),
                )),
                Cell::from(task.departments_label()),
                Cell::from(Span::styled(task.due_date.format("%d/%m/%Y").to_string(), due_style)),
                Cell::from(task.created_at.format("%d/%m/%Y").to_string()),
                Cell::from(row.status().to_string()),
            ])
        })
        .collect();

    let table = Table::new(
        body,
        [
            Constraint::Percentage(30),
            Constraint::Length(12),
            Constraint::Percentage(22),
            Constraint::Length(13),
            Constraint::Length(11),
            Constraint::Length(15),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(41, 98, 218))
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▶ ")
    .block(
        Block::default()
            .title(" Tarefas ")
            .borders(Borders::ALL)
            .border_type(ratatui::widgets::BorderType::Rounded),
    );

    let mut state = TableState::default();
    if !rows.is_empty() {
        state.select(Some(app.task_row.min(rows.len() - 1)));
    }
    f.render_stateful_widget(table, chunks[1], &mut state);
}

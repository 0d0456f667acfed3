use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};
use taskpro::models::{Column, Priority, Task};

/// 优先级指示器颜色
pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Urgent => Color::Magenta,
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Blue,
    }
}

/// 渲染看板视图
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let board = app.store.board();
    let columns: Vec<&Column> = board.ordered_columns().collect();
    if columns.is_empty() {
        return;
    }

    let done = board
        .column(app.store.completed_column())
        .map_or(0, Column::len);
    let block = Block::default()
        .title(format!(" Kanban ({}/{}) ", done, board.task_count()))
        .title_alignment(ratatui::layout::Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);

    // 每列等宽
    let constraints: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (idx, column) in columns.iter().enumerate() {
        let tasks = board.tasks_in(&column.id);
        render_column(f, chunks[idx], column, &tasks, idx, app);
    }
}

/// 渲染单个列
fn render_column(
    f: &mut Frame,
    area: Rect,
    column: &Column,
    tasks: &[&Task],
    column_idx: usize,
    app: &App,
) {
    let is_column_focused = app.selected_column == column_idx;

    // 简洁配色：聚焦=白色，非聚焦=灰色
    let (border_color, title_style) = if is_column_focused {
        (Color::White, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
    } else {
        (Color::DarkGray, Style::default().fg(Color::Gray))
    };

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let is_selected = is_column_focused && i == app.selected_task_index;

            // 只有选中的任务高亮
            let style = if is_selected {
                Style::default()
                    .bg(Color::Rgb(41, 98, 218))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let selection_indicator = if is_selected {
                Span::styled("▶ ", Style::default().fg(Color::White))
            } else {
                Span::raw("  ")
            };

            let mut title_line = vec![
                Span::raw(" "),
                selection_indicator,
                Span::styled("● ", Style::default().fg(priority_color(task.priority))),
                Span::raw(task.title.as_str()),
            ];
            let (done_subtasks, total_subtasks) = task.subtask_progress();
            if total_subtasks > 0 {
                title_line.push(Span::styled(
                    format!(" [{}/{}]", done_subtasks, total_subtasks),
                    Style::default().fg(Color::Cyan),
                ));
            }

            // 第二行：截止日期和负责人
            let due_style = if app.store.is_overdue(&task.id) {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let meta_line = Line::from(vec![
                Span::raw("     "),
                Span::styled(task.due_date.format("%d/%m/%Y").to_string(), due_style),
                Span::raw("  "),
                Span::styled(task.assignees_label(), Style::default().fg(Color::DarkGray)),
            ]);

            ListItem::new(vec![Line::from(title_line), meta_line]).style(style)
        })
        .collect();

    let title_with_count = format!(" {} ({}) ", column.title, tasks.len());

    let list = List::new(items).block(
        Block::default()
            .title(title_with_count)
            .title_alignment(ratatui::layout::Alignment::Center)
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .border_type(ratatui::widgets::BorderType::Rounded),
    );

    // 保证选中项可见
    let mut state = ListState::default();
    if is_column_focused && !tasks.is_empty() {
        state.select(Some(app.selected_task_index.min(tasks.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Gauge, List, ListItem, ListState},
    Frame,
};
use taskpro::dashboard::{MONTH_LABELS, OVERDUE_LABEL, Summary};

/// 状态列表：所有列，然后是逾期伪状态
pub fn status_entries(summary: &Summary) -> Vec<(String, usize)> {
    let mut entries = summary.by_status.clone();
    entries.push((OVERDUE_LABEL.to_string(), summary.overdue));
    entries
}

/// 渲染仪表盘
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    render_status_cards(f, top[0], app, &summary);
    render_completion(f, top[1], &summary);
    render_departments(f, bottom[0], &summary);
    render_monthly(f, bottom[1], &summary, app.store.today());
}

fn render_status_cards(f: &mut Frame, area: Rect, app: &App, summary: &Summary) {
    let items: Vec<ListItem> = status_entries(summary)
        .into_iter()
        .map(|(title, count)| {
            let color = if title == OVERDUE_LABEL {
                Color::Red
            } else {
                Color::Cyan
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:>4} ", count), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::raw(title),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Tarefas ({}) ", summary.total))
                .borders(Borders::ALL)
                .border_type(ratatui::widgets::BorderType::Rounded),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(41, 98, 218))
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.status_row));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_completion(f: &mut Frame, area: Rect, summary: &Summary) {
    let block = Block::default()
        .title(" Taxa de conclusão ")
        .borders(Borders::ALL)
        .border_type(ratatui::widgets::BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .percent(summary.completion_rate.min(100))
            .label(format!(
                "{}% ({}/{})",
                summary.completion_rate, summary.completed, summary.total
            )),
        chunks[0],
    );
    f.render_widget(
        Line::from(vec![
            Span::styled("Atrasadas: ", Style::default().fg(Color::Red)),
            Span::raw(summary.overdue.to_string()),
        ]),
        chunks[2],
    );
}

fn render_departments(f: &mut Frame, area: Rect, summary: &Summary) {
    let data: Vec<(&str, u64)> = summary
        .by_department
        .iter()
        .map(|(dept, n)| (dept.as_str(), *n as u64))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(" Por departamento ")
                .borders(Borders::ALL)
                .border_type(ratatui::widgets::BorderType::Rounded),
        )
        .data(&data)
        .bar_width(10)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(chart, area);
}

fn render_monthly(f: &mut Frame, area: Rect, summary: &Summary, today: chrono::NaiveDate) {
    use chrono::Datelike;

    let data: Vec<(&str, u64)> = MONTH_LABELS
        .iter()
        .zip(summary.completions_by_month.iter())
        .map(|(label, n)| (*label, *n))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(" Concluídas por mês ({}) ", today.year()))
                .borders(Borders::ALL)
                .border_type(ratatui::widgets::BorderType::Rounded),
        )
        .data(&data)
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::Black).bg(Color::Green));
    f.render_widget(chart, area);
}

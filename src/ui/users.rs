use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use taskpro::models::{Role, UserStatus};

/// 渲染用户表格
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let users = app.users.search(&app.user_search);
    let search = if app.user_search.is_empty() {
        Span::styled("/ para buscar", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(format!("busca: \"{}\"", app.user_search))
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" Usuários ", Style::default().fg(Color::Yellow)),
            search,
            Span::styled(
                format!("  ({} de {})", users.len(), app.users.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        chunks[0],
    );

    let header = Row::new(["Nome", "Email", "Departamento", "Função", "Status"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = users
        .iter()
        .map(|user| {
            let role_style = match user.role {
                Role::Admin => Style::default().fg(Color::Magenta),
                Role::User => Style::default(),
            };
            let status_style = match user.status {
                UserStatus::Active => Style::default().fg(Color::Green),
                UserStatus::Inactive => Style::default().fg(Color::DarkGray),
            };
            Row::new(vec![
                Cell::from(user.name.as_str()),
                Cell::from(user.email.as_str()),
                Cell::from(user.department.as_str()),
                Cell::from(Span::styled(user.role.label(), role_style)),
                Cell::from(Span::styled(user.status.label(), status_style)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Length(14),
            Constraint::Length(9),
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
            .borders(Borders::ALL)
            .border_type(ratatui::widgets::BorderType::Rounded),
    );

    let mut state = TableState::default();
    if !users.is_empty() {
        state.select(Some(app.user_row.min(users.len() - 1)));
    }
    f.render_stateful_widget(table, chunks[1], &mut state);
}

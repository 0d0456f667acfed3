use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::dialogs::centered_rect;

fn heading(text: &str) -> Line<'_> {
    Line::from(Span::styled(
        text,
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(keys: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<11}", keys), Style::default().fg(Color::Cyan)),
        Span::raw(desc),
    ])
}

/// 渲染帮助面板
pub fn render(f: &mut Frame, area: Rect) {
    // 背景遮罩
    f.render_widget(
        Block::default().style(Style::default().bg(Color::Rgb(0, 0, 0))),
        area,
    );

    let popup_area = centered_rect(80, 85, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Atalhos (ESC ou ? para fechar) ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    // 分成三列
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(inner);

    let general = vec![
        heading("Geral"),
        Line::from(""),
        key_line("1-5", "trocar de tela"),
        key_line("Tab", "próxima tela"),
        key_line("?", "esta ajuda"),
        key_line("o", "sair da conta"),
        key_line("q, Ctrl+C", "fechar o programa"),
        Line::from(""),
        heading("Dashboard"),
        Line::from(""),
        key_line("j/k", "escolher status"),
        key_line("Enter", "ver tarefas do status"),
        Line::from(""),
        heading("Kanban"),
        Line::from(""),
        key_line("h/l", "coluna anterior/próxima"),
        key_line("j/k", "tarefa abaixo/acima"),
        key_line("H/L", "mover para coluna vizinha"),
        key_line("J/K", "mover dentro da coluna"),
        key_line("a", "nova tarefa"),
        key_line("e", "editar tarefa"),
        key_line("d", "excluir tarefa"),
        key_line("Enter, v", "detalhes e subtarefas"),
        key_line("y", "copiar tarefa"),
    ];

    let tables = vec![
        heading("Tarefas"),
        Line::from(""),
        key_line("j/k", "navegar"),
        key_line("/", "buscar"),
        key_line("f", "departamento"),
        key_line("s", "status"),
        key_line("p", "prioridade"),
        key_line("m / Y", "mês / ano"),
        key_line("S", "ordenar por campo"),
        key_line("r", "inverter ordem"),
        key_line("c", "limpar filtros"),
        key_line("a/e/d", "nova/editar/excluir"),
        Line::from(""),
        heading("Usuários"),
        Line::from(""),
        key_line("/", "buscar"),
        key_line("a/e/d", "novo/editar/excluir"),
        key_line("P", "redefinir senha (admin)"),
        Line::from(""),
        heading("Projetos"),
        Line::from(""),
        key_line("a/e/d", "novo/editar/excluir"),
        key_line("Enter", "abrir no kanban"),
    ];

    let dialogs = vec![
        heading("Detalhes"),
        Line::from(""),
        key_line("j/k", "escolher subtarefa"),
        key_line("a", "nova subtarefa"),
        key_line("e", "editar subtarefa"),
        key_line("d", "excluir subtarefa"),
        key_line("Espaço", "avançar status"),
        Line::from(""),
        heading("Diálogos"),
        Line::from(""),
        key_line("Tab/↑↓", "próximo campo"),
        key_line("Enter", "confirmar"),
        key_line("Esc", "cancelar"),
        key_line("Ctrl+U", "limpar campo"),
        key_line("y/n", "sim/não"),
        Line::from(""),
        heading("Campos"),
        Line::from(""),
        Line::from("• listas separadas por vírgula"),
        Line::from("• datas em dd/mm/aaaa ou aaaa-mm-dd"),
        Line::from("• prioridade: baixa, média, alta, urgente"),
    ];

    f.render_widget(
        Paragraph::new(general)
            .block(Block::default().borders(Borders::RIGHT))
            .wrap(Wrap { trim: false }),
        columns[0],
    );
    f.render_widget(
        Paragraph::new(tables)
            .block(Block::default().borders(Borders::RIGHT))
            .wrap(Wrap { trim: false }),
        columns[1],
    );
    f.render_widget(Paragraph::new(dialogs).wrap(Wrap { trim: false }), columns[2]);
}

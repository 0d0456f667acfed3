use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::dialogs::centered_fixed;
use super::text_input::{InputAction, LineInput};

/// 登录表单的焦点字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// 登录表单
pub struct LoginForm {
    pub email: LineInput,
    pub password: LineInput,
    pub focus: LoginField,
    /// 上次失败的原因，显示在表单下方
    pub error: Option<String>,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginForm {
    pub fn new() -> Self {
        let mut form = Self {
            email: LineInput::new(""),
            password: LineInput::new("").masked(),
            focus: LoginField::Email,
            error: None,
        };
        form.refresh_focus();
        form
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
        self.refresh_focus();
    }

    fn refresh_focus(&mut self) {
        self.email.set_focused(self.focus == LoginField::Email);
        self.password.set_focused(self.focus == LoginField::Password);
    }

    /// 在邮箱字段按 Enter 跳到密码，不提交
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if matches!(key.code, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) {
            self.toggle_focus();
            return InputAction::Continue;
        }
        match self.focus {
            LoginField::Email => match self.email.handle_key(key) {
                InputAction::Submit if self.password.value().is_empty() => {
                    self.toggle_focus();
                    InputAction::Continue
                }
                action => action,
            },
            LoginField::Password => self.password.handle_key(key),
        }
    }

    /// 输入的 (邮箱, 密码)，邮箱去空白
    pub fn credentials(&self) -> (String, String) {
        (self.email.value().trim().to_string(), self.password.value())
    }
}

pub fn render(f: &mut Frame, area: Rect, form: &LoginForm) {
    let popup = centered_fixed(50, 16, area);

    let block = Block::default()
        .title(" TaskPro ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(136, 192, 208)))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // 标题
            Constraint::Length(3), // 邮箱
            Constraint::Length(3), // 密码
            Constraint::Length(2), // 错误
            Constraint::Min(0),    // 提示
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new("Entre com suas credenciais para acessar o sistema")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Rgb(129, 161, 193))),
        chunks[0],
    );

    render_field(f, chunks[1], "Email", &form.email, form.focus == LoginField::Email);
    render_field(f, chunks[2], "Senha", &form.password, form.focus == LoginField::Password);

    if let Some(error) = &form.error {
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("✗ ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled(error.as_str(), Style::default().fg(Color::Red)),
            ]))
            .alignment(Alignment::Center),
            chunks[3],
        );
    }

    let hints = vec![
        Line::from("Tab trocar campo  Enter entrar  Esc sair"),
        Line::from(Span::styled(
            "Demo: admin@example.com / password",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    f.render_widget(
        Paragraph::new(hints)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Rgb(129, 161, 193))),
        chunks[4],
    );
}

fn render_field(f: &mut Frame, area: Rect, label: &str, input: &LineInput, focused: bool) {
    let border = if focused {
        Color::Rgb(136, 192, 208)
    } else {
        Color::Rgb(76, 86, 106)
    };
    let block = Block::default()
        .title(format!(" {} ", label))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let inner = block.inner(area);
    f.render_widget(block, area);
    input.render(f, inner);
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    Frame,
};
use tui_textarea::{CursorMove, TextArea};

/// 输入动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// 继续编辑
    Continue,
    /// 提交内容
    Submit,
    /// 取消
    Cancel,
}

/// 单行输入框，可选掩码（用于密码）
pub struct LineInput {
    textarea: TextArea<'static>,
    masked: bool,
}

impl LineInput {
    pub fn new(initial_value: &str) -> Self {
        let first_line = initial_value.lines().next().unwrap_or_default().to_string();
        let mut textarea = TextArea::new(vec![first_line]);
        textarea.move_cursor(CursorMove::End);

        // Nord 配色
        textarea.set_style(Style::default().fg(Color::Rgb(236, 239, 244)));
        textarea.set_cursor_line_style(Style::default());
        Self {
            textarea,
            masked: false,
        }
    }

    pub fn masked(mut self) -> Self {
        self.textarea.set_mask_char('•');
        self.masked = true;
        self
    }

    pub fn is_masked(&self) -> bool {
        self.masked
    }

    /// 获取内容
    pub fn value(&self) -> String {
        self.textarea.lines().join("")
    }

    pub fn set_focused(&mut self, focused: bool) {
        let cursor = if focused {
            Style::default()
                .bg(Color::Rgb(136, 192, 208))
                .fg(Color::Rgb(46, 52, 64))
        } else {
            Style::default()
        };
        self.textarea.set_cursor_style(cursor);
        let text = if focused {
            Style::default().fg(Color::Rgb(236, 239, 244))
        } else {
            Style::default()
                .fg(Color::Rgb(216, 222, 233))
                .add_modifier(Modifier::DIM)
        };
        self.textarea.set_style(text);
    }

    /// 处理按键事件
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        // Ctrl+S 提交
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('s') => InputAction::Submit,
                KeyCode::Char('c') => InputAction::Cancel,
                KeyCode::Char('u') => {
                    self.textarea.move_cursor(CursorMove::Head);
                    self.textarea.delete_line_by_end();
                    InputAction::Continue
                }
                KeyCode::Char('a') => {
                    self.textarea.move_cursor(CursorMove::Head);
                    InputAction::Continue
                }
                KeyCode::Char('e') => {
                    self.textarea.move_cursor(CursorMove::End);
                    InputAction::Continue
                }
                _ => InputAction::Continue,
            };
        }

        match key.code {
            KeyCode::Esc => InputAction::Cancel,
            KeyCode::Enter => InputAction::Submit,
            KeyCode::Char(c) => {
                self.textarea.insert_char(c);
                InputAction::Continue
            }
            KeyCode::Backspace => {
                self.textarea.delete_char();
                InputAction::Continue
            }
            KeyCode::Delete => {
                self.textarea.delete_next_char();
                InputAction::Continue
            }
            KeyCode::Left => {
                self.textarea.move_cursor(CursorMove::Back);
                InputAction::Continue
            }
            KeyCode::Right => {
                self.textarea.move_cursor(CursorMove::Forward);
                InputAction::Continue
            }
            KeyCode::Home => {
                self.textarea.move_cursor(CursorMove::Head);
                InputAction::Continue
            }
            KeyCode::End => {
                self.textarea.move_cursor(CursorMove::End);
                InputAction::Continue
            }
            _ => InputAction::Continue,
        }
    }

    /// 渲染输入框
    pub fn render(&self, f: &mut Frame, area: Rect) {
        f.render_widget(&self.textarea, area);
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::text_input::{InputAction, LineInput};

/// 单行输入对话框的用途
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    SearchTasks,
    SearchUsers,
    SetPassword { user_id: String },
}

/// 表单对话框的用途
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPurpose {
    NewTask,
    EditTask(String),
    NewSubtask(String),
    EditSubtask { task_id: String, index: usize },
    NewUser,
    EditUser(String),
    NewProject,
    EditProject(String),
}

/// 选择对话框的用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectPurpose {
    Department,
    Status,
    Priority,
    Month,
    Year,
    Sort,
}

/// 确认操作类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteTask(String),
    DeleteSubtask { task_id: String, index: usize },
    DeleteUser(String),
    DeleteProject(String),
    Logout,
}

/// 表单中的一个字段
pub struct FormField {
    pub label: &'static str,
    pub input: LineInput,
}

impl FormField {
    pub fn new(label: &'static str, value: &str) -> Self {
        Self {
            label,
            input: LineInput::new(value),
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            label,
            input: LineInput::new("").masked(),
        }
    }
}

/// 多字段表单，Tab 切换焦点
pub struct Form {
    pub fields: Vec<FormField>,
    pub focus: usize,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        let mut form = Self { fields, focus: 0 };
        form.refresh_focus();
        form
    }

    /// 标签为 `label` 的字段值（去空白），没有时为空
    pub fn value(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.input.value().trim().to_string())
            .unwrap_or_default()
    }

    /// 原始值，不去空白，用于密码
    pub fn raw_value(&self, label: &str) -> String {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.input.value())
            .unwrap_or_default()
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
            self.refresh_focus();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
            self.refresh_focus();
        }
    }

    fn refresh_focus(&mut self) {
        let focus = self.focus;
        for (i, field) in self.fields.iter_mut().enumerate() {
            field.input.set_focused(i == focus);
        }
    }

    /// Tab/Shift+Tab/↑/↓ 切换字段，Enter 提交
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                InputAction::Continue
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                InputAction::Continue
            }
            _ => match self.fields.get_mut(self.focus) {
                Some(field) => field.input.handle_key(key),
                None => InputAction::Cancel,
            },
        }
    }
}

/// 对话框类型
pub enum DialogType {
    /// 单行输入对话框
    Input {
        title: String,
        prompt: String,
        input: LineInput,
        purpose: InputPurpose,
    },
    /// 表单对话框（创建/编辑任务、用户、项目）
    Form {
        title: String,
        form: Form,
        purpose: FormPurpose,
    },
    /// 选择对话框（筛选条件等）
    Select {
        title: String,
        items: Vec<String>,
        selected: usize,
        filter: String,
        purpose: SelectPurpose,
    },
    /// 确认对话框
    Confirm {
        title: String,
        message: String,
        yes_selected: bool,
        action: ConfirmAction,
    },
}

impl DialogType {
    pub fn input(title: &str, prompt: &str, value: &str, purpose: InputPurpose) -> Self {
        let mut input = LineInput::new(value);
        if matches!(purpose, InputPurpose::SetPassword { .. }) {
            input = input.masked();
        }
        input.set_focused(true);
        DialogType::Input {
            title: title.to_string(),
            prompt: prompt.to_string(),
            input,
            purpose,
        }
    }

    pub fn select(title: &str, items: Vec<String>, purpose: SelectPurpose) -> Self {
        DialogType::Select {
            title: title.to_string(),
            items,
            selected: 0,
            filter: String::new(),
            purpose,
        }
    }

    pub fn confirm(title: &str, message: String, action: ConfirmAction) -> Self {
        DialogType::Confirm {
            title: title.to_string(),
            message,
            yes_selected: false,
            action,
        }
    }
}

/// 选择对话框中匹配过滤词的项及其原索引
pub fn filtered_items<'a>(items: &'a [String], filter: &str) -> Vec<(usize, &'a String)> {
    let filter = filter.to_lowercase();
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| filter.is_empty() || item.to_lowercase().contains(&filter))
        .collect()
}

/// 渲染居中的对话框
pub fn render_dialog(f: &mut Frame, dialog: &DialogType) {
    let area = match dialog {
        DialogType::Form { form, .. } => {
            let height = (form.fields.len() as u16) * 3 + 4;
            centered_fixed(70, height, f.area())
        }
        DialogType::Input { .. } => centered_fixed(60, 7, f.area()),
        _ => centered_rect(60, 50, f.area()),
    };

    // 清空对话框区域
    f.render_widget(Clear, area);

    match dialog {
        DialogType::Input {
            title,
            prompt,
            input,
            ..
        } => render_input_dialog(f, area, title, prompt, input),
        DialogType::Form { title, form, .. } => render_form_dialog(f, area, title, form),
        DialogType::Select {
            title,
            items,
            selected,
            filter,
            ..
        } => render_select_dialog(f, area, title, items, *selected, filter),
        DialogType::Confirm {
            title,
            message,
            yes_selected,
            ..
        } => render_confirm_dialog(f, area, title, message, *yes_selected),
    }
}

fn dialog_block(title: &str, border: Color) -> Block<'static> {
    Block::default()
        .title(format!("  {}  ", title))
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .style(Style::default().bg(Color::Rgb(46, 52, 64))) // Nord background
}

/// 渲染输入对话框
fn render_input_dialog(f: &mut Frame, area: Rect, title: &str, prompt: &str, input: &LineInput) {
    let block = dialog_block(title, Color::Rgb(76, 86, 106));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // 提示文本
            Constraint::Length(3), // 输入框
            Constraint::Length(1), // 帮助
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(prompt).style(Style::default().fg(Color::Rgb(129, 161, 193))),
        chunks[0],
    );

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(136, 192, 208)))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let input_inner = input_block.inner(chunks[1]);
    f.render_widget(input_block, chunks[1]);
    input.render(f, input_inner);

    f.render_widget(
        Paragraph::new("Enter confirm  Esc cancel")
            .style(Style::default().fg(Color::Rgb(129, 161, 193)))
            .alignment(Alignment::Center),
        chunks[2],
    );
}

/// 渲染表单对话框
fn render_form_dialog(f: &mut Frame, area: Rect, title: &str, form: &Form) {
    let block = dialog_block(title, Color::Rgb(136, 192, 208));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints: Vec<Constraint> = form.fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let border = if focused {
            Color::Rgb(136, 192, 208)
        } else {
            Color::Rgb(76, 86, 106)
        };
        let label_style = if focused {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Rgb(129, 161, 193))
        };
        let field_block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), label_style))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .border_type(ratatui::widgets::BorderType::Rounded);
        let field_inner = field_block.inner(chunks[i]);
        f.render_widget(field_block, chunks[i]);
        field.input.render(f, field_inner);
    }

    if let Some(help_area) = chunks.last() {
        f.render_widget(
            Paragraph::new("Tab/↑↓ next field  Enter save  Esc cancel")
                .style(Style::default().fg(Color::Rgb(129, 161, 193)))
                .alignment(Alignment::Center),
            *help_area,
        );
    }
}

/// 渲染选择对话框
fn render_select_dialog(
    f: &mut Frame,
    area: Rect,
    title: &str,
    items: &[String],
    selected: usize,
    filter: &str,
) {
    let block = dialog_block(title, Color::Rgb(76, 86, 106));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 搜索框
            Constraint::Min(0),    // 列表
            Constraint::Length(1), // 帮助
        ])
        .split(inner);

    let (search_text, search_style) = if filter.is_empty() {
        (
            "🔍 type to filter...".to_string(),
            Style::default().fg(Color::Rgb(129, 161, 193)),
        )
    } else {
        (
            format!("🔍 {}", filter),
            Style::default().fg(Color::Rgb(136, 192, 208)),
        )
    };
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(136, 192, 208)))
        .border_type(ratatui::widgets::BorderType::Rounded);
    let search_inner = search_block.inner(chunks[0]);
    f.render_widget(search_block, chunks[0]);
    f.render_widget(Paragraph::new(search_text).style(search_style), search_inner);

    let visible = filtered_items(items, filter);
    let list_items: Vec<ListItem> = visible
        .iter()
        .enumerate()
        .map(|(pos, (_, item))| {
            if pos == selected {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!(" {} ", pos + 1),
                        Style::default()
                            .fg(Color::White)
                            .bg(Color::Rgb(94, 129, 172))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(
                        item.as_str(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    ),
                ]))
                .style(Style::default().bg(Color::Rgb(59, 66, 82)))
            } else {
                ListItem::new(Line::from(format!("     {}", item)))
            }
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(selected.min(visible.len().saturating_sub(1))));
    f.render_stateful_widget(List::new(list_items), chunks[1], &mut list_state);

    let help_text = format!("↑↓ move  Enter choose  Esc cancel  [{}/{}]", visible.len(), items.len());
    f.render_widget(
        Paragraph::new(help_text)
            .style(Style::default().fg(Color::Rgb(129, 161, 193)))
            .alignment(Alignment::Center),
        chunks[2],
    );
}

/// 渲染确认对话框
fn render_confirm_dialog(f: &mut Frame, area: Rect, title: &str, message: &str, yes_selected: bool) {
    let block = dialog_block(title, Color::Rgb(235, 203, 139)); // Nord yellow for warnings
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // 消息
            Constraint::Length(3), // 按钮
        ])
        .split(inner);

    f.render_widget(
        Paragraph::new(message)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Rgb(216, 222, 233))),
        chunks[0],
    );

    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[1]);

    let no_style = if !yes_selected {
        Style::default()
            .bg(Color::Rgb(191, 97, 106))
            .fg(Color::Rgb(46, 52, 64))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(191, 97, 106))
            .add_modifier(Modifier::DIM)
    };
    f.render_widget(
        Paragraph::new("[ n ] Não").style(no_style).alignment(Alignment::Center),
        button_chunks[1],
    );

    let yes_style = if yes_selected {
        Style::default()
            .bg(Color::Rgb(163, 190, 140))
            .fg(Color::Rgb(46, 52, 64))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Rgb(163, 190, 140))
            .add_modifier(Modifier::DIM)
    };
    f.render_widget(
        Paragraph::new("[ y ] Sim").style(yes_style).alignment(Alignment::Center),
        button_chunks[2],
    );
}

/// 创建一个居中的矩形区域
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// 宽度按百分比、高度按行数居中
pub fn centered_fixed(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let y = r.y + (r.height - height) / 2;
    let row = Rect {
        x: r.x,
        y,
        width: r.width,
        height,
    };
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(row)[1]
}

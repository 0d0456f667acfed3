use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, warn};

use taskpro::board::BoardStore;
use taskpro::config::Config;
use taskpro::dashboard::Summary;
use taskpro::models::{Project, Task, User};
use taskpro::projects::ProjectCatalog;
use taskpro::query::{TaskQuery, TaskRow};
use taskpro::session::{Identity, Session};
use taskpro::users::UserDirectory;

use crate::ui::dialogs::DialogType;
use crate::ui::login::LoginForm;

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 通知消息
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl Notification {
    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// 应用视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Kanban,
    Tasks,
    Users,
    Projects,
}

impl View {
    /// 标签栏中的视图，按标签顺序
    pub const TABS: [View; 5] = [
        View::Dashboard,
        View::Kanban,
        View::Tasks,
        View::Users,
        View::Projects,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Dashboard => "Dashboard",
            View::Kanban => "Kanban",
            View::Tasks => "Tarefas",
            View::Users => "Usuários",
            View::Projects => "Projetos",
        }
    }
}

/// 应用模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 正常模式 - 导航和查看
    Normal,
    /// 对话框模式
    Dialog,
    /// 帮助模式 - 显示快捷键
    Help,
    /// 任务详情（含子任务）
    Detail,
}

/// 应用状态
pub struct App {
    pub config: Config,
    pub session: Session,
    pub store: BoardStore,
    pub users: UserDirectory,
    pub projects: ProjectCatalog,
    pub view: View,
    pub mode: Mode,
    pub login: LoginForm,
    /// 看板中选中的列
    pub selected_column: usize,
    /// 看板列内选中的任务
    pub selected_task_index: usize,
    pub task_query: TaskQuery,
    pub task_row: usize,
    pub user_search: String,
    pub user_row: usize,
    pub project_row: usize,
    pub status_row: usize,
    /// 详情视图中的任务和子任务选中项
    pub detail_task: Option<String>,
    pub subtask_row: usize,
    pub dialog: Option<DialogType>,
    pub notification: Option<Notification>,
}

impl App {
    /// 加载配置和会话，创建应用
    pub fn new(config: Config, session_path: &Path) -> Result<Self> {
        let session = Session::init(session_path)?;
        Self::with_session(config, session)
    }

    pub fn with_session(config: Config, mut session: Session) -> Result<Self> {
        let store = BoardStore::seeded().with_completed_column(&config.completed_column)?;
        let users = UserDirectory::seeded();
        // 会话文件里的身份可能已过期
        session.refresh(&users)?;
        let view = if session.is_logged_in() {
            View::Dashboard
        } else {
            View::Login
        };
        Ok(Self {
            config,
            session,
            store,
            users,
            projects: ProjectCatalog::seeded(),
            view,
            mode: Mode::Normal,
            login: LoginForm::new(),
            selected_column: 0,
            selected_task_index: 0,
            task_query: TaskQuery::default(),
            task_row: 0,
            user_search: String::new(),
            user_row: 0,
            project_row: 0,
            status_row: 0,
            detail_task: None,
            subtask_row: 0,
            dialog: None,
            notification: None,
        })
    }

    /// 处理键盘输入
    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        crate::input::handle_key_input(self, key)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    /// 切换视图，除登录页外都需要已登录
    pub fn navigate(&mut self, view: View) {
        if view != View::Login && self.session.require().is_err() {
            self.view = View::Login;
            self.mode = Mode::Normal;
            self.show_notification(
                "Acesso negado: faça login para continuar".to_string(),
                NotificationLevel::Error,
            );
            return;
        }
        debug!(from = ?self.view, to = ?view, "navigate");
        self.view = view;
        self.mode = Mode::Normal;
    }

    /// 用户被修改或删除后，让会话里的身份跟上用户目录
    pub fn sync_session(&mut self) {
        let was_logged_in = self.session.is_logged_in();
        match self.session.refresh(&self.users) {
            Ok(true) => {}
            Ok(false) if was_logged_in => {
                self.detail_task = None;
                self.dialog = None;
                self.mode = Mode::Normal;
                self.login = LoginForm::new();
                self.view = View::Login;
                self.show_notification(
                    "Sessão encerrada: conta removida ou inativa".to_string(),
                    NotificationLevel::Warning,
                );
            }
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "failed to update session file");
                self.notify_error(e);
            }
        }
    }

    /// 显示通知消息
    pub fn show_notification(&mut self, message: String, level: NotificationLevel) {
        self.notification = Some(Notification {
            message,
            level,
            created_at: Instant::now(),
            ttl: Duration::from_secs(self.config.notification_secs),
        });
    }

    pub fn notify_error(&mut self, err: impl std::fmt::Display) {
        self.show_notification(err.to_string(), NotificationLevel::Error);
    }

    /// 清除已过期的通知
    pub fn clear_expired_notification(&mut self) {
        if self.notification.as_ref().is_some_and(Notification::is_expired) {
            self.notification = None;
        }
    }

    /// 看板列 ID，按显示顺序
    pub fn column_ids(&self) -> Vec<String> {
        self.store.board().column_order.clone()
    }

    pub fn column_count(&self) -> usize {
        self.store.board().column_order.len()
    }

    /// 看板中当前选中的任务
    pub fn selected_kanban_task(&self) -> Option<&Task> {
        let column = self.store.board().column_order.get(self.selected_column)?;
        self.store
            .tasks_in(column)
            .get(self.selected_task_index)
            .copied()
    }

    pub fn task_rows(&self) -> Vec<TaskRow<'_>> {
        self.task_query.apply(self.store.board())
    }

    /// 任务表中当前选中的任务
    pub fn selected_table_task(&self) -> Option<&Task> {
        self.task_rows().get(self.task_row).map(|row| row.task)
    }

    /// 当前视图指向的任务
    pub fn focused_task(&self) -> Option<&Task> {
        match self.view {
            View::Kanban => self.selected_kanban_task(),
            View::Tasks => self.selected_table_task(),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&Task> {
        self.detail_task.as_deref().and_then(|id| self.store.task(id))
    }

    /// 打开任务详情
    pub fn open_detail(&mut self, task_id: &str) {
        self.detail_task = Some(task_id.to_string());
        self.subtask_row = 0;
        self.mode = Mode::Detail;
    }

    pub fn summary(&self) -> Summary {
        Summary::from_board(
            self.store.board(),
            self.store.completed_column(),
            self.store.today(),
        )
    }

    /// 用户表中当前选中的用户（按搜索过滤后）
    pub fn selected_user(&self) -> Option<&User> {
        self.users.search(&self.user_search).get(self.user_row).copied()
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.projects.all().get(self.project_row)
    }

    /// 把看板光标放到 `task_id` 上
    pub fn select_kanban_task(&mut self, task_id: &str) {
        let board = self.store.board();
        let Some(column) = board.column_of(task_id) else {
            return;
        };
        let index = column.position(task_id).unwrap_or(0);
        let col = board
            .column_order
            .iter()
            .position(|c| *c == column.id)
            .unwrap_or(0);
        self.selected_column = col;
        self.selected_task_index = index;
    }

    /// 修改后把列表光标限制在范围内
    pub fn clamp_selection(&mut self) {
        let column_len = self
            .store
            .board()
            .column_order
            .get(self.selected_column)
            .map_or(0, |c| self.store.tasks_in(c).len());
        self.selected_task_index = self.selected_task_index.min(column_len.saturating_sub(1));
        let rows = self.task_rows().len();
        self.task_row = self.task_row.min(rows.saturating_sub(1));
        let users = self.users.search(&self.user_search).len();
        self.user_row = self.user_row.min(users.saturating_sub(1));
        self.project_row = self.project_row.min(self.projects.len().saturating_sub(1));
    }

    pub fn copy_task(&mut self) {
        let Some(task) = self.focused_task().or_else(|| self.detail()) else {
            return;
        };
        let status = self
            .store
            .column_of(&task.id)
            .map(|c| c.title.clone())
            .unwrap_or_default();
        let text = format!(
            "{}\n{}\nPrioridade: {}\nStatus: {}\nDepartamentos: {}\nResponsáveis: {}\nVencimento: {}",
            task.title,
            task.description,
            task.priority.label(),
            status,
            task.departments_label(),
            task.assignees_label(),
            task.due_date.format("%d/%m/%Y"),
        );
        match copy_to_clipboard(&text) {
            Ok(()) => self.show_notification(
                "Tarefa copiada para a área de transferência".to_string(),
                NotificationLevel::Success,
            ),
            Err(e) => self.notify_error(e),
        }
    }
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(text: &str) -> Result<(), String> {
    arboard::Clipboard::new()
        .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
        .map_err(|e| format!("clipboard error: {}", e))
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_text: &str) -> Result<(), String> {
    Err("built without clipboard support".to_string())
}

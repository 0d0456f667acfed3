use std::collections::BTreeSet;

use chrono::Datelike;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info, warn};

use taskpro::board::Moved;
use taskpro::dashboard::{MONTH_LABELS, OVERDUE_LABEL};
use taskpro::models::Priority;
use taskpro::query::SortField;
use taskpro::session::SessionError;
use taskpro::users::UserError;

use crate::app::{App, Mode, NotificationLevel, View};
use crate::input::forms;
use crate::input::Command;
use crate::ui::dialogs::{
    filtered_items, ConfirmAction, DialogType, Form, FormPurpose, InputPurpose, SelectPurpose,
};
use crate::ui::login::LoginForm;
use crate::ui::status_entries;
use crate::ui::text_input::InputAction;

/// 选择对话框中的“全部”项
const ALL: &str = "Todos";

/// 处理键盘输入
/// 返回 false 表示应该退出应用
pub fn handle_key_input(app: &mut App, key: KeyEvent) -> bool {
    match app.mode {
        Mode::Dialog => handle_dialog_mode(app, key),
        Mode::Help => handle_help_mode(app, key),
        Mode::Detail => handle_detail_mode(app, key),
        Mode::Normal if app.view == View::Login => handle_login_mode(app, key),
        Mode::Normal => handle_normal_mode(app, key),
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

/// 登录界面：Esc 或 Ctrl+C 退出
fn handle_login_mode(app: &mut App, key: KeyEvent) -> bool {
    match app.login.handle_key(key) {
        InputAction::Continue => true,
        InputAction::Cancel => false,
        InputAction::Submit => {
            submit_login(app);
            true
        }
    }
}

fn submit_login(app: &mut App) {
    let (email, password) = app.login.credentials();
    match app.session.login(&app.users, &email, &password) {
        Ok(identity) => {
            let name = identity.name.clone();
            app.login = LoginForm::new();
            app.navigate(View::Dashboard);
            app.show_notification(format!("Bem-vindo, {}!", name), NotificationLevel::Success);
        }
        Err(err) => {
            let message = match err {
                SessionError::InvalidCredentials => "Email ou senha inválidos".to_string(),
                SessionError::InactiveUser(_) => {
                    "Usuário inativo. Contate o administrador.".to_string()
                }
                other => other.to_string(),
            };
            app.login.error = Some(message.clone());
            app.show_notification(message, NotificationLevel::Error);
        }
    }
}

/// 处理正常模式的按键
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> bool {
    if is_ctrl_c(&key) {
        return false;
    }
    let Some(cmd) = match_key(app.view, key) else {
        return true;
    };
    if cmd == Command::Quit {
        return false;
    }
    execute_command(app, cmd);
    true
}

/// 匹配按键到命令，先匹配全局键，再匹配当前视图的键
pub fn match_key(view: View, key: KeyEvent) -> Option<Command> {
    let cmd = match key.code {
        KeyCode::Char('q') => Command::Quit,
        KeyCode::Char('?') => Command::ShowHelp,
        KeyCode::Char('o') => Command::Logout,
        KeyCode::Tab => Command::NextView,
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            Command::SwitchView(View::TABS[index])
        }
        KeyCode::Char('j') | KeyCode::Down => Command::SelectDown,
        KeyCode::Char('k') | KeyCode::Up => Command::SelectUp,
        KeyCode::Enter => Command::Open,
        _ => return match_view_key(view, key),
    };
    Some(cmd)
}

fn match_view_key(view: View, key: KeyEvent) -> Option<Command> {
    let cmd = match (view, key.code) {
        (View::Kanban, KeyCode::Char('h') | KeyCode::Left) => Command::ColumnLeft,
        (View::Kanban, KeyCode::Char('l') | KeyCode::Right) => Command::ColumnRight,
        (View::Kanban, KeyCode::Char('H')) => Command::MoveTaskLeft,
        (View::Kanban, KeyCode::Char('L')) => Command::MoveTaskRight,
        (View::Kanban, KeyCode::Char('J')) => Command::MoveTaskDown,
        (View::Kanban, KeyCode::Char('K')) => Command::MoveTaskUp,

        (View::Kanban | View::Tasks, KeyCode::Char('v')) => Command::Open,
        (View::Kanban | View::Tasks, KeyCode::Char('y')) => Command::CopyTask,

        (View::Tasks, KeyCode::Char('f')) => Command::FilterDepartment,
        (View::Tasks, KeyCode::Char('s')) => Command::FilterStatus,
        (View::Tasks, KeyCode::Char('p')) => Command::FilterPriority,
        (View::Tasks, KeyCode::Char('m')) => Command::FilterMonth,
        (View::Tasks, KeyCode::Char('Y')) => Command::FilterYear,
        (View::Tasks, KeyCode::Char('S')) => Command::ChooseSort,
        (View::Tasks, KeyCode::Char('r')) => Command::ReverseSort,
        (View::Tasks, KeyCode::Char('c')) => Command::ClearFilters,
        (View::Tasks | View::Users, KeyCode::Char('/')) => Command::Search,

        (View::Users, KeyCode::Char('P')) => Command::SetPassword,

        (View::Kanban | View::Tasks | View::Users | View::Projects, KeyCode::Char('a')) => {
            Command::NewItem
        }
        (View::Kanban | View::Tasks | View::Users | View::Projects, KeyCode::Char('e')) => {
            Command::EditItem
        }
        (View::Kanban | View::Tasks | View::Users | View::Projects, KeyCode::Char('d')) => {
            Command::DeleteItem
        }
        _ => return None,
    };
    Some(cmd)
}

/// 详情模式的按键
fn match_detail_key(key: KeyEvent) -> Option<Command> {
    let cmd = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('v') => Command::Close,
        KeyCode::Char('j') | KeyCode::Down => Command::SelectDown,
        KeyCode::Char('k') | KeyCode::Up => Command::SelectUp,
        KeyCode::Char('a') => Command::NewItem,
        KeyCode::Char('e') => Command::EditItem,
        KeyCode::Char('d') => Command::DeleteItem,
        KeyCode::Char(' ') => Command::CycleSubtaskStatus,
        KeyCode::Char('y') => Command::CopyTask,
        KeyCode::Char('?') => Command::ShowHelp,
        _ => return None,
    };
    Some(cmd)
}

fn handle_detail_mode(app: &mut App, key: KeyEvent) -> bool {
    if is_ctrl_c(&key) {
        return false;
    }
    if let Some(cmd) = match_detail_key(key) {
        execute_command(app, cmd);
    }
    true
}

fn handle_help_mode(app: &mut App, key: KeyEvent) -> bool {
    if is_ctrl_c(&key) {
        return false;
    }
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
        app.mode = if app.detail().is_some() {
            Mode::Detail
        } else {
            Mode::Normal
        };
    }
    true
}

/// 执行命令
fn execute_command(app: &mut App, cmd: Command) {
    match cmd {
        Command::Quit => {}
        Command::Logout => open_dialog(
            app,
            DialogType::confirm(
                "Sair",
                "Deseja encerrar a sessão?".to_string(),
                ConfirmAction::Logout,
            ),
        ),
        Command::SwitchView(view) => app.navigate(view),
        Command::NextView => {
            let next = View::TABS
                .iter()
                .position(|v| *v == app.view)
                .map_or(0, |pos| (pos + 1) % View::TABS.len());
            app.navigate(View::TABS[next]);
        }
        Command::ShowHelp => app.mode = Mode::Help,
        Command::SelectUp => move_selection(app, -1),
        Command::SelectDown => move_selection(app, 1),
        Command::ColumnLeft => {
            app.selected_column = app.selected_column.saturating_sub(1);
            app.clamp_selection();
        }
        Command::ColumnRight => {
            let last = app.column_count().saturating_sub(1);
            app.selected_column = (app.selected_column + 1).min(last);
            app.clamp_selection();
        }
        Command::MoveTaskLeft => move_task_to_column(app, -1),
        Command::MoveTaskRight => move_task_to_column(app, 1),
        Command::MoveTaskUp => move_task_in_column(app, -1),
        Command::MoveTaskDown => move_task_in_column(app, 1),
        Command::NewItem => new_item(app),
        Command::EditItem => edit_item(app),
        Command::DeleteItem => delete_item(app),
        Command::Open => open_item(app),
        Command::CopyTask => app.copy_task(),
        Command::Search => {
            let dialog = match app.view {
                View::Tasks => DialogType::input(
                    "Buscar tarefas",
                    "Título, descrição ou responsável:",
                    &app.task_query.search,
                    InputPurpose::SearchTasks,
                ),
                View::Users => DialogType::input(
                    "Buscar usuários",
                    "Nome, email ou departamento:",
                    &app.user_search,
                    InputPurpose::SearchUsers,
                ),
                _ => return,
            };
            open_dialog(app, dialog);
        }
        Command::FilterDepartment => open_select(app, SelectPurpose::Department),
        Command::FilterStatus => open_select(app, SelectPurpose::Status),
        Command::FilterPriority => open_select(app, SelectPurpose::Priority),
        Command::FilterMonth => open_select(app, SelectPurpose::Month),
        Command::FilterYear => open_select(app, SelectPurpose::Year),
        Command::ChooseSort => open_select(app, SelectPurpose::Sort),
        Command::ReverseSort => {
            app.task_query.direction = app.task_query.direction.flip();
        }
        Command::ClearFilters => {
            app.task_query.clear_filters();
            app.task_row = 0;
            app.show_notification("Filtros limpos".to_string(), NotificationLevel::Info);
        }
        Command::SetPassword => set_password(app),
        Command::CycleSubtaskStatus => cycle_subtask_status(app),
        Command::Close => {
            app.detail_task = None;
            app.mode = Mode::Normal;
        }
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

fn move_selection(app: &mut App, delta: isize) {
    if app.mode == Mode::Detail {
        let len = app.detail().map_or(0, |t| t.subtasks.len());
        app.subtask_row = step(app.subtask_row, delta, len);
        return;
    }
    match app.view {
        View::Dashboard => {
            let len = status_entries(&app.summary()).len();
            app.status_row = step(app.status_row, delta, len);
        }
        View::Kanban => {
            let len = app
                .column_ids()
                .get(app.selected_column)
                .map_or(0, |c| app.store.tasks_in(c).len());
            app.selected_task_index = step(app.selected_task_index, delta, len);
        }
        View::Tasks => {
            let len = app.task_rows().len();
            app.task_row = step(app.task_row, delta, len);
        }
        View::Users => {
            let len = app.users.search(&app.user_search).len();
            app.user_row = step(app.user_row, delta, len);
        }
        View::Projects => {
            app.project_row = step(app.project_row, delta, app.projects.len());
        }
        View::Login => {}
    }
}

/// 移动任务到相邻的列
fn move_task_to_column(app: &mut App, offset: isize) {
    let Some(task_id) = app.selected_kanban_task().map(|t| t.id.clone()) else {
        return;
    };
    match app.store.move_adjacent(&task_id, offset) {
        Ok(Moved::Relocated { to_title }) => {
            app.select_kanban_task(&task_id);
            app.show_notification(
                format!("Tarefa movida para {}", to_title),
                NotificationLevel::Success,
            );
        }
        Ok(_) => {}
        Err(e) => app.notify_error(e),
    }
}

/// 在列内上下移动任务
fn move_task_in_column(app: &mut App, offset: isize) {
    let Some(task_id) = app.selected_kanban_task().map(|t| t.id.clone()) else {
        return;
    };
    match app.store.reorder(&task_id, offset) {
        Ok(Moved::Unchanged) => {}
        Ok(_) => app.select_kanban_task(&task_id),
        Err(e) => app.notify_error(e),
    }
}

fn open_dialog(app: &mut App, dialog: DialogType) {
    app.dialog = Some(dialog);
    app.mode = Mode::Dialog;
}

fn open_form(app: &mut App, title: &str, form: Form, purpose: FormPurpose) {
    open_dialog(
        app,
        DialogType::Form {
            title: title.to_string(),
            form,
            purpose,
        },
    );
}

/// 关闭对话框后回到详情或正常模式
fn close_dialog(app: &mut App) {
    app.dialog = None;
    if app.detail().is_some() {
        app.mode = Mode::Detail;
    } else {
        app.detail_task = None;
        app.mode = Mode::Normal;
    }
}

fn new_item(app: &mut App) {
    if app.mode == Mode::Detail {
        if let Some(task) = app.detail() {
            let form = forms::subtask_form(None, task.due_date);
            let purpose = FormPurpose::NewSubtask(task.id.clone());
            open_form(app, "Nova subtarefa", form, purpose);
        }
        return;
    }
    match app.view {
        View::Kanban | View::Tasks => {
            let form = forms::task_form(None, &app.config.default_department, app.store.today());
            open_form(app, "Nova tarefa", form, FormPurpose::NewTask);
        }
        View::Users => {
            let form = forms::user_form(None, &app.config.default_department);
            open_form(app, "Novo usuário", form, FormPurpose::NewUser);
        }
        View::Projects => {
            open_form(app, "Novo projeto", forms::project_form(None), FormPurpose::NewProject);
        }
        View::Dashboard | View::Login => {}
    }
}

fn edit_item(app: &mut App) {
    if app.mode == Mode::Detail {
        let index = app.subtask_row;
        let Some(task) = app.detail() else {
            return;
        };
        if let Some(sub) = task.subtasks.get(index) {
            let form = forms::subtask_form(Some(sub), sub.due_date);
            let purpose = FormPurpose::EditSubtask {
                task_id: task.id.clone(),
                index,
            };
            open_form(app, "Editar subtarefa", form, purpose);
        }
        return;
    }
    match app.view {
        View::Kanban | View::Tasks => {
            if let Some(task) = app.focused_task() {
                let form = forms::task_form(Some(task), &app.config.default_department, app.store.today());
                let purpose = FormPurpose::EditTask(task.id.clone());
                open_form(app, "Editar tarefa", form, purpose);
            }
        }
        View::Users => {
            if let Some(user) = app.selected_user() {
                let form = forms::user_form(Some(user), &app.config.default_department);
                let purpose = FormPurpose::EditUser(user.id.clone());
                open_form(app, "Editar usuário", form, purpose);
            }
        }
        View::Projects => {
            if let Some(project) = app.selected_project() {
                let form = forms::project_form(Some(project));
                let purpose = FormPurpose::EditProject(project.id.clone());
                open_form(app, "Editar projeto", form, purpose);
            }
        }
        View::Dashboard | View::Login => {}
    }
}

fn delete_item(app: &mut App) {
    if app.mode == Mode::Detail {
        let index = app.subtask_row;
        let Some(task) = app.detail() else {
            return;
        };
        if let Some(sub) = task.subtasks.get(index) {
            let dialog = DialogType::confirm(
                "Excluir subtarefa",
                format!("Excluir a subtarefa \"{}\"?", sub.title),
                ConfirmAction::DeleteSubtask {
                    task_id: task.id.clone(),
                    index,
                },
            );
            open_dialog(app, dialog);
        }
        return;
    }
    let dialog = match app.view {
        View::Kanban | View::Tasks => {
            let Some(task) = app.focused_task() else {
                return;
            };
            // 任务表中只有管理员或创建者可以删除
            if app.view == View::Tasks {
                let allowed = app
                    .identity()
                    .is_some_and(|me| me.can_delete_task(task.created_by.as_deref()));
                if !allowed {
                    warn!(task_id = %task.id, "task deletion denied");
                    app.show_notification(
                        "Apenas administradores ou o criador podem excluir esta tarefa".to_string(),
                        NotificationLevel::Error,
                    );
                    return;
                }
            }
            DialogType::confirm(
                "Excluir tarefa",
                format!("Excluir a tarefa \"{}\"? Esta ação não pode ser desfeita.", task.title),
                ConfirmAction::DeleteTask(task.id.clone()),
            )
        }
        View::Users => {
            let Some(user) = app.selected_user() else {
                return;
            };
            DialogType::confirm(
                "Excluir usuário",
                format!("Excluir o usuário {} ({})?", user.name, user.email),
                ConfirmAction::DeleteUser(user.id.clone()),
            )
        }
        View::Projects => {
            let Some(project) = app.selected_project() else {
                return;
            };
            DialogType::confirm(
                "Excluir projeto",
                format!("Excluir o projeto \"{}\"?", project.name),
                ConfirmAction::DeleteProject(project.id.clone()),
            )
        }
        View::Dashboard | View::Login => return,
    };
    open_dialog(app, dialog);
}

fn open_item(app: &mut App) {
    match app.view {
        View::Dashboard => {
            let entries = status_entries(&app.summary());
            let Some((status, _)) = entries.get(app.status_row) else {
                return;
            };
            // 逾期只是展示，不对应筛选条件
            if status == OVERDUE_LABEL {
                return;
            }
            app.task_query.clear_filters();
            app.task_query.status = Some(status.clone());
            app.task_row = 0;
            app.navigate(View::Tasks);
        }
        View::Kanban | View::Tasks => {
            if let Some(id) = app.focused_task().map(|t| t.id.clone()) {
                app.open_detail(&id);
            }
        }
        View::Projects => {
            if let Some(name) = app.selected_project().map(|p| p.name.clone()) {
                app.navigate(View::Kanban);
                app.show_notification(format!("Abrindo projeto: {}", name), NotificationLevel::Info);
            }
        }
        View::Users | View::Login => {}
    }
}

fn set_password(app: &mut App) {
    if !app.identity().is_some_and(|me| app.users.is_active_admin(me)) {
        app.show_notification(
            "Apenas administradores podem alterar senhas".to_string(),
            NotificationLevel::Error,
        );
        return;
    }
    let Some(user) = app.selected_user() else {
        return;
    };
    let dialog = DialogType::input(
        "Alterar senha",
        &format!("Nova senha para {}:", user.name),
        "",
        InputPurpose::SetPassword {
            user_id: user.id.clone(),
        },
    );
    open_dialog(app, dialog);
}

fn cycle_subtask_status(app: &mut App) {
    let index = app.subtask_row;
    let Some((task_id, status)) = app
        .detail()
        .and_then(|t| t.subtasks.get(index).map(|s| (t.id.clone(), s.status.next())))
    else {
        return;
    };
    match app.store.set_subtask_status(&task_id, index, status) {
        Ok(()) => debug!(task_id = %task_id, index, status = status.label(), "subtask status changed"),
        Err(e) => app.notify_error(e),
    }
}

/// 任务中出现过的部门，加上默认部门
fn known_departments(app: &App) -> BTreeSet<String> {
    let mut departments: BTreeSet<String> = app
        .store
        .board()
        .tasks
        .values()
        .flat_map(|t| t.departments.iter().cloned())
        .collect();
    if !app.config.default_department.is_empty() {
        departments.insert(app.config.default_department.clone());
    }
    departments
}

fn open_select(app: &mut App, purpose: SelectPurpose) {
    let all = std::iter::once(ALL.to_string());
    let (title, items): (&str, Vec<String>) = match purpose {
        SelectPurpose::Department => ("Departamento", all.chain(known_departments(app)).collect()),
        SelectPurpose::Status => (
            "Status",
            all.chain(app.store.board().ordered_columns().map(|c| c.title.clone()))
                .collect(),
        ),
        SelectPurpose::Priority => (
            "Prioridade",
            all.chain(Priority::ALL.iter().map(|p| p.label().to_string()))
                .collect(),
        ),
        SelectPurpose::Month => (
            "Mês de vencimento",
            all.chain(MONTH_LABELS.iter().map(|m| m.to_string())).collect(),
        ),
        SelectPurpose::Year => {
            let mut years: BTreeSet<i32> = app
                .store
                .board()
                .tasks
                .values()
                .map(|t| t.due_date.year())
                .collect();
            years.insert(app.store.today().year());
            (
                "Ano de vencimento",
                all.chain(years.into_iter().rev().map(|y| y.to_string()))
                    .collect(),
            )
        }
        SelectPurpose::Sort => (
            "Ordenar por",
            SortField::ALL.iter().map(|f| f.as_str().to_string()).collect(),
        ),
    };
    open_dialog(app, DialogType::select(title, items, purpose));
}

fn apply_select(app: &mut App, purpose: SelectPurpose, choice: &str) {
    let value = (choice != ALL).then(|| choice.to_string());
    let query = &mut app.task_query;
    match purpose {
        SelectPurpose::Department => query.department = value,
        SelectPurpose::Status => query.status = value,
        SelectPurpose::Priority => query.priority = value.and_then(|v| v.parse().ok()),
        SelectPurpose::Month => {
            query.month = value
                .and_then(|v| MONTH_LABELS.iter().position(|m| *m == v))
                .map(|i| i as u32 + 1);
        }
        SelectPurpose::Year => query.year = value.and_then(|v| v.parse().ok()),
        SelectPurpose::Sort => {
            if let Ok(field) = choice.parse::<SortField>() {
                query.toggle_sort(field);
            }
        }
    }
    debug!(?purpose, choice, "task filter changed");
    app.task_row = 0;
}

/// 处理对话框模式的按键
fn handle_dialog_mode(app: &mut App, key: KeyEvent) -> bool {
    let Some(mut dialog) = app.dialog.take() else {
        close_dialog(app);
        return true;
    };

    let keep_open = match &mut dialog {
        DialogType::Input { input, purpose, .. } => match input.handle_key(key) {
            InputAction::Continue => true,
            InputAction::Cancel => false,
            InputAction::Submit => !submit_input(app, purpose, &input.value()),
        },
        DialogType::Form { form, purpose, .. } => match form.handle_key(key) {
            InputAction::Continue => true,
            InputAction::Cancel => false,
            InputAction::Submit => !submit_form(app, purpose, form),
        },
        DialogType::Select {
            items,
            selected,
            filter,
            purpose,
            ..
        } => {
            let visible = filtered_items(items, filter).len();
            match key.code {
                KeyCode::Esc => false,
                KeyCode::Up => {
                    *selected = selected.saturating_sub(1);
                    true
                }
                KeyCode::Down => {
                    *selected = step(*selected, 1, visible);
                    true
                }
                KeyCode::Backspace => {
                    filter.pop();
                    *selected = 0;
                    true
                }
                KeyCode::Char(c) => {
                    filter.push(c);
                    *selected = 0;
                    true
                }
                KeyCode::Enter => {
                    let choice = filtered_items(items, filter)
                        .get(*selected)
                        .map(|(_, item)| (*item).clone());
                    if let Some(choice) = choice {
                        apply_select(app, *purpose, &choice);
                    }
                    false
                }
                _ => true,
            }
        }
        DialogType::Confirm {
            yes_selected,
            action,
            ..
        } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                confirm(app, action.clone());
                false
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *yes_selected = !*yes_selected;
                true
            }
            KeyCode::Enter => {
                if *yes_selected {
                    confirm(app, action.clone());
                }
                false
            }
            _ => true,
        },
    };

    if keep_open {
        app.dialog = Some(dialog);
    } else {
        close_dialog(app);
    }
    true
}

/// 返回 true 表示对话框可以关闭
fn submit_input(app: &mut App, purpose: &InputPurpose, value: &str) -> bool {
    match purpose {
        InputPurpose::SearchTasks => {
            app.task_query.search = value.trim().to_string();
            app.task_row = 0;
            true
        }
        InputPurpose::SearchUsers => {
            app.user_search = value.trim().to_string();
            app.user_row = 0;
            true
        }
        InputPurpose::SetPassword { user_id } => {
            let Some(actor) = app.identity().cloned() else {
                return true;
            };
            match app.users.set_password(&actor, user_id, value) {
                Ok(()) => {
                    app.show_notification(
                        "Senha alterada com sucesso".to_string(),
                        NotificationLevel::Success,
                    );
                    true
                }
                Err(UserError::EmptyPassword) => {
                    app.show_notification(
                        "A nova senha não pode ser vazia".to_string(),
                        NotificationLevel::Error,
                    );
                    false
                }
                Err(e) => {
                    app.notify_error(e);
                    true
                }
            }
        }
    }
}

fn text<E: std::fmt::Display>(err: E) -> String {
    err.to_string()
}

/// 应用提交的表单，返回的消息用于成功提示
fn apply_form(app: &mut App, purpose: &FormPurpose, form: &Form) -> Result<String, String> {
    match purpose {
        FormPurpose::NewTask => {
            let fields = forms::parse_task_form(form)?;
            let creator = app.identity().map(|me| me.email.clone());
            let id = app.store.create_task(fields.into_draft(creator)).map_err(text)?;
            app.select_kanban_task(&id);
            Ok("Tarefa criada com sucesso".to_string())
        }
        FormPurpose::EditTask(id) => {
            let patch = forms::parse_task_form(form)?.into_patch();
            app.store.update_task(id, patch).map_err(text)?;
            Ok("Tarefa atualizada".to_string())
        }
        FormPurpose::NewSubtask(task_id) => {
            let draft = forms::parse_subtask_draft(form)?;
            let index = app.store.add_subtask(task_id, draft).map_err(text)?;
            app.subtask_row = index;
            Ok("Subtarefa adicionada".to_string())
        }
        FormPurpose::EditSubtask { task_id, index } => {
            let patch = forms::parse_subtask_patch(form)?;
            app.store.update_subtask(task_id, *index, patch).map_err(text)?;
            Ok("Subtarefa atualizada".to_string())
        }
        FormPurpose::NewUser => {
            let new = forms::parse_new_user(form)?;
            app.users.add_user(new).map_err(text)?;
            Ok("Usuário criado com sucesso".to_string())
        }
        FormPurpose::EditUser(id) => {
            let patch = forms::parse_user_patch(form)?;
            app.users.update_user(id, patch).map_err(text)?;
            Ok("Usuário atualizado".to_string())
        }
        FormPurpose::NewProject => {
            let draft = forms::parse_project_form(form)?;
            let today = app.store.today();
            app.projects.create(draft, today).map_err(text)?;
            Ok("Projeto criado com sucesso".to_string())
        }
        FormPurpose::EditProject(id) => {
            let draft = forms::parse_project_form(form)?;
            app.projects.update(id, draft).map_err(text)?;
            Ok("Projeto atualizado".to_string())
        }
    }
}

/// 输入无效时保持表单打开并提示错误
fn submit_form(app: &mut App, purpose: &FormPurpose, form: &Form) -> bool {
    match apply_form(app, purpose, form) {
        Ok(message) => {
            app.clamp_selection();
            app.show_notification(message, NotificationLevel::Success);
            if matches!(purpose, FormPurpose::EditUser(_)) {
                app.sync_session();
            }
            true
        }
        Err(message) => {
            app.show_notification(message, NotificationLevel::Error);
            false
        }
    }
}

fn confirm(app: &mut App, action: ConfirmAction) {
    match action {
        ConfirmAction::DeleteTask(id) => {
            if app.store.delete_task(&id) {
                if app.detail_task.as_deref() == Some(id.as_str()) {
                    app.detail_task = None;
                }
                app.show_notification("Tarefa excluída".to_string(), NotificationLevel::Success);
            }
        }
        ConfirmAction::DeleteSubtask { task_id, index } => {
            match app.store.delete_subtask(&task_id, index) {
                Ok(sub) => {
                    app.subtask_row = app.subtask_row.saturating_sub(1);
                    app.show_notification(
                        format!("Subtarefa \"{}\" excluída", sub.title),
                        NotificationLevel::Success,
                    );
                }
                Err(e) => app.notify_error(e),
            }
        }
        ConfirmAction::DeleteUser(id) => match app.users.delete_user(&id) {
            Ok(user) => {
                app.show_notification(
                    format!("Usuário {} excluído", user.name),
                    NotificationLevel::Success,
                );
                app.sync_session();
            }
            Err(e) => app.notify_error(e),
        },
        ConfirmAction::DeleteProject(id) => match app.projects.delete(&id) {
            Ok(project) => app.show_notification(
                format!("Projeto \"{}\" excluído", project.name),
                NotificationLevel::Success,
            ),
            Err(e) => app.notify_error(e),
        },
        ConfirmAction::Logout => {
            if let Err(e) = app.session.logout() {
                warn!(error = %e, "failed to clear session file");
            }
            info!("returned to login");
            app.detail_task = None;
            app.login = LoginForm::new();
            app.view = View::Login;
            app.show_notification("Sessão encerrada".to_string(), NotificationLevel::Info);
        }
    }
    app.clamp_selection();
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpro::config::Config;
    use taskpro::session::Session;

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_input(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn logged_out() -> App {
        App::with_session(Config::default(), Session::in_memory()).unwrap()
    }

    fn login_as(email: &str, password: &str) -> App {
        let mut app = logged_out();
        type_str(&mut app, email);
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, password);
        press(&mut app, KeyCode::Enter);
        app
    }

    fn message(app: &App) -> &str {
        app.notification.as_ref().map_or("", |n| n.message.as_str())
    }

    #[test]
    fn test_login_with_seeded_admin() {
        let app = login_as("admin@example.com", "password");
        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.identity().map(|i| i.name.as_str()), Some("Admin User"));
        assert!(message(&app).contains("Admin User"));
    }

    #[test]
    fn test_login_failures_stay_on_login() {
        let app = login_as("admin@example.com", "wrong");
        assert_eq!(app.view, View::Login);
        assert_eq!(app.login.error.as_deref(), Some("Email ou senha inválidos"));

        let app = login_as("ana.costa@example.com", "ana123");
        assert_eq!(app.view, View::Login);
        assert!(app.login.error.as_deref().unwrap().contains("inativo"));
    }

    #[test]
    fn test_guard_redirects_to_login() {
        let mut app = logged_out();
        app.navigate(View::Kanban);
        assert_eq!(app.view, View::Login);
        assert!(message(&app).starts_with("Acesso negado"));
    }

    #[test]
    fn test_escape_on_login_quits() {
        let mut app = logged_out();
        assert!(!press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_move_task_right_shows_toast() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.view, View::Kanban);
        let id = app.selected_kanban_task().unwrap().id.clone();
        press(&mut app, KeyCode::Char('L'));
        assert_eq!(app.store.column_of(&id).unwrap().title, "Em Andamento");
        assert_eq!(app.selected_column, 1);
        assert_eq!(app.selected_kanban_task().unwrap().id, id);
        assert_eq!(message(&app), "Tarefa movida para Em Andamento");
        app.store.board().check_invariants().unwrap();
    }

    #[test]
    fn test_create_task_through_form() {
        let mut app = login_as("joao.silva@example.com", "joao123");
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode, Mode::Dialog);
        type_str(&mut app, "Trocar correia");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.store.board().task_count(), 6);
        let task = app.selected_kanban_task().unwrap();
        assert_eq!(task.title, "Trocar correia");
        assert_eq!(task.created_by.as_deref(), Some("joao.silva@example.com"));
    }

    #[test]
    fn test_blank_title_keeps_form_open() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Dialog);
        assert!(app.dialog.is_some());
        assert_eq!(app.store.board().task_count(), 5);
        assert_eq!(app.notification.as_ref().unwrap().level, NotificationLevel::Error);
    }

    #[test]
    fn test_task_table_delete_requires_admin_or_creator() {
        let mut app = login_as("joao.silva@example.com", "joao123");
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('d'));
        assert!(app.dialog.is_none());
        assert_eq!(app.store.board().task_count(), 5);
        assert!(message(&app).starts_with("Apenas administradores"));
    }

    #[test]
    fn test_admin_deletes_from_task_table() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store.board().task_count(), 4);
        app.store.board().check_invariants().unwrap();
    }

    #[test]
    fn test_dashboard_status_opens_filtered_tasks() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Tasks);
        assert_eq!(app.task_query.status.as_deref(), Some("Em Andamento"));
        assert_eq!(app.task_rows().len(), 2);
    }

    #[test]
    fn test_sort_select_toggles_direction() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('S'));
        type_str(&mut app, "due");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.task_query.direction, taskpro::query::Direction::Desc);
    }

    #[test]
    fn test_open_project_goes_to_kanban() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('5'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Kanban);
        assert_eq!(message(&app), "Abrindo projeto: Automação da Linha de Produção");
    }

    #[test]
    fn test_subtask_lifecycle_in_detail() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Detail);
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Comprar peças");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Detail);
        assert_eq!(app.detail().unwrap().subtasks.len(), 1);

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char(' '));
        let sub = &app.detail().unwrap().subtasks[0];
        assert_eq!(sub.status, taskpro::models::SubtaskStatus::Done);
        assert!(sub.completed_date.is_some());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.detail().unwrap().subtasks.is_empty());
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn test_set_password_is_admin_only() {
        let mut app = login_as("joao.silva@example.com", "joao123");
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('P'));
        assert!(app.dialog.is_none());

        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('4'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('P'));
        type_str(&mut app, "nova-senha");
        press(&mut app, KeyCode::Enter);
        assert_eq!(message(&app), "Senha alterada com sucesso");
        let joao = app.users.get("2").unwrap();
        assert!(joao.password.verify("nova-senha"));
    }

    #[test]
    fn test_self_demotion_drops_admin_rights() {
        let mut app = login_as("carlos.oliveira@example.com", "carlos123");
        press(&mut app, KeyCode::Char('4'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.selected_user().unwrap().id, "4");
        press(&mut app, KeyCode::Char('e'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Tab);
        }
        for _ in 0..5 {
            press(&mut app, KeyCode::Backspace);
        }
        type_str(&mut app, "user");
        press(&mut app, KeyCode::Enter);
        assert!(app.dialog.is_none());
        assert!(!app.identity().unwrap().is_admin());

        press(&mut app, KeyCode::Char('P'));
        assert!(app.dialog.is_none());
        assert!(message(&app).starts_with("Apenas administradores"));

        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('d'));
        assert!(app.dialog.is_none());
        assert_eq!(app.store.board().task_count(), 5);
    }

    #[test]
    fn test_deleting_own_account_ends_session() {
        let mut app = login_as("carlos.oliveira@example.com", "carlos123");
        press(&mut app, KeyCode::Char('4'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Char('j'));
        }
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.users.get("4").is_none());
        assert!(!app.session.is_logged_in());
        assert_eq!(app.view, View::Login);
        assert_eq!(app.mode, Mode::Normal);
        assert!(message(&app).starts_with("Sessão encerrada"));
    }

    #[test]
    fn test_logout_returns_to_login() {
        let mut app = login_as("admin@example.com", "password");
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.session.is_logged_in());
        press(&mut app, KeyCode::Char('o'));
        press(&mut app, KeyCode::Char('y'));
        assert!(!app.session.is_logged_in());
        assert_eq!(app.view, View::Login);
    }
}

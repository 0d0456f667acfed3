//! 创建/编辑对话框的表单布局，以及转换为 draft 和 patch

use chrono::NaiveDate;
use std::collections::BTreeSet;

use taskpro::models::task::parse_set;
use taskpro::models::{
    Priority, Project, ProjectDraft, Role, Subtask, SubtaskDraft, SubtaskPatch, Task,
    TaskDraft, TaskPatch, User, UserStatus,
};
use taskpro::users::{NewUser, UserPatch};

use crate::ui::dialogs::{Form, FormField};

pub const TITLE: &str = "Título";
pub const DESCRIPTION: &str = "Descrição";
pub const PRIORITY: &str = "Prioridade";
pub const DEPARTMENTS: &str = "Departamentos";
pub const ASSIGNEES: &str = "Responsáveis";
pub const DUE: &str = "Vencimento";

pub const NAME: &str = "Nome";
pub const EMAIL: &str = "Email";
pub const DEPARTMENT: &str = "Departamento";
pub const ROLE: &str = "Função (admin/user)";
pub const STATUS: &str = "Status (ativo/inativo)";
pub const PASSWORD: &str = "Senha";

pub const DEADLINE: &str = "Prazo";
pub const MEMBERS: &str = "Membros";

/// 支持 `dd/mm/yyyy` 和 `yyyy-mm-dd`
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn priority_field(form: &Form) -> Result<Priority, String> {
    let raw = form.value(PRIORITY);
    if raw.is_empty() {
        return Ok(Priority::default());
    }
    raw.parse::<Priority>()
        .map_err(|_| format!("Prioridade inválida: {}", raw))
}

fn due_field(form: &Form) -> Result<NaiveDate, String> {
    let raw = form.value(DUE);
    parse_date(&raw).ok_or_else(|| format!("Data de vencimento inválida: '{}'", raw))
}

/// 从任务表单读回的值
#[derive(Debug, Clone, PartialEq)]
pub struct TaskFields {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub departments: BTreeSet<String>,
    pub assignees: BTreeSet<String>,
    pub due_date: NaiveDate,
}

impl TaskFields {
    pub fn into_draft(self, created_by: Option<String>) -> TaskDraft {
        TaskDraft {
            title: self.title,
            description: self.description,
            priority: self.priority,
            departments: self.departments,
            assignees: self.assignees,
            due_date: self.due_date,
            subtasks: Vec::new(),
            created_by,
        }
    }

    pub fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: Some(self.title),
            description: Some(self.description),
            priority: Some(self.priority),
            departments: Some(self.departments),
            assignees: Some(self.assignees),
            due_date: Some(self.due_date),
        }
    }
}

/// 新任务默认使用配置的部门和今天的日期
pub fn task_form(task: Option<&Task>, default_department: &str, today: NaiveDate) -> Form {
    let fields = match task {
        Some(task) => vec![
            FormField::new(TITLE, &task.title),
            FormField::new(DESCRIPTION, &task.description),
            FormField::new(PRIORITY, task.priority.label()),
            FormField::new(DEPARTMENTS, &join(&task.departments)),
            FormField::new(ASSIGNEES, &join(&task.assignees)),
            FormField::new(DUE, &format_date(task.due_date)),
        ],
        None => vec![
            FormField::new(TITLE, ""),
            FormField::new(DESCRIPTION, ""),
            FormField::new(PRIORITY, Priority::default().label()),
            FormField::new(DEPARTMENTS, default_department),
            FormField::new(ASSIGNEES, ""),
            FormField::new(DUE, &format_date(today)),
        ],
    };
    Form::new(fields)
}

pub fn parse_task_form(form: &Form) -> Result<TaskFields, String> {
    Ok(TaskFields {
        title: form.value(TITLE),
        description: form.value(DESCRIPTION),
        priority: priority_field(form)?,
        departments: parse_set(&form.value(DEPARTMENTS)),
        assignees: parse_set(&form.value(ASSIGNEES)),
        due_date: due_field(form)?,
    })
}

pub fn subtask_form(subtask: Option<&Subtask>, due: NaiveDate) -> Form {
    let fields = match subtask {
        Some(sub) => vec![
            FormField::new(TITLE, &sub.title),
            FormField::new(DESCRIPTION, &sub.description),
            FormField::new(PRIORITY, sub.priority.label()),
            FormField::new(ASSIGNEES, &join(&sub.assignees)),
            FormField::new(DUE, &format_date(sub.due_date)),
        ],
        None => vec![
            FormField::new(TITLE, ""),
            FormField::new(DESCRIPTION, ""),
            FormField::new(PRIORITY, Priority::default().label()),
            FormField::new(ASSIGNEES, ""),
            FormField::new(DUE, &format_date(due)),
        ],
    };
    Form::new(fields)
}

pub fn parse_subtask_draft(form: &Form) -> Result<SubtaskDraft, String> {
    let mut draft = SubtaskDraft::new(form.value(TITLE), due_field(form)?);
    draft.description = form.value(DESCRIPTION);
    draft.priority = priority_field(form)?;
    draft.assignees = parse_set(&form.value(ASSIGNEES));
    Ok(draft)
}

pub fn parse_subtask_patch(form: &Form) -> Result<SubtaskPatch, String> {
    Ok(SubtaskPatch {
        title: Some(form.value(TITLE)),
        description: Some(form.value(DESCRIPTION)),
        priority: Some(priority_field(form)?),
        assignees: Some(parse_set(&form.value(ASSIGNEES))),
        due_date: Some(due_field(form)?),
    })
}

/// 密码字段只在创建表单中出现
pub fn user_form(user: Option<&User>, default_department: &str) -> Form {
    match user {
        Some(user) => Form::new(vec![
            FormField::new(NAME, &user.name),
            FormField::new(EMAIL, &user.email),
            FormField::new(DEPARTMENT, &user.department),
            FormField::new(ROLE, role_key(user.role)),
            FormField::new(STATUS, user.status.label()),
        ]),
        None => Form::new(vec![
            FormField::new(NAME, ""),
            FormField::new(EMAIL, ""),
            FormField::new(DEPARTMENT, default_department),
            FormField::new(ROLE, role_key(Role::User)),
            FormField::new(STATUS, UserStatus::Active.label()),
            FormField::masked(PASSWORD),
        ]),
    }
}

fn role_key(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::User => "user",
    }
}

fn role_and_status(form: &Form) -> Result<(Role, UserStatus), String> {
    let role = form
        .value(ROLE)
        .parse::<Role>()
        .map_err(|_| format!("Função inválida: {}", form.value(ROLE)))?;
    let status = form
        .value(STATUS)
        .parse::<UserStatus>()
        .map_err(|_| format!("Status inválido: {}", form.value(STATUS)))?;
    Ok((role, status))
}

pub fn parse_new_user(form: &Form) -> Result<NewUser, String> {
    let (role, status) = role_and_status(form)?;
    Ok(NewUser {
        name: form.value(NAME),
        email: form.value(EMAIL),
        department: form.value(DEPARTMENT),
        role,
        status,
        password: form.raw_value(PASSWORD),
    })
}

pub fn parse_user_patch(form: &Form) -> Result<UserPatch, String> {
    let (role, status) = role_and_status(form)?;
    Ok(UserPatch {
        name: Some(form.value(NAME)),
        email: Some(form.value(EMAIL)),
        department: Some(form.value(DEPARTMENT)),
        role: Some(role),
        status: Some(status),
    })
}

pub fn project_form(project: Option<&Project>) -> Form {
    match project {
        Some(project) => Form::new(vec![
            FormField::new(NAME, &project.name),
            FormField::new(DESCRIPTION, &project.description),
            FormField::new(DEADLINE, &project.due_date.map(format_date).unwrap_or_default()),
            FormField::new(MEMBERS, &project.members.join(", ")),
        ]),
        None => Form::new(vec![
            FormField::new(NAME, ""),
            FormField::new(DESCRIPTION, ""),
            FormField::new(DEADLINE, ""),
            FormField::new(MEMBERS, ""),
        ]),
    }
}

/// 截止日期为空表示没有截止日期，成员保持输入顺序
pub fn parse_project_form(form: &Form) -> Result<ProjectDraft, String> {
    let raw_deadline = form.value(DEADLINE);
    let due_date = if raw_deadline.is_empty() {
        None
    } else {
        Some(parse_date(&raw_deadline).ok_or_else(|| format!("Prazo inválido: '{}'", raw_deadline))?)
    };
    let mut draft = ProjectDraft {
        name: form.value(NAME),
        description: form.value(DESCRIPTION),
        due_date,
        members: Vec::new(),
    };
    for member in form.value(MEMBERS).split(',') {
        draft.add_member(member);
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpro::board::seed;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn set(form: &mut Form, label: &str, value: &str) {
        let field = form.fields.iter_mut().find(|f| f.label == label).unwrap();
        field.input = crate::ui::text_input::LineInput::new(value);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("15/08/2023"), Some(day(2023, 8, 15)));
        assert_eq!(parse_date(" 2023-08-15 "), Some(day(2023, 8, 15)));
        assert_eq!(parse_date("31/02/2023"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_new_task_form_defaults() {
        let mut form = task_form(None, "Produção", day(2024, 3, 1));
        set(&mut form, TITLE, "  Calibrar sensores ");
        set(&mut form, ASSIGNEES, "Ana Costa, , João Silva");
        let fields = parse_task_form(&form).unwrap();
        assert_eq!(fields.title, "Calibrar sensores");
        assert_eq!(fields.priority, Priority::Medium);
        assert!(fields.departments.contains("Produção"));
        assert_eq!(fields.assignees.len(), 2);
        assert_eq!(fields.due_date, day(2024, 3, 1));
    }

    #[test]
    fn test_edit_task_form_round_trips_seed_task() {
        let tasks = seed::tasks();
        let task = &tasks[0];
        let form = task_form(Some(task), "Produção", day(2024, 3, 1));
        let patch = parse_task_form(&form).unwrap().into_patch();
        assert_eq!(patch.title.as_deref(), Some(task.title.as_str()));
        assert_eq!(patch.priority, Some(task.priority));
        assert_eq!(patch.departments.as_ref(), Some(&task.departments));
        assert_eq!(patch.due_date, Some(task.due_date));
    }

    #[test]
    fn test_invalid_priority_and_date_are_reported() {
        let mut form = task_form(None, "", day(2024, 3, 1));
        set(&mut form, PRIORITY, "crítica");
        assert!(parse_task_form(&form).unwrap_err().contains("Prioridade"));
        set(&mut form, PRIORITY, "urgente");
        set(&mut form, DUE, "amanhã");
        assert!(parse_task_form(&form).unwrap_err().contains("vencimento"));
    }

    #[test]
    fn test_new_user_form() {
        let mut form = user_form(None, "Qualidade");
        set(&mut form, NAME, "Rita");
        set(&mut form, EMAIL, "rita@example.com");
        set(&mut form, ROLE, "Admin");
        set(&mut form, PASSWORD, " s3nha ");
        let new = parse_new_user(&form).unwrap();
        assert_eq!(new.role, Role::Admin);
        assert_eq!(new.status, UserStatus::Active);
        assert_eq!(new.department, "Qualidade");
        assert_eq!(new.password, " s3nha ");
    }

    #[test]
    fn test_project_form_dedupes_members() {
        let mut form = project_form(None);
        set(&mut form, NAME, "Lean");
        set(&mut form, MEMBERS, "Ana Costa, Pedro Alves, Ana Costa");
        let draft = parse_project_form(&form).unwrap();
        assert_eq!(draft.members, vec!["Ana Costa".to_string(), "Pedro Alves".to_string()]);
        assert_eq!(draft.due_date, None);
        set(&mut form, DEADLINE, "30/13/2024");
        assert!(parse_project_form(&form).is_err());
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub type TaskId = String;

/// 任务优先级，声明顺序即排序顺序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    /// 命令行和过滤器使用的键
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// 看板和表格上显示的标签
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Baixa",
            Priority::Medium => "Média",
            Priority::High => "Alta",
            Priority::Urgent => "Urgente",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baixa" => Ok(Priority::Low),
            "medium" | "média" | "media" => Ok(Priority::Medium),
            "high" | "alta" => Ok(Priority::High),
            "urgent" | "urgente" => Ok(Priority::Urgent),
            other => Err(format!(
                "unknown priority '{}' (expected low, medium, high or urgent)",
                other
            )),
        }
    }
}

/// 子任务状态。父任务的状态由所在列决定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubtaskStatus {
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Em Andamento")]
    InProgress,
    #[serde(rename = "Concluído")]
    Done,
}

impl SubtaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SubtaskStatus::Pending => "Pendente",
            SubtaskStatus::InProgress => "Em Andamento",
            SubtaskStatus::Done => "Concluído",
        }
    }

    /// 循环切换：Pendente -> Em Andamento -> Concluído -> Pendente
    pub fn next(&self) -> Self {
        match self {
            SubtaskStatus::Pending => SubtaskStatus::InProgress,
            SubtaskStatus::InProgress => SubtaskStatus::Done,
            SubtaskStatus::Done => SubtaskStatus::Pending,
        }
    }
}

impl fmt::Display for SubtaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SubtaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pendente" | "pending" => Ok(SubtaskStatus::Pending),
            "em andamento" | "in-progress" | "in progress" => Ok(SubtaskStatus::InProgress),
            "concluído" | "concluido" | "done" => Ok(SubtaskStatus::Done),
            other => Err(format!("unknown subtask status '{}'", other)),
        }
    }
}

/// 检查项，只属于一个任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignees: BTreeSet<String>,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub status: SubtaskStatus,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
}

/// 新子任务，id 和完成日期由 store 分配
#[derive(Debug, Clone, PartialEq)]
pub struct SubtaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub assignees: BTreeSet<String>,
    pub due_date: NaiveDate,
    pub status: SubtaskStatus,
}

impl SubtaskDraft {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            assignees: BTreeSet::new(),
            due_date,
            status: SubtaskStatus::Pending,
        }
    }
}

/// 子任务的部分更新，`None` 表示不修改
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubtaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub assignees: Option<BTreeSet<String>>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub departments: BTreeSet<String>,
    #[serde(default)]
    pub assignees: BTreeSet<String>,
    pub due_date: NaiveDate,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// 创建者邮箱
    #[serde(default)]
    pub created_by: Option<String>,
}

impl Task {
    /// "Dept A, Dept B" 形式，用于表格和卡片
    pub fn departments_label(&self) -> String {
        join_set(&self.departments)
    }

    pub fn assignees_label(&self) -> String {
        join_set(&self.assignees)
    }

    /// (完成数, 总数)
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self
            .subtasks
            .iter()
            .filter(|s| s.status == SubtaskStatus::Done)
            .count();
        (done, self.subtasks.len())
    }
}

/// 创建任务时调用方提供的字段
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub departments: BTreeSet<String>,
    pub assignees: BTreeSet<String>,
    pub due_date: NaiveDate,
    pub subtasks: Vec<SubtaskDraft>,
    pub created_by: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            departments: BTreeSet::new(),
            assignees: BTreeSet::new(),
            due_date,
            subtasks: Vec::new(),
            created_by: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.departments.insert(department.into());
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignees.insert(assignee.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// 任务的部分更新，位置、id 和 store 维护的日期不可修改
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub departments: Option<BTreeSet<String>>,
    pub assignees: Option<BTreeSet<String>>,
    pub due_date: Option<NaiveDate>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

/// 解析逗号分隔的列表（"Qualidade, Produção"），丢弃空项
pub fn parse_set(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

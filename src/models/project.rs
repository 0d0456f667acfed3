use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 项目状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[default]
    #[serde(rename = "Em Andamento")]
    InProgress,
    #[serde(rename = "Concluído")]
    Done,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Pending => "Pendente",
            ProjectStatus::InProgress => "Em Andamento",
            ProjectStatus::Done => "Concluído",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// 按加入顺序，不重复
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub tasks_total: u32,
    #[serde(default)]
    pub tasks_completed: u32,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Project {
    /// 完成百分比，四舍五入；没有任务时为 0
    pub fn progress(&self) -> u16 {
        if self.tasks_total == 0 {
            return 0;
        }
        let pct = f64::from(self.tasks_completed) / f64::from(self.tasks_total) * 100.0;
        pct.round().clamp(0.0, 100.0) as u16
    }
}

/// 项目的可编辑部分，创建和编辑共用
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub due_date: Option<NaiveDate>,
    pub members: Vec<String>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_project(project: &Project) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            due_date: project.due_date,
            members: project.members.clone(),
        }
    }

    /// 添加去空白后的成员名，空白或重复时返回 false
    pub fn add_member(&mut self, member: &str) -> bool {
        let member = member.trim();
        if member.is_empty() || self.members.iter().any(|m| m == member) {
            return false;
        }
        self.members.push(member.to_string());
        true
    }

    pub fn remove_member(&mut self, member: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != member);
        self.members.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(total: u32, completed: u32) -> Project {
        Project {
            id: "proj-1".to_string(),
            name: "Certificação ISO 9001".to_string(),
            description: String::new(),
            created_at: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            due_date: None,
            members: Vec::new(),
            tasks_total: total,
            tasks_completed: completed,
            status: ProjectStatus::InProgress,
        }
    }

    #[test]
    fn test_progress_rounds_to_nearest_percent() {
        assert_eq!(project(24, 10).progress(), 42);
        assert_eq!(project(18, 15).progress(), 83);
        assert_eq!(project(12, 12).progress(), 100);
    }

    #[test]
    fn test_progress_without_tasks_is_zero() {
        assert_eq!(project(0, 0).progress(), 0);
    }

    #[test]
    fn test_add_member_trims_and_rejects_duplicates() {
        let mut draft = ProjectDraft::new("Automação");
        assert!(draft.add_member("  Ana Costa "));
        assert!(!draft.add_member("Ana Costa"));
        assert!(!draft.add_member("   "));
        assert_eq!(draft.members, vec!["Ana Costa".to_string()]);
    }

    #[test]
    fn test_remove_member() {
        let mut draft = ProjectDraft::new("Automação");
        draft.add_member("João Silva");
        draft.add_member("Maria Santos");
        assert!(draft.remove_member("João Silva"));
        assert!(!draft.remove_member("João Silva"));
        assert_eq!(draft.members, vec!["Maria Santos".to_string()]);
    }
}

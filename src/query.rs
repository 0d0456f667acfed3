//! 任务表的过滤和排序

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::Datelike;

use crate::board::Board;
use crate::models::{Column, Priority, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Title,
    Priority,
    Department,
    #[default]
    DueDate,
    CreatedAt,
    Status,
}

impl SortField {
    pub const ALL: [SortField; 6] = [
        SortField::Title,
        SortField::Priority,
        SortField::Department,
        SortField::DueDate,
        SortField::CreatedAt,
        SortField::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Priority => "priority",
            SortField::Department => "department",
            SortField::DueDate => "due",
            SortField::CreatedAt => "created",
            SortField::Status => "status",
        }
    }

    pub fn next(&self) -> Self {
        let pos = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "department" => Ok(SortField::Department),
            "due" | "due-date" | "duedate" => Ok(SortField::DueDate),
            "created" | "created-at" | "createdat" => Ok(SortField::CreatedAt),
            "status" => Ok(SortField::Status),
            other => Err(format!("unknown sort field '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Asc => "▲",
            Direction::Desc => "▼",
        }
    }
}

/// 任务及其所在列
#[derive(Debug, Clone, Copy)]
pub struct TaskRow<'a> {
    pub task: &'a Task,
    pub column: &'a Column,
}

impl TaskRow<'_> {
    pub fn status(&self) -> &str {
        &self.column.title
    }
}

/// 过滤与排序设置，`None` 表示全部
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub search: String,
    pub department: Option<String>,
    /// 列标题，如 "Em Andamento"
    pub status: Option<String>,
    pub priority: Option<Priority>,
    /// 1-12
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub sort_field: SortField,
    pub direction: Direction,
}

impl TaskQuery {
    /// 点击当前排序字段则反转方向，换字段时从升序开始
    pub fn toggle_sort(&mut self, field: SortField) {
        if self.sort_field == field {
            self.direction = self.direction.flip();
        } else {
            self.sort_field = field;
            self.direction = Direction::Asc;
        }
    }

    pub fn clear_filters(&mut self) {
        *self = TaskQuery {
            sort_field: self.sort_field,
            direction: self.direction,
            ..TaskQuery::default()
        };
    }

    pub fn matches(&self, row: &TaskRow<'_>) -> bool {
        let task = row.task;
        let term = self.search.trim().to_lowercase();
        if !term.is_empty() {
            let hit = task.title.to_lowercase().contains(&term)
                || task.description.to_lowercase().contains(&term)
                || task.assignees.iter().any(|a| a.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        if let Some(dept) = &self.department {
            if !task.departments.contains(dept) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if row.status() != status {
                return false;
            }
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        if self.month.is_some_and(|m| m != task.due_date.month()) {
            return false;
        }
        if self.year.is_some_and(|y| y != task.due_date.year()) {
            return false;
        }
        true
    }

    /// 通过所有过滤条件的行，按排序顺序
    pub fn apply<'a>(&self, board: &'a Board) -> Vec<TaskRow<'a>> {
        let mut rows: Vec<TaskRow<'a>> = board
            .ordered_columns()
            .flat_map(|column| {
                column
                    .task_ids
                    .iter()
                    .filter_map(|id| board.tasks.get(id))
                    .map(move |task| TaskRow { task, column })
            })
            .filter(|row| self.matches(row))
            .collect();

        rows.sort_by(|a, b| {
            let ord = compare(self.sort_field, a, b);
            match self.direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        });
        rows
    }
}

fn compare(field: SortField, a: &TaskRow<'_>, b: &TaskRow<'_>) -> Ordering {
    match field {
        // 按字符串原样比较，大写字母排在小写之前
        SortField::Title => a.task.title.cmp(&b.task.title),
        SortField::Priority => a.task.priority.cmp(&b.task.priority),
        SortField::Department => a.task.departments_label().cmp(&b.task.departments_label()),
        SortField::DueDate => a.task.due_date.cmp(&b.task.due_date),
        SortField::CreatedAt => a.task.created_at.cmp(&b.task.created_at),
        SortField::Status => a.status().cmp(b.status()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{seed, BoardStore};
    use crate::models::TaskDraft;

    fn ids(rows: &[TaskRow<'_>]) -> Vec<String> {
        rows.iter().map(|r| r.task.id.clone()).collect()
    }

    #[test]
    fn test_default_sorts_by_due_date_ascending() {
        let board = seed::board();
        let rows = TaskQuery::default().apply(&board);
        assert_eq!(ids(&rows), vec!["task-2", "task-4", "task-1", "task-5", "task-3"]);
    }

    #[test]
    fn test_search_matches_assignee_case_insensitively() {
        let board = seed::board();
        let query = TaskQuery {
            search: "MARIA".to_string(),
            ..TaskQuery::default()
        };
        assert_eq!(ids(&query.apply(&board)), vec!["task-2"]);
    }

    #[test]
    fn test_search_matches_description() {
        let board = seed::board();
        let query = TaskQuery {
            search: "documentação".to_string(),
            ..TaskQuery::default()
        };
        assert_eq!(ids(&query.apply(&board)), vec!["task-5"]);
    }

    #[test]
    fn test_equality_filters_combine() {
        let board = seed::board();
        let query = TaskQuery {
            department: Some("Manutenção".to_string()),
            status: Some("Pendente".to_string()),
            priority: Some(Priority::Low),
            ..TaskQuery::default()
        };
        assert_eq!(ids(&query.apply(&board)), vec!["task-5"]);
    }

    #[test]
    fn test_completed_and_high_priority_filter() {
        let board = seed::board();
        let query = TaskQuery {
            status: Some("Concluído".to_string()),
            priority: Some(Priority::High),
            ..TaskQuery::default()
        };
        assert_eq!(ids(&query.apply(&board)), vec!["task-3"]);
    }

    #[test]
    fn test_title_sort_is_case_sensitive() {
        let mut store = BoardStore::seeded();
        store
            .create_task(TaskDraft::new("auditoria externa", seed::tasks()[0].due_date))
            .unwrap();
        let query = TaskQuery {
            sort_field: SortField::Title,
            ..TaskQuery::default()
        };
        let rows = query.apply(store.board());
        let titles: Vec<&str> = rows.iter().map(|r| r.task.title.as_str()).collect();
        assert_eq!(titles.first(), Some(&"Auditoria de qualidade"));
        assert_eq!(titles.last(), Some(&"auditoria externa"));
    }

    #[test]
    fn test_month_and_year_filter() {
        let board = seed::board();
        let august = TaskQuery {
            month: Some(8),
            year: Some(2023),
            ..TaskQuery::default()
        };
        assert_eq!(ids(&august.apply(&board)), vec!["task-5", "task-3"]);

        let other_year = TaskQuery {
            year: Some(2024),
            ..TaskQuery::default()
        };
        assert!(other_year.apply(&board).is_empty());
    }

    #[test]
    fn test_toggle_sort() {
        let mut query = TaskQuery::default();
        query.toggle_sort(SortField::DueDate);
        assert_eq!(query.direction, Direction::Desc);
        query.toggle_sort(SortField::Priority);
        assert_eq!(query.sort_field, SortField::Priority);
        assert_eq!(query.direction, Direction::Asc);
        query.toggle_sort(SortField::Priority);
        assert_eq!(query.direction, Direction::Desc);
    }

    #[test]
    fn test_priority_sorts_by_rank() {
        let board = seed::board();
        let mut query = TaskQuery::default();
        query.toggle_sort(SortField::Priority);
        query.toggle_sort(SortField::Priority);
        let rows = query.apply(&board);
        assert_eq!(rows[0].task.priority, Priority::High);
        assert_eq!(rows.last().map(|r| r.task.priority), Some(Priority::Low));
    }

    #[test]
    fn test_status_comes_from_column() {
        let board = seed::board();
        let query = TaskQuery {
            status: Some("Concluído".to_string()),
            ..TaskQuery::default()
        };
        let rows = query.apply(&board);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status(), "Concluído");
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut query = TaskQuery {
            search: "x".to_string(),
            year: Some(2023),
            ..TaskQuery::default()
        };
        query.toggle_sort(SortField::Title);
        query.clear_filters();
        assert!(query.search.is_empty() && query.year.is_none());
        assert_eq!(query.sort_field, SortField::Title);
    }
}

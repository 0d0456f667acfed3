//! 看板状态
//!
//! [`Board`] 用 map 保存任务，每个 [`Column`] 只保存有序的任务 id。
//! 只有 [`BoardStore`] 修改看板，每次成功操作后 [`Board::check_invariants`] 都成立。

pub mod drop;
pub mod seed;
pub mod store;

pub use drop::{DropEvent, Location};
pub use store::{BoardStore, Moved};

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Column, ColumnId, Task, TaskId};

/// 看板修改错误，失败的调用不改动看板
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    /// 标题去空白后为空
    #[error("task title is required")]
    TitleRequired,
    #[error("subtask title is required")]
    SubtaskTitleRequired,
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),
    #[error("column not found: {0}")]
    ColumnNotFound(ColumnId),
    /// 拖拽源位置上不是被拖拽的任务
    #[error("task {task_id} is not at position {index} of column {column_id}")]
    NotAtSource {
        task_id: TaskId,
        column_id: ColumnId,
        index: usize,
    },
    #[error("task {task_id} has no subtask at position {index}")]
    SubtaskNotFound { task_id: TaskId, index: usize },
    /// 没有列可以放新任务
    #[error("board has no columns")]
    NoColumns,
    /// 引用关系被破坏
    #[error("inconsistent board: {0}")]
    Inconsistent(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub tasks: HashMap<TaskId, Task>,
    pub columns: HashMap<ColumnId, Column>,
    pub column_order: Vec<ColumnId>,
}

impl Board {
    /// 由按显示顺序排列的列和它们引用的任务构建
    pub fn from_parts(columns: Vec<Column>, tasks: Vec<Task>) -> Self {
        let column_order = columns.iter().map(|c| c.id.clone()).collect();
        Self {
            tasks: tasks.into_iter().map(|t| (t.id.clone(), t)).collect(),
            columns: columns.into_iter().map(|c| (c.id.clone(), c)).collect(),
            column_order,
        }
    }

    /// 按显示顺序
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order
            .iter()
            .filter_map(|id| self.columns.get(id))
    }

    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.get(column_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// 当前包含 `task_id` 的列
    pub fn column_of(&self, task_id: &str) -> Option<&Column> {
        self.ordered_columns()
            .find(|c| c.task_ids.iter().any(|id| id == task_id))
    }

    pub fn tasks_in(&self, column_id: &str) -> Vec<&Task> {
        self.columns
            .get(column_id)
            .map(|c| c.task_ids.iter().filter_map(|id| self.tasks.get(id)).collect())
            .unwrap_or_default()
    }

    /// 逾期：截止日期早于今天，且不在完成列中
    pub fn is_overdue(&self, task_id: &str, completed_column: &str, today: NaiveDate) -> bool {
        let Some(task) = self.tasks.get(task_id) else {
            return false;
        };
        task.due_date < today && self.column_of(task_id).is_some_and(|c| c.id != completed_column)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// 检查列中的 id 与任务表是否一致
    ///
    /// 返回遇到的第一个问题，比如悬空 id 或重复出现的任务。
    pub fn check_invariants(&self) -> Result<(), BoardError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for column in self.columns.values() {
            for id in &column.task_ids {
                if !self.tasks.contains_key(id) {
                    return Err(BoardError::Inconsistent(format!(
                        "column {} lists unknown task {}",
                        column.id, id
                    )));
                }
                if !seen.insert(id.as_str()) {
                    return Err(BoardError::Inconsistent(format!(
                        "task {} is listed more than once",
                        id
                    )));
                }
            }
        }
        if let Some(orphan) = self.tasks.keys().find(|id| !seen.contains(id.as_str())) {
            return Err(BoardError::Inconsistent(format!(
                "task {} is in no column",
                orphan
            )));
        }

        let order: HashSet<&str> = self.column_order.iter().map(String::as_str).collect();
        if order.len() != self.column_order.len()
            || order.len() != self.columns.len()
            || self.columns.keys().any(|k| !order.contains(k.as_str()))
        {
            return Err(BoardError::Inconsistent(
                "column order is not a permutation of the columns".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_board_is_consistent() {
        let board = seed::board();
        assert_eq!(board.check_invariants(), Ok(()));
        assert_eq!(board.task_count(), 5);
    }

    #[test]
    fn test_dangling_id_is_reported() {
        let mut board = seed::board();
        board.tasks.remove("task-1");
        assert!(matches!(
            board.check_invariants(),
            Err(BoardError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_duplicate_listing_is_reported() {
        let mut board = seed::board();
        if let Some(col) = board.columns.get_mut("column-2") {
            col.task_ids.push("task-1".to_string());
        }
        assert!(board.check_invariants().is_err());
    }

    #[test]
    fn test_column_order_must_cover_all_columns() {
        let mut board = seed::board();
        board.column_order.pop();
        assert!(board.check_invariants().is_err());

        let mut board = seed::board();
        board.column_order.push("column-1".to_string());
        assert!(board.check_invariants().is_err());
    }

    #[test]
    fn test_column_of_and_tasks_in() {
        let board = seed::board();
        assert_eq!(board.column_of("task-4").map(|c| c.title.as_str()), Some("Em Andamento"));
        let titles: Vec<_> = board.tasks_in("column-1").iter().map(|t| t.id.clone()).collect();
        assert_eq!(titles, vec!["task-1", "task-5"]);
        assert!(board.tasks_in("column-9").is_empty());
    }
}

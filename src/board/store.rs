use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use uuid::Uuid;

use super::drop::DropEvent;
use super::{Board, BoardError};
use crate::models::{
    Column, Subtask, SubtaskDraft, SubtaskPatch, SubtaskStatus, Task, TaskDraft, TaskId, TaskPatch,
};

/// 移动结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Moved {
    /// 位置没有变化
    Unchanged,
    /// 同一列内换位
    Reordered,
    /// 移到了另一列
    Relocated { to_title: String },
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// 持有看板，所有修改都经过这里
#[derive(Debug, Clone)]
pub struct BoardStore {
    board: Board,
    completed_column: String,
    clock: fn() -> NaiveDate,
}

impl BoardStore {
    /// 包装看板，默认最后一列为完成列
    #[must_use]
    pub fn new(board: Board) -> Self {
        let completed_column = board.column_order.last().cloned().unwrap_or_default();
        Self {
            board,
            completed_column,
            clock: local_today,
        }
    }

    /// 使用内置初始数据
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(super::seed::board())
    }

    /// 指定哪一列算作完成，列不存在时返回 [`BoardError::ColumnNotFound`]
    pub fn with_completed_column(mut self, column_id: &str) -> Result<Self, BoardError> {
        if !self.board.columns.contains_key(column_id) {
            return Err(BoardError::ColumnNotFound(column_id.to_string()));
        }
        self.completed_column = column_id.to_string();
        Ok(self)
    }

    /// 替换"今天"的来源，完成日期和创建日期都用它
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn completed_column(&self) -> &str {
        &self.completed_column
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.board.task(task_id)
    }

    pub fn column_of(&self, task_id: &str) -> Option<&Column> {
        self.board.column_of(task_id)
    }

    pub fn is_overdue(&self, task_id: &str) -> bool {
        self.board.is_overdue(task_id, &self.completed_column, self.today())
    }

    pub fn tasks_in(&self, column_id: &str) -> Vec<&Task> {
        self.board.tasks_in(column_id)
    }

    /// 移动任务：先从源列移出，再插入目标列
    ///
    /// 目标索引按移出后的目标列长度截断。进入完成列时补上 `completed_date`，
    /// 离开完成列时清空。源位置上不是该任务时返回 [`BoardError::NotAtSource`]。
    pub fn move_task(
        &mut self,
        task_id: &str,
        source_column: &str,
        source_index: usize,
        dest_column: &str,
        dest_index: usize,
    ) -> Result<Moved, BoardError> {
        if source_column == dest_column && source_index == dest_index {
            return Ok(Moved::Unchanged);
        }

        let source = self
            .board
            .columns
            .get(source_column)
            .ok_or_else(|| BoardError::ColumnNotFound(source_column.to_string()))?;
        if source.task_ids.get(source_index).map(String::as_str) != Some(task_id) {
            warn!(task_id, source_column, source_index, "drag source mismatch");
            return Err(BoardError::NotAtSource {
                task_id: task_id.to_string(),
                column_id: source_column.to_string(),
                index: source_index,
            });
        }
        if !self.board.columns.contains_key(dest_column) {
            return Err(BoardError::ColumnNotFound(dest_column.to_string()));
        }
        if !self.board.tasks.contains_key(task_id) {
            return Err(BoardError::TaskNotFound(task_id.to_string()));
        }

        // 先移除再插入
        if let Some(source) = self.board.columns.get_mut(source_column) {
            source.task_ids.remove(source_index);
        }
        let mut to_title = String::new();
        if let Some(dest) = self.board.columns.get_mut(dest_column) {
            let index = dest_index.min(dest.task_ids.len());
            dest.task_ids.insert(index, task_id.to_string());
            to_title = dest.title.clone();
        }

        if source_column == dest_column {
            return Ok(Moved::Reordered);
        }

        let today = self.today();
        let entering = dest_column == self.completed_column;
        let leaving = source_column == self.completed_column;
        if let Some(task) = self.board.tasks.get_mut(task_id) {
            if entering && task.completed_date.is_none() {
                task.completed_date = Some(today);
            } else if leaving {
                task.completed_date = None;
            }
        }

        info!(task_id, from = source_column, to = dest_column, "task moved");
        Ok(Moved::Relocated { to_title })
    }

    /// 处理拖拽结束事件，取消的拖拽不做修改
    pub fn apply_drop(&mut self, event: &DropEvent) -> Result<Moved, BoardError> {
        let Some(dest) = &event.destination else {
            return Ok(Moved::Unchanged);
        };
        self.move_task(
            &event.dragged_id,
            &event.source.column_id,
            event.source.index,
            &dest.column_id,
            dest.index,
        )
    }

    /// 移到相邻列末尾（`-1` 左，`+1` 右）
    pub fn move_adjacent(&mut self, task_id: &str, offset: isize) -> Result<Moved, BoardError> {
        let (column_id, index) = self.locate(task_id)?;
        let Some(pos) = self.board.column_order.iter().position(|c| *c == column_id) else {
            return Err(BoardError::ColumnNotFound(column_id));
        };
        let Some(target) = pos
            .checked_add_signed(offset)
            .and_then(|p| self.board.column_order.get(p))
            .cloned()
        else {
            return Ok(Moved::Unchanged);
        };
        if target == column_id {
            return Ok(Moved::Unchanged);
        }
        let dest_len = self.board.columns.get(&target).map_or(0, Column::len);
        self.move_task(task_id, &column_id, index, &target, dest_len)
    }

    /// 列内上移（`-1`）或下移（`+1`）
    pub fn reorder(&mut self, task_id: &str, offset: isize) -> Result<Moved, BoardError> {
        let (column_id, index) = self.locate(task_id)?;
        let len = self.board.columns.get(&column_id).map_or(0, Column::len);
        let Some(target) = index.checked_add_signed(offset).filter(|t| *t < len) else {
            return Ok(Moved::Unchanged);
        };
        self.move_task(task_id, &column_id, index, &column_id, target)
    }

    /// 在第一列末尾创建任务，返回新 id
    pub fn create_task(&mut self, draft: TaskDraft) -> Result<TaskId, BoardError> {
        let title = draft.title.trim();
        if title.is_empty() {
            warn!("rejected task without title");
            return Err(BoardError::TitleRequired);
        }
        if draft.subtasks.iter().any(|s| s.title.trim().is_empty()) {
            return Err(BoardError::SubtaskTitleRequired);
        }
        let first = self
            .board
            .column_order
            .first()
            .cloned()
            .ok_or(BoardError::NoColumns)?;

        let today = self.today();
        let id = format!("task-{}", Uuid::new_v4());
        let subtasks = draft
            .subtasks
            .into_iter()
            .map(|s| new_subtask(s, today))
            .collect();
        let task = Task {
            id: id.clone(),
            title: title.to_string(),
            description: draft.description,
            priority: draft.priority,
            departments: draft.departments,
            assignees: draft.assignees,
            due_date: draft.due_date,
            created_at: today,
            completed_date: None,
            subtasks,
            created_by: draft.created_by,
        };

        self.board.tasks.insert(id.clone(), task);
        if let Some(column) = self.board.columns.get_mut(&first) {
            column.task_ids.push(id.clone());
        }
        info!(task_id = %id, column = %first, "task created");
        Ok(id)
    }

    /// 合并 `patch` 中设置的字段
    pub fn update_task(&mut self, task_id: &str, patch: TaskPatch) -> Result<(), BoardError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            warn!(task_id, "rejected blank title");
            return Err(BoardError::TitleRequired);
        }
        let task = self.task_mut(task_id)?;
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(departments) = patch.departments {
            task.departments = departments;
        }
        if let Some(assignees) = patch.assignees {
            task.assignees = assignees;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        info!(task_id, "task updated");
        Ok(())
    }

    /// 从任务表和所在列中删除，已不存在时返回 `false`
    pub fn delete_task(&mut self, task_id: &str) -> bool {
        if self.board.tasks.remove(task_id).is_none() {
            return false;
        }
        for column in self.board.columns.values_mut() {
            column.task_ids.retain(|id| id != task_id);
        }
        info!(task_id, "task deleted");
        true
    }

    /// 追加子任务，返回其索引
    pub fn add_subtask(&mut self, task_id: &str, draft: SubtaskDraft) -> Result<usize, BoardError> {
        if draft.title.trim().is_empty() {
            return Err(BoardError::SubtaskTitleRequired);
        }
        let today = self.today();
        let task = self.task_mut(task_id)?;
        task.subtasks.push(new_subtask(draft, today));
        Ok(task.subtasks.len() - 1)
    }

    pub fn update_subtask(
        &mut self,
        task_id: &str,
        index: usize,
        patch: SubtaskPatch,
    ) -> Result<(), BoardError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(BoardError::SubtaskTitleRequired);
        }
        let subtask = self.subtask_mut(task_id, index)?;
        if let Some(title) = patch.title {
            subtask.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            subtask.description = description;
        }
        if let Some(priority) = patch.priority {
            subtask.priority = priority;
        }
        if let Some(assignees) = patch.assignees {
            subtask.assignees = assignees;
        }
        if let Some(due_date) = patch.due_date {
            subtask.due_date = due_date;
        }
        Ok(())
    }

    /// 删除并返回 `index` 处的子任务
    pub fn delete_subtask(&mut self, task_id: &str, index: usize) -> Result<Subtask, BoardError> {
        let task = self.task_mut(task_id)?;
        if index >= task.subtasks.len() {
            return Err(BoardError::SubtaskNotFound {
                task_id: task_id.to_string(),
                index,
            });
        }
        Ok(task.subtasks.remove(index))
    }

    /// `Done` 记录今天的日期，其他状态清空完成日期
    pub fn set_subtask_status(
        &mut self,
        task_id: &str,
        index: usize,
        status: SubtaskStatus,
    ) -> Result<(), BoardError> {
        let today = self.today();
        let subtask = self.subtask_mut(task_id, index)?;
        subtask.status = status;
        subtask.completed_date = (status == SubtaskStatus::Done).then_some(today);
        Ok(())
    }

    fn locate(&self, task_id: &str) -> Result<(String, usize), BoardError> {
        self.board
            .column_of(task_id)
            .and_then(|c| c.position(task_id).map(|i| (c.id.clone(), i)))
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))
    }

    fn task_mut(&mut self, task_id: &str) -> Result<&mut Task, BoardError> {
        self.board
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.to_string()))
    }

    fn subtask_mut(&mut self, task_id: &str, index: usize) -> Result<&mut Subtask, BoardError> {
        self.task_mut(task_id)?
            .subtasks
            .get_mut(index)
            .ok_or_else(|| BoardError::SubtaskNotFound {
                task_id: task_id.to_string(),
                index,
            })
    }
}

fn new_subtask(draft: SubtaskDraft, today: NaiveDate) -> Subtask {
    Subtask {
        id: format!("sub-{}", Uuid::new_v4()),
        title: draft.title.trim().to_string(),
        description: draft.description,
        priority: draft.priority,
        assignees: draft.assignees,
        due_date: draft.due_date,
        status: draft.status,
        completed_date: (draft.status == SubtaskStatus::Done).then_some(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Location;
    use crate::models::Priority;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn store() -> BoardStore {
        BoardStore::seeded().with_clock(fixed_today)
    }

    fn ids(store: &BoardStore, column: &str) -> Vec<String> {
        store.board().columns[column].task_ids.clone()
    }

    #[test]
    fn test_same_slot_is_noop() {
        let mut s = store();
        let before = s.board().clone();
        assert_eq!(s.move_task("task-1", "column-1", 0, "column-1", 0), Ok(Moved::Unchanged));
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn test_move_into_completed_sets_date() {
        let mut s = store();
        let moved = s.move_task("task-2", "column-2", 0, "column-3", 0).unwrap();
        assert_eq!(moved, Moved::Relocated { to_title: "Concluído".to_string() });
        assert_eq!(ids(&s, "column-2"), vec!["task-4"]);
        assert_eq!(ids(&s, "column-3"), vec!["task-2", "task-3"]);
        assert_eq!(s.task("task-2").unwrap().completed_date, Some(fixed_today()));
        s.board().check_invariants().unwrap();
    }

    #[test]
    fn test_move_pending_task_into_middle_of_in_progress() {
        let mut s = store();
        let moved = s.move_task("task-1", "column-1", 0, "column-2", 1).unwrap();
        assert_eq!(moved, Moved::Relocated { to_title: "Em Andamento".to_string() });
        assert_eq!(ids(&s, "column-1"), vec!["task-5"]);
        assert_eq!(ids(&s, "column-2"), vec!["task-2", "task-1", "task-4"]);
        assert_eq!(s.task("task-1").unwrap().completed_date, None);
    }

    #[test]
    fn test_move_in_progress_task_behind_completed_one() {
        let mut s = store();
        s.move_task("task-4", "column-2", 1, "column-3", 1).unwrap();
        assert_eq!(ids(&s, "column-2"), vec!["task-2"]);
        assert_eq!(ids(&s, "column-3"), vec!["task-3", "task-4"]);
        assert_eq!(s.task("task-4").unwrap().completed_date, Some(fixed_today()));
    }

    #[test]
    fn test_overdue_follows_completed_column() {
        // task-3 有完成日期，但完成列改成了 column-2
        let s = store().with_completed_column("column-2").unwrap();
        assert!(s.is_overdue("task-3"));
        assert!(!s.is_overdue("task-2"));
        assert!(s.is_overdue("task-1"));

        let s = store();
        assert!(!s.is_overdue("task-3"));
        assert!(s.is_overdue("task-2"));
        assert!(!s.is_overdue("missing"));
    }

    #[test]
    fn test_move_into_completed_keeps_existing_date() {
        let mut s = store();
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        s.board.tasks.get_mut("task-1").unwrap().completed_date = Some(earlier);
        s.move_task("task-1", "column-1", 0, "column-3", 1).unwrap();
        assert_eq!(s.task("task-1").unwrap().completed_date, Some(earlier));
    }

    #[test]
    fn test_move_out_of_completed_clears_date() {
        let mut s = store();
        assert!(s.task("task-3").unwrap().completed_date.is_some());
        s.move_task("task-3", "column-3", 0, "column-1", 1).unwrap();
        assert_eq!(s.task("task-3").unwrap().completed_date, None);
        assert_eq!(ids(&s, "column-1"), vec!["task-1", "task-3", "task-5"]);
    }

    #[test]
    fn test_reorder_inside_completed_keeps_date() {
        let mut s = store();
        s.move_task("task-2", "column-2", 0, "column-3", 1).unwrap();
        let date = s.task("task-3").unwrap().completed_date;
        s.move_task("task-3", "column-3", 0, "column-3", 1).unwrap();
        assert_eq!(ids(&s, "column-3"), vec!["task-2", "task-3"]);
        assert_eq!(s.task("task-3").unwrap().completed_date, date);
    }

    #[test]
    fn test_same_column_move_right_uses_post_removal_index() {
        let mut s = store();
        s.create_task(TaskDraft::new("Extra", fixed_today())).unwrap();
        let extra = ids(&s, "column-1")[2].clone();
        // [task-1, task-5, extra]：移出 0 号后插到 2
        assert_eq!(s.move_task("task-1", "column-1", 0, "column-1", 2), Ok(Moved::Reordered));
        assert_eq!(ids(&s, "column-1"), vec!["task-5".to_string(), extra, "task-1".to_string()]);
    }

    #[test]
    fn test_destination_index_is_clamped() {
        let mut s = store();
        s.move_task("task-1", "column-1", 0, "column-2", 99).unwrap();
        assert_eq!(ids(&s, "column-2"), vec!["task-2", "task-4", "task-1"]);
    }

    #[test]
    fn test_wrong_source_is_rejected_without_change() {
        let mut s = store();
        let before = s.board().clone();
        let err = s.move_task("task-1", "column-1", 1, "column-2", 0).unwrap_err();
        assert!(matches!(err, BoardError::NotAtSource { .. }));
        assert_eq!(
            s.move_task("task-1", "column-1", 0, "column-9", 0),
            Err(BoardError::ColumnNotFound("column-9".to_string()))
        );
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn test_cancelled_drop_is_noop() {
        let mut s = store();
        let before = s.board().clone();
        let event = DropEvent::new("task-1", Location::new("column-1", 0), None);
        assert_eq!(s.apply_drop(&event), Ok(Moved::Unchanged));
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn test_drop_moves_task() {
        let mut s = store();
        let event = DropEvent::new(
            "task-5",
            Location::new("column-1", 1),
            Some(Location::new("column-2", 1)),
        );
        s.apply_drop(&event).unwrap();
        assert_eq!(ids(&s, "column-2"), vec!["task-2", "task-5", "task-4"]);
    }

    #[test]
    fn test_move_adjacent_appends_and_stops_at_edges() {
        let mut s = store();
        assert_eq!(s.move_adjacent("task-1", -1), Ok(Moved::Unchanged));
        s.move_adjacent("task-1", 1).unwrap();
        assert_eq!(ids(&s, "column-2"), vec!["task-2", "task-4", "task-1"]);
        s.move_adjacent("task-1", 1).unwrap();
        assert_eq!(s.task("task-1").unwrap().completed_date, Some(fixed_today()));
        assert_eq!(s.move_adjacent("task-1", 1), Ok(Moved::Unchanged));
    }

    #[test]
    fn test_reorder_within_column() {
        let mut s = store();
        assert_eq!(s.reorder("task-1", -1), Ok(Moved::Unchanged));
        assert_eq!(s.reorder("task-1", 1), Ok(Moved::Reordered));
        assert_eq!(ids(&s, "column-1"), vec!["task-5", "task-1"]);
        assert_eq!(s.reorder("task-1", 1), Ok(Moved::Unchanged));
    }

    #[test]
    fn test_create_task_goes_to_first_column() {
        let mut s = store();
        let id = s
            .create_task(
                TaskDraft::new("  Calibrar sensores ", fixed_today())
                    .with_priority(Priority::Urgent)
                    .with_department("Qualidade"),
            )
            .unwrap();
        let task = s.task(&id).unwrap();
        assert_eq!(task.title, "Calibrar sensores");
        assert_eq!(task.created_at, fixed_today());
        assert_eq!(task.completed_date, None);
        assert_eq!(ids(&s, "column-1").last(), Some(&id));
        s.board().check_invariants().unwrap();
    }

    #[test]
    fn test_create_task_requires_title() {
        let mut s = store();
        let before = s.board().clone();
        assert_eq!(
            s.create_task(TaskDraft::new("   ", fixed_today())),
            Err(BoardError::TitleRequired)
        );
        assert_eq!(s.board(), &before);
    }

    #[test]
    fn test_update_task_merges_fields() {
        let mut s = store();
        let patch = TaskPatch {
            title: Some("Auditoria ISO".to_string()),
            priority: Some(Priority::Urgent),
            ..TaskPatch::default()
        };
        s.update_task("task-2", patch).unwrap();
        let task = s.task("task-2").unwrap();
        assert_eq!(task.title, "Auditoria ISO");
        assert_eq!(task.priority, Priority::Urgent);
        assert!(task.description.contains("ISO"));
        assert_eq!(s.column_of("task-2").unwrap().id, "column-2");
    }

    #[test]
    fn test_update_task_rejects_blank_title_and_unknown_id() {
        let mut s = store();
        let blank = TaskPatch {
            title: Some(" ".to_string()),
            ..TaskPatch::default()
        };
        assert_eq!(s.update_task("task-2", blank), Err(BoardError::TitleRequired));
        assert_eq!(
            s.update_task("nope", TaskPatch::default()),
            Err(BoardError::TaskNotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_delete_task_is_idempotent() {
        let mut s = store();
        assert!(s.delete_task("task-4"));
        assert!(!s.delete_task("task-4"));
        assert_eq!(ids(&s, "column-2"), vec!["task-2"]);
        s.board().check_invariants().unwrap();
    }

    #[test]
    fn test_subtask_lifecycle() {
        let mut s = store();
        let due = fixed_today();
        assert_eq!(
            s.add_subtask("task-1", SubtaskDraft::new("", due)),
            Err(BoardError::SubtaskTitleRequired)
        );
        let idx = s.add_subtask("task-1", SubtaskDraft::new("Trocar filtros", due)).unwrap();
        assert_eq!(idx, 0);

        s.set_subtask_status("task-1", 0, SubtaskStatus::Done).unwrap();
        assert_eq!(s.task("task-1").unwrap().subtasks[0].completed_date, Some(due));
        s.set_subtask_status("task-1", 0, SubtaskStatus::InProgress).unwrap();
        assert_eq!(s.task("task-1").unwrap().subtasks[0].completed_date, None);

        let patch = SubtaskPatch {
            title: Some("Trocar filtros de ar".to_string()),
            ..SubtaskPatch::default()
        };
        s.update_subtask("task-1", 0, patch).unwrap();
        assert_eq!(s.task("task-1").unwrap().subtasks[0].title, "Trocar filtros de ar");

        assert!(matches!(
            s.set_subtask_status("task-1", 3, SubtaskStatus::Done),
            Err(BoardError::SubtaskNotFound { index: 3, .. })
        ));
        let removed = s.delete_subtask("task-1", 0).unwrap();
        assert_eq!(removed.title, "Trocar filtros de ar");
        assert!(s.task("task-1").unwrap().subtasks.is_empty());
    }

    #[test]
    fn test_completed_column_must_exist() {
        assert!(BoardStore::seeded().with_completed_column("column-9").is_err());
        let s = BoardStore::seeded().with_completed_column("column-2").unwrap();
        assert_eq!(s.completed_column(), "column-2");
    }
}

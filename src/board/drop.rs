use serde::{Deserialize, Serialize};

use crate::models::{ColumnId, TaskId};

/// 看板上的一个位置：列和列内索引
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub column_id: ColumnId,
    pub index: usize,
}

impl Location {
    pub fn new(column_id: impl Into<String>, index: usize) -> Self {
        Self {
            column_id: column_id.into(),
            index,
        }
    }
}

/// 拖拽结束事件，取消时 `destination` 为 `None`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEvent {
    pub dragged_id: TaskId,
    pub source: Location,
    pub destination: Option<Location>,
}

impl DropEvent {
    pub fn new(dragged_id: impl Into<String>, source: Location, destination: Option<Location>) -> Self {
        Self {
            dragged_id: dragged_id.into(),
            source,
            destination,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.destination.is_none()
    }
}

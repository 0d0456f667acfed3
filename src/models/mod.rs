pub mod column;
pub mod project;
pub mod task;
pub mod user;

pub use column::{Column, ColumnId};
pub use project::{Project, ProjectDraft, ProjectStatus};
pub use task::{
    Priority, Subtask, SubtaskDraft, SubtaskPatch, SubtaskStatus, Task, TaskDraft, TaskId,
    TaskPatch,
};
pub use user::{PasswordHash, Role, User, UserStatus};

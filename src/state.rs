/// 会话状态持久化
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

use crate::session::Identity;

/// 会话文件内容（不含任何密码信息）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<Identity>,
}

/// 获取会话文件路径
/// All platforms: ~/.taskpro/session.json
pub fn get_session_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".taskpro").join("session.json"))
}

/// 保存会话到文件
pub fn save_state(path: &Path, state: &SessionState) -> io::Result<()> {
    // 确保目录存在
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)
}

/// 从文件加载会话，文件不存在时返回未登录状态
pub fn load_state(path: &Path) -> io::Result<SessionState> {
    if !path.exists() {
        return Ok(SessionState::default());
    }
    let content = std::fs::read_to_string(path)?;
    let state: SessionState = serde_json::from_str(&content)?;
    Ok(state)
}

/// 删除会话文件，文件不存在不算错误
pub fn clear_state(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

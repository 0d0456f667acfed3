//! 应用会话：当前登录的用户
//!
//! 会话由调用方持有。`init` 从会话文件恢复，`login` 用 [`UserDirectory`] 校验密码，
//! `logout` 删除文件。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Role, User};
use crate::state::{self, SessionState};
use crate::users::UserDirectory;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("account {0} is inactive")]
    InactiveUser(String),
    /// 未登录时访问受保护的视图
    #[error("access denied: please log in")]
    NotAuthenticated,
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
}

/// 当前登录用户，跨启动保存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 管理员可以删除任何任务，其他人只能删除自己创建的
    pub fn can_delete_task(&self, created_by: Option<&str>) -> bool {
        self.is_admin() || created_by.is_some_and(|c| c.eq_ignore_ascii_case(&self.email))
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            department: user.department.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
enum SessionStatus {
    #[default]
    LoggedOut,
    LoggedIn(Identity),
}

#[derive(Debug, Clone)]
pub struct Session {
    path: Option<PathBuf>,
    status: SessionStatus,
}

impl Session {
    /// 不写磁盘的会话
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            status: SessionStatus::LoggedOut,
        }
    }

    /// 从 `path` 恢复会话，文件不存在视为未登录
    pub fn init(path: &Path) -> Result<Self, SessionError> {
        let stored = state::load_state(path)?;
        let status = match stored {
            SessionState {
                logged_in: true,
                user: Some(identity),
            } => SessionStatus::LoggedIn(identity),
            _ => SessionStatus::LoggedOut,
        };
        debug!(path = %path.display(), logged_in = matches!(status, SessionStatus::LoggedIn(_)), "session restored");
        Ok(Self {
            path: Some(path.to_path_buf()),
            status,
        })
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.status {
            SessionStatus::LoggedIn(identity) => Some(identity),
            SessionStatus::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.identity().is_some()
    }

    /// 路由守卫
    pub fn require(&self) -> Result<&Identity, SessionError> {
        self.identity().ok_or(SessionError::NotAuthenticated)
    }

    /// 校验活跃用户的密码并保存身份
    ///
    /// 邮箱不存在和密码错误都返回 [`SessionError::InvalidCredentials`]。
    pub fn login(
        &mut self,
        users: &UserDirectory,
        email: &str,
        password: &str,
    ) -> Result<&Identity, SessionError> {
        let Some(user) = users.find_by_email(email) else {
            warn!(email, "login with unknown email");
            return Err(SessionError::InvalidCredentials);
        };
        if !user.password.verify(password) {
            warn!(email, "login with wrong password");
            return Err(SessionError::InvalidCredentials);
        }
        if !user.is_active() {
            warn!(email, "login for inactive account");
            return Err(SessionError::InactiveUser(user.email.clone()));
        }

        let identity = Identity::from(user);
        if let Some(path) = &self.path {
            state::save_state(
                path,
                &SessionState {
                    logged_in: true,
                    user: Some(identity.clone()),
                },
            )?;
        }
        info!(user = %identity.email, "logged in");
        self.status = SessionStatus::LoggedIn(identity);
        self.require()
    }

    /// 清除身份并删除会话文件
    pub fn logout(&mut self) -> Result<(), SessionError> {
        if let Some(identity) = self.identity() {
            info!(user = %identity.email, "logged out");
        }
        self.status = SessionStatus::LoggedOut;
        if let Some(path) = &self.path {
            state::clear_state(path)?;
        }
        Ok(())
    }

    /// 按用户目录刷新当前用户
    ///
    /// 用户已删除或停用时退出登录，否则同步姓名、邮箱、角色和部门。
    /// 返回是否仍在登录状态。
    pub fn refresh(&mut self, users: &UserDirectory) -> Result<bool, SessionError> {
        let Some(current) = self.identity() else {
            return Ok(false);
        };
        let Some(user) = users.get(&current.id).filter(|u| u.is_active()) else {
            warn!(user = %current.email, "account gone or inactive, ending session");
            self.logout()?;
            return Ok(false);
        };

        let fresh = Identity::from(user);
        if self.identity() == Some(&fresh) {
            return Ok(true);
        }
        if let Some(path) = &self.path {
            state::save_state(
                path,
                &SessionState {
                    logged_in: true,
                    user: Some(fresh.clone()),
                },
            )?;
        }
        debug!(user = %fresh.email, "session identity refreshed");
        self.status = SessionStatus::LoggedIn(fresh);
        Ok(true)
    }
}

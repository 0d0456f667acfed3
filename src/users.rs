//! 内存中的用户目录

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{PasswordHash, Role, User, UserStatus};
use crate::session::Identity;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// 创建时姓名、邮箱、密码必填；更新时只要求姓名和邮箱
    #[error("{0} is required")]
    Required(&'static str),
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("email already registered: {0}")]
    DuplicateEmail(String),
    #[error("user not found: {0}")]
    NotFound(String),
    #[error("cannot remove the last administrator")]
    LastAdmin,
    /// 只有管理员可以管理密码
    #[error("only administrators can manage passwords")]
    NotAdmin,
    #[error("new password cannot be empty")]
    EmptyPassword,
}

/// 新账号，密码插入时哈希，原文随后丢弃
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub status: UserStatus,
    pub password: String,
}

/// 账号的部分更新，`None` 保持原值
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置账号
    #[must_use]
    pub fn seeded() -> Self {
        let seed = [
            ("1", "Admin User", "admin@example.com", "Administração", Role::Admin, UserStatus::Active, "password"),
            ("2", "João Silva", "joao.silva@example.com", "Manutenção", Role::User, UserStatus::Active, "joao123"),
            ("3", "Maria Santos", "maria.santos@example.com", "Qualidade", Role::User, UserStatus::Active, "maria123"),
            ("4", "Carlos Oliveira", "carlos.oliveira@example.com", "Inovação", Role::Admin, UserStatus::Active, "carlos123"),
            ("5", "Ana Costa", "ana.costa@example.com", "Produção", Role::User, UserStatus::Inactive, "ana123"),
            ("6", "Pedro Alves", "pedro.alves@example.com", "Manutenção", Role::User, UserStatus::Active, "pedro123"),
        ];
        let users = seed
            .into_iter()
            .map(|(id, name, email, department, role, status, password)| User {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                department: department.to_string(),
                role,
                status,
                password: PasswordHash::new(password),
            })
            .collect();
        Self { users }
    }

    pub fn all(&self) -> &[User] {
        &self.users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// 按邮箱查找，忽略大小写
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim();
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    /// 姓名、邮箱或部门包含 `term` 的用户，忽略大小写
    pub fn search(&self, term: &str) -> Vec<&User> {
        let term = term.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                term.is_empty()
                    || u.name.to_lowercase().contains(&term)
                    || u.email.to_lowercase().contains(&term)
                    || u.department.to_lowercase().contains(&term)
            })
            .collect()
    }

    pub fn add_user(&mut self, new: NewUser) -> Result<String, UserError> {
        let name = required(&new.name, "name")?;
        let email = required(&new.email, "email")?;
        if new.password.trim().is_empty() {
            return Err(UserError::Required("password"));
        }
        self.check_email(&email, None)?;

        let id = Uuid::new_v4().to_string();
        self.users.push(User {
            id: id.clone(),
            name,
            email,
            department: new.department.trim().to_string(),
            role: new.role,
            status: new.status,
            password: PasswordHash::new(&new.password),
        });
        info!(user_id = %id, "user added");
        Ok(id)
    }

    /// 降级唯一的管理员时返回 [`UserError::LastAdmin`]
    pub fn update_user(&mut self, id: &str, patch: UserPatch) -> Result<(), UserError> {
        let current = self
            .get(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        let name = patch.name.as_deref().map(|n| required(n, "name")).transpose()?;
        let email = patch.email.as_deref().map(|e| required(e, "email")).transpose()?;
        if let Some(email) = &email {
            self.check_email(email, Some(id))?;
        }
        if current.is_admin() && patch.role == Some(Role::User) && self.admin_count() == 1 {
            warn!(user_id = id, "refused to demote last admin");
            return Err(UserError::LastAdmin);
        }

        let Some(user) = self.users.iter_mut().find(|u| u.id == id) else {
            return Err(UserError::NotFound(id.to_string()));
        };
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(department) = patch.department {
            user.department = department.trim().to_string();
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(status) = patch.status {
            user.status = status;
        }
        info!(user_id = id, "user updated");
        Ok(())
    }

    pub fn delete_user(&mut self, id: &str) -> Result<User, UserError> {
        let pos = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        if self.users[pos].is_admin() && self.admin_count() == 1 {
            warn!(user_id = id, "refused to delete last admin");
            return Err(UserError::LastAdmin);
        }
        info!(user_id = id, "user deleted");
        Ok(self.users.remove(pos))
    }

    /// `actor` 当前是否为目录中的活跃管理员，不信任登录时记录的角色
    pub fn is_active_admin(&self, actor: &Identity) -> bool {
        self.get(&actor.id)
            .is_some_and(|user| user.is_admin() && user.is_active())
    }

    /// 修改用户密码，仅限活跃管理员
    pub fn set_password(
        &mut self,
        actor: &Identity,
        id: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        if !self.is_active_admin(actor) {
            warn!(actor = %actor.email, "password change denied");
            return Err(UserError::NotAdmin);
        }
        if new_password.trim().is_empty() {
            return Err(UserError::EmptyPassword);
        }
        let user = self
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        user.password = PasswordHash::new(new_password);
        info!(user_id = id, actor = %actor.email, "password changed");
        Ok(())
    }

    fn admin_count(&self) -> usize {
        self.users.iter().filter(|u| u.is_admin()).count()
    }

    fn check_email(&self, email: &str, except_id: Option<&str>) -> Result<(), UserError> {
        if !is_valid_email(email) {
            return Err(UserError::InvalidEmail(email.to_string()));
        }
        let taken = self
            .users
            .iter()
            .any(|u| Some(u.id.as_str()) != except_id && u.email.eq_ignore_ascii_case(email));
        if taken {
            return Err(UserError::DuplicateEmail(email.to_string()));
        }
        Ok(())
    }
}

fn required(value: &str, field: &'static str) -> Result<String, UserError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UserError::Required(field));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Identity {
        Identity {
            id: "1".to_string(),
            name: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            department: "Administração".to_string(),
        }
    }

    fn new_user(name: &str, email: &str, password: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            department: "Produção".to_string(),
            password: password.to_string(),
            ..NewUser::default()
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@c.com"));
    }

    #[test]
    fn test_add_user_validates_required_fields() {
        let mut dir = UserDirectory::seeded();
        assert_eq!(
            dir.add_user(new_user(" ", "x@y.com", "pw")),
            Err(UserError::Required("name"))
        );
        assert_eq!(
            dir.add_user(new_user("X", "", "pw")),
            Err(UserError::Required("email"))
        );
        assert_eq!(
            dir.add_user(new_user("X", "x@y.com", "")),
            Err(UserError::Required("password"))
        );
        assert_eq!(dir.len(), 6);
    }

    #[test]
    fn test_add_user_rejects_bad_and_duplicate_email() {
        let mut dir = UserDirectory::seeded();
        assert!(matches!(
            dir.add_user(new_user("X", "not-an-email", "pw")),
            Err(UserError::InvalidEmail(_))
        ));
        assert!(matches!(
            dir.add_user(new_user("X", "Maria.Santos@example.com", "pw")),
            Err(UserError::DuplicateEmail(_))
        ));
        let id = dir.add_user(new_user("Lúcia", "lucia@example.com", "pw")).unwrap();
        let user = dir.get(&id).unwrap();
        assert!(user.password.verify("pw"));
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_update_user_email_must_stay_unique() {
        let mut dir = UserDirectory::seeded();
        let taken = UserPatch {
            email: Some("joao.silva@example.com".to_string()),
            ..UserPatch::default()
        };
        assert!(matches!(dir.update_user("3", taken), Err(UserError::DuplicateEmail(_))));

        let own = UserPatch {
            email: Some("maria.santos@example.com".to_string()),
            name: Some("Maria S.".to_string()),
            ..UserPatch::default()
        };
        dir.update_user("3", own).unwrap();
        assert_eq!(dir.get("3").unwrap().name, "Maria S.");
    }

    #[test]
    fn test_update_user_rejects_blank_name() {
        let mut dir = UserDirectory::seeded();
        let patch = UserPatch {
            name: Some("".to_string()),
            ..UserPatch::default()
        };
        assert_eq!(dir.update_user("2", patch), Err(UserError::Required("name")));
    }

    #[test]
    fn test_last_admin_cannot_be_deleted() {
        let mut dir = UserDirectory::seeded();
        dir.delete_user("4").unwrap();
        assert_eq!(dir.delete_user("1").unwrap_err(), UserError::LastAdmin);
        let demote = UserPatch {
            role: Some(Role::User),
            ..UserPatch::default()
        };
        assert_eq!(dir.update_user("1", demote), Err(UserError::LastAdmin));
        assert!(dir.delete_user("2").is_ok());
        assert_eq!(dir.delete_user("2"), Err(UserError::NotFound("2".to_string())));
    }

    #[test]
    fn test_only_admins_set_passwords() {
        let mut dir = UserDirectory::seeded();
        let joao = Identity::from(dir.get("2").unwrap());
        assert_eq!(dir.set_password(&joao, "3", "nova"), Err(UserError::NotAdmin));
        // 身份里的角色被篡改也没用，以目录为准
        let mut forged = joao.clone();
        forged.role = Role::Admin;
        assert_eq!(dir.set_password(&forged, "3", "nova"), Err(UserError::NotAdmin));
        assert_eq!(dir.set_password(&admin(), "2", "  "), Err(UserError::EmptyPassword));
        dir.set_password(&admin(), "2", "nova").unwrap();
        assert!(dir.get("2").unwrap().password.verify("nova"));
        assert!(!dir.get("2").unwrap().password.verify("joao123"));
    }

    #[test]
    fn test_demoted_or_deleted_admin_loses_password_rights() {
        let mut dir = UserDirectory::seeded();
        let carlos = Identity::from(dir.get("4").unwrap());
        dir.set_password(&carlos, "2", "primeira").unwrap();

        let demote = UserPatch {
            role: Some(Role::User),
            ..UserPatch::default()
        };
        dir.update_user("4", demote).unwrap();
        assert_eq!(dir.set_password(&carlos, "2", "outra"), Err(UserError::NotAdmin));
        assert!(dir.get("2").unwrap().password.verify("primeira"));

        let mut dir = UserDirectory::seeded();
        dir.delete_user("4").unwrap();
        assert_eq!(dir.set_password(&carlos, "2", "outra"), Err(UserError::NotAdmin));

        let mut dir = UserDirectory::seeded();
        let deactivate = UserPatch {
            status: Some(UserStatus::Inactive),
            ..UserPatch::default()
        };
        dir.update_user("4", deactivate).unwrap();
        assert!(!dir.is_active_admin(&carlos));
    }

    #[test]
    fn test_search_covers_name_email_department() {
        let dir = UserDirectory::seeded();
        assert_eq!(dir.search("manutenção").len(), 2);
        assert_eq!(dir.search("CARLOS").len(), 1);
        assert_eq!(dir.search("example.com").len(), 6);
        assert_eq!(dir.search("").len(), 6);
    }

    #[test]
    fn test_find_by_email_ignores_case() {
        let dir = UserDirectory::seeded();
        assert_eq!(dir.find_by_email(" ADMIN@example.com").map(|u| u.id.as_str()), Some("1"));
        assert!(dir.find_by_email("nobody@example.com").is_none());
    }
}

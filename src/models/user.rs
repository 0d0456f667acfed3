use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "Usuário",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" | "usuário" | "usuario" => Ok(Role::User),
            other => Err(format!("unknown role '{}' (expected admin or user)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Active => "Ativo",
            UserStatus::Inactive => "Inativo",
        }
    }
}

impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" | "ativo" => Ok(UserStatus::Active),
            "inactive" | "inativo" => Ok(UserStatus::Inactive),
            other => Err(format!("unknown status '{}' (expected active or inactive)", other)),
        }
    }
}

/// 密码的加盐 SHA-256 摘要，不保存原文
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
    salt: String,
    digest: String,
}

impl PasswordHash {
    pub fn new(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = digest(&salt, password);
        Self { salt, digest }
    }

    pub fn verify(&self, password: &str) -> bool {
        digest(&self.salt, password) == self.digest
    }
}

// 不输出摘要内容
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub role: Role,
    pub status: UserStatus,
    pub password: PasswordHash,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_verifies_only_the_original() {
        let hash = PasswordHash::new("admin123");
        assert!(hash.verify("admin123"));
        assert!(!hash.verify("admin124"));
        assert!(!hash.verify(""));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let a = PasswordHash::new("secret");
        let b = PasswordHash::new("secret");
        assert_ne!(a, b);
        assert!(a.verify("secret") && b.verify("secret"));
    }

    #[test]
    fn test_password_hash_debug_hides_digest() {
        let hash = PasswordHash::new("secret");
        assert_eq!(format!("{:?}", hash), "PasswordHash(..)");
    }
}

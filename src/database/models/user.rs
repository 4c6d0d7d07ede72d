use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ValidationError;
use crate::database::repository::{Model, Record};

/// Roles approved to sign in. A user without a role is registered but not yet approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Leader,
    Material,
    Travel,
    Cost,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Admin, Role::Leader, Role::Material, Role::Travel, Role::Cost];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Leader => "LEADER",
            Role::Material => "MATERIAL",
            Role::Travel => "TRAVEL",
            Role::Cost => "COST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == trimmed)
            .ok_or_else(|| {
                let allowed: Vec<String> = Role::ALL.iter().map(|r| format!("\"{}\"", r)).collect();
                ValidationError::new(format!(
                    "User Role must be include one of {}.",
                    allowed.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    #[default]
    Free,
    Premium,
}

impl Membership {
    pub fn as_str(&self) -> &'static str {
        match self {
            Membership::Free => "free",
            Membership::Premium => "premium",
        }
    }
}

impl FromStr for Membership {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "free" => Ok(Membership::Free),
            "premium" => Ok(Membership::Premium),
            _ => Err(ValidationError::new(
                "Membership must be one of \"free\", \"premium\"",
            )),
        }
    }
}

/// Stored user document. `password` holds the bcrypt hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub membership: Membership,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
    pub password: String,
}

impl User {
    pub fn full_name(first_name: &str, last_name: &str) -> String {
        format!("{} {}", first_name, last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

impl Model for User {
    const COLLECTION: &'static str = "users";
}

/// User fields safe to return to clients
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: Option<Role>,
    pub membership: Membership,
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl From<&Record<User>> for UserProfile {
    fn from(record: &Record<User>) -> Self {
        let user = &record.data;
        Self {
            id: record.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            role: user.role,
            membership: user.membership,
            expiration_date: user.expiration_date,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Populated reference to a user, as embedded in posts and comments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<&Record<User>> for UserSummary {
    fn from(record: &Record<User>) -> Self {
        Self {
            id: record.id,
            name: record.data.name.clone(),
            avatar: record.data.avatar.clone(),
        }
    }
}

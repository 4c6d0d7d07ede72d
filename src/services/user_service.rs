use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{self, AuthError, Claims};
use crate::config::SecurityConfig;
use crate::database::models::{Membership, Role, User, UserProfile, ValidationError};
use crate::database::{Filter, FindQuery, Record, Repository, StoreError};

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Can't register this user. this email used by someone.")]
    DuplicateEmail,

    #[error("Authentication error.")]
    UnknownEmail,

    #[error("Password didn't match.")]
    PasswordMismatch,

    #[error("You didn't approved by admin.")]
    NotApproved,

    #[error("There is not {0} user.")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// Registration payload. Every field is optional so missing ones produce
/// the field-specific message instead of a deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub membership: Option<String>,
    pub expiration_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginUser {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignRole {
    pub id: Option<String>,
    pub role: Option<String>,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
    pub membership: Option<String>,
    /// `null` clears the date, absence keeps it
    #[serde(default, deserialize_with = "deserialize_some")]
    pub expiration_date: Option<Option<DateTime<Utc>>>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Returned by registration; never carries the password
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Option<Role>,
    pub name: String,
    pub phone_number: String,
    pub address: String,
    pub membership: Membership,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl From<&Record<User>> for RegisteredUser {
    fn from(record: &Record<User>) -> Self {
        let user = &record.data;
        Self {
            user_id: record.id,
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
            membership: user.membership,
            expiration_date: user.expiration_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub user: SessionUser,
    #[serde(rename = "JWT_token")]
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<UserProfile>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

/// User registration, login and administration over the users collection
#[derive(Clone)]
pub struct UserService {
    users: Repository<User>,
    security: SecurityConfig,
}

impl UserService {
    pub fn new(users: Repository<User>, security: SecurityConfig) -> Self {
        Self { users, security }
    }

    /// Register with a random temporary password. New users have no role
    /// and cannot sign in until an admin assigns one.
    pub async fn register(&self, input: RegisterUser) -> UserServiceResult<Record<User>> {
        let first_name = required(input.first_name, "First name must not be empty")?;
        let last_name = required(input.last_name, "Last name must not be empty")?;
        let email = normalize_email(input.email).ok_or_else(invalid_fields)?;
        let phone_number = required(input.phone_number, "Phone number must not be empty")?;
        let address = required(input.address, "Address must not be empty")?;
        let membership: Membership =
            required(input.membership, "Membership must not be empty")?.parse()?;

        let password = auth::generate_temporary_password();
        let user = User {
            name: User::full_name(&first_name, &last_name),
            first_name,
            last_name,
            email,
            phone_number,
            address,
            avatar: None,
            bio: None,
            role: None,
            membership,
            expiration_date: input.expiration_date,
            password: String::new(),
        };

        self.insert(user, &password).await
    }

    /// Insert a user with a chosen password and role, bypassing registration
    pub async fn create_with_password(
        &self,
        mut user: User,
        password: &str,
    ) -> UserServiceResult<Record<User>> {
        if password.trim().is_empty() {
            return Err(ValidationError::new("Password must not be empty").into());
        }
        user.email = normalize_email(Some(user.email)).ok_or_else(invalid_fields)?;
        user.name = User::full_name(&user.first_name, &user.last_name);
        self.insert(user, password).await
    }

    async fn insert(&self, mut user: User, password: &str) -> UserServiceResult<Record<User>> {
        if self.find_by_email(&user.email).await?.is_some() {
            return Err(UserServiceError::DuplicateEmail);
        }

        user.password = auth::hash_password(password, self.security.bcrypt_cost).await?;
        let record = match self.users.create_unique("email", &user).await {
            Err(StoreError::Duplicate { .. }) => return Err(UserServiceError::DuplicateEmail),
            other => other?,
        };
        tracing::info!("Registered user {} ({})", record.id, record.data.email);
        Ok(record)
    }

    pub async fn login(&self, input: LoginUser) -> UserServiceResult<LoginOutcome> {
        let email = normalize_email(input.email).ok_or_else(invalid_fields)?;
        let password = match input.password {
            Some(p) if !p.is_empty() => p,
            _ => return Err(ValidationError::new("Password must not be empty").into()),
        };

        let record = self
            .find_by_email(&email)
            .await?
            .ok_or(UserServiceError::UnknownEmail)?;

        if !auth::verify_password(&password, &record.data.password).await? {
            tracing::info!("Password mismatch for {}", email);
            return Err(UserServiceError::PasswordMismatch);
        }

        let role = record.data.role.ok_or(UserServiceError::NotApproved)?;
        let user = &record.data;
        let claims = Claims::new(
            record.id,
            user.name.clone(),
            role,
            user.email.clone(),
            self.security.jwt_expiry_hours,
        );
        let token = auth::generate_jwt(&claims, &self.security)?;

        Ok(LoginOutcome {
            user: SessionUser {
                id: record.id,
                name: user.name.clone(),
                email: user.email.clone(),
                avatar: user.avatar.clone(),
                role,
            },
            token,
        })
    }

    pub async fn find_by_email(&self, email: &str) -> UserServiceResult<Option<Record<User>>> {
        let filter = FindQuery::all().filter("email", email.trim().to_lowercase()).filter;
        Ok(self.users.find_one(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> UserServiceResult<Record<User>> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))
    }

    /// One page of users, oldest first. `page` is 1-based.
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        membership: Option<Membership>,
    ) -> UserServiceResult<UserPage> {
        let mut filter = Filter::new();
        if let Some(membership) = membership {
            filter.insert("membership".to_string(), json!(membership));
        }

        let query = FindQuery {
            filter: filter.clone(),
            ..FindQuery::default()
        }
        .page(page.saturating_sub(1).saturating_mul(limit), limit);

        let records = self.users.find(&query).await?;
        let total = self.users.count(&filter).await?;

        Ok(UserPage {
            users: records.iter().map(UserProfile::from).collect(),
            total,
            page,
            limit,
        })
    }

    pub async fn assign_role(&self, input: AssignRole) -> UserServiceResult<Record<User>> {
        let id = required(input.id, "User Id must not be empty")?;
        let role: Role = required(input.role, "Role must not be empty")?.parse()?;
        let id = parse_user_id(&id)?;
        self.set_role(id, role).await
    }

    pub async fn set_role(&self, id: Uuid, role: Role) -> UserServiceResult<Record<User>> {
        let mut record = self.get(id).await?;
        record.data.role = Some(role);
        let updated = self.save(id, &record.data).await?;
        tracing::info!("Assigned role {} to user {}", role, id);
        Ok(updated)
    }

    pub async fn update(&self, id: &str, input: UpdateUser) -> UserServiceResult<Record<User>> {
        let id = parse_user_id(id)?;
        let mut user = self.get(id).await?.data;

        if let Some(first_name) = input.first_name {
            user.first_name = required(Some(first_name), "First name must not be empty")?;
        }
        if let Some(last_name) = input.last_name {
            user.last_name = required(Some(last_name), "Last name must not be empty")?;
        }
        if input.email.is_some() {
            let email = normalize_email(input.email).ok_or_else(invalid_fields)?;
            if email != user.email {
                if let Some(other) = self.find_by_email(&email).await? {
                    if other.id != id {
                        return Err(UserServiceError::DuplicateEmail);
                    }
                }
            }
            user.email = email;
        }
        if let Some(phone_number) = input.phone_number {
            user.phone_number = required(Some(phone_number), "Phone number must not be empty")?;
        }
        if let Some(address) = input.address {
            user.address = required(Some(address), "Address must not be empty")?;
        }
        if input.avatar.is_some() {
            user.avatar = input.avatar;
        }
        if input.bio.is_some() {
            user.bio = input.bio;
        }
        if let Some(role) = input.role {
            user.role = Some(role.parse()?);
        }
        if let Some(membership) = input.membership {
            user.membership = membership.parse()?;
        }
        if let Some(expiration_date) = input.expiration_date {
            user.expiration_date = expiration_date;
        }
        user.name = User::full_name(&user.first_name, &user.last_name);

        self.save(id, &user).await
    }

    pub async fn set_password(&self, id: Uuid, password: &str) -> UserServiceResult<Record<User>> {
        if password.trim().is_empty() {
            return Err(ValidationError::new("Password must not be empty").into());
        }
        let mut user = self.get(id).await?.data;
        user.password = auth::hash_password(password, self.security.bcrypt_cost).await?;
        self.save(id, &user).await
    }

    pub async fn delete(&self, id: &str) -> UserServiceResult<Record<User>> {
        let uuid = parse_user_id(id)?;
        let deleted = self
            .users
            .delete(uuid)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))?;
        tracing::info!("Deleted user {} ({})", deleted.id, deleted.data.email);
        Ok(deleted)
    }

    async fn save(&self, id: Uuid, user: &User) -> UserServiceResult<Record<User>> {
        self.users
            .update(id, user)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(id.to_string()))
    }
}

fn required(value: Option<String>, message: &str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::new(message)),
    }
}

fn invalid_fields() -> UserServiceError {
    ValidationError::new("Invalid fields").into()
}

fn normalize_email(email: Option<String>) -> Option<String> {
    let email = email?.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return None;
    }
    Some(email)
}

/// An id that is not a UUID cannot name a stored user
fn parse_user_id(id: &str) -> UserServiceResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| UserServiceError::NotFound(id.to_string()))
}

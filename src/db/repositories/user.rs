use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::users;

/// User data returned from repository (without the password hash)
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub registration_date: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            username: model.username,
            registration_date: model.registration_date,
        }
    }
}

/// Profile fields a user may change about themselves. `None` leaves the
/// stored value untouched; id, password and registration date are not
/// reachable through this type.
#[derive(Debug, Clone, Default)]
pub struct UserProfilePatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl UserProfilePatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    /// Get user by email (exact match)
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Get user by email with password hash (for login verification)
    pub async fn get_by_email_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    /// Create a new user with a hashed password and server-set
    /// registration date. Email uniqueness is enforced by the schema.
    pub async fn create(
        &self,
        email: &str,
        password: &str,
        config: &SecurityConfig,
    ) -> Result<User> {
        let password = password.to_string();
        let config = config.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, Some(&config)))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();

        let inserted = users::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash),
            registration_date: Set(now),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert user")?;

        Ok(User::from(inserted))
    }

    /// Apply a partial profile update. Returns `None` when the id does not
    /// resolve to a stored user.
    pub async fn update_profile(&self, id: i32, patch: UserProfilePatch) -> Result<Option<User>> {
        let Some(user) = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user for profile update")?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = user.into();
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(first_name) = patch.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = patch.last_name {
            active.last_name = Set(Some(last_name));
        }
        if let Some(username) = patch.username {
            active.username = Set(Some(username));
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(Some(User::from(updated)))
    }
}

/// Verify a plaintext password against a stored Argon2id hash.
/// Note: This uses `spawn_blocking` because Argon2 verification is
/// CPU-intensive and would block the async runtime if run directly.
pub async fn verify_password(password_hash: String, password: String) -> Result<bool> {
    let is_valid = task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        let argon2 = Argon2::default();
        Ok::<bool, anyhow::Error>(
            argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")??;

    Ok(is_valid)
}

/// Hash a password using Argon2id with optional custom params.
/// If config is None, uses the library defaults.
pub fn hash_password(password: &str, config: Option<&SecurityConfig>) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let argon2 = if let Some(cfg) = config {
        let params = Params::new(
            cfg.argon2_memory_cost_kib,
            cfg.argon2_time_cost,
            cfg.argon2_parallelism,
            None, // output length (use default)
        )
        .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    } else {
        Argon2::default()
    };

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify_round_trips() {
        let hash = hash_password("correct horse", None).unwrap();
        assert!(
            verify_password(hash.clone(), "correct horse".to_string())
                .await
                .unwrap()
        );
        assert!(
            !verify_password(hash, "wrong horse".to_string())
                .await
                .unwrap()
        );
    }

    #[test]
    fn patch_emptiness() {
        assert!(UserProfilePatch::default().is_empty());
        let patch = UserProfilePatch {
            username: Some("kestrel7".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}

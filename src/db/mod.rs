use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::campaign::CampaignPatch;
pub use repositories::user::{User, UserProfilePatch};

use crate::config::SecurityConfig;
use crate::entities::{auth_tokens, campaigns};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Each pooled connection to an in-memory SQLite database would see
        // its own empty database, so memory URLs get a single connection.
        let is_memory = db_url.contains(":memory:");
        let (max_connections, min_connections) = if is_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !is_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    fn campaign_repo(&self) -> repositories::campaign::CampaignRepository {
        repositories::campaign::CampaignRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo().create(email, password, security).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_email_with_password(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>> {
        self.user_repo().get_by_email_with_password(email).await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        patch: UserProfilePatch,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, patch).await
    }

    // ========== Tokens ==========

    pub async fn issue_token(&self, user_id: i32) -> Result<auth_tokens::Model> {
        self.token_repo().issue(user_id).await
    }

    pub async fn resolve_token(&self, token: &str) -> Result<Option<i32>> {
        self.token_repo().resolve_user_id(token).await
    }

    pub async fn revoke_tokens(&self, user_id: i32) -> Result<u64> {
        self.token_repo().revoke_for_user(user_id).await
    }

    // ========== Campaigns ==========

    pub async fn create_campaign(
        &self,
        name: &str,
        host_id: i32,
        start_date: Option<String>,
        accessibility: i32,
    ) -> Result<campaigns::Model> {
        self.campaign_repo()
            .create(name, host_id, start_date, accessibility)
            .await
    }

    pub async fn get_campaign(&self, id: i32) -> Result<Option<campaigns::Model>> {
        self.campaign_repo().get(id).await
    }

    pub async fn update_campaign(
        &self,
        id: i32,
        patch: CampaignPatch,
    ) -> Result<Option<campaigns::Model>> {
        self.campaign_repo().update(id, patch).await
    }

    pub async fn remove_campaign(&self, id: i32) -> Result<bool> {
        self.campaign_repo().remove(id).await
    }

    pub async fn attach_participant(&self, campaign_id: i32, user_id: i32) -> Result<bool> {
        self.campaign_repo()
            .attach_participant(campaign_id, user_id)
            .await
    }

    pub async fn detach_participant(&self, campaign_id: i32, user_id: i32) -> Result<bool> {
        self.campaign_repo()
            .detach_participant(campaign_id, user_id)
            .await
    }

    pub async fn campaign_participants(&self, campaign_id: i32) -> Result<Option<Vec<User>>> {
        self.campaign_repo().participants(campaign_id).await
    }

    pub async fn hosted_campaigns(&self, user_id: i32) -> Result<Vec<campaigns::Model>> {
        self.campaign_repo().hosted_by(user_id).await
    }

    pub async fn participated_campaigns(
        &self,
        user_id: i32,
    ) -> Result<Option<Vec<campaigns::Model>>> {
        self.campaign_repo().participated_by(user_id).await
    }
}

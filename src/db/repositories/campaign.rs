use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};

use super::user::User;
use crate::entities::{campaign_participants, campaigns, prelude::*, users};

/// Campaign fields an update request may carry. `None` leaves the stored
/// value untouched.
#[derive(Debug, Clone, Default)]
pub struct CampaignPatch {
    pub name: Option<String>,
    pub host_id: Option<i32>,
    pub start_date: Option<String>,
    pub accessibility: Option<i32>,
}

impl CampaignPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.host_id.is_none()
            && self.start_date.is_none()
            && self.accessibility.is_none()
    }
}

pub struct CampaignRepository {
    conn: DatabaseConnection,
}

impl CampaignRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Create a campaign hosted by `host_id`. Start date defaults to now,
    /// accessibility to private.
    pub async fn create(
        &self,
        name: &str,
        host_id: i32,
        start_date: Option<String>,
        accessibility: i32,
    ) -> Result<campaigns::Model> {
        let created = campaigns::ActiveModel {
            name: Set(name.to_string()),
            host_id: Set(host_id),
            start_date: Set(start_date.unwrap_or_else(|| chrono::Utc::now().to_rfc3339())),
            accessibility: Set(accessibility),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert campaign")?;

        Ok(created)
    }

    pub async fn get(&self, id: i32) -> Result<Option<campaigns::Model>> {
        let campaign = Campaigns::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query campaign by ID")?;

        Ok(campaign)
    }

    /// Apply a partial update. Returns `None` when the id does not resolve.
    /// Ownership and host-existence checks happen at the call site before
    /// anything is written.
    pub async fn update(&self, id: i32, patch: CampaignPatch) -> Result<Option<campaigns::Model>> {
        let Some(campaign) = Campaigns::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query campaign for update")?
        else {
            return Ok(None);
        };

        let mut active: campaigns::ActiveModel = campaign.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(host_id) = patch.host_id {
            active.host_id = Set(host_id);
        }
        if let Some(start_date) = patch.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(accessibility) = patch.accessibility {
            active.accessibility = Set(accessibility);
        }

        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update campaign")?;

        Ok(Some(updated))
    }

    /// Delete a campaign. Participant pivot rows go with it via cascade.
    pub async fn remove(&self, id: i32) -> Result<bool> {
        let res = Campaigns::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete campaign")?;

        Ok(res.rows_affected > 0)
    }

    /// Attach a user to a campaign. Returns `false` when the pair already
    /// exists (joining twice is a no-op).
    pub async fn attach_participant(&self, campaign_id: i32, user_id: i32) -> Result<bool> {
        let existing = CampaignParticipants::find()
            .filter(campaign_participants::Column::CampaignId.eq(campaign_id))
            .filter(campaign_participants::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query participant pivot")?;

        if existing.is_some() {
            return Ok(false);
        }

        campaign_participants::ActiveModel {
            campaign_id: Set(campaign_id),
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to attach participant")?;

        Ok(true)
    }

    /// Detach a user from a campaign. Returns `false` when there was
    /// nothing to detach.
    pub async fn detach_participant(&self, campaign_id: i32, user_id: i32) -> Result<bool> {
        let res = CampaignParticipants::delete_many()
            .filter(campaign_participants::Column::CampaignId.eq(campaign_id))
            .filter(campaign_participants::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to detach participant")?;

        Ok(res.rows_affected > 0)
    }

    /// Users attached to a campaign via the pivot. `None` when the campaign
    /// itself does not exist.
    pub async fn participants(&self, campaign_id: i32) -> Result<Option<Vec<User>>> {
        let Some(campaign) = Campaigns::find_by_id(campaign_id)
            .one(&self.conn)
            .await
            .context("Failed to query campaign for participants")?
        else {
            return Ok(None);
        };

        let participants = campaign
            .find_related(Users)
            .all(&self.conn)
            .await
            .context("Failed to query campaign participants")?;

        Ok(Some(participants.into_iter().map(User::from).collect()))
    }

    /// Campaigns where the user is the current host.
    pub async fn hosted_by(&self, user_id: i32) -> Result<Vec<campaigns::Model>> {
        let campaigns = Campaigns::find()
            .filter(campaigns::Column::HostId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to query hosted campaigns")?;

        Ok(campaigns)
    }

    /// Campaigns the user joined as a participant (hosting does not imply
    /// participation). `None` when the user does not exist.
    pub async fn participated_by(&self, user_id: i32) -> Result<Option<Vec<campaigns::Model>>> {
        let Some(user) = users::Entity::find_by_id(user_id)
            .one(&self.conn)
            .await
            .context("Failed to query user for participations")?
        else {
            return Ok(None);
        };

        let campaigns = user
            .find_related(Campaigns)
            .all(&self.conn)
            .await
            .context("Failed to query participated campaigns")?;

        Ok(Some(campaigns))
    }
}

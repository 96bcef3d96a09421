use sea_orm::Iterable;
use sea_orm::entity::prelude::*;

/// Who can see and join a campaign. Stored as its integer discriminant;
/// inbound payloads are range-checked against the declared variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter)]
pub enum CampaignAccessibility {
    Private = 0,
    Public = 1,
}

impl CampaignAccessibility {
    #[must_use]
    pub fn variant_count() -> i32 {
        i32::try_from(Self::iter().count()).unwrap_or(i32::MAX)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Creator and sole authorized mutator/deleter
    pub host_id: i32,

    pub start_date: String,

    /// Discriminant of [`CampaignAccessibility`]
    pub accessibility: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::HostId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Host,

    #[sea_orm(has_many = "super::campaign_participants::Entity")]
    Participants,
}

/// Many-to-many: users attached to this campaign via the pivot.
impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::campaign_participants::Relation::Users.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::campaign_participants::Relation::Campaigns.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

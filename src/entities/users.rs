use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub username: Option<String>,

    /// Server-assigned at registration, immutable afterwards
    pub registration_date: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_tokens::Entity")]
    AuthTokens,

    #[sea_orm(has_many = "super::campaign_participants::Entity")]
    Participations,
}

impl Related<super::auth_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthTokens.def()
    }
}

/// Many-to-many: campaigns this user participates in (not hosting).
impl Related<super::campaigns::Entity> for Entity {
    fn to() -> RelationDef {
        super::campaign_participants::Relation::Campaigns.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::campaign_participants::Relation::Users.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

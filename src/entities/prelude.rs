pub use super::auth_tokens::Entity as AuthTokens;
pub use super::campaign_participants::Entity as CampaignParticipants;
pub use super::campaigns::Entity as Campaigns;
pub use super::users::Entity as Users;

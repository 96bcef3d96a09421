pub mod prelude;

pub mod auth_tokens;
pub mod campaign_participants;
pub mod campaigns;
pub mod users;

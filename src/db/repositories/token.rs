use anyhow::{Context, Result};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use subtle::ConstantTimeEq;

use crate::entities::{auth_tokens, prelude::*};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issue a fresh bearer token for a user. Any previously issued tokens
    /// for that user are deleted in the same transaction, so at most one
    /// token is live per user at any point.
    pub async fn issue(&self, user_id: i32) -> Result<auth_tokens::Model> {
        let txn = self.conn.begin().await.context("Failed to open token transaction")?;

        AuthTokens::delete_many()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .exec(&txn)
            .await
            .context("Failed to delete superseded tokens")?;

        let inserted = AuthTokens::insert(auth_tokens::ActiveModel {
            token: Set(generate_token()),
            user_id: Set(user_id),
            auth_date: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        })
        .exec(&txn)
        .await
        .context("Failed to insert token")?;

        let model = AuthTokens::find_by_id(inserted.last_insert_id)
            .one(&txn)
            .await
            .context("Failed to query issued token")?
            .ok_or_else(|| anyhow::anyhow!("Issued token row missing"))?;

        txn.commit().await.context("Failed to commit token transaction")?;

        Ok(model)
    }

    /// Resolve a presented bearer token to its owning user id.
    ///
    /// The row is located through the unique token index and the stored
    /// value is then re-compared in constant time, so a mismatch and an
    /// unknown token are indistinguishable to a timing observer.
    pub async fn resolve_user_id(&self, token: &str) -> Result<Option<i32>> {
        let row = AuthTokens::find()
            .filter(auth_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query token")?;

        Ok(row.and_then(|t| {
            bool::from(t.token.as_bytes().ct_eq(token.as_bytes())).then_some(t.user_id)
        }))
    }

    /// Delete every token owned by a user. Returns the number of rows removed.
    pub async fn revoke_for_user(&self, user_id: i32) -> Result<u64> {
        let res = AuthTokens::delete_many()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to revoke tokens")?;

        Ok(res.rows_affected)
    }
}

/// Generate a random bearer token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_are_opaque_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}

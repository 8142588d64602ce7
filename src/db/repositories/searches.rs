use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entities::{prelude::*, user_searches};

pub struct SearchRepository {
    conn: DatabaseConnection,
}

impl SearchRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(
        &self,
        user_id: &str,
        idea_check_id: &str,
        idea: &str,
        overall_score: i32,
        verdict: &str,
    ) -> Result<()> {
        let active_model = user_searches::ActiveModel {
            user_id: Set(user_id.to_string()),
            idea_check_id: Set(idea_check_id.to_string()),
            idea: Set(idea.to_string()),
            overall_score: Set(overall_score),
            verdict: Set(verdict.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        UserSearches::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn history(&self, user_id: &str, limit: u64) -> Result<Vec<user_searches::Model>> {
        let rows = UserSearches::find()
            .filter(user_searches::Column::UserId.eq(user_id))
            .order_by_desc(user_searches::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }
}

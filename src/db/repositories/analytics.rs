use anyhow::Result;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

use crate::entities::{analytics_events, prelude::*};

pub struct AnalyticsRepository {
    conn: DatabaseConnection,
}

impl AnalyticsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn record(
        &self,
        event_name: &str,
        event_data: &str,
        user_id: Option<&str>,
    ) -> Result<()> {
        let active_model = analytics_events::ActiveModel {
            user_id: Set(user_id.map(String::from)),
            event_name: Set(event_name.to_string()),
            event_data: Set(event_data.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        AnalyticsEvents::insert(active_model).exec(&self.conn).await?;
        Ok(())
    }
}

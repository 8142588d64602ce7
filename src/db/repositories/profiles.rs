use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{prelude::*, user_profiles};

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<user_profiles::Model>> {
        Ok(UserProfiles::find_by_id(user_id).one(&self.conn).await?)
    }

    /// Bumps the profile's search counters. The daily counter resets
    /// when the stored quota day differs from `today`.
    pub async fn bump_search_stats(&self, user_id: &str, today: &str) -> Result<()> {
        let Some(profile) = self.get(user_id).await? else {
            return Ok(());
        };

        let searches_today = if profile.quota_day == today {
            profile.searches_today + 1
        } else {
            1
        };

        let mut active: user_profiles::ActiveModel = profile.clone().into();
        active.quota_day = Set(today.to_string());
        active.searches_today = Set(searches_today);
        active.searches_this_month = Set(profile.searches_this_month + 1);
        active.total_searches = Set(profile.total_searches + 1);
        active.last_search_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.update(&self.conn).await?;

        Ok(())
    }

    pub async fn insert(&self, profile: user_profiles::Model) -> Result<()> {
        let active: user_profiles::ActiveModel = profile.into();
        UserProfiles::insert(active).exec(&self.conn).await?;
        Ok(())
    }
}

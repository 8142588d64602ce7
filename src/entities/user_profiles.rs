use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub email: Option<String>,

    /// Subscription tier: "free" or "pro".
    pub plan: String,

    /// Calendar day (YYYY-MM-DD) that `searches_today` counts against.
    pub quota_day: String,

    pub searches_today: i32,

    pub searches_this_month: i32,

    pub total_searches: i64,

    pub last_search_at: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

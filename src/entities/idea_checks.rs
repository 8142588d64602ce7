use sea_orm::entity::prelude::*;

/// One cached idea check, keyed by the content fingerprint of the
/// canonical idea text. JSON payload columns hold the aggregated
/// sources and the analysis.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "idea_checks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub fingerprint: String,

    pub idea: String,

    #[sea_orm(column_type = "Text")]
    pub sources_json: String,

    #[sea_orm(column_type = "Text")]
    pub analysis_json: String,

    pub overall_score: i32,

    pub verdict: String,

    pub user_id: Option<String>,

    pub times_requested: i64,

    pub created_at: String,

    pub last_requested_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

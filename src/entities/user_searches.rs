use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "user_searches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub user_id: String,

    pub idea_check_id: String,

    pub idea: String,

    pub overall_score: i32,

    pub verdict: String,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

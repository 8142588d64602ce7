use anyhow::Result;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{idea_checks, prelude::*};
use crate::models::analysis::Analysis;
use crate::models::sources::AggregateSources;

/// A cache row with its JSON payloads decoded.
#[derive(Debug, Clone)]
pub struct CachedCheck {
    pub id: String,
    pub fingerprint: String,
    pub idea: String,
    pub sources: AggregateSources,
    pub analysis: Analysis,
    pub times_requested: i64,
    pub created_at: String,
    pub last_requested_at: String,
}

impl TryFrom<idea_checks::Model> for CachedCheck {
    type Error = anyhow::Error;

    fn try_from(model: idea_checks::Model) -> Result<Self> {
        Ok(Self {
            sources: serde_json::from_str(&model.sources_json)?,
            analysis: serde_json::from_str(&model.analysis_json)?,
            id: model.id,
            fingerprint: model.fingerprint,
            idea: model.idea,
            times_requested: model.times_requested,
            created_at: model.created_at,
            last_requested_at: model.last_requested_at,
        })
    }
}

/// Fields for a fresh cache row.
#[derive(Debug, Clone)]
pub struct NewCheck<'a> {
    pub id: &'a str,
    pub fingerprint: &'a str,
    pub idea: &'a str,
    pub sources: &'a AggregateSources,
    pub analysis: &'a Analysis,
    pub user_id: Option<&'a str>,
}

pub struct CheckRepository {
    conn: DatabaseConnection,
}

impl CheckRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn find(&self, fingerprint: &str) -> Result<Option<CachedCheck>> {
        let row = IdeaChecks::find()
            .filter(idea_checks::Column::Fingerprint.eq(fingerprint))
            .one(&self.conn)
            .await?;

        row.map(CachedCheck::try_from).transpose()
    }

    /// Atomic increment-or-no-op: bumps the request counter and the
    /// last-requested timestamp in one statement so concurrent hits
    /// never lose updates.
    pub async fn record_hit(&self, fingerprint: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        IdeaChecks::update_many()
            .col_expr(
                idea_checks::Column::TimesRequested,
                Expr::col(idea_checks::Column::TimesRequested).add(1),
            )
            .col_expr(idea_checks::Column::LastRequestedAt, Expr::value(now))
            .filter(idea_checks::Column::Fingerprint.eq(fingerprint))
            .exec(&self.conn)
            .await?;

        Ok(())
    }

    /// Stores a fresh check. Concurrent misses for the same
    /// fingerprint may both reach this point; the conflict clause
    /// makes the second store overwrite the payload instead of
    /// failing.
    pub async fn insert(&self, check: NewCheck<'_>) -> Result<CachedCheck> {
        let now = chrono::Utc::now().to_rfc3339();
        let sources_json = serde_json::to_string(check.sources)?;
        let analysis_json = serde_json::to_string(check.analysis)?;

        let active_model = idea_checks::ActiveModel {
            id: Set(check.id.to_string()),
            fingerprint: Set(check.fingerprint.to_string()),
            idea: Set(check.idea.to_string()),
            sources_json: Set(sources_json),
            analysis_json: Set(analysis_json),
            overall_score: Set(i32::from(check.analysis.overall_score)),
            verdict: Set(check.analysis.verdict.to_string()),
            user_id: Set(check.user_id.map(String::from)),
            times_requested: Set(1),
            created_at: Set(now.clone()),
            last_requested_at: Set(now),
        };

        IdeaChecks::insert(active_model)
            .on_conflict(
                OnConflict::column(idea_checks::Column::Fingerprint)
                    .update_columns([
                        idea_checks::Column::SourcesJson,
                        idea_checks::Column::AnalysisJson,
                        idea_checks::Column::OverallScore,
                        idea_checks::Column::Verdict,
                        idea_checks::Column::LastRequestedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        self.find(check.fingerprint)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Check row missing immediately after insert"))
    }

    pub async fn popular(&self, limit: u64) -> Result<Vec<idea_checks::Model>> {
        let rows = IdeaChecks::find()
            .filter(idea_checks::Column::TimesRequested.gt(1))
            .order_by_desc(idea_checks::Column::TimesRequested)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(IdeaChecks::find().count(&self.conn).await?)
    }
}

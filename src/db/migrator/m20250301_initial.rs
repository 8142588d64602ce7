use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IdeaChecks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdeaChecks::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdeaChecks::Fingerprint)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(IdeaChecks::Idea).text().not_null())
                    .col(ColumnDef::new(IdeaChecks::SourcesJson).text().not_null())
                    .col(ColumnDef::new(IdeaChecks::AnalysisJson).text().not_null())
                    .col(
                        ColumnDef::new(IdeaChecks::OverallScore)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(IdeaChecks::Verdict).string().not_null())
                    .col(ColumnDef::new(IdeaChecks::UserId).string())
                    .col(
                        ColumnDef::new(IdeaChecks::TimesRequested)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(IdeaChecks::CreatedAt).string().not_null())
                    .col(
                        ColumnDef::new(IdeaChecks::LastRequestedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_idea_checks_times_requested")
                    .table(IdeaChecks::Table)
                    .col(IdeaChecks::TimesRequested)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserProfiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserProfiles::Email).string())
                    .col(
                        ColumnDef::new(UserProfiles::Plan)
                            .string()
                            .not_null()
                            .default("free"),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::QuotaDay)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::SearchesToday)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::SearchesThisMonth)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::TotalSearches)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(UserProfiles::LastSearchAt).string())
                    .col(ColumnDef::new(UserProfiles::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserSearches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSearches::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserSearches::UserId).string().not_null())
                    .col(
                        ColumnDef::new(UserSearches::IdeaCheckId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserSearches::Idea).text().not_null())
                    .col(
                        ColumnDef::new(UserSearches::OverallScore)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserSearches::Verdict).string().not_null())
                    .col(ColumnDef::new(UserSearches::CreatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_searches_user_id")
                    .table(UserSearches::Table)
                    .col(UserSearches::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AnalyticsEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalyticsEvents::UserId).string())
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::EventData)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AnalyticsEvents::CreatedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalyticsEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserSearches::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdeaChecks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum IdeaChecks {
    Table,
    Id,
    Fingerprint,
    Idea,
    SourcesJson,
    AnalysisJson,
    OverallScore,
    Verdict,
    UserId,
    TimesRequested,
    CreatedAt,
    LastRequestedAt,
}

#[derive(DeriveIden)]
enum UserProfiles {
    Table,
    Id,
    Email,
    Plan,
    QuotaDay,
    SearchesToday,
    SearchesThisMonth,
    TotalSearches,
    LastSearchAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum UserSearches {
    Table,
    Id,
    UserId,
    IdeaCheckId,
    Idea,
    OverallScore,
    Verdict,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AnalyticsEvents {
    Table,
    Id,
    UserId,
    EventName,
    EventData,
    CreatedAt,
}

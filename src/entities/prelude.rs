pub use super::analytics_events::Entity as AnalyticsEvents;
pub use super::idea_checks::Entity as IdeaChecks;
pub use super::user_profiles::Entity as UserProfiles;
pub use super::user_searches::Entity as UserSearches;

pub mod aggregator;
pub use aggregator::{SourceAggregator, SourceOutcome};

pub mod analytics;
pub use analytics::AnalyticsService;

pub mod check;
pub use check::{CheckError, CheckOutcome, CheckService, IdeaCheckResult};

pub mod governor;
pub use governor::{GateDecision, QuotaDecision, RateGovernor};

pub mod names;
pub use names::NameService;

pub mod synthesis;
pub use synthesis::SynthesisService;

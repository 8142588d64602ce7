use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::error;

use crate::db::Store;
use crate::domain::events::NotificationEvent;

/// Persists check lifecycle events to the analytics sink.
///
/// Runs as a detached listener on the event bus so a slow or failing
/// write can never delay the request that emitted the event.
pub struct AnalyticsService {
    store: Store,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl AnalyticsService {
    #[must_use]
    pub const fn new(store: Store, event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        Self { store, event_bus }
    }

    pub fn start_listener(self: Arc<Self>) {
        let mut rx = self.event_bus.subscribe();
        let service = self;

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if let Err(e) = service.handle_event(event).await {
                            error!(error = %e, "Failed to record analytics event");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        error!(count, "Analytics listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Analytics listener event bus closed");
                        break;
                    }
                }
            }
        });
    }

    async fn handle_event(&self, event: NotificationEvent) -> anyhow::Result<()> {
        let event_data = serde_json::to_string(&event)?;
        let user_id = event.user_id().map(String::from);

        self.store
            .record_event(event.name(), &event_data, user_id.as_deref())
            .await
    }
}

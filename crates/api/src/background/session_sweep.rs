//! Periodic deletion of expired sessions.
//!
//! Garbage collection only: an expired session is already rejected on use,
//! so a failed or skipped sweep never affects correctness.

use std::sync::Arc;
use std::time::Duration;

use storefront_core::auth::SessionService;
use tokio_util::sync::CancellationToken;

/// Shortest period the loop will tick at.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Run the sweep loop every `interval` (at least [`MIN_INTERVAL`]) until
/// `cancel` is triggered.
pub async fn run(sessions: Arc<SessionService>, interval: Duration, cancel: CancellationToken) {
    let interval = interval.max(MIN_INTERVAL);
    tracing::info!(interval_secs = interval.as_secs(), "Session sweep job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sessions.sweep_expired_sessions().await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "Session sweep: purged expired sessions");
                    }
                    Ok(_) => {
                        tracing::debug!("Session sweep: nothing to purge");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: cleanup failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storefront_core::auth::{CredentialHasher, SessionConfig, TokenConfig, TokenIssuer};
    use storefront_core::memory::{MemorySessionStore, MemoryUserStore};
    use storefront_core::session::NewSession;
    use storefront_core::store::SessionStore;
    use uuid::Uuid;

    async fn service_with_expired_session() -> (MemorySessionStore, Arc<SessionService>) {
        let store = MemorySessionStore::new();
        store
            .create(NewSession {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                secret_hash: "hash".into(),
                expires_at: Utc::now() - chrono::Duration::minutes(1),
            })
            .await
            .unwrap();

        let service = Arc::new(SessionService::new(
            Arc::new(MemoryUserStore::new()),
            Arc::new(store.clone()),
            CredentialHasher::default(),
            TokenIssuer::new(&TokenConfig::new("sweep-test-secret")),
            SessionConfig::default(),
        ));
        (store, service)
    }

    #[tokio::test]
    async fn test_sweeps_on_first_tick_and_stops_on_cancel() {
        let (store, service) = service_with_expired_session().await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(service, Duration::from_secs(3600), cancel.clone()));

        for _ in 0..100 {
            if store.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.is_empty());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweep loop should stop after cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn test_zero_interval_is_raised_to_minimum() {
        let (store, service) = service_with_expired_session().await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(service, Duration::ZERO, cancel.clone()));

        for _ in 0..100 {
            if store.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(store.is_empty());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweep loop should stop after cancellation")
            .expect("sweep task must not panic");
    }
}

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};

use crate::store::Store;

/// Periodically drops revocation entries whose credential has expired anyway.
pub async fn run(store: Arc<dyn Store>, every: Duration) {
    let mut ticker = actix_web::rt::time::interval(every);
    loop {
        ticker.tick().await;
        match store.purge_expired_revocations(Utc::now()).await {
            Ok(0) => debug!("No expired revocations to purge"),
            Ok(purged) => info!(purged, "Purged expired token revocations"),
            Err(e) => error!(error = %e, "Failed to purge expired token revocations"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::model::revoked_token::RevokedToken;
    use crate::store::memory::MemoryStore;

    #[actix_web::test]
    async fn sweep_drops_only_expired_entries() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let now = Utc::now();
        for (jti, expires_at) in [
            ("old", now - ChronoDuration::minutes(1)),
            ("live", now + ChronoDuration::hours(1)),
        ] {
            store
                .revoke_token(RevokedToken {
                    jti: jti.into(),
                    user_id: 1,
                    revoked_at: now,
                    expires_at,
                })
                .await
                .unwrap();
        }

        let handle = actix_web::rt::spawn(run(store.clone(), Duration::from_millis(10)));
        actix_web::rt::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(!store.is_token_revoked("old").await.unwrap());
        assert!(store.is_token_revoked("live").await.unwrap());
    }
}

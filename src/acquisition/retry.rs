//! Term-rotation retry loop.

use tracing::warn;

use crate::models::ObjectRecord;
use crate::museum::{AcquisitionError, AttemptBudget, MuseumApiClient};

/// Acquire a random object, trying a fresh term after every failure.
pub async fn acquire_with_rotation<C>(
    client: &C,
    budget: &mut AttemptBudget,
) -> Result<ObjectRecord, AcquisitionError>
where
    C: MuseumApiClient + ?Sized,
{
    acquire_observed(client, budget, |_, _| {}).await
}

/// Like [`acquire_with_rotation`], calling `on_retry` with the failed term
/// and error before each retry.
///
/// Retries are immediate: failures here mean a bad term more often than a
/// flaky network. The only error returned is `MaxAttemptsReached`.
pub async fn acquire_observed<C, F>(
    client: &C,
    budget: &mut AttemptBudget,
    mut on_retry: F,
) -> Result<ObjectRecord, AcquisitionError>
where
    C: MuseumApiClient + ?Sized,
    F: FnMut(&str, &AcquisitionError) + Send,
{
    loop {
        let term = client.terms().choose();

        match client.attempt_random(&term, budget).await {
            Ok(record) => return Ok(record),
            Err(e) if e.is_retryable() => {
                warn!(
                    "[{}] '{}' failed ({}/{} attempts used): {}",
                    client.id(),
                    term,
                    budget.used(),
                    budget.max(),
                    e
                );
                if budget.is_exhausted() {
                    return Err(AcquisitionError::MaxAttemptsReached {
                        attempts: budget.used(),
                    });
                }
                on_retry(&term, &e);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::json;

    use crate::models::RawSearchResult;
    use crate::museum::{AcquisitionStrategy, ClientOptions, VamClient};
    use crate::proxy::{ProxyError, ScriptedProxy};

    fn client(proxy: Arc<ScriptedProxy>, strategy: AcquisitionStrategy) -> VamClient {
        VamClient::new(proxy).with_options(ClientOptions {
            strategy,
            ..ClientOptions::default()
        })
    }

    #[tokio::test]
    async fn test_rotates_terms_after_failure() {
        let proxy = Arc::new(ScriptedProxy::new());
        proxy
            .push_err(ProxyError::Http("reset".into()))
            .push_ok(RawSearchResult::new(0, vec![]))
            .push_ok(RawSearchResult::new(
                1,
                vec![json!({"systemNumber": "O9", "_primaryImageId": "img9"})],
            ));

        let client = client(proxy.clone(), AcquisitionStrategy::Native);
        let mut budget = AttemptBudget::new(5);
        let mut retries = Vec::new();

        let record = acquire_observed(&client, &mut budget, |_, e| retries.push(e.kind()))
            .await
            .unwrap();

        assert_eq!(record.id, "O9");
        assert_eq!(budget.used(), 3);
        assert_eq!(retries.len(), 2);
        assert!(proxy.requests().iter().all(|p| p.random_order));
    }

    #[tokio::test]
    async fn test_stops_at_budget() {
        let proxy = Arc::new(ScriptedProxy::always_failing("offline"));
        let client = client(proxy.clone(), AcquisitionStrategy::Native);
        let mut budget = AttemptBudget::new(4);

        let err = acquire_with_rotation(&client, &mut budget).await.unwrap_err();
        assert_eq!(err, AcquisitionError::MaxAttemptsReached { attempts: 4 });
        assert_eq!(proxy.call_count(), 4);
    }

    #[tokio::test]
    async fn test_count_probe_counts_against_budget() {
        // Every probe reports matches but every page comes back empty
        let proxy = Arc::new(ScriptedProxy::new());
        for _ in 0..3 {
            proxy
                .push_ok(RawSearchResult::new(10, vec![]))
                .push_ok(RawSearchResult::new(10, vec![]));
        }

        let client = client(proxy.clone(), AcquisitionStrategy::CountThenOffset);
        let mut budget = AttemptBudget::new(5);

        let err = acquire_with_rotation(&client, &mut budget).await.unwrap_err();
        assert_eq!(err.kind(), crate::museum::ErrorKind::MaxAttemptsReached);
        assert_eq!(proxy.call_count(), 5);
    }
}

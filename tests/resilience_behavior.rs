//! Behavior-driven tests for retry, caching, pacing and fallback.
//!
//! These verify HOW upstream unreliability is absorbed: which failures are
//! retried, how long the executor waits, and when cached answers are reused.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gazette_core::{
    CacheStore, ChainOutcome, FallbackChain, HttpError, HttpResponse, Pacer, ProviderId,
    RecordingSleeper, RetryExecutor, RetryPolicy, ScriptedHttpClient, SourceError, SourceErrorKind,
    Upstream,
};

fn scripted_upstream(
    http: ScriptedHttpClient,
    sleeper: Arc<RecordingSleeper>,
) -> (Upstream, Arc<ScriptedHttpClient>) {
    let http = Arc::new(http);
    let upstream = Upstream::new(
        http.clone(),
        RetryExecutor::new(RetryPolicy::default(), sleeper),
        Pacer::disabled(),
        "gazette-tests/1.0",
    );
    (upstream, http)
}

const TIMEOUT: Duration = Duration::from_secs(8);

// =============================================================================
// Retry executor
// =============================================================================

#[tokio::test]
async fn when_call_fails_twice_then_succeeds_result_is_returned_after_three_calls() {
    // Given: A call that fails twice before succeeding
    let sleeper = Arc::new(RecordingSleeper::new());
    let executor = RetryExecutor::new(RetryPolicy::default(), sleeper.clone());
    let calls = AtomicUsize::new(0);

    // When: The executor runs it
    let result = executor
        .run("flaky", || async {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(SourceError::transient("connection reset")),
                _ => Ok("payload"),
            }
        })
        .await;

    // Then: Success on the third attempt with doubling backoff in between
    assert_eq!(result.expect("third attempt succeeds"), "payload");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
}

#[tokio::test]
async fn when_call_always_fails_last_error_surfaces_after_exactly_three_calls() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let executor = RetryExecutor::new(RetryPolicy::default(), sleeper.clone());
    let calls = AtomicUsize::new(0);

    let result: Result<(), SourceError> = executor
        .run("down", || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::transient(format!("failure {n}")))
        })
        .await;

    let error = result.expect_err("exhausted");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(error.message(), "failure 2");
    // no sleep after the final attempt
    assert_eq!(sleeper.delays().len(), 2);
}

#[tokio::test]
async fn when_error_is_not_retryable_executor_fails_immediately() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let executor = RetryExecutor::new(RetryPolicy::default(), sleeper.clone());
    let calls = AtomicUsize::new(0);

    let result: Result<(), SourceError> = executor
        .run("bad input", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(SourceError::normalization("unexpected shape"))
        })
        .await;

    assert_eq!(result.expect_err("fails").kind(), SourceErrorKind::Normalization);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sleeper.delays().is_empty());
}

// =============================================================================
// Upstream status classification
// =============================================================================

#[tokio::test]
async fn when_provider_returns_429_with_retry_after_the_executor_sleeps_exactly_that_long() {
    // Given: A rate-limited first reply asking for 5 seconds
    let sleeper = Arc::new(RecordingSleeper::new());
    let (upstream, http) = scripted_upstream(
        ScriptedHttpClient::new()
            .on(
                "/latest",
                Ok(HttpResponse::new(429, "slow down").with_header("Retry-After", "5")),
            )
            .on_json("/latest", r#"{"ok":true}"#),
        sleeper.clone(),
    );

    // When: The call is made
    let value = upstream
        .get_json_value(ProviderId::Frankfurter, "https://fx.test/latest", TIMEOUT)
        .await
        .expect("second attempt succeeds");

    // Then: Exactly the server delay was honored
    assert_eq!(value["ok"], true);
    assert_eq!(sleeper.delays(), vec![Duration::from_secs(5)]);
    assert_eq!(http.requests().len(), 2);
}

#[tokio::test]
async fn when_retry_after_is_excessive_it_is_bounded_to_sixty_seconds() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let (upstream, _) = scripted_upstream(
        ScriptedHttpClient::new()
            .on(
                "/simple/price",
                Ok(HttpResponse::new(429, "").with_header("retry-after", "3600")),
            )
            .on_json("/simple/price", "{}"),
        sleeper.clone(),
    );

    upstream
        .get_json_value(ProviderId::Coingecko, "https://cg.test/simple/price", TIMEOUT)
        .await
        .expect("recovers");

    assert_eq!(sleeper.delays(), vec![Duration::from_secs(60)]);
}

#[tokio::test]
async fn when_429_has_no_usable_retry_after_exponential_backoff_applies() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let (upstream, http) = scripted_upstream(
        ScriptedHttpClient::new().on(
            "/latest",
            Ok(HttpResponse::new(429, "")
                .with_header("Retry-After", "Wed, 21 Oct 2015 07:28:00 GMT")),
        ),
        sleeper.clone(),
    );

    let error = upstream
        .get_json_value(ProviderId::Frankfurter, "https://fx.test/latest", TIMEOUT)
        .await
        .expect_err("still limited");

    assert_eq!(error.code(), "source.rate_limited");
    assert_eq!(http.requests().len(), 3);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_secs(2), Duration::from_secs(4)]
    );
}

#[tokio::test]
async fn when_provider_returns_404_request_is_rejected_without_retry() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let (upstream, http) = scripted_upstream(
        ScriptedHttpClient::new().on("/latest", Ok(HttpResponse::new(404, "not found"))),
        sleeper.clone(),
    );

    let error = upstream
        .get_json_value(ProviderId::Frankfurter, "https://fx.test/latest", TIMEOUT)
        .await
        .expect_err("rejected");

    assert_eq!(error.kind(), SourceErrorKind::Rejected);
    assert_eq!(http.requests().len(), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn when_server_errors_and_timeouts_persist_they_are_retried_then_surfaced() {
    for reply in [
        Ok(HttpResponse::new(503, "unavailable")),
        Ok(HttpResponse::new(408, "")),
        Err(HttpError::timeout("deadline elapsed")),
    ] {
        let sleeper = Arc::new(RecordingSleeper::new());
        let (upstream, http) =
            scripted_upstream(ScriptedHttpClient::new().on("/x", reply), sleeper.clone());

        let error = upstream
            .get_json_value(ProviderId::NagerDate, "https://nager.test/x", TIMEOUT)
            .await
            .expect_err("exhausted");

        assert_eq!(error.kind(), SourceErrorKind::Transient);
        assert_eq!(http.requests().len(), 3);
        assert_eq!(sleeper.total(), Duration::from_secs(6));
    }
}

#[tokio::test]
async fn when_body_is_not_json_the_call_is_retried() {
    let sleeper = Arc::new(RecordingSleeper::new());
    let (upstream, http) = scripted_upstream(
        ScriptedHttpClient::new()
            .on_json("/feed", "<html>maintenance</html>")
            .on_json("/feed", r#"{"events":[]}"#),
        sleeper.clone(),
    );

    let value = upstream
        .get_json_value(ProviderId::Wikipedia, "https://wiki.test/feed", TIMEOUT)
        .await
        .expect("second body decodes");

    assert!(value["events"].is_array());
    assert_eq!(http.requests().len(), 2);
}

#[tokio::test]
async fn every_request_carries_user_agent_accept_and_timeout() {
    let (upstream, http) = scripted_upstream(
        ScriptedHttpClient::new().on_json("/latest", "{}"),
        Arc::new(RecordingSleeper::new()),
    );

    upstream
        .get_json_value(ProviderId::Frankfurter, "https://fx.test/latest", TIMEOUT)
        .await
        .expect("ok");

    let requests = http.requests();
    let request = &requests[0];
    assert_eq!(
        request.headers.get("user-agent").map(String::as_str),
        Some("gazette-tests/1.0")
    );
    assert_eq!(
        request.headers.get("accept").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(request.timeout_ms, 8_000);
}

// =============================================================================
// Cache-aside store
// =============================================================================

#[tokio::test]
async fn when_entry_is_fresh_fetch_is_not_called_and_after_expiry_it_is() {
    let cache = CacheStore::with_default_ttl();
    let fetches = AtomicUsize::new(0);
    let ttl = Duration::from_millis(40);

    let fetch = || async {
        let n = fetches.fetch_add(1, Ordering::SeqCst);
        Ok::<_, SourceError>(vec![n])
    };

    let first: Vec<usize> = cache.get_or_fetch("k", ttl, fetch).await.expect("fetched");
    let second: Vec<usize> = cache.get_or_fetch("k", ttl, fetch).await.expect("cached");
    assert_eq!(first, second);
    assert_eq!(fetches.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(80)).await;

    let third: Vec<usize> = cache.get_or_fetch("k", ttl, fetch).await.expect("refetched");
    assert_eq!(third, vec![1]);
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn when_fetch_fails_nothing_is_cached() {
    let cache = CacheStore::with_default_ttl();

    let failed: Result<String, SourceError> = cache
        .get_or_fetch("k", Duration::from_secs(60), || async {
            Err(SourceError::transient("boom"))
        })
        .await;
    assert!(failed.is_err());
    assert!(cache.is_empty().await);

    let ok: String = cache
        .get_or_fetch("k", Duration::from_secs(60), || async { Ok(String::from("v")) })
        .await
        .expect("fetched");
    assert_eq!(ok, "v");
    assert_eq!(cache.len().await, 1);
}

// =============================================================================
// Pacing
// =============================================================================

#[tokio::test]
async fn when_pacing_is_enabled_calls_to_one_provider_are_spaced() {
    let pacer = Pacer::new(Duration::from_millis(60));

    let started = Instant::now();
    pacer.until_ready(ProviderId::WikimediaCommons).await;
    pacer.until_ready(ProviderId::UnsplashSource).await;
    assert!(started.elapsed() < Duration::from_millis(50));

    pacer.until_ready(ProviderId::WikimediaCommons).await;
    assert!(started.elapsed() >= Duration::from_millis(40));
}

// =============================================================================
// Fallback chain
// =============================================================================

#[tokio::test]
async fn when_only_the_third_candidate_yields_it_wins_after_three_calls() {
    let calls = AtomicUsize::new(0);

    let outcome = FallbackChain::select(
        [ProviderId::Wikipedia, ProviderId::WikimediaCommons, ProviderId::Dataset],
        |provider| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                match provider {
                    ProviderId::Wikipedia => Err(SourceError::transient("timeout")),
                    ProviderId::WikimediaCommons => Ok(Vec::new()),
                    _ => Ok(vec![provider.as_str()]),
                }
            }
        },
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome.attempts(), 3);
    match outcome {
        ChainOutcome::Success {
            candidate, items, failures, ..
        } => {
            assert_eq!(candidate, ProviderId::Dataset);
            assert_eq!(items, vec!["dataset"]);
            assert_eq!(failures.len(), 2);
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn when_every_candidate_is_empty_the_chain_is_exhausted_after_three_calls() {
    let calls = AtomicUsize::new(0);

    let outcome: ChainOutcome<u8, String> = FallbackChain::select([1, 2, 3], |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        async { Ok(Vec::new()) }
    })
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(matches!(
        outcome,
        ChainOutcome::Exhausted { attempts: 3, ref failures } if failures.iter().all(|f| f.error.is_none())
    ));
}

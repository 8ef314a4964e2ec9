//! End-to-end acquisition tests against a scripted proxy.

use std::sync::Arc;

use serde_json::{json, Value};

use curio::acquisition::{AcquireOutcome, AcquisitionController, Phase};
use curio::config::SearchConfiguration;
use curio::history::HistoryStore;
use curio::models::RawSearchResult;
use curio::museum::{
    AcquisitionError, AcquisitionStrategy, AttemptBudget, ClientOptions, ErrorKind,
    MuseumApiClient, VamClient,
};
use curio::proxy::{ProxyError, ScriptedProxy};

fn client(proxy: &Arc<ScriptedProxy>, strategy: AcquisitionStrategy) -> Arc<dyn MuseumApiClient> {
    let client = VamClient::new(proxy.clone()).with_options(ClientOptions {
        strategy,
        ..ClientOptions::default()
    });
    Arc::new(client)
}

fn object(id: &str, image_id: Option<&str>) -> Value {
    json!({
        "systemNumber": id,
        "objectType": "Jug",
        "_primaryTitle": format!("Jug {}", id),
        "_primaryImageId": image_id,
    })
}

#[tokio::test]
async fn failing_proxy_uses_exactly_the_budget() {
    for strategy in [AcquisitionStrategy::Native, AcquisitionStrategy::CountThenOffset] {
        let proxy = Arc::new(ScriptedProxy::always_failing("connection refused"));
        let client = client(&proxy, strategy);

        let mut budget = AttemptBudget::new(5);
        let err = client.get_random_object(&mut budget).await.unwrap_err();

        assert_eq!(err, AcquisitionError::MaxAttemptsReached { attempts: 5 });
        assert_eq!(proxy.call_count(), 5, "strategy {:?}", strategy);
    }
}

#[tokio::test]
async fn count_then_offset_returns_illustrated_object() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_ok(RawSearchResult::new(3, vec![object("O0", None)]))
        .push_ok(RawSearchResult::new(3, vec![object("O1", Some("img123"))]));
    let client = client(&proxy, AcquisitionStrategy::CountThenOffset);

    let mut budget = AttemptBudget::new(5);
    let record = client.get_random_object(&mut budget).await.unwrap();

    assert_eq!(record.id, "O1");
    assert!(record.image_url.contains("img123"));
    assert!(!record.description.is_empty());
    assert_eq!(budget.used(), 2);

    let requests = proxy.requests();
    assert_eq!(requests.len(), 2);
    // Count probe, then the page holding the random offset
    assert_eq!(requests[0].page, 1);
    assert_eq!(requests[0].page_size, 1);
    assert!(!requests[0].random_order);
    assert_eq!(requests[1].page_size, 2);
    assert!((1..=2).contains(&requests[1].page));
    assert_eq!(requests[0].term(), requests[1].term());
}

#[tokio::test]
async fn imageless_candidate_falls_back_to_second_record() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_ok(RawSearchResult::new(2, vec![object("O1", None)]))
        .push_ok(RawSearchResult::new(
            2,
            vec![object("O1", None), object("O2", Some("img999"))],
        ));
    let client = client(&proxy, AcquisitionStrategy::CountThenOffset);

    let record = client
        .get_random_object(&mut AttemptBudget::new(5))
        .await
        .unwrap();
    assert_eq!(record.id, "O2");
    assert_eq!(record.image_id.as_deref(), Some("img999"));
}

#[tokio::test]
async fn page_without_images_rotates_term() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_ok(RawSearchResult::new(2, vec![]))
        .push_ok(RawSearchResult::new(
            2,
            vec![object("O1", None), object("O2", Some(""))],
        ))
        .push_ok(RawSearchResult::new(1, vec![]))
        .push_ok(RawSearchResult::new(1, vec![object("O3", Some("img3"))]));
    let client = client(&proxy, AcquisitionStrategy::CountThenOffset);

    let mut budget = AttemptBudget::new(5);
    let record = client.get_random_object(&mut budget).await.unwrap();
    assert_eq!(record.id, "O3");
    assert_eq!(budget.used(), 4);
}

#[tokio::test]
async fn zero_matches_rotates_term() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_ok(RawSearchResult::new(0, vec![]))
        .push_ok(RawSearchResult::new(4, vec![]))
        .push_ok(RawSearchResult::new(4, vec![object("O4", Some("img4"))]));
    let client = client(&proxy, AcquisitionStrategy::CountThenOffset);

    let record = client
        .get_random_object(&mut AttemptBudget::new(5))
        .await
        .unwrap();
    assert_eq!(record.id, "O4");
    assert_eq!(proxy.call_count(), 3);
}

#[tokio::test]
async fn missing_record_count_is_malformed() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy.push_ok(RawSearchResult {
        record_count: None,
        records: Some(vec![]),
    });
    let client = client(&proxy, AcquisitionStrategy::CountThenOffset);

    let err = client
        .attempt_random("teapot", &mut AttemptBudget::new(5))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPayload);
}

#[tokio::test]
async fn empty_native_response_is_malformed() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_ok(RawSearchResult::new(0, vec![]))
        .push_ok(RawSearchResult::new(1, vec![object("O8", Some("img8"))]));
    let client = client(&proxy, AcquisitionStrategy::Native);

    let err = client
        .attempt_random("teapot", &mut AttemptBudget::new(5))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    assert!(err.is_retryable());

    // Retried with another term like any network failure
    let record = client
        .get_random_object(&mut AttemptBudget::new(5))
        .await
        .unwrap();
    assert_eq!(record.id, "O8");
}

#[tokio::test]
async fn decode_failure_is_retried() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_err(ProxyError::Decode("expected value".into()))
        .push_ok(RawSearchResult::new(1, vec![object("O5", Some("img5"))]));
    let client = client(&proxy, AcquisitionStrategy::Native);

    let record = client
        .get_random_object(&mut AttemptBudget::new(5))
        .await
        .unwrap();
    assert_eq!(record.id, "O5");
}

#[tokio::test]
async fn native_strategy_accepts_imageless_record() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy.push_ok(RawSearchResult::new(812, vec![object("O6", None)]));
    let client = client(&proxy, AcquisitionStrategy::Auto);

    let record = client
        .get_random_object(&mut AttemptBudget::new(5))
        .await
        .unwrap();
    assert_eq!(record.id, "O6");
    assert_eq!(record.image_url, "");
    assert_eq!(record.image_id, None);

    let requests = proxy.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].random_order);
    assert_eq!(requests[0].page_size, 1);
}

#[tokio::test]
async fn large_collections_clamp_the_page() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_ok(RawSearchResult::new(50_000_000, vec![]))
        .push_ok(RawSearchResult::new(
            50_000_000,
            vec![object("O7", Some("img7"))],
        ));
    let client = client(&proxy, AcquisitionStrategy::CountThenOffset);

    client
        .get_random_object(&mut AttemptBudget::new(5))
        .await
        .unwrap();
    let page = proxy.requests()[1].page;
    assert!((1..=1000).contains(&page), "page {} out of range", page);
}

#[tokio::test]
async fn strict_terms_use_the_item_field() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy.push_ok(RawSearchResult::new(1, vec![object("O8", Some("img8"))]));
    let client = client(&proxy, AcquisitionStrategy::Native);
    client.initialize(SearchConfiguration::new(vec!["teapot".into()], true));

    client
        .get_random_object(&mut AttemptBudget::new(5))
        .await
        .unwrap();

    let request = &proxy.requests()[0];
    assert_eq!(request.strict_item.as_deref(), Some("teapot"));
    assert_eq!(request.search_term, None);
}

#[tokio::test]
async fn empty_configuration_falls_back_to_defaults() {
    let proxy = Arc::new(ScriptedProxy::new());
    let client = client(&proxy, AcquisitionStrategy::Native);
    client.initialize(SearchConfiguration::default());

    assert!(!client.terms().is_strict());
    assert_eq!(
        client.terms().terms().len(),
        curio::terms::DEFAULT_SEARCH_TERMS.len()
    );
}

#[tokio::test]
async fn fetch_by_id_filters_on_identifier() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy.push_ok(RawSearchResult::new(1, vec![object("O9", None)]));
    let client = client(&proxy, AcquisitionStrategy::Auto);

    let record = client.fetch_by_id("O9").await.unwrap();
    assert_eq!(record.id, "O9");
    assert_eq!(record.collection_url, "https://collections.vam.ac.uk/item/O9");

    let request = &proxy.requests()[0];
    assert_eq!(request.id_filter.as_deref(), Some("O9"));
    assert!(!request.image_only);

    let err = client.fetch_by_id("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

#[tokio::test]
async fn controller_records_success_in_history() {
    let proxy = Arc::new(ScriptedProxy::new());
    proxy
        .push_ok(RawSearchResult::new(1, vec![object("A", Some("a"))]))
        .push_err(ProxyError::Http("reset".into()))
        .push_ok(RawSearchResult::new(1, vec![object("B", Some("b"))]));

    let history = Arc::new(HistoryStore::in_memory(10));
    let controller =
        AcquisitionController::new(client(&proxy, AcquisitionStrategy::Native), history.clone())
            .with_max_attempts(3);

    for expected in ["A", "B"] {
        match controller.acquire().await.unwrap() {
            AcquireOutcome::Acquired(record) => assert_eq!(record.id, expected),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    let ids: Vec<String> = history.list().await.into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["B", "A"]);
    assert_eq!(controller.phase(), Phase::Success);
}

use std::sync::Arc;
use std::time::Duration;

use gazette_core::providers::day_facts::MAX_FACTS;
use gazette_core::providers::{
    CachedFacts, CommonsSearch, DatasetFacts, UnsplashSource, WikipediaFacts,
};
use gazette_core::{
    CacheMode, CacheStore, FactSource, ImageSource, Pacer, ProviderId, RecordingSleeper,
    RetryExecutor, RetryPolicy, ScriptedHttpClient, Upstream,
};
use time::{Date, Month};

const COMMONS_HITS: &str = r#"{"query":{"pages":{
    "7":{"index":1,"title":"File:Praia.jpg","imageinfo":[{"thumburl":"https://up.test/t/Praia.jpg"}]},
    "8":{"index":2,"title":"File:Mar.jpg","imageinfo":[{"url":"https://up.test/Mar.jpg"}]}
}}}"#;

const ON_THIS_DAY_HOLIDAYS: &str =
    r#"{"holidays":[{"text":"Dia Mundial do Meio Ambiente"},{"text":"  "}]}"#;
const ON_THIS_DAY_EVENTS: &str = r#"{"events":[{"text":"Fundação da cidade","year":1554}]}"#;

fn upstream(http: ScriptedHttpClient) -> Upstream {
    Upstream::new(
        Arc::new(http),
        RetryExecutor::new(RetryPolicy::default(), Arc::new(RecordingSleeper::new())),
        Pacer::disabled(),
        "gazette-contract/1.0",
    )
}

fn image_sources() -> Vec<Arc<dyn ImageSource>> {
    let http = ScriptedHttpClient::new().on_json("gsrsearch=", COMMONS_HITS);
    let commons: Arc<dyn ImageSource> = Arc::new(CommonsSearch::new(
        upstream(http),
        "https://commons.test/w/api.php",
        Duration::from_secs(10),
    ));
    vec![
        commons,
        Arc::new(UnsplashSource::new("https://source.unsplash.com")),
    ]
}

fn fact_sources() -> Vec<Arc<dyn FactSource>> {
    let http = ScriptedHttpClient::new()
        .on_json("/feed/onthisday/holidays/", ON_THIS_DAY_HOLIDAYS)
        .on_json("/feed/onthisday/events/", ON_THIS_DAY_EVENTS);
    let wikipedia: Arc<dyn FactSource> = Arc::new(WikipediaFacts::new(
        upstream(http),
        "https://pt.wikipedia.test/api/rest_v1",
        Duration::from_secs(8),
    ));
    vec![
        wikipedia.clone(),
        Arc::new(DatasetFacts),
        Arc::new(CachedFacts::new(
            wikipedia,
            CacheStore::with_default_ttl(),
            Duration::from_secs(60),
            CacheMode::Use,
        )),
    ]
}

#[tokio::test]
async fn image_hits_carry_their_provider_query_and_a_thumbnail() {
    for source in image_sources() {
        let hits = source
            .search("praia", 1024)
            .await
            .unwrap_or_else(|error| panic!("provider '{}' search failed: {error}", source.id()));

        assert!(!hits.is_empty(), "provider '{}': no hits", source.id());
        for hit in &hits {
            assert_eq!(hit.provider, source.id(), "provider '{}': id", source.id());
            assert_eq!(hit.query, "praia", "provider '{}': query", source.id());
            assert!(
                hit.thumbnail_url.starts_with("https://"),
                "provider '{}': thumbnail {}",
                source.id(),
                hit.thumbnail_url
            );
            assert!(hit.credit_line().starts_with("Imagem: "));
        }
    }
}

#[tokio::test]
async fn blank_image_queries_yield_no_hits_instead_of_errors() {
    for source in image_sources() {
        let hits = source
            .search("  ", 1024)
            .await
            .unwrap_or_else(|error| panic!("provider '{}' search failed: {error}", source.id()));
        assert!(hits.is_empty(), "provider '{}': expected no hits", source.id());
    }
}

#[tokio::test]
async fn fact_items_are_capped_attributed_and_repeatable() {
    let day = Date::from_calendar_date(2025, Month::June, 5).expect("valid date");

    for source in fact_sources() {
        let first = source
            .facts(day)
            .await
            .unwrap_or_else(|error| panic!("source '{}' failed: {error}", source.id()));
        let second = source.facts(day).await.expect("second call");

        assert!(!first.is_empty(), "source '{}': no items", source.id());
        assert!(first.len() <= MAX_FACTS, "source '{}': too many items", source.id());
        assert_eq!(first, second, "source '{}': not repeatable", source.id());
        for item in &first {
            assert_eq!(item.source, source.id(), "source '{}': attribution", source.id());
            assert!(!item.title.trim().is_empty());
            assert!(!item.summary.trim().is_empty());
        }
    }
}

#[test]
fn fact_sources_report_stable_ids() {
    let ids: Vec<ProviderId> = fact_sources().iter().map(|source| source.id()).collect();
    assert_eq!(
        ids,
        vec![ProviderId::Wikipedia, ProviderId::Dataset, ProviderId::Wikipedia]
    );
}

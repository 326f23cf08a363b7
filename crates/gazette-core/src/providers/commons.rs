use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::data_source::{ImageSource, SourceError};
use crate::upstream::Upstream;
use crate::{Candidate, ProviderId};

/// Results requested per search.
pub const SEARCH_LIMIT: u32 = 8;

/// Wikimedia Commons file search (namespace 6) with image metadata.
#[derive(Clone)]
pub struct CommonsSearch {
    upstream: Upstream,
    api_url: String,
    timeout: Duration,
}

impl CommonsSearch {
    pub fn new(upstream: Upstream, api_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            upstream,
            api_url: api_url.into(),
            timeout,
        }
    }

    pub fn search_url(&self, query: &str, width: u32) -> String {
        let width = width.to_string();
        let limit = SEARCH_LIMIT.to_string();
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("generator", "search"),
            ("gsrnamespace", "6"),
            ("gsrsearch", query),
            ("gsrlimit", limit.as_str()),
            ("prop", "imageinfo"),
            ("iiprop", "url|extmetadata"),
            ("iiurlwidth", width.as_str()),
            ("redirects", "1"),
        ];

        let encoded = params
            .iter()
            .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}?{encoded}", self.api_url)
    }

    async fn run_search(&self, query: &str, width: u32) -> Result<Vec<Candidate>, SourceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.search_url(query, width);
        let raw: SearchResponse = self
            .upstream
            .get_json(ProviderId::WikimediaCommons, &url, self.timeout)
            .await?;
        Ok(normalize_search(raw, query))
    }
}

impl ImageSource for CommonsSearch {
    fn id(&self) -> ProviderId {
        ProviderId::WikimediaCommons
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        width: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>, SourceError>> + Send + 'a>> {
        Box::pin(self.run_search(query, width))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    pages: BTreeMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    index: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    #[serde(default)]
    thumburl: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    descriptionurl: Option<String>,
    #[serde(default)]
    extmetadata: BTreeMap<String, MetaField>,
}

#[derive(Debug, Deserialize)]
struct MetaField {
    #[serde(default)]
    value: Value,
}

fn meta_text(meta: &BTreeMap<String, MetaField>, name: &str) -> Option<String> {
    meta.get(name)
        .and_then(|field| field.value.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

fn normalize_search(raw: SearchResponse, query: &str) -> Vec<Candidate> {
    let Some(found) = raw.query else {
        return Vec::new();
    };

    let mut pages: Vec<Page> = found.pages.into_values().collect();
    pages.sort_by_key(|page| page.index.unwrap_or(i64::MAX));

    pages
        .into_iter()
        .filter_map(|page| {
            let title = page.title?;
            let info = page.imageinfo.into_iter().next()?;
            let thumbnail_url = info.thumburl.or(info.url)?;

            let license = meta_text(&info.extmetadata, "LicenseShortName")
                .or_else(|| meta_text(&info.extmetadata, "UsageTerms"));

            Some(Candidate {
                provider: ProviderId::WikimediaCommons,
                source_id: title,
                thumbnail_url,
                description_url: info.descriptionurl,
                license,
                author: meta_text(&info.extmetadata, "Artist"),
                attribution_required: meta_text(&info.extmetadata, "Attribution").is_some(),
                query: query.to_owned(),
            })
        })
        .collect()
}

use std::future::Future;
use std::pin::Pin;

use crate::data_source::{ImageSource, SourceError};
use crate::{Candidate, ProviderId};

/// Keyless Unsplash Source preview endpoint.
///
/// The endpoint redirects straight to an image, so a "search" only builds the
/// URL; the bytes are fetched at download time. No attribution metadata is
/// available.
#[derive(Debug, Clone)]
pub struct UnsplashSource {
    base_url: String,
}

impl UnsplashSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// 16:9 preview URL for `query`.
    pub fn preview_url(&self, query: &str, width: u32) -> String {
        let height = width * 9 / 16;
        format!(
            "{}/{width}x{height}/?{}",
            self.base_url,
            urlencoding::encode(query.trim())
        )
    }

    pub fn candidate(&self, query: &str, width: u32) -> Option<Candidate> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        Some(Candidate {
            provider: ProviderId::UnsplashSource,
            source_id: query.to_owned(),
            thumbnail_url: self.preview_url(query, width),
            description_url: None,
            license: None,
            author: None,
            attribution_required: false,
            query: query.to_owned(),
        })
    }
}

impl ImageSource for UnsplashSource {
    fn id(&self) -> ProviderId {
        ProviderId::UnsplashSource
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
        width: u32,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Candidate>, SourceError>> + Send + 'a>> {
        let hits = self.candidate(query, width).into_iter().collect();
        Box::pin(std::future::ready(Ok(hits)))
    }
}

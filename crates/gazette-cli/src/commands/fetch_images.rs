//! Batch job that picks and downloads a stock photo for each post.
//!
//! Posts are handled one at a time with a pause between them, and `--sleep`
//! also spaces every call to the same provider. Each download is re-encoded
//! as an RGB JPEG no wider than `--width`, lands in `{out_dir}/{slug}.jpg`
//! and gets a line in `{out_dir}/manifest.jsonl` carrying its credit line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use gazette_core::{validate, FeedConfig, FeedService, ProviderId};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::cli::FetchImagesArgs;
use crate::error::CliError;

pub const MANIFEST_FILE: &str = "manifest.jsonl";
const JPEG_QUALITY: u8 = 90;

/// One entry of the posts file.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub category_slug: Option<String>,
    #[serde(default)]
    pub has_image: bool,
}

#[derive(Debug, Clone)]
struct JobOptions {
    out_dir: PathBuf,
    replace: bool,
    limit: Option<usize>,
    width: u32,
    pause: Duration,
    slugs: Vec<String>,
}

impl JobOptions {
    fn from_args(args: &FetchImagesArgs) -> Result<Self, CliError> {
        let width = validate::image_width(args.width)?;
        if !args.sleep.is_finite() || args.sleep < 0.0 {
            return Err(CliError::Command(format!(
                "--sleep must be a non-negative number of seconds, got {}",
                args.sleep
            )));
        }

        Ok(Self {
            out_dir: args.out_dir.clone(),
            replace: args.replace,
            limit: args.limit.filter(|limit| *limit > 0),
            width,
            pause: Duration::from_secs_f64(args.sleep),
            slugs: args
                .slugs
                .iter()
                .map(|slug| slug.trim().to_owned())
                .filter(|slug| !slug.is_empty())
                .collect(),
        })
    }

    /// Raises the per-provider spacing to at least the job pause.
    fn paced(&self, config: FeedConfig) -> FeedConfig {
        let pacing = config.pacing.max(self.pause);
        config.with_pacing(pacing)
    }
}

/// Service configuration for an image job: `--sleep` becomes the minimum
/// spacing between calls to one provider, searches and downloads alike.
pub fn job_config(args: &FetchImagesArgs, config: FeedConfig) -> Result<FeedConfig, CliError> {
    Ok(JobOptions::from_args(args)?.paced(config))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Saved,
    Skipped,
    Missing,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostOutcome {
    pub slug: String,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PostOutcome {
    fn bare(slug: &str, status: PostStatus) -> Self {
        Self {
            slug: slug.to_owned(),
            status,
            provider: None,
            query: None,
            file: None,
            error: None,
        }
    }

    fn failed(slug: &str, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::bare(slug, PostStatus::Failed)
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct JobReport {
    pub processed: usize,
    pub skipped: usize,
    pub missing: usize,
    pub failed: usize,
    pub manifest: PathBuf,
    pub posts: Vec<PostOutcome>,
}

impl JobReport {
    fn record(&mut self, outcome: PostOutcome) {
        match outcome.status {
            PostStatus::Saved => self.processed += 1,
            PostStatus::Skipped => self.skipped += 1,
            PostStatus::Missing => self.missing += 1,
            PostStatus::Failed => self.failed += 1,
        }
        self.posts.push(outcome);
    }
}

#[derive(Debug, Serialize)]
struct ManifestLine<'a> {
    slug: &'a str,
    file: &'a Path,
    provider: ProviderId,
    source_id: &'a str,
    query: &'a str,
    url: &'a str,
    credit: String,
}

pub async fn run(args: &FetchImagesArgs, feeds: &FeedService) -> Result<Value, CliError> {
    let options = JobOptions::from_args(args)?;
    let posts = load_posts(&args.posts).await?;
    let feeds = feeds.clone().with_image_mode(args.provider.into());

    let report = run_job(&options, posts, &feeds).await?;
    info!(
        processed = report.processed,
        skipped = report.skipped,
        missing = report.missing,
        failed = report.failed,
        "image job finished"
    );
    Ok(serde_json::to_value(report)?)
}

pub async fn load_posts(path: &Path) -> Result<Vec<Post>, CliError> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&text)?)
}

async fn run_job(
    options: &JobOptions,
    posts: Vec<Post>,
    feeds: &FeedService,
) -> Result<JobReport, CliError> {
    tokio::fs::create_dir_all(&options.out_dir).await?;
    let manifest = options.out_dir.join(MANIFEST_FILE);
    let mut report = JobReport {
        manifest: manifest.clone(),
        ..JobReport::default()
    };

    let selected = posts
        .into_iter()
        .filter(|post| options.slugs.is_empty() || options.slugs.contains(&post.slug));

    let mut queue = Vec::new();
    for post in selected {
        if post.has_image && !options.replace {
            report.record(PostOutcome::bare(&post.slug, PostStatus::Skipped));
        } else {
            queue.push(post);
        }
    }
    if let Some(limit) = options.limit {
        queue.truncate(limit);
    }

    for (index, post) in queue.iter().enumerate() {
        if index > 0 && !options.pause.is_zero() {
            tokio::time::sleep(options.pause).await;
        }
        let outcome = process_post(options, post, feeds, &manifest).await;
        report.record(outcome);
    }

    Ok(report)
}

async fn process_post(
    options: &JobOptions,
    post: &Post,
    feeds: &FeedService,
    manifest: &Path,
) -> PostOutcome {
    if !is_safe_slug(&post.slug) {
        warn!(slug = %post.slug, "slug is not usable as a file name");
        return PostOutcome::failed(&post.slug, "slug is not usable as a file name");
    }

    let Some(candidate) = feeds
        .fetch_candidate_image(&post.title, post.category_slug.as_deref(), options.width)
        .await
    else {
        warn!(slug = %post.slug, mode = feeds.image_mode().as_str(), "no image found");
        return PostOutcome::bare(&post.slug, PostStatus::Missing);
    };

    let bytes = match feeds.download_image(&candidate).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(slug = %post.slug, provider = %candidate.provider, %error, "image download failed");
            return PostOutcome::failed(&post.slug, error);
        }
    };

    let jpeg = match to_jpeg(&bytes, options.width) {
        Ok(jpeg) => jpeg,
        Err(error) => {
            warn!(slug = %post.slug, provider = %candidate.provider, %error, "image decode failed");
            return PostOutcome::failed(&post.slug, error);
        }
    };

    let file = options.out_dir.join(format!("{}.jpg", post.slug));
    if let Err(error) = tokio::fs::write(&file, &jpeg).await {
        warn!(slug = %post.slug, path = %file.display(), %error, "image write failed");
        return PostOutcome::failed(&post.slug, error);
    }

    let line = ManifestLine {
        slug: &post.slug,
        file: &file,
        provider: candidate.provider,
        source_id: &candidate.source_id,
        query: &candidate.query,
        url: &candidate.thumbnail_url,
        credit: candidate.credit_line(),
    };
    if let Err(error) = append_manifest(manifest, &line).await {
        warn!(slug = %post.slug, %error, "manifest append failed");
        return PostOutcome::failed(&post.slug, error);
    }

    info!(slug = %post.slug, provider = %candidate.provider, query = %candidate.query, "image saved");
    PostOutcome {
        provider: Some(candidate.provider),
        query: Some(candidate.query),
        file: Some(file),
        ..PostOutcome::bare(&post.slug, PostStatus::Saved)
    }
}

async fn append_manifest(path: &Path, line: &ManifestLine<'_>) -> Result<(), CliError> {
    let mut text = serde_json::to_string(line)?;
    text.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Decodes any supported format and re-encodes it as an RGB JPEG, scaled
/// down to `max_width` when wider.
fn to_jpeg(bytes: &[u8], max_width: u32) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = if decoded.width() > max_width {
        let height = u64::from(decoded.height()) * u64::from(max_width) / u64::from(decoded.width());
        let height = u32::try_from(height).unwrap_or(u32::MAX).max(1);
        decoded.resize_exact(max_width, height, FilterType::Lanczos3)
    } else {
        decoded
    };
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut buffer = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY))?;
    Ok(buffer)
}

fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

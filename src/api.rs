//! API client for the OMDb metadata service.
//!
//! This module defines the [`MetadataProvider`] interface the tracker
//! consumes, an OMDb implementation of it, and [`build_catalogue`], which
//! turns provider responses into a [`ShowCatalogue`].

use crate::error::{Result, TrackerError};
use crate::types::{lunderize, sanitize_title, titleize, Episode, Season, ShowCatalogue};
use log::{debug, info, warn};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Maximum number of retry attempts for failed requests.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds (doubles each retry).
const BASE_RETRY_DELAY_MS: u64 = 500;

const USER_AGENT: &str = concat!("showtracker/", env!("CARGO_PKG_VERSION"));

/// Summary of a show as reported by the metadata provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowSummary {
    /// Whether the provider knows the title at all.
    pub found: bool,
    /// Whether the title resolved to a film rather than a series.
    pub is_film: bool,
    /// Number of seasons the provider lists.
    pub total_seasons: u32,
    /// Canonical title, if the provider returned one.
    pub title: Option<String>,
}

/// One episode record from a season listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeRecord {
    pub episode_number: u32,
    pub title: String,
    /// `None` when the provider reports "N/A" (typically unaired).
    pub rating: Option<f64>,
}

/// Source of show and season metadata.
#[allow(async_fn_in_trait)]
pub trait MetadataProvider {
    /// Look up a show by title.
    async fn fetch_show(&self, title: &str) -> Result<ShowSummary>;

    /// Fetch the ordered episode listing of one season (1-based).
    async fn fetch_season(&self, title: &str, season: u32) -> Result<Vec<EpisodeRecord>>;
}

/// Build the full catalogue of a show.
///
/// Fails with [`TrackerError::ShowNotFound`] if the provider doesn't know
/// the title and [`TrackerError::FoundFilm`] if it resolves to a film.
///
/// Announced seasons at the end with no episodes listed yet are dropped.
/// An unlisted season followed by listed ones fails with
/// [`TrackerError::MissingSeason`], since every season must hold at least
/// one episode for navigation to cross it.
pub async fn build_catalogue<P: MetadataProvider>(
    provider: &P,
    title: &str,
) -> Result<ShowCatalogue> {
    info!("Fetching catalogue for '{}'", title);
    let summary = provider.fetch_show(title).await?;

    if !summary.found {
        return Err(TrackerError::ShowNotFound(title.to_string()));
    }
    if summary.is_film {
        return Err(TrackerError::FoundFilm(title.to_string()));
    }

    let display_title = summary.title.unwrap_or_else(|| titleize(title));
    let mut catalogue = ShowCatalogue::new(&display_title);
    // Keep the key the user typed so tracker lookups stay stable.
    catalogue.key = lunderize(title);

    for season in 1..=summary.total_seasons {
        let records = provider.fetch_season(title, season).await?;
        debug!("Season {} of '{}': {} episodes", season, title, records.len());
        let episodes = records
            .into_iter()
            .map(|r| Episode::new(season, r.episode_number, &r.title, r.rating))
            .collect();
        catalogue.add_season(Season::from_episodes(season, episodes));
    }

    while catalogue
        .seasons
        .last()
        .is_some_and(|s| s.episodes_this_season() == 0)
    {
        debug!(
            "Dropping unlisted season {} of '{}'",
            catalogue.season_count(),
            title
        );
        catalogue.seasons.pop();
    }

    if let Some(idx) = catalogue
        .seasons
        .iter()
        .position(|s| s.episodes_this_season() == 0)
    {
        return Err(TrackerError::MissingSeason {
            title: catalogue.title,
            season: idx as u32 + 1,
        });
    }

    Ok(catalogue)
}

/// Parse an OMDb rating string; "N/A" and garbage map to `None`.
pub fn parse_rating(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|r| r.is_finite())
}

/// Whether an OMDb request is worth repeating.
///
/// OMDb answers unknown titles and bad keys with a normal JSON body (or a
/// 401), so only transport failures and 5xx responses are retried.
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout()
        || error.is_connect()
        || error.is_request()
        || error.status().is_some_and(|s| s.is_server_error())
}

/// Delay before retry number `attempt` (0-based), doubling each time.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BASE_RETRY_DELAY_MS.saturating_mul(2_u64.saturating_pow(attempt)))
}

/// Send an OMDb request, retrying transient failures.
///
/// `describe` names the lookup in log lines and in the final
/// [`TrackerError::Network`] message, e.g. "Fetch season 3 of 'house'".
async fn send_with_retries<T, F, Fut>(describe: &str, send: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, reqwest::Error>>,
{
    let mut attempt = 0;
    loop {
        let err = match send().await {
            Ok(response) => {
                if attempt > 0 {
                    info!("{} succeeded on attempt {}", describe, attempt + 1);
                }
                return Ok(response);
            }
            Err(err) => err,
        };

        if !is_transient(&err) {
            return Err(TrackerError::Network(format!("{}: {}", describe, err)));
        }
        if attempt == MAX_RETRIES {
            return Err(TrackerError::Network(format!(
                "{}: giving up after {} attempts: {}",
                describe,
                MAX_RETRIES + 1,
                err
            )));
        }

        let delay = backoff_delay(attempt);
        warn!(
            "{} failed ({}), retrying in {:?} [{}/{}]",
            describe,
            err,
            delay,
            attempt + 1,
            MAX_RETRIES
        );
        sleep(delay).await;
        attempt += 1;
    }
}

// Response types for title lookups
#[derive(Debug, Deserialize)]
struct TitleResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
    #[serde(rename = "totalSeasons", default)]
    total_seasons: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

// Response types for season listings
#[derive(Debug, Deserialize)]
struct SeasonResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Episodes", default)]
    episodes: Vec<RawEpisode>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEpisode {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Episode")]
    episode: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: Option<String>,
}

/// Metadata provider for the OMDb API (<http://www.omdbapi.com>).
pub struct OmdbProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbProvider {
    /// Creates a new OMDb provider.
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    async fn request<T>(&self, operation: &str, params: Vec<(&'static str, String)>) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let api_key = self.api_key.clone().ok_or_else(|| {
            TrackerError::Config(format!(
                "no OMDb API key configured; set api_key in the config file or {}",
                crate::config::API_KEY_ENV
            ))
        })?;

        let mut query = params;
        query.push(("apikey", api_key));

        let resp = send_with_retries(operation, || {
            let client = self.client.clone();
            let url = format!("{}/", self.base_url);
            let query = query.clone();
            async move { client.get(url).query(&query).send().await?.error_for_status() }
        })
        .await?;

        resp.json::<T>()
            .await
            .map_err(|e| TrackerError::Parse(format!("{}: {}", operation, e)))
    }
}

impl MetadataProvider for OmdbProvider {
    async fn fetch_show(&self, title: &str) -> Result<ShowSummary> {
        let request_title = sanitize_title(title);
        debug!("Looking up '{}' on OMDb", request_title);

        let parsed: TitleResponse = self
            .request(
                &format!("Look up '{}'", request_title),
                vec![("t", request_title.clone())],
            )
            .await?;

        if parsed.response != "True" {
            debug!(
                "OMDb has no match for '{}': {}",
                request_title,
                parsed.error.as_deref().unwrap_or("no error given")
            );
            return Ok(ShowSummary {
                found: false,
                is_film: false,
                total_seasons: 0,
                title: None,
            });
        }

        let is_film = parsed.kind.as_deref() == Some("movie");
        let total_seasons = parsed
            .total_seasons
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0);

        Ok(ShowSummary {
            found: true,
            is_film,
            total_seasons,
            title: parsed.title,
        })
    }

    async fn fetch_season(&self, title: &str, season: u32) -> Result<Vec<EpisodeRecord>> {
        let request_title = sanitize_title(title);

        let parsed: SeasonResponse = self
            .request(
                &format!("Fetch season {} of '{}'", season, request_title),
                vec![("t", request_title.clone()), ("season", season.to_string())],
            )
            .await?;

        if parsed.response != "True" {
            warn!(
                "OMDb returned no episodes for season {} of '{}': {}",
                season,
                request_title,
                parsed.error.as_deref().unwrap_or("no error given")
            );
            return Ok(Vec::new());
        }

        Ok(parsed
            .episodes
            .into_iter()
            .filter_map(|raw| {
                let episode_number = raw.episode.trim().parse().ok()?;
                Some(EpisodeRecord {
                    episode_number,
                    title: raw.title,
                    rating: raw.imdb_rating.as_deref().and_then(parse_rating),
                })
            })
            .collect())
    }
}

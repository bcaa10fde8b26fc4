//! Semantic Scholar search client: the paginated retrieval loop.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::time::sleep;

use crate::config::Config;
use crate::models::Paper;
use crate::source::{CancelToken, RateLimiter, SourceError};

/// Field projection requested from the API for every page.
const SEARCH_FIELDS: &str = "paperId,title,authors,year,citationCount,influentialCitationCount,tldr,abstract,publicationTypes,externalIds,openAccessPdf,url,citationStyles";

/// Hard cap the API places on a single page.
const PAGE_CAP: usize = 100;

/// Transport attempts per page before giving up.
const MAX_ATTEMPTS: u32 = 5;

/// Seconds to wait on HTTP 429 when no Retry-After header is present.
const DEFAULT_RETRY_AFTER: u64 = 15;

/// Client for the Semantic Scholar Graph API paper-search endpoint.
#[derive(Debug, Clone)]
pub struct SemanticScholar {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    limiter: Arc<RateLimiter>,
}

impl SemanticScholar {
    /// Create a client. The rate limiter is injected so callers can share
    /// one gate across clients or keep them independent.
    pub fn new(config: &Config, limiter: Arc<RateLimiter>) -> Self {
        let client = Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.api.base_url.clone(),
            api_key: config.api.api_key.clone(),
            limiter,
        }
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run one search, following pagination until `max_results` records are
    /// accumulated or the result set is exhausted.
    ///
    /// `on_progress` is called synchronously on the fetch task, before each
    /// page request and after each page is absorbed, with a 0-100 percent
    /// and a short message; it must not block. Cancelling via `cancel`
    /// returns the records fetched so far instead of an error.
    pub async fn search<F>(
        &self,
        query: &str,
        max_results: usize,
        mut on_progress: F,
        cancel: &CancelToken,
    ) -> Result<Vec<Paper>, SourceError>
    where
        F: FnMut(u8, &str),
    {
        let mut papers: Vec<Paper> = Vec::new();
        let mut offset: usize = 0;

        while papers.len() < max_results {
            if cancel.is_cancelled() {
                tracing::debug!(fetched = papers.len(), "search cancelled");
                break;
            }

            on_progress(
                percent(papers.len(), max_results),
                &format!("Fetching results (offset: {offset})..."),
            );

            let limit = (max_results - papers.len()).min(PAGE_CAP);
            let page = self
                .fetch_page(
                    query,
                    offset,
                    limit,
                    percent(papers.len(), max_results),
                    &mut on_progress,
                    cancel,
                )
                .await?;
            let Some(SearchPage { data, next }) = page else {
                // Cancelled during a retry wait.
                break;
            };

            if data.is_empty() {
                break;
            }

            let received = data.len();
            papers.extend(data.into_iter().map(normalize));

            on_progress(
                percent(papers.len(), max_results),
                &format!("Processed {} results...", papers.len()),
            );

            // Follow the explicit cursor when the response carries one;
            // without it this was the last page.
            offset = next.unwrap_or(offset + received);
            if next.is_none() {
                break;
            }
        }

        papers.truncate(max_results);
        Ok(papers)
    }

    /// Fetch one page, absorbing 429s and retrying transport failures with
    /// exponential backoff. Returns `Ok(None)` if cancelled during a wait.
    async fn fetch_page(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
        percent: u8,
        on_progress: &mut dyn FnMut(u8, &str),
        cancel: &CancelToken,
    ) -> Result<Option<SearchPage>, SourceError> {
        let url = format!("{}/paper/search", self.base_url);
        let mut attempts: u32 = 0;

        loop {
            self.limiter.acquire().await;

            let mut request = self.client.get(&url).query(&[
                ("query", query.to_string()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("fields", SEARCH_FIELDS.to_string()),
            ]);
            if let Some(ref key) = self.api_key {
                request = request.header("x-api-key", key);
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) => {
                    attempts += 1;
                    if attempts >= MAX_ATTEMPTS {
                        return Err(SourceError::Network {
                            attempts,
                            source: err,
                        });
                    }
                    let delay = Duration::from_secs(1u64 << (attempts - 1));
                    tracing::debug!(attempt = attempts, ?delay, error = %err, "transport error, retrying");
                    if cancel.is_cancelled() {
                        return Ok(None);
                    }
                    sleep(delay).await;
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                // Not counted against the attempt budget.
                let wait = retry_after_seconds(&response).unwrap_or(DEFAULT_RETRY_AFTER);
                tracing::warn!(wait, "rate limited by the API");
                on_progress(percent, &format!("Rate limit hit, waiting {wait} seconds..."));
                if cancel.is_cancelled() {
                    return Ok(None);
                }
                sleep(Duration::from_secs(wait)).await;
                continue;
            }
            if !status.is_success() {
                return Err(classify_status(status));
            }

            return match response.json::<SearchPage>().await {
                Ok(page) => Ok(Some(page)),
                Err(err) => Err(SourceError::Parse(err.to_string())),
            };
        }
    }
}

/// Map a non-success status to its error kind. Everything here is
/// non-transient and fails the search immediately.
fn classify_status(status: StatusCode) -> SourceError {
    match status {
        StatusCode::BAD_REQUEST => SourceError::BadQuery,
        StatusCode::UNAUTHORIZED => SourceError::Unauthorized,
        StatusCode::FORBIDDEN => SourceError::Forbidden,
        StatusCode::NOT_FOUND => SourceError::NotFound,
        StatusCode::INTERNAL_SERVER_ERROR => SourceError::Upstream,
        other => SourceError::UnexpectedStatus(other.as_u16()),
    }
}

fn retry_after_seconds(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn percent(done: usize, total: usize) -> u8 {
    ((done * 100) / total.max(1)).min(100) as u8
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchPage {
    data: Vec<RawPaper>,
    next: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawPaper {
    paper_id: Option<String>,
    title: Option<String>,
    authors: Option<Vec<RawAuthor>>,
    year: Option<i64>,
    citation_count: Option<i64>,
    influential_citation_count: Option<i64>,
    tldr: Option<RawTldr>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    publication_types: Option<Vec<Option<String>>>,
    external_ids: Option<RawExternalIds>,
    open_access_pdf: Option<RawOpenAccessPdf>,
    url: Option<String>,
    citation_styles: Option<RawCitationStyles>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAuthor {
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTldr {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOpenAccessPdf {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCitationStyles {
    bibtex: Option<String>,
}

/// Flatten one raw API item into a [`Paper`].
///
/// Total over anything the page decoder admits: every nested lookup
/// defaults to empty text, list values drop null entries before joining,
/// and absent numerics become empty strings rather than zeros.
fn normalize(raw: RawPaper) -> Paper {
    let authors = raw
        .authors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|author| author.name)
        .collect::<Vec<_>>()
        .join(", ");

    let publication_types = raw
        .publication_types
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    Paper {
        paper_id: raw.paper_id.unwrap_or_default(),
        title: raw.title.unwrap_or_default(),
        authors,
        year: raw.year.map(|y| y.to_string()).unwrap_or_default(),
        citations: raw.citation_count.map(|c| c.to_string()).unwrap_or_default(),
        influential_citations: raw
            .influential_citation_count
            .map(|c| c.to_string())
            .unwrap_or_default(),
        tldr: raw.tldr.and_then(|t| t.text).unwrap_or_default(),
        abstract_text: raw.abstract_text.unwrap_or_default(),
        publication_types,
        doi: raw.external_ids.and_then(|e| e.doi).unwrap_or_default(),
        pdf_url: raw.open_access_pdf.and_then(|p| p.url).unwrap_or_default(),
        url: raw.url.unwrap_or_default(),
        bibtex: raw.citation_styles.and_then(|c| c.bibtex).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawPaper {
        serde_json::from_value(value).expect("raw paper should deserialize")
    }

    #[test]
    fn normalize_full_item() {
        let paper = normalize(raw(json!({
            "paperId": "649def34f8be52c8b66281af98ae884c09aef38b",
            "title": "Critical Discourse Analysis",
            "authors": [{"name": "Norman Fairclough"}, {"name": null}, {"name": "Ruth Wodak"}],
            "year": 2008,
            "citationCount": 1234,
            "influentialCitationCount": 56,
            "tldr": {"text": "A survey of CDA methods."},
            "abstract": "This paper surveys...",
            "publicationTypes": ["JournalArticle", null, "Review"],
            "externalIds": {"DOI": "10.1000/example", "CorpusId": 42},
            "openAccessPdf": {"url": "https://example.org/paper.pdf"},
            "url": "https://www.semanticscholar.org/paper/649def",
            "citationStyles": {"bibtex": "@article{fairclough2008}"}
        })));

        assert_eq!(paper.title, "Critical Discourse Analysis");
        assert_eq!(paper.authors, "Norman Fairclough, Ruth Wodak");
        assert_eq!(paper.year, "2008");
        assert_eq!(paper.citations, "1234");
        assert_eq!(paper.influential_citations, "56");
        assert_eq!(paper.tldr, "A survey of CDA methods.");
        assert_eq!(paper.publication_types, "JournalArticle, Review");
        assert_eq!(paper.doi, "10.1000/example");
        assert_eq!(paper.pdf_url, "https://example.org/paper.pdf");
        assert_eq!(paper.bibtex, "@article{fairclough2008}");
    }

    #[test]
    fn normalize_null_tldr_and_missing_external_ids() {
        let paper = normalize(raw(json!({
            "paperId": "abc",
            "title": "Sparse Item",
            "tldr": null
        })));

        assert_eq!(paper.title, "Sparse Item");
        assert_eq!(paper.tldr, "");
        assert_eq!(paper.doi, "");
        assert_eq!(paper.pdf_url, "");
        assert_eq!(paper.bibtex, "");
    }

    #[test]
    fn normalize_absent_numerics_stay_empty() {
        let paper = normalize(raw(json!({"title": "No Counts"})));

        // Missing counts are empty text, not "0".
        assert_eq!(paper.year, "");
        assert_eq!(paper.citations, "");
        assert_eq!(paper.influential_citations, "");
    }

    #[test]
    fn normalize_empty_object() {
        let paper = normalize(raw(json!({})));
        assert_eq!(paper, Paper::default());
    }

    #[test]
    fn percent_floors_and_clamps() {
        assert_eq!(percent(0, 200), 0);
        assert_eq!(percent(99, 200), 49);
        assert_eq!(percent(200, 200), 100);
        assert_eq!(percent(250, 200), 100);
        assert_eq!(percent(0, 0), 0);
    }
}

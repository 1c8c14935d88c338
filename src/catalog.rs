use std::time::Duration;
use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use crate::article::Article;
use crate::error::{AppError, Result};
use crate::pdf::extract_pdf_text;

pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
pub const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

// Create a static client to reuse connections
pub(crate) static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .user_agent(concat!("arxiv-analyzer/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
});

// Create static selectors to avoid recompiling them each time
static ENTRY_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("entry"));
static ID_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("id"));
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("title"));
static SUMMARY_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("summary"));
static PUBLISHED_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("published"));
static AUTHOR_NAME_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("author name"));
static CATEGORY_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("category"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Failed to parse static selector")
}

fn default_max_results() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchRequest {
    #[serde(default)]
    pub arxiv_id: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default)]
    pub fetch_full_text: bool,
}

/// An article as returned by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogArticle {
    pub arxiv_id: String,
    pub title: String,
    pub authors: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub categories: Vec<String>,
    pub published: String,
    pub pdf_url: String,
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub text_length: Option<usize>,
}

impl From<CatalogArticle> for Article {
    fn from(fetched: CatalogArticle) -> Self {
        Article {
            arxiv_id: fetched.arxiv_id,
            title: fetched.title,
            abstract_text: fetched.abstract_text,
            full_text: fetched.full_text,
            categories: fetched.categories,
        }
    }
}

pub struct CatalogClient {
    base_url: String,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(ARXIV_API_URL)
    }
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, req: &FetchRequest) -> Result<Vec<CatalogArticle>> {
        let params: Vec<(&str, String)> = match (&req.arxiv_id, &req.query) {
            (Some(id), _) if !id.trim().is_empty() => vec![("id_list", id.trim().to_string())],
            (_, Some(query)) if !query.trim().is_empty() => vec![
                ("search_query", query.trim().to_string()),
                ("max_results", req.max_results.to_string()),
            ],
            _ => {
                return Err(AppError::InvalidInput(
                    "Either arxiv_id or query must be provided".to_string(),
                ));
            }
        };

        tracing::info!(?params, "querying arXiv");
        let response = HTTP_CLIENT
            .get(&self.base_url)
            .query(&params)
            .timeout(CATALOG_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::UpstreamFailure(format!(
                "arXiv API returned status {}",
                status
            )));
        }
        let body = response.text().await?;

        let mut articles = parse_feed(&body);
        if articles.is_empty() {
            return Err(AppError::NotFound("No articles found".to_string()));
        }

        if req.fetch_full_text {
            for article in &mut articles {
                let full_text = extract_pdf_text(&article.pdf_url).await;
                article.text_length = Some(full_text.as_ref().map_or(0, |t| t.chars().count()));
                article.full_text = full_text;
            }
        }

        Ok(articles)
    }
}

/// Parses an arXiv Atom feed. Entries without an id or title are skipped.
pub fn parse_feed(xml: &str) -> Vec<CatalogArticle> {
    let document = Html::parse_document(xml);
    document
        .select(&ENTRY_SELECTOR)
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(entry: ElementRef<'_>) -> Option<CatalogArticle> {
    let id_url = first_text(entry, &ID_SELECTOR)?;
    let arxiv_id = strip_version(id_url.rsplit("/abs/").next().unwrap_or(&id_url)).to_string();
    let title = first_text(entry, &TITLE_SELECTOR).filter(|t| !t.is_empty())?;

    let authors = entry
        .select(&AUTHOR_NAME_SELECTOR)
        .map(|name| normalize_whitespace(&name.text().collect::<String>()))
        .collect();
    let categories = entry
        .select(&CATEGORY_SELECTOR)
        .filter_map(|cat| cat.value().attr("term"))
        .map(str::to_string)
        .collect();

    Some(CatalogArticle {
        pdf_url: format!("https://arxiv.org/pdf/{}.pdf", arxiv_id),
        arxiv_id,
        title,
        authors,
        abstract_text: first_text(entry, &SUMMARY_SELECTOR).unwrap_or_default(),
        categories,
        published: first_text(entry, &PUBLISHED_SELECTOR).unwrap_or_default(),
        full_text: None,
        text_length: None,
    })
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
}

/// Drops a trailing `vN` version marker from an arXiv id.
pub fn strip_version(id: &str) -> &str {
    match id.rfind('v') {
        Some(pos)
            if pos + 1 < id.len() && id[pos + 1..].bytes().all(|b| b.is_ascii_digit()) =>
        {
            &id[..pos]
        }
        _ => id,
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

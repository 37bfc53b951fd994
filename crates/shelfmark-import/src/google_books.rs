use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shelfmark_core::IdentifierKind;

use crate::error::{ImportError, Result};

const BASE_URL: &str = "https://www.googleapis.com/books/v1";
const USER_AGENT: &str = concat!("shelfmark/", env!("CARGO_PKG_VERSION"));

/// Keyword filters for a volume search. At least one must be filled in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeQuery {
    pub author: Option<String>,
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub lccn: Option<String>,
    pub oclc: Option<String>,
}

impl VolumeQuery {
    fn terms(&self) -> Vec<(&'static str, &str)> {
        [
            ("inauthor", &self.author),
            ("intitle", &self.title),
            ("isbn", &self.isbn),
            ("lccn", &self.lccn),
            ("oclc", &self.oclc),
        ]
        .into_iter()
        .filter_map(|(keyword, slot)| {
            slot.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| (keyword, s))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.terms().is_empty()
    }

    /// The free-text `q` parameter: supplied filters as `keyword:value`
    /// terms, space-joined.
    pub fn to_query_string(&self) -> String {
        self.terms()
            .iter()
            .map(|(keyword, value)| format!("{keyword}:{value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One volume as the API reported it, trimmed to the fields the catalog
/// stores. Parsing is tolerant: anything absent stays `None`/empty rather
/// than failing the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVolume {
    pub title: String,
    pub authors: Vec<String>,
    pub published_date: Option<String>,
    pub page_count: Option<u32>,
    pub language: Option<String>,
    pub cover_url: Option<String>,
    pub identifiers: Vec<(IdentifierKind, String)>,
}

impl RawVolume {
    pub fn from_json(v: &Value) -> Self {
        let info = v.get("volumeInfo").unwrap_or(v);

        let title = info
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let authors = info
            .get("authors")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(Value::as_str)
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let published_date = info
            .get("publishedDate")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);

        let page_count = info
            .get("pageCount")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok());

        let language = info
            .get("language")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);

        let cover_url = info
            .get("imageLinks")
            .and_then(|links| links.get("thumbnail"))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);

        let mut identifiers: Vec<(IdentifierKind, String)> = Vec::new();
        if let Some(arr) = info.get("industryIdentifiers").and_then(Value::as_array) {
            for item in arr {
                let kind = item
                    .get("type")
                    .and_then(Value::as_str)
                    .map(IdentifierKind::from_api)
                    .unwrap_or(IdentifierKind::Other);
                let Some(value) = item.get("identifier").and_then(Value::as_str) else {
                    continue;
                };
                // A book carries one identifier per kind; keep the first.
                if identifiers.iter().all(|(k, _)| *k != kind) {
                    identifiers.push((kind, value.to_string()));
                }
            }
        }

        Self {
            title,
            authors,
            published_date,
            page_count,
            language,
            cover_url,
            identifiers,
        }
    }
}

pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client somewhere else — the config's override or a test
    /// server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .expect("failed to build reqwest client");
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Single GET against the volume search endpoint. An empty result set
    /// (`totalItems == 0`) is a normal outcome; a non-success status or an
    /// unparsable body is a hard failure.
    pub async fn search(&self, query: &VolumeQuery) -> Result<Vec<RawVolume>> {
        if query.is_empty() {
            return Err(ImportError::EmptyQuery);
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ImportError::Parse(format!("invalid base URL {}: {e}", self.base_url)))?;
        {
            let mut segs = url
                .path_segments_mut()
                .map_err(|_| ImportError::Parse("invalid Google Books base URL".to_string()))?;
            segs.push("volumes");
        }
        url.query_pairs_mut()
            .append_pair("q", &query.to_query_string());

        let resp = self.client.get(url.clone()).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ImportError::Api(
                url.to_string(),
                format!("HTTP {status}: {body}"),
            ));
        }

        let body = resp.text().await?;
        let json: Value =
            serde_json::from_str(&body).map_err(|e| ImportError::Parse(e.to_string()))?;

        let total = json
            .get("totalItems")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        if total == 0 {
            return Ok(Vec::new());
        }

        Ok(json
            .get("items")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().map(RawVolume::from_json).collect())
            .unwrap_or_default())
    }
}

impl Default for GoogleBooksClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn query_string_joins_supplied_filters() {
        let query = VolumeQuery {
            author: Some("Tolkien".to_string()),
            title: Some("Hobbit".to_string()),
            ..Default::default()
        };
        assert_eq!(query.to_query_string(), "inauthor:Tolkien intitle:Hobbit");

        let only_isbn = VolumeQuery {
            isbn: Some("9788307018867".to_string()),
            ..Default::default()
        };
        assert_eq!(only_isbn.to_query_string(), "isbn:9788307018867");
        assert!(VolumeQuery::default().is_empty());
    }

    #[test]
    fn parses_a_volume_item() {
        let item = json!({
            "volumeInfo": {
                "title": "Hobbit czyli Tam i z powrotem",
                "authors": ["J. R. R. Tolkien"],
                "publishedDate": "2004",
                "pageCount": 314,
                "language": "pl",
                "imageLinks": {"thumbnail": "http://books.google.com/books/content?id=abc"},
                "industryIdentifiers": [
                    {"type": "ISBN_13", "identifier": "9788324589456"},
                    {"type": "ISBN_10", "identifier": "8324589457"}
                ]
            }
        });

        let volume = RawVolume::from_json(&item);
        assert_eq!(volume.title, "Hobbit czyli Tam i z powrotem");
        assert_eq!(volume.authors.len(), 1);
        assert_eq!(volume.published_date.as_deref(), Some("2004"));
        assert_eq!(volume.page_count, Some(314));
        assert_eq!(volume.identifiers.len(), 2);
        assert_eq!(volume.identifiers[0].0, IdentifierKind::Isbn13);
    }

    #[test]
    fn missing_fields_stay_absent() {
        let volume = RawVolume::from_json(&json!({"volumeInfo": {"title": "Bare"}}));
        assert_eq!(volume.title, "Bare");
        assert!(volume.authors.is_empty());
        assert_eq!(volume.published_date, None);
        assert!(volume.identifiers.is_empty());

        // Unknown identifier types collapse onto OTHER; the first one wins.
        let volume = RawVolume::from_json(&json!({
            "volumeInfo": {
                "title": "Odd",
                "industryIdentifiers": [
                    {"type": "LCCN", "identifier": "12345"},
                    {"type": "OCLC", "identifier": "67890"}
                ]
            }
        }));
        assert_eq!(
            volume.identifiers,
            vec![(IdentifierKind::Other, "12345".to_string())]
        );
    }

    #[tokio::test]
    async fn search_parses_the_item_list() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes?q=intitle%3AHobbit")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "totalItems": 1,
                    "items": [
                        {"volumeInfo": {"title": "Hobbit", "authors": ["Tolkien"], "language": "en"}}
                    ]
                }"#,
            )
            .create_async()
            .await;

        let client = GoogleBooksClient::with_base_url(server.url());
        let query = VolumeQuery {
            title: Some("Hobbit".to_string()),
            ..Default::default()
        };
        let volumes = client.search(&query).await.unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].title, "Hobbit");
    }

    #[tokio::test]
    async fn zero_total_items_is_a_normal_empty_result() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes?q=intitle%3ANothing")
            .with_status(200)
            .with_body(r#"{"totalItems": 0}"#)
            .create_async()
            .await;

        let client = GoogleBooksClient::with_base_url(server.url());
        let query = VolumeQuery {
            title: Some("Nothing".to_string()),
            ..Default::default()
        };
        assert!(client.search(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_status_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes?q=intitle%3ABoom")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let client = GoogleBooksClient::with_base_url(server.url());
        let query = VolumeQuery {
            title: Some("Boom".to_string()),
            ..Default::default()
        };
        let err = client.search(&query).await.unwrap_err();
        assert!(matches!(err, ImportError::Api(..)), "{err}");
    }

    #[tokio::test]
    async fn unparsable_body_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/volumes?q=intitle%3ABad")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = GoogleBooksClient::with_base_url(server.url());
        let query = VolumeQuery {
            title: Some("Bad".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            client.search(&query).await.unwrap_err(),
            ImportError::Parse(_)
        ));
    }

    #[tokio::test]
    async fn empty_query_is_rejected_before_any_request() {
        let client = GoogleBooksClient::with_base_url("http://127.0.0.1:1");
        assert!(matches!(
            client.search(&VolumeQuery::default()).await.unwrap_err(),
            ImportError::EmptyQuery
        ));
    }
}

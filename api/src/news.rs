//! Soccer news from the ESPN site API, merged across league feeds.

use crate::client::{ApiError, ApiResult};
use crate::espn::{EspnArticle, NewsResponse};
use crate::{NewsArticle, NewsImage};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use log::{debug, warn};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

pub const ESPN_SOCCER: &str = "https://site.api.espn.com/apis/site/v2/sports/soccer";
/// League key that selects every feed.
pub const ALL_LEAGUES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewsSource {
    pub key: &'static str,
    pub name: &'static str,
}

pub const NEWS_SOURCES: &[NewsSource] = &[
    NewsSource { key: "eng.1", name: "Premier League" },
    NewsSource { key: "esp.1", name: "La Liga" },
    NewsSource { key: "ita.1", name: "Serie A" },
    NewsSource { key: "ger.1", name: "Bundesliga" },
    NewsSource { key: "fra.1", name: "Ligue 1" },
    NewsSource { key: "uefa.champions", name: "Champions League" },
    NewsSource { key: "uefa.europa", name: "Europa League" },
];

/// Feeds for a league key, or every feed for [`ALL_LEAGUES`].
pub fn sources_for(league: &str) -> ApiResult<Vec<NewsSource>> {
    if league == ALL_LEAGUES {
        return Ok(NEWS_SOURCES.to_vec());
    }
    NEWS_SOURCES
        .iter()
        .find(|s| s.key == league)
        .map(|s| vec![*s])
        .ok_or_else(|| ApiError::NotFound(format!("no news feed for league {league:?}")))
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl Default for NewsClient {
    fn default() -> Self {
        Self {
            client: Client::builder()
                .user_agent("pitchiq/0.1 (soccer stats)")
                .build()
                .unwrap_or_default(),
            base_url: ESPN_SOCCER.to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl NewsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Articles for `league`, newest first.
    ///
    /// Feeds are fetched concurrently and a failed feed is skipped. Only when
    /// every feed fails is the result an error; no articles at all is
    /// `Ok(vec![])`.
    pub async fn fetch_news(&self, league: &str) -> ApiResult<Vec<NewsArticle>> {
        let sources = sources_for(league)?;
        let results = join_all(sources.iter().map(|s| self.fetch_feed(s))).await;

        let mut feeds = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (source, result) in sources.iter().zip(results) {
            match result {
                Ok(articles) => feeds.push(articles),
                Err(e) => {
                    warn!("{} news feed failed: {e}", source.name);
                    failures.push(e);
                }
            }
        }

        if feeds.is_empty() {
            return Err(match failures.len() {
                1 => failures.remove(0),
                n => ApiError::Other(format!("all {n} news feeds failed")),
            });
        }
        Ok(merge_articles(feeds))
    }

    async fn fetch_feed(&self, source: &NewsSource) -> ApiResult<Vec<NewsArticle>> {
        let url = format!("{}/{}/news", self.base_url, source.key);
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Api(status, url));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e, url.clone()))?;
        let raw: NewsResponse =
            serde_json::from_str(&body).map_err(|e| ApiError::Parsing(e, url.clone()))?;

        Ok(raw.articles.iter().filter_map(map_article).collect())
    }
}

pub fn map_article(raw: &EspnArticle) -> Option<NewsArticle> {
    let id = raw.id.owned()?;
    let headline = raw.headline.owned()?;

    let images = raw
        .images
        .iter()
        .filter_map(|img| {
            Some(NewsImage {
                url: img.url.owned()?,
                caption: img.caption.owned(),
                width: img.width.parse(),
                height: img.height.parse(),
            })
        })
        .collect();

    Some(NewsArticle {
        id,
        headline,
        description: raw.description.owned(),
        published: raw
            .published
            .get()
            .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        link: raw
            .links
            .as_ref()
            .and_then(|l| l.web.as_ref())
            .and_then(|w| w.href.owned()),
        images,
    })
}

/// Merge feeds, keeping the last copy of each article id, newest first.
/// Undated articles sort last.
pub fn merge_articles(feeds: Vec<Vec<NewsArticle>>) -> Vec<NewsArticle> {
    let mut merged: Vec<NewsArticle> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for article in feeds.into_iter().flatten() {
        match index.get(&article.id) {
            Some(&i) => merged[i] = article,
            None => {
                index.insert(article.id.clone(), merged.len());
                merged.push(article);
            }
        }
    }

    merged.sort_by(|a, b| b.published.cmp(&a.published));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Server;

    fn article(id: &str, headline: &str, day: Option<u32>) -> NewsArticle {
        NewsArticle {
            id: id.into(),
            headline: headline.into(),
            published: day.map(|d| Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn unknown_league_is_not_found() {
        assert!(matches!(sources_for("mls"), Err(ApiError::NotFound(_))));
        assert_eq!(sources_for("all").unwrap().len(), 7);
        assert_eq!(sources_for("eng.1").unwrap()[0].name, "Premier League");
    }

    #[test]
    fn duplicate_ids_keep_last_copy() {
        let merged = merge_articles(vec![
            vec![article("1", "first", Some(1)), article("2", "other", Some(2))],
            vec![article("1", "second", Some(1))],
        ]);
        assert_eq!(merged.len(), 2);
        let one = merged.iter().find(|a| a.id == "1").unwrap();
        assert_eq!(one.headline, "second");
    }

    #[test]
    fn newest_first_undated_last() {
        let merged = merge_articles(vec![vec![
            article("a", "old", Some(1)),
            article("b", "undated", None),
            article("c", "new", Some(20)),
        ]]);
        let ids: Vec<&str> = merged.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn articles_need_id_and_headline() {
        let raw: NewsResponse = serde_json::from_str(
            r#"{"articles": [
                {"id": 123, "headline": "Arsenal win", "published": "2024-05-19T17:30:00Z",
                 "links": {"web": {"href": "https://espn.com/a"}},
                 "images": [{"url": "https://img/1.jpg", "width": 576, "height": "324"}, {"caption": "no url"}]},
                {"headline": "no id"},
                {"id": 5}
            ]}"#,
        )
        .unwrap();
        let mapped: Vec<NewsArticle> = raw.articles.iter().filter_map(map_article).collect();
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].id, "123");
        assert_eq!(mapped[0].link.as_deref(), Some("https://espn.com/a"));
        assert_eq!(mapped[0].images.len(), 1);
        assert_eq!(mapped[0].images[0].height, Some(324));
        assert!(mapped[0].published.is_some());
    }

    #[tokio::test]
    async fn failed_feed_is_skipped() {
        let mut server = Server::new_async().await;
        let mut mocks = Vec::new();
        for source in NEWS_SOURCES {
            let path = format!("/{}/news", source.key);
            let mock = server.mock("GET", path.as_str());
            let mock = if source.key == "esp.1" {
                mock.with_status(503)
            } else {
                mock.with_status(200).with_body(format!(
                    r#"{{"articles": [{{"id": "{0}", "headline": "{0} story", "published": "2024-05-19T10:00:00Z"}},
                                      {{"id": "shared", "headline": "shared story"}}]}}"#,
                    source.key
                ))
            };
            mocks.push(mock.create_async().await);
        }

        let client = NewsClient::new().with_base_url(server.url());
        let articles = client.fetch_news(ALL_LEAGUES).await.unwrap();
        assert_eq!(articles.len(), 7);
        assert_eq!(articles.iter().filter(|a| a.id == "shared").count(), 1);
        assert!(articles.iter().all(|a| a.id != "esp.1"));
        assert_eq!(articles.last().unwrap().id, "shared");
    }

    #[tokio::test]
    async fn all_feeds_failing_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = NewsClient::new().with_base_url(server.url());
        assert!(matches!(client.fetch_news("all").await, Err(ApiError::Other(_))));
        assert!(matches!(client.fetch_news("eng.1").await, Err(ApiError::Api(..))));
    }

    #[tokio::test]
    async fn empty_feed_is_not_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/eng.1/news")
            .with_status(200)
            .with_body(r#"{"articles": []}"#)
            .create_async()
            .await;

        let client = NewsClient::new().with_base_url(server.url());
        assert!(client.fetch_news("eng.1").await.unwrap().is_empty());
    }
}

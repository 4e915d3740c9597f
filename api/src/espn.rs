/// ESPN news API raw wire types: serde shapes for the per-league soccer news feeds.
/// These map to `NewsArticle` via news.rs.
use crate::sportsdb::{Loose, list};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// News feed  (site v2 API: /sports/soccer/{league}/news)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct NewsResponse {
    #[serde(deserialize_with = "list")]
    pub articles: Vec<EspnArticle>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EspnArticle {
    pub id: Loose, // numeric on the wire
    pub headline: Loose,
    pub description: Loose,
    pub published: Loose, // ISO 8601
    pub links: Option<EspnLinks>,
    #[serde(deserialize_with = "list")]
    pub images: Vec<EspnImage>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EspnLinks {
    pub web: Option<EspnLink>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EspnLink {
    pub href: Loose,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct EspnImage {
    pub url: Loose,
    pub caption: Loose,
    pub width: Loose,
    pub height: Loose,
}

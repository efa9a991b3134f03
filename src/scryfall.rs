//! Card data source client
//!
//! Thin blocking client for the Scryfall search API. The rest of the crate
//! treats this as an opaque source of per-card art and name data keyed by
//! set code.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::BuildError;

const SEARCH_URL: &str = "https://api.scryfall.com/cards/search";
const USER_AGENT: &str = "setswap";

/// Polite delay between paginated requests against the public API.
const PAGE_DELAY: Duration = Duration::from_millis(100);

#[derive(Deserialize, Debug)]
struct SearchPage {
    #[serde(default)]
    data: Vec<WireCard>,
    #[serde(default)]
    next_page: Option<String>,
}

#[derive(Deserialize, Debug)]
struct WireCard {
    name: String,
    #[serde(default)]
    printed_name: Option<String>,
    collector_number: String,
    #[serde(default)]
    image_uris: Option<ImageUris>,
}

#[derive(Deserialize, Debug)]
struct ImageUris {
    #[serde(default)]
    art_crop: Option<String>,
}

/// One card as seen by the manifest builder.
#[derive(Clone, Debug)]
pub struct CardEntry {
    pub name: String,
    pub printed_name: Option<String>,
    pub collector_number: String,
    pub art_url: Option<String>,
}

impl From<WireCard> for CardEntry {
    fn from(card: WireCard) -> Self {
        CardEntry {
            name: card.name,
            printed_name: card.printed_name,
            collector_number: card.collector_number,
            art_url: card.image_uris.and_then(|i| i.art_crop),
        }
    }
}

/// Fetch every card of a set, following pagination.
pub fn set_cards(set_code: &str) -> Result<Vec<CardEntry>, BuildError> {
    let client = reqwest::blocking::Client::new();
    let mut cards: Vec<CardEntry> = Vec::new();
    let mut next = Some(format!("{}?q=set:{}", SEARCH_URL, set_code));

    while let Some(url) = next {
        let response = client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .send()
            .map_err(|e| BuildError::DataSourceUnavailable(e.to_string()))?;

        // Scryfall answers an unknown or empty set with a 404.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BuildError::NoCardsFound(set_code.to_string()));
        }
        if !response.status().is_success() {
            return Err(BuildError::DataSourceUnavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let page: SearchPage = response
            .json()
            .map_err(|e| BuildError::DataSourceUnavailable(e.to_string()))?;

        cards.extend(page.data.into_iter().map(CardEntry::from));

        next = page.next_page;
        if next.is_some() {
            std::thread::sleep(PAGE_DELAY);
        }
    }

    Ok(cards)
}

/// Download replacement art to `dest`.
pub fn download_art(url: &str, dest: &Path) -> Result<(), BuildError> {
    let client = reqwest::blocking::Client::new();
    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| BuildError::DataSourceUnavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(BuildError::DataSourceUnavailable(format!(
            "HTTP {} for {}",
            response.status(),
            url
        )));
    }

    let bytes = response
        .bytes()
        .map_err(|e| BuildError::DataSourceUnavailable(e.to_string()))?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, &bytes)?;
    Ok(())
}

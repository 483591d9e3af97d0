//! News article synthesis.
//!
//! The upstream has no news feed on its free tier, so articles are assembled from
//! coin metadata: a headline picked from a small template set, the coin's
//! description, and a category tag. The choice of template and tag is delegated to
//! a [`HeadlineGenerator`] so tests can seed it.

use crate::client::{AsyncMarketClient, NEWS_SOURCE_COINS};
use crate::error::MarketApiResult;
use crate::models::{Coin, NewsArticle};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::join_all;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Author credited on synthesized articles.
pub const NEWS_AUTHOR: &str = "CoinGecko";

const CATEGORIES: [&str; 5] = [
    "Market Analysis",
    "Price Movement",
    "Technology",
    "Investment",
    "Trends",
];

const TITLE_TEMPLATES: usize = 5;

/// Picks headline and category variants for an article.
pub trait HeadlineGenerator: Send + Sync {
    /// Index into the headline templates, in `0..TITLE_TEMPLATES`.
    fn pick_title(&self, coin: &Coin) -> usize;

    /// Index into the category tags, in `0..5`.
    fn pick_category(&self, coin: &Coin) -> usize;
}

/// Generator backed by a seedable RNG.
pub struct RandomHeadlines {
    rng: Mutex<StdRng>,
}

impl RandomHeadlines {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn next_index(&self, bound: usize) -> usize {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..bound),
            Err(_) => 0,
        }
    }
}

impl Default for RandomHeadlines {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl HeadlineGenerator for RandomHeadlines {
    fn pick_title(&self, _coin: &Coin) -> usize {
        self.next_index(TITLE_TEMPLATES)
    }

    fn pick_category(&self, _coin: &Coin) -> usize {
        self.next_index(CATEGORIES.len())
    }
}

/// Always picks the same variants. Useful for deterministic output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedHeadlines {
    pub title: usize,
    pub category: usize,
}

impl HeadlineGenerator for FixedHeadlines {
    fn pick_title(&self, _coin: &Coin) -> usize {
        self.title
    }

    fn pick_category(&self, _coin: &Coin) -> usize {
        self.category
    }
}

fn headline(template: usize, coin: &Coin) -> String {
    let rising = coin.change_24h.map(|c| c > 0.0).unwrap_or(false);
    match template % TITLE_TEMPLATES {
        0 => format!(
            "{} ({}) Shows {} Movement in Recent Trading",
            coin.name,
            coin.symbol,
            if rising { "Positive" } else { "Negative" }
        ),
        1 => format!(
            "Market Analysis: What's Next for {} After Recent Price {}",
            coin.name,
            if rising { "Surge" } else { "Drop" }
        ),
        2 => format!("{} Trends: Experts Weigh In on Future Prospects", coin.name),
        3 => format!("{} Update: Key Developments and Market Position", coin.name),
        _ => format!("Understanding {}: Technology and Market Potential", coin.name),
    }
}

/// Build one article for `coin`.
///
/// `sequence` is the coin's position in this generation; together with the
/// generation time it makes the id unique.
pub fn synthesize_article(
    coin: &Coin,
    description: Option<&str>,
    generated_at: DateTime<Utc>,
    sequence: usize,
    generator: &dyn HeadlineGenerator,
) -> NewsArticle {
    let description = description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description available.")
        .to_string();
    let category = CATEGORIES[generator.pick_category(coin) % CATEGORIES.len()];

    NewsArticle {
        id: format!(
            "{}-{}-{}",
            coin.id,
            generated_at.timestamp_millis(),
            sequence
        ),
        title: headline(generator.pick_title(coin), coin),
        description,
        url: format!("https://www.coingecko.com/en/coins/{}", coin.id),
        thumb_image: coin.image.clone(),
        published_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        author: NEWS_AUTHOR.to_string(),
        tags: vec![
            coin.name.clone(),
            "Cryptocurrency".to_string(),
            category.to_string(),
        ],
    }
}

/// Synthesize up to `count` articles from the largest coins.
///
/// The detail requests for the selected coins run concurrently. Coins whose
/// detail request fails are skipped; only a failure of the listing is an error.
pub async fn gather_articles<C>(
    client: &C,
    generator: &dyn HeadlineGenerator,
    count: usize,
) -> MarketApiResult<Vec<NewsArticle>>
where
    C: AsyncMarketClient + ?Sized,
{
    let coins: Vec<Coin> = client
        .top_coins(NEWS_SOURCE_COINS)
        .await?
        .into_iter()
        .take(count)
        .collect();
    let generated_at = Utc::now();

    let details = join_all(coins.iter().map(|coin| client.coin_detail(&coin.id))).await;

    let articles: Vec<NewsArticle> = coins
        .iter()
        .zip(details)
        .enumerate()
        .filter_map(|(sequence, (coin, detail))| match detail {
            Ok(detail) => Some(synthesize_article(
                coin,
                detail.description_en(),
                generated_at,
                sequence,
                generator,
            )),
            Err(e) => {
                tracing::warn!(coin = %coin.id, error = %e, "Skipping news article");
                None
            }
        })
        .collect();

    tracing::debug!("Synthesized {} news articles", articles.len());
    Ok(articles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn coin(id: &str, name: &str, change: f64) -> Coin {
        Coin {
            id: id.to_string(),
            name: name.to_string(),
            symbol: name[..3].to_uppercase(),
            change_24h: Some(change),
            image: format!("https://img/{}.png", id),
            ..Default::default()
        }
    }

    #[test]
    fn test_article_fields() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let generator = FixedHeadlines {
            title: 0,
            category: 2,
        };

        let article = synthesize_article(
            &coin("bitcoin", "Bitcoin", 2.5),
            Some("Peer-to-peer cash."),
            at,
            0,
            &generator,
        );

        assert_eq!(
            article.title,
            "Bitcoin (BIT) Shows Positive Movement in Recent Trading"
        );
        assert_eq!(article.description, "Peer-to-peer cash.");
        assert_eq!(article.url, "https://www.coingecko.com/en/coins/bitcoin");
        assert_eq!(article.published_at, "2024-05-01T12:00:00.000Z");
        assert_eq!(article.author, "CoinGecko");
        assert_eq!(article.tags, vec!["Bitcoin", "Cryptocurrency", "Technology"]);
    }

    #[test]
    fn test_missing_description_placeholder() {
        let article = synthesize_article(
            &coin("tether", "Tether", -0.01),
            Some("   "),
            Utc::now(),
            3,
            &FixedHeadlines::default(),
        );
        assert_eq!(article.description, "No description available.");
        assert!(article.title.contains("Negative"));
    }

    #[test]
    fn test_ids_unique_within_generation() {
        let at = Utc::now();
        let generator = RandomHeadlines::seeded(7);
        let coins = [coin("a-coin", "Alpha", 1.0), coin("b-coin", "Beta", 1.0)];

        let ids: HashSet<String> = coins
            .iter()
            .chain(coins.iter())
            .enumerate()
            .map(|(i, c)| synthesize_article(c, None, at, i, &generator).id)
            .collect();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let c = coin("solana", "Solana", 4.0);
        let first = RandomHeadlines::seeded(42);
        let second = RandomHeadlines::seeded(42);

        let a: Vec<usize> = (0..8).map(|_| first.pick_title(&c)).collect();
        let b: Vec<usize> = (0..8).map(|_| second.pick_title(&c)).collect();
        assert_eq!(a, b);
        assert!(a.iter().all(|i| *i < TITLE_TEMPLATES));
    }
}

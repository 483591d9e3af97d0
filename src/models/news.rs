//! Synthesized news article.

use serde::{Deserialize, Serialize};

/// A news card built from coin metadata.
///
/// These are not real news items; see [`crate::news`] for how they are made.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NewsArticle {
    /// Unique within one generation
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub thumb_image: String,
    /// RFC 3339 timestamp of the generation run
    pub published_at: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Slice out page `page` (1-based) of `per_page` articles.
pub fn paginate(articles: &[NewsArticle], page: usize, per_page: usize) -> &[NewsArticle] {
    if per_page == 0 || page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(per_page);
    if start >= articles.len() {
        return &[];
    }
    let end = (start + per_page).min(articles.len());
    &articles[start..end]
}

/// Number of pages needed for `total` articles.
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        0
    } else {
        total.div_ceil(per_page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn articles(n: usize) -> Vec<NewsArticle> {
        (0..n)
            .map(|i| NewsArticle {
                id: format!("coin-{}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_paginate() {
        let all = articles(20);
        assert_eq!(paginate(&all, 1, 6).len(), 6);
        assert_eq!(paginate(&all, 4, 6).len(), 2);
        assert_eq!(paginate(&all, 4, 6)[0].id, "coin-18");
        assert!(paginate(&all, 5, 6).is_empty());
        assert!(paginate(&all, 0, 6).is_empty());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(20, 6), 4);
        assert_eq!(page_count(20, 15), 2);
        assert_eq!(page_count(0, 15), 0);
    }
}

//! In-memory catalog backed by a JSON file.

use super::{CatalogError, CatalogStore};
use crate::domain::types::{CatalogItem, ScoredItem};
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tracing::info;

/// Catalog held fully in memory, loaded once from a JSON array of items.
/// Queries are read-only, so no interior locking is needed.
pub struct JsonCatalog {
    items: Vec<CatalogItem>,
}

impl JsonCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let items: Vec<CatalogItem> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), items = items.len(), "Loaded catalog");
        Ok(Self { items })
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

#[async_trait]
impl CatalogStore for JsonCatalog {
    async fn count(&self) -> Result<usize, CatalogError> {
        Ok(self.items.len())
    }

    async fn nearest(&self, embedding: &[f32], n: usize) -> Result<Vec<ScoredItem>, CatalogError> {
        let mut scored: Vec<ScoredItem> = self
            .items
            .iter()
            .filter(|item| !item.embedding.is_empty())
            .map(|item| ScoredItem {
                item: item.clone(),
                score: cosine_similarity(embedding, &item.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(n);
        Ok(scored)
    }

    async fn keyword_matches(
        &self,
        query: &str,
        n: usize,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self
            .items
            .iter()
            .filter(|item| {
                item.item_name.to_lowercase().contains(&needle)
                    || item.item_desc.to_lowercase().contains(&needle)
                    || item
                        .categories
                        .iter()
                        .any(|category| category.to_lowercase().contains(&needle))
                    || item.summary.to_lowercase().contains(&needle)
            })
            .take(n)
            .cloned()
            .collect();

        Ok(matches)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ItemPrices;

    fn item(id: &str, name: &str, summary: &str, embedding: Vec<f32>) -> CatalogItem {
        CatalogItem {
            item_id: id.to_string(),
            item_name: name.to_string(),
            item_desc: format!("{name} description"),
            brand: "Norden".to_string(),
            categories: vec!["living room".to_string()],
            prices: ItemPrices {
                full_price: 499.0,
                sale_price: 399.0,
            },
            reviews: Vec::new(),
            summary: summary.to_string(),
            embedding,
        }
    }

    #[tokio::test]
    async fn nearest_ranks_by_cosine_similarity() {
        let catalog = JsonCatalog::new(vec![
            item("1", "Oslo Sofa", "sofa, living room", vec![1.0, 0.0]),
            item("2", "Bergen Desk", "desk, office", vec![0.0, 1.0]),
            item("3", "Fjord Couch", "couch, living room", vec![0.9, 0.1]),
        ]);

        let hits = catalog.nearest(&[1.0, 0.0], 2).await.expect("query works");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item.item_id, "1");
        assert_eq!(hits[1].item.item_id, "3");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn nearest_skips_items_without_embeddings() {
        let catalog = JsonCatalog::new(vec![
            item("1", "Oslo Sofa", "sofa", Vec::new()),
            item("2", "Fjord Couch", "couch", vec![1.0, 0.0]),
        ]);

        let hits = catalog.nearest(&[1.0, 0.0], 10).await.expect("query works");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].item.item_id, "2");
    }

    #[tokio::test]
    async fn keyword_match_is_case_insensitive_across_fields() {
        let catalog = JsonCatalog::new(vec![
            item("1", "Oslo Sofa", "sofa, living room", Vec::new()),
            item("2", "Bergen Desk", "standing desk", Vec::new()),
        ]);

        let by_name = catalog.keyword_matches("OSLO", 10).await.expect("query");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].item_id, "1");

        let by_category = catalog
            .keyword_matches("Living Room", 10)
            .await
            .expect("query");
        assert_eq!(by_category.len(), 2);

        let by_summary = catalog.keyword_matches("standing", 10).await.expect("query");
        assert_eq!(by_summary.len(), 1);
        assert_eq!(by_summary[0].item_id, "2");
    }

    #[tokio::test]
    async fn keyword_match_respects_limit_and_misses_cleanly() {
        let catalog = JsonCatalog::new(vec![
            item("1", "Oslo Sofa", "sofa", Vec::new()),
            item("2", "Fjord Couch", "sofa", Vec::new()),
        ]);

        let limited = catalog.keyword_matches("sofa", 1).await.expect("query");
        assert_eq!(limited.len(), 1);

        let missed = catalog
            .keyword_matches("xyz-nonexistent-term", 10)
            .await
            .expect("query");
        assert!(missed.is_empty());
    }

    #[test]
    fn cosine_similarity_handles_degenerate_vectors() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
    }
}

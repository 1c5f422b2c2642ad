//! One-time catalog seeding: generate synthetic furniture items with the
//! completion model, build each item's searchable summary, embed it, and
//! write the catalog file the server loads at startup.

use clap::Parser;
use davenport_core::model::{
    CompletionProvider, CompletionRequest, EmbeddingProvider, GeminiClient, GeminiConfig,
};
use davenport_core::types::{CatalogItem, ChatMessage, ItemPrices, ItemReview, MessageRole};
use davenport_core::AppConfig;
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "davenport-seed", about = "Generate and embed a synthetic furniture catalog")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Number of items to generate
    #[arg(long, default_value_t = 15)]
    count: usize,

    /// Output path (overrides catalog_path from config)
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Shape the model is asked to produce; summary and embedding are added here.
#[derive(Debug, Deserialize)]
struct SeedRecord {
    item_id: String,
    item_name: String,
    item_desc: String,
    brand: String,
    country: String,
    prices: ItemPrices,
    categories: Vec<String>,
    #[serde(default)]
    reviews: Vec<ItemReview>,
    #[serde(default)]
    notes: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_tracing();

    let config_path = args.config.as_deref().map(Path::new);
    let config = AppConfig::load(config_path)?;
    let output = args.output.unwrap_or_else(|| config.catalog_path.clone());

    let gemini = GeminiClient::from_config(&GeminiConfig {
        endpoint: config.endpoint.clone(),
        api_key: config.api_key.clone(),
        embedding_model: config.embedding_model.clone(),
    });

    info!(count = args.count, model = %config.model, "Generating synthetic catalog items");
    let response = gemini
        .complete(CompletionRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage::new(MessageRole::User, seed_prompt(args.count))],
            tools: Vec::new(),
        })
        .await?;

    let records: Vec<SeedRecord> = serde_json::from_str(strip_code_fences(&response.content))?;
    info!(items = records.len(), "Parsed generated items");

    let mut catalog = Vec::with_capacity(records.len());
    for record in records {
        let summary = compose_summary(&record);
        let embedding = match gemini.embed(&summary).await {
            Ok(values) => values,
            Err(error) => {
                warn!(item = %record.item_id, %error, "Skipping item that failed to embed");
                continue;
            }
        };
        info!(item = %record.item_id, dims = embedding.len(), "Embedded item summary");
        catalog.push(CatalogItem {
            item_id: record.item_id,
            item_name: record.item_name,
            item_desc: record.item_desc,
            brand: record.brand,
            categories: record.categories,
            prices: record.prices,
            reviews: record.reviews,
            summary,
            embedding,
        });
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, serde_json::to_vec_pretty(&catalog)?)?;
    info!(path = %output.display(), items = catalog.len(), "Catalog written");

    Ok(())
}

fn seed_prompt(count: usize) -> String {
    format!(
        "You are an assistant that generates furniture store item data. Generate {count} \
         furniture store items as a JSON array, with no commentary and no code fences. Each \
         record must have the fields: item_id (string), item_name, item_desc, brand, country \
         (country of manufacture), prices (object with full_price and sale_price as numbers), \
         categories (array of strings), reviews (array of objects with review_date, rating, \
         comment), and notes (string). Ensure variety in the data and realistic values."
    )
}

/// Searchable text the embedding is computed from; mirrors what the lookup
/// tool's keyword fallback scans.
fn compose_summary(record: &SeedRecord) -> String {
    let reviews = record
        .reviews
        .iter()
        .map(|review| {
            format!(
                "Rated {} on {}: {}",
                review.rating, review.review_date, review.comment
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{} {} from the brand {}. Manufacturer: Made in {}. Categories: {}. Reviews: {}. \
         Price: At full price it costs: {} USD, On sale it costs: {} USD. Notes: {}",
        record.item_name,
        record.item_desc,
        record.brand,
        record.country,
        record.categories.join(", "),
        reviews,
        record.prices.full_price,
        record.prices.sale_price,
        record.notes,
    )
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
    match rest.rfind("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}

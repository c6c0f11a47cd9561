use anyhow::{bail, Context};
use clap::Subcommand;
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::{schema, DatabaseManager, Repository};
use crate::models::{Resource, Review, Tour, User, ValidationMode};

#[derive(Subcommand)]
pub enum FixtureCommands {
    #[command(about = "Load the sample dataset (users, tours, reviews)")]
    Load,

    #[command(about = "Delete all records from every entity table")]
    Reset,
}

const SEED: &str = include_str!("../../../fixtures/seed.json");

#[derive(Deserialize)]
struct SeedFile {
    users: Vec<Map<String, Value>>,
    tours: Vec<Map<String, Value>>,
    reviews: Vec<SeedReview>,
}

/// Reviews reference their tour and user by position in the seed arrays.
#[derive(Deserialize)]
struct SeedReview {
    review: String,
    rating: f64,
    tour: usize,
    user: usize,
}

pub async fn run(cmd: FixtureCommands) -> anyhow::Result<()> {
    match cmd {
        FixtureCommands::Load => load().await,
        FixtureCommands::Reset => reset().await,
    }
}

async fn load() -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    schema::ensure(&pool).await?;

    let seed: SeedFile = serde_json::from_str(SEED).context("invalid seed file")?;

    // Inserts go through the repository so domain hooks run: tours get
    // their slugs, reviews recompute the rating aggregates.
    let users = Repository::<User>::new(pool.clone());
    let mut user_ids = Vec::with_capacity(seed.users.len());
    for fields in seed.users {
        User::validate(&fields, ValidationMode::Create)?;
        let record = users.insert(fields).await?;
        user_ids.push(record_id(&record)?);
    }

    let tours = Repository::<Tour>::new(pool.clone());
    let mut tour_ids = Vec::with_capacity(seed.tours.len());
    for fields in seed.tours {
        Tour::validate(&fields, ValidationMode::Create)?;
        let record = tours.insert(fields).await?;
        tour_ids.push(record_id(&record)?);
    }

    let reviews = Repository::<Review>::new(pool.clone());
    let mut review_count = 0;
    for review in seed.reviews {
        let Some(tour_id) = tour_ids.get(review.tour) else {
            bail!("review references unknown tour index {}", review.tour);
        };
        let Some(user_id) = user_ids.get(review.user) else {
            bail!("review references unknown user index {}", review.user);
        };
        let mut fields = Map::new();
        fields.insert("review".to_string(), Value::String(review.review));
        fields.insert("rating".to_string(), Value::from(review.rating));
        fields.insert("tour_id".to_string(), Value::String(tour_id.to_string()));
        fields.insert("user_id".to_string(), Value::String(user_id.to_string()));
        Review::validate(&fields, ValidationMode::Create)?;
        reviews.insert(fields).await?;
        review_count += 1;
    }

    println!(
        "loaded {} users, {} tours, {} reviews",
        user_ids.len(),
        tour_ids.len(),
        review_count
    );
    Ok(())
}

async fn reset() -> anyhow::Result<()> {
    let pool = DatabaseManager::pool().await?;
    // Children first; tours and users cascade to nothing else.
    for table in ["bookings", "reviews", "tours", "users"] {
        sqlx::query(&format!("DELETE FROM \"{}\"", table)).execute(&pool).await?;
    }
    println!("all entity tables cleared");
    Ok(())
}

fn record_id(record: &Value) -> anyhow::Result<Uuid> {
    record
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .context("inserted record has no id")
}

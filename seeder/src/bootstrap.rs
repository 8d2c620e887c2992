use anyhow::{Context, Result};
use bson::{doc, Document};
use common::RawCandleDocument;
use serde::Serialize;

use crate::samples::SampleSet;
use crate::store::{DocumentStore, IndexSpec, ServiceAccount, SortOrder};

pub const RAW_MARKET_DATA: &str = "raw_market_data";
pub const MARKET_DATA: &str = "market_data";
pub const PREDICTIONS: &str = "prediction_ml";

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionPlan {
    pub name: String,
    pub indexes: Vec<IndexSpec>,
    /// Applied only when the collection is created.
    pub validator: Option<Document>,
}

/// Shape every raw candle must have before the server accepts it.
pub fn raw_market_data_validator() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["symbol", "openTime", "open", "high", "low", "close", "volume"],
            "properties": {
                "symbol": { "bsonType": "string" },
                "openTime": { "bsonType": "date" },
                "open": { "bsonType": "number" },
                "high": { "bsonType": "number" },
                "low": { "bsonType": "number" },
                "close": { "bsonType": "number" },
                "volume": { "bsonType": "number" },
            },
        },
    }
}

/// Collections, indexes and account a fresh database needs.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapPlan {
    pub database: String,
    pub collections: Vec<CollectionPlan>,
    pub service_account: Option<ServiceAccount>,
}

impl BootstrapPlan {
    pub fn standard(database: &str) -> Self {
        let bar_indexes = || {
            vec![
                IndexSpec::new(&[
                    ("symbol", SortOrder::Ascending),
                    ("openTime", SortOrder::Ascending),
                ])
                .unique(),
                IndexSpec::ascending("symbol"),
                IndexSpec::descending("openTime"),
            ]
        };

        BootstrapPlan {
            database: database.to_string(),
            collections: vec![
                CollectionPlan {
                    name: RAW_MARKET_DATA.to_string(),
                    indexes: bar_indexes(),
                    validator: Some(raw_market_data_validator()),
                },
                CollectionPlan {
                    name: MARKET_DATA.to_string(),
                    indexes: bar_indexes(),
                    validator: None,
                },
                CollectionPlan {
                    name: PREDICTIONS.to_string(),
                    indexes: vec![IndexSpec::ascending("symbol").unique()],
                    validator: None,
                },
            ],
            service_account: None,
        }
    }

    /// Adds a `readWrite` account on the plan's database.
    pub fn with_service_account(mut self, user: &str, password: &str) -> Self {
        self.service_account = Some(ServiceAccount {
            user: user.to_string(),
            password: password.to_string(),
            role: "readWrite".to_string(),
            database: self.database.clone(),
        });
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub raw_market_data: usize,
    pub market_data: usize,
    pub predictions: usize,
}

pub async fn bootstrap<S: DocumentStore>(store: &S, plan: &BootstrapPlan) -> Result<()> {
    match &plan.service_account {
        Some(account) => {
            if store.create_user(account).await? {
                log::info!("Created user {} ({} on {})", account.user, account.role, account.database);
            } else {
                log::info!("User {} already exists", account.user);
            }
        }
        None => log::warn!("No service password configured, skipping account creation"),
    }

    for collection in &plan.collections {
        if store
            .ensure_collection(&collection.name, collection.validator.as_ref())
            .await?
        {
            match collection.validator {
                Some(_) => log::info!("Created collection {} with validator", collection.name),
                None => log::info!("Created collection {}", collection.name),
            }
        }
        for index in &collection.indexes {
            store
                .create_index(&collection.name, index)
                .await
                .with_context(|| format!("Index {} on {}", index.name(), collection.name))?;
        }
        log::info!(
            "{}: {} index(es) in place",
            collection.name,
            collection.indexes.len()
        );
    }
    Ok(())
}

/// Inserts the sample set. Running it twice trips the unique indexes
/// instead of duplicating rows.
pub async fn seed<S: DocumentStore>(store: &S, samples: &SampleSet) -> Result<SeedReport> {
    let raw: Vec<RawCandleDocument> = samples.market_data.iter().map(Into::into).collect();

    let report = SeedReport {
        raw_market_data: store
            .insert_many(RAW_MARKET_DATA, to_documents(&raw)?)
            .await?,
        market_data: store
            .insert_many(MARKET_DATA, to_documents(&samples.market_data)?)
            .await?,
        predictions: store
            .insert_many(PREDICTIONS, to_documents(&samples.predictions)?)
            .await?,
    };

    log::info!(
        "Seeded {} raw bars, {} processed bars, {} forecast series",
        report.raw_market_data,
        report.market_data,
        report.predictions
    );
    Ok(report)
}

fn to_documents<T: Serialize>(documents: &[T]) -> Result<Vec<Document>> {
    documents
        .iter()
        .map(|document| bson::to_document(document).context("Failed to serialize document"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::generate;
    use crate::store::{DuplicateKey, InMemoryStore};
    use chrono::{TimeZone, Utc};

    fn samples() -> SampleSet {
        let symbols = vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()];
        generate(&symbols, 12, Utc.with_ymd_and_hms(2024, 11, 2, 14, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_bootstrap_creates_plan() {
        let store = InMemoryStore::new();
        let plan = BootstrapPlan::standard("Cryptobot").with_service_account("CryptoBot", "pw");

        bootstrap(&store, &plan).await.unwrap();

        assert_eq!(
            store.collection_names(),
            vec![MARKET_DATA, PREDICTIONS, RAW_MARKET_DATA]
        );
        let indexes: Vec<String> = store
            .indexes(MARKET_DATA)
            .iter()
            .map(IndexSpec::name)
            .collect();
        assert_eq!(indexes, vec!["symbol_1_openTime_1", "symbol_1", "openTime_-1"]);
        assert!(store.indexes(MARKET_DATA)[0].unique);
        assert!(store.indexes(PREDICTIONS)[0].unique);

        let users = store.users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, "readWrite");
        assert_eq!(users[0].database, "Cryptobot");

        // Second run changes nothing
        bootstrap(&store, &plan).await.unwrap();
        assert_eq!(store.indexes(MARKET_DATA).len(), 3);
        assert_eq!(store.users().len(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_without_account() {
        let store = InMemoryStore::new();
        bootstrap(&store, &BootstrapPlan::standard("Cryptobot"))
            .await
            .unwrap();
        assert!(store.users().is_empty());
        assert_eq!(store.collection_names().len(), 3);
    }

    #[tokio::test]
    async fn test_seed_inserts_every_collection() {
        let store = InMemoryStore::new();
        bootstrap(&store, &BootstrapPlan::standard("Cryptobot"))
            .await
            .unwrap();

        let report = seed(&store, &samples()).await.unwrap();
        assert_eq!(
            report,
            SeedReport {
                raw_market_data: 24,
                market_data: 24,
                predictions: 2,
            }
        );

        let bar = &store.documents(MARKET_DATA)[0];
        assert_eq!(bar.get_str("symbol").unwrap(), "BTCUSDT");
        assert!(bar.get_datetime("openTime").is_ok());
        assert!(bar.get_datetime("last_updated").is_ok());
        assert!(bar.get_document("indicator").unwrap().get_f64("RSI").is_ok());
        assert!(store.documents(RAW_MARKET_DATA)[0].get("indicator").is_none());

        let forecast = &store.documents(PREDICTIONS)[0];
        let point = forecast.get_array("predictions").unwrap()[0]
            .as_document()
            .unwrap();
        assert!(point.get_datetime("timestamp").is_ok());
    }

    #[tokio::test]
    async fn test_raw_collection_is_validated() {
        let store = InMemoryStore::new();
        bootstrap(&store, &BootstrapPlan::standard("Cryptobot"))
            .await
            .unwrap();

        assert_eq!(
            store.validator(RAW_MARKET_DATA),
            Some(raw_market_data_validator())
        );
        assert!(store.validator(MARKET_DATA).is_none());

        // Generated candles satisfy the schema
        seed(&store, &samples()).await.unwrap();

        let epoch_millis = doc! {
            "symbol": "BTCUSDT",
            "openTime": 1_730_552_400_000_i64,
            "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0, "volume": 1.0,
        };
        let error = store
            .insert_many(RAW_MARKET_DATA, vec![epoch_millis])
            .await
            .unwrap_err();
        assert!(error.to_string().contains("openTime is not of type date"));

        let no_volume = doc! {
            "symbol": "BTCUSDT",
            "openTime": bson::DateTime::now(),
            "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0,
        };
        let error = store
            .insert_many(RAW_MARKET_DATA, vec![no_volume])
            .await
            .unwrap_err();
        assert!(error.to_string().contains("missing required field volume"));
        assert_eq!(store.documents(RAW_MARKET_DATA).len(), 24);
    }

    #[tokio::test]
    async fn test_second_seed_violates_uniqueness() {
        let store = InMemoryStore::new();
        bootstrap(&store, &BootstrapPlan::standard("Cryptobot"))
            .await
            .unwrap();
        seed(&store, &samples()).await.unwrap();

        let error = seed(&store, &samples()).await.unwrap_err();
        let duplicate = error.downcast_ref::<DuplicateKey>().unwrap();
        assert_eq!(duplicate.collection, RAW_MARKET_DATA);
        assert!(duplicate.key.contains("BTCUSDT"));

        assert_eq!(store.documents(RAW_MARKET_DATA).len(), 24);
        assert_eq!(store.documents(MARKET_DATA).len(), 24);
    }
}

use anyhow::Result;
use chrono::Utc;
use seeder::samples::generate;
use seeder::{bootstrap, seed, BootstrapPlan, DuplicateKey, MongoStore, SeederConfig};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SeederConfig::from_env()?;
    log::info!(
        "Seeding {} at {} for {}",
        config.database,
        config.mongo_uri,
        config.symbols.join(",")
    );

    let store = MongoStore::connect(&config.mongo_uri, &config.database).await?;

    let mut plan = BootstrapPlan::standard(store.name());
    if let Some(password) = &config.service_password {
        plan = plan.with_service_account(&config.service_user, password);
    }
    bootstrap(&store, &plan).await?;

    let samples = generate(&config.symbols, config.candles, Utc::now());
    match seed(&store, &samples).await {
        Ok(report) => {
            log::info!("Done: {report:?}");
            Ok(())
        }
        Err(error) => {
            if let Some(duplicate) = error.downcast_ref::<DuplicateKey>() {
                log::error!("Sample data already present, nothing duplicated: {duplicate}");
            }
            Err(error)
        }
    }
}

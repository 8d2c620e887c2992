pub mod bootstrap;
pub mod config;
pub mod mongo;
pub mod samples;
pub mod store;

pub use bootstrap::{bootstrap, seed, BootstrapPlan, SeedReport};
pub use config::SeederConfig;
pub use mongo::MongoStore;
pub use store::{DocumentStore, DuplicateKey, InMemoryStore, IndexSpec, ServiceAccount, SortOrder};

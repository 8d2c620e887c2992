use anyhow::{Context, Result};
use mongodb::bson::{doc, Document};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{CreateCollectionOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};

use crate::store::{DocumentStore, DuplicateKey, IndexSpec, ServiceAccount};

const DUPLICATE_KEY_CODE: i32 = 11000;
const USER_EXISTS_CODE: i32 = 51003;

/// [`DocumentStore`] backed by a MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .with_context(|| format!("Failed to connect to {uri}"))?;
        Ok(Self::new(&client, database))
    }

    pub fn new(client: &Client, database: &str) -> Self {
        MongoStore {
            database: client.database(database),
        }
    }

    pub fn name(&self) -> &str {
        self.database.name()
    }
}

impl DocumentStore for MongoStore {
    async fn create_user(&self, account: &ServiceAccount) -> Result<bool> {
        let command = doc! {
            "createUser": account.user.as_str(),
            "pwd": account.password.as_str(),
            "roles": [{ "role": account.role.as_str(), "db": account.database.as_str() }],
        };

        match self.database.run_command(command).await {
            Ok(_) => Ok(true),
            Err(error) if command_code(&error) == Some(USER_EXISTS_CODE) => Ok(false),
            Err(error) => {
                Err(error).with_context(|| format!("Failed to create user {}", account.user))
            }
        }
    }

    async fn ensure_collection(&self, name: &str, validator: Option<&Document>) -> Result<bool> {
        let existing = self
            .database
            .list_collection_names()
            .await
            .context("Failed to list collections")?;
        if existing.iter().any(|collection| collection == name) {
            return Ok(false);
        }

        let options = validator.map(|validator| {
            CreateCollectionOptions::builder()
                .validator(validator.clone())
                .build()
        });
        self.database
            .create_collection(name)
            .with_options(options)
            .await
            .with_context(|| format!("Failed to create collection {name}"))?;
        Ok(true)
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> Result<()> {
        let mut keys = Document::new();
        for (field, order) in &index.keys {
            keys.insert(field.as_str(), order.direction());
        }

        let options = IndexOptions::builder()
            .name(index.name())
            .unique(index.unique)
            .build();
        let model = IndexModel::builder().keys(keys).options(options).build();

        match self
            .database
            .collection::<Document>(collection)
            .create_index(model)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => match duplicate_key_message(&error) {
                Some(key) => Err(DuplicateKey {
                    collection: collection.to_string(),
                    key,
                }
                .into()),
                None => Err(error).with_context(|| {
                    format!("Failed to create index {} on {collection}", index.name())
                }),
            },
        }
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        match self
            .database
            .collection::<Document>(collection)
            .insert_many(documents)
            .await
        {
            Ok(result) => Ok(result.inserted_ids.len()),
            Err(error) => match duplicate_key_message(&error) {
                Some(key) => Err(DuplicateKey {
                    collection: collection.to_string(),
                    key,
                }
                .into()),
                None => Err(error).with_context(|| format!("Failed to insert into {collection}")),
            },
        }
    }
}

fn command_code(error: &MongoError) -> Option<i32> {
    match error.kind.as_ref() {
        ErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}

// Server message of the first E11000 in the failure, if any
fn duplicate_key_message(error: &MongoError) -> Option<String> {
    match error.kind.as_ref() {
        ErrorKind::InsertMany(failure) => failure
            .write_errors
            .as_ref()?
            .iter()
            .find(|write| write.code == DUPLICATE_KEY_CODE)
            .map(|write| write.message.clone()),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE => {
            Some(write.message.clone())
        }
        ErrorKind::Command(command) if command.code == DUPLICATE_KEY_CODE => {
            Some(command.message.clone())
        }
        _ => None,
    }
}

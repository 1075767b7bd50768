use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE: &str = "trivia_live";
const APP_NAME: &str = "trivia-live-back";

/// Parsed client options plus the database that holds the trivia collections.
#[derive(Clone)]
pub struct MongoConfig {
    options: ClientOptions,
    database: String,
}

impl MongoConfig {
    /// Parse `uri`; a missing or empty `database` falls back to `trivia_live`.
    pub async fn from_uri(uri: &str, database: Option<&str>) -> MongoResult<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })?;
        options.app_name.get_or_insert_with(|| APP_NAME.to_owned());

        let database = database
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_DATABASE)
            .to_owned();

        Ok(Self { options, database })
    }

    /// Database holding the trivia collections.
    pub fn database_name(&self) -> &str {
        &self.database
    }

    pub(super) fn client_options(&self) -> &ClientOptions {
        &self.options
    }
}

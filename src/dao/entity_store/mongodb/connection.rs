use std::time::Duration;

use mongodb::{Client, Database, bson::doc, error::Error as MongoError};
use tokio::time::sleep;
use tracing::debug;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

/// Pings tried before giving up; longer outages are left to the storage supervisor.
const OPEN_ATTEMPTS: u32 = 3;
const OPEN_BACKOFF_STEP: Duration = Duration::from_millis(200);

/// Open a client for `config` and wait for the database to answer a ping.
pub(super) async fn open(config: &MongoConfig) -> MongoResult<Database> {
    let client = Client::with_options(config.client_options().clone())
        .map_err(|source| MongoDaoError::Client { source })?;
    let database = client.database(config.database_name());

    let mut attempt = 1;
    loop {
        match ping(&database).await {
            Ok(()) => return Ok(database),
            Err(source) if attempt >= OPEN_ATTEMPTS => {
                return Err(MongoDaoError::Unreachable {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                debug!(
                    attempt,
                    database = config.database_name(),
                    error = %err,
                    "MongoDB did not answer; retrying"
                );
                sleep(OPEN_BACKOFF_STEP * attempt).await;
                attempt += 1;
            }
        }
    }
}

pub(super) async fn ping(database: &Database) -> Result<(), MongoError> {
    database.run_command(doc! { "ping": 1 }).await.map(|_| ())
}

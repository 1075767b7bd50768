use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for the MongoDB store internals.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB entity store, tagged with the collection involved.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("invalid MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("cannot build a MongoDB client")]
    Client {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB unreachable after {attempts} ping(s)")]
    Unreachable {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB health ping failed")]
    Ping {
        #[source]
        source: MongoError,
    },
    #[error("cannot create index `{index}` on `{collection}`")]
    Index {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("cannot allocate an id in `{collection}`")]
    Counter {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("id counter of `{collection}` vanished")]
    MissingCounter { collection: &'static str },
    #[error("{operation} on `{collection}` failed")]
    Query {
        operation: &'static str,
        collection: &'static str,
        #[source]
        source: MongoError,
    },
}

impl MongoDaoError {
    pub(super) fn query(
        operation: &'static str,
        collection: &'static str,
    ) -> impl FnOnce(MongoError) -> Self {
        move |source| MongoDaoError::Query {
            operation,
            collection,
            source,
        }
    }
}

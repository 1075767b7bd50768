/// Entity persistence backends and the store abstraction.
pub mod entity_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;

// SQLite-backed persistence layer
// Items survive restarts; the engine itself never touches disk

pub mod db;

pub use db::{ItemDb, StoreError};

pub type Result<T> = std::result::Result<T, StoreError>;

//! Database layer: connection management and collection repositories.

pub mod connection;
pub mod repos;

pub use connection::{
    database_name_in_uri, ConnectionError, ConnectionManager, ConnectionStatus, Connector,
    MongoConnector,
};
pub use repos::DbError;

mod client;
mod models;

pub use client::{AvocadoClient, CatalogSource, RemoteError, DEFAULT_API_URL};
pub use models::{RemoteCollection, RemoteIncrement};

// Thin clients over the Google REST APIs
mod auth;
mod bigquery;
mod firestore;

// Re-export key types
pub use auth::{MetadataTokenSource, TokenSource, METADATA_TOKEN_PATH};
pub use bigquery::{
    BigQueryClient, SourceFormat, TableReference, DEFAULT_BIGQUERY_ENDPOINT,
    DEFAULT_TRANSFER_ENDPOINT,
};
pub use firestore::{
    to_firestore_fields, to_firestore_value, FirestoreClient, DEFAULT_FIRESTORE_ENDPOINT,
};

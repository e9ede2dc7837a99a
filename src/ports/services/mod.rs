mod blob_service;
mod fetch_service;
mod relay_service;

pub use blob_service::BlobService;
pub use fetch_service::FetchService;
pub use relay_service::RelayService;

mod blob_service_impl;
mod fetch_service_impl;
mod relay_service_impl;

pub use blob_service_impl::{BlobServiceImpl, DEFAULT_CONTENT_TYPE};
pub use fetch_service_impl::FetchServiceImpl;
pub use relay_service_impl::RelayServiceImpl;

mod config_errors;
mod fetch_errors;
mod gcp_errors;
mod publish_errors;
mod storage_errors;
mod validation_errors;

pub use config_errors::*;
pub use fetch_errors::*;
pub use gcp_errors::*;
pub use publish_errors::*;
pub use storage_errors::*;
pub use validation_errors::*;

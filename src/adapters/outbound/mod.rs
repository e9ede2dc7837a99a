pub mod gcp;
pub mod messaging;
pub mod storage;

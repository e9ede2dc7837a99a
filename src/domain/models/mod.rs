pub mod event;
pub mod fetch;
pub mod policy;

pub use event::{
    ATTR_BUCKET_ID, ATTR_EVENT_TYPE, ATTR_OBJECT_ID, EventParseError, EventType, RelayOutcome,
    StorageEvent,
};
pub use fetch::{
    FetchNotification, FetchOutcome, FetchRequest, FetchStatus, ResolvedFetch, expand_date_tokens,
};
pub use policy::ErrorPolicy;

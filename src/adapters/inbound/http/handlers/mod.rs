pub mod event_handlers;
pub mod health_handlers;

pub use event_handlers::*;
pub use health_handlers::*;

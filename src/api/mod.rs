//! API Module
//!
//! HTTP handlers and routing for the region service.
//!
//! # Endpoints
//! - `POST /regions/:region/{get,put_from_load}` - Reads and loads
//! - `POST /regions/:region/{insert,update,lock,unlock,after_insert,after_update}` - Writes
//! - `POST /regions/:region/{remove,remove_all,evict,evict_all}` - Removal
//! - `GET /regions/:region/timestamp` - Region timestamp source
//! - `GET /stats` - Per-region statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

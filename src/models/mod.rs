//! Request and Response models for the region API
//!
//! DTOs used to serialize and deserialize HTTP bodies. Cached payloads are
//! arbitrary JSON.

pub mod requests;
pub mod responses;

pub use requests::{
    AfterWriteRequest, GetRequest, InsertRequest, KeyRef, KeyRequest, LockRequest,
    PutFromLoadRequest, UnlockRequest, UpdateRequest,
};
pub use responses::{
    ErrorResponse, GetResponse, HealthResponse, LockResponse, RegionStats, RemoveResponse,
    StatsResponse, TimestampResponse, WriteResponse,
};

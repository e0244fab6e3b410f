//! Reading Ingestion
//!
//! The boundary through which readings reach the impact monitor:
//! - `Ingestion`: a single push subscription with idempotent teardown
//! - `DevicePayload`: the JSON sample published by the impact module
//! - `spawn_mock_source`: tiered synthetic readings for bench testing

mod mock;
mod payload;
mod subscription;

pub use mock::{spawn_mock_source, MockConfig, MockGenerator};
pub use payload::DevicePayload;
pub use subscription::{Ingestion, ReadingSink};

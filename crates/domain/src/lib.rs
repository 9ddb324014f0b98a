//! dnscached domain layer
pub mod cache_entry;
pub mod config;
pub mod dns_protocol;
pub mod dns_record;
pub mod dns_wire;
pub mod errors;

pub use cache_entry::CacheEntry;
pub use config::{CliOverrides, Config, ConfigError};
pub use dns_protocol::{parse_upstream_server, parse_upstream_servers};
pub use dns_record::RecordType;
pub use dns_wire::ResponseCode;
pub use errors::DomainError;

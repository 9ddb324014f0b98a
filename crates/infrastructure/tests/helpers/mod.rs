#![allow(dead_code, unused_imports)]

pub mod dns_server_mock;
pub mod mock_ports;
pub mod packets;

pub use dns_server_mock::MockDnsServer;
pub use mock_ports::{MockDnsForwarder, MockHostLookup};
pub use packets::{query_packet, DecodedResponse};

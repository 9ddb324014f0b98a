use dnscached_domain::DomainError;
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use std::net::IpAddr;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub addresses: Vec<IpAddr>,

    pub rcode: ResponseCode,

    pub truncated: bool,
}

impl DnsResponse {
    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail | ResponseCode::Refused | ResponseCode::NotImp
        )
    }

    /// Classifies the response for the resolver: addresses on success,
    /// `NxDomain` for an authoritative negative, a transient error otherwise.
    /// A truncated reply carrying no addresses counts as transient.
    pub fn into_addresses(self) -> Result<Vec<IpAddr>, DomainError> {
        if self.is_nxdomain() {
            return Err(DomainError::NxDomain);
        }
        if self.is_server_error() {
            return Err(DomainError::ServerFailure(
                ResponseParser::rcode_to_status(self.rcode).to_string(),
            ));
        }
        if self.truncated && self.addresses.is_empty() {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Truncated response {} without address records",
                self.id
            )));
        }
        Ok(self.addresses)
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        // from_vec succeeded, so the 12-byte header is present.
        let id = u16::from_be_bytes([response_bytes[0], response_bytes[1]]);
        let rcode = message.response_code();
        let truncated = message.truncated();

        let mut addresses = Vec::new();
        for record in message.answers() {
            match record.data() {
                RData::A(a) => addresses.push(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => addresses.push(IpAddr::V6(aaaa.0)),
                _ => {}
            }
        }

        debug!(
            rcode = ?rcode,
            addresses = addresses.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            id,
            addresses,
            rcode,
            truncated,
        })
    }

    /// Parses a response to the query sent with `expected_id`.
    pub fn parse_for(response_bytes: &[u8], expected_id: u16) -> Result<DnsResponse, DomainError> {
        let response = Self::parse(response_bytes)?;
        if response.id != expected_id {
            return Err(DomainError::InvalidDnsResponse(format!(
                "Response ID {} does not match query ID {}",
                response.id, expected_id
            )));
        }
        Ok(response)
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}

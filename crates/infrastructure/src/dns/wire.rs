//! Hand-rolled RFC 1035 codec for the UDP server: just enough parsing to
//! find questions, just enough building to answer A/AAAA from the cache.

pub mod builder;
pub mod parser;

pub use builder::ResponseBuilder;
pub use parser::{parse_request, Header, ParsedRequest, Question};

use super::parser::Header;
use dnscached_domain::dns_wire::{
    CLASS_IN, COMPRESSION_POINTER, FLAG_AA, FLAG_QR, FLAG_RA, FLAG_RD, FLAG_TC, HEADER_LEN,
    MAX_UDP_MESSAGE_SIZE, RCODE_MASK,
};
use dnscached_domain::{RecordType, ResponseCode};
use std::net::IpAddr;

/// Pointer(2) + TYPE(2) + CLASS(2) + TTL(4) + RDLENGTH(2).
const ANSWER_FIXED_LEN: usize = 12;

/// Appends sections to a response in wire order, never exceeding the UDP
/// size limit. Every question must be pushed before the first answer.
/// Anything that does not fit is dropped and marks the response truncated;
/// nothing is appended after that.
pub struct ResponseBuilder {
    buf: Vec<u8>,
    flags: u16,
    qdcount: u16,
    ancount: u16,
    truncated: bool,
}

impl ResponseBuilder {
    /// Header echoes the request ID and RD bit, with QR, AA and RA set.
    pub fn new(request: &Header) -> Self {
        let mut buf = Vec::with_capacity(MAX_UDP_MESSAGE_SIZE);
        buf.extend_from_slice(&request.id.to_be_bytes());
        buf.resize(HEADER_LEN, 0);

        Self {
            buf,
            flags: FLAG_QR | FLAG_AA | FLAG_RA | (request.flags & FLAG_RD),
            qdcount: 0,
            ancount: 0,
            truncated: false,
        }
    }

    /// Header-only FORMERR reply.
    pub fn format_error(request: &Header) -> Vec<u8> {
        let mut builder = Self::new(request);
        builder.set_rcode(ResponseCode::FormErr);
        builder.finish()
    }

    fn fits(&mut self, extra: usize) -> bool {
        if self.truncated || self.buf.len() + extra > MAX_UDP_MESSAGE_SIZE {
            self.truncated = true;
            return false;
        }
        true
    }

    /// Copies a question verbatim and returns the offset of its name in the
    /// response, for answer pointers. `None` once the response is full or
    /// an answer has already been appended.
    pub fn push_question(&mut self, raw: &[u8]) -> Option<usize> {
        if self.ancount > 0 || !self.fits(raw.len()) {
            return None;
        }
        let offset = self.buf.len();
        self.buf.extend_from_slice(raw);
        self.qdcount += 1;
        Some(offset)
    }

    /// Appends an A or AAAA record whose owner is a pointer to `name_offset`.
    pub fn push_answer(&mut self, name_offset: usize, ip: IpAddr, ttl: u32) -> bool {
        let mut octets = [0u8; 16];
        let (record_type, len) = match ip {
            IpAddr::V4(v4) => {
                octets[..4].copy_from_slice(&v4.octets());
                (RecordType::A, 4)
            }
            IpAddr::V6(v6) => {
                octets = v6.octets();
                (RecordType::AAAA, 16)
            }
        };
        let rdata = &octets[..len];

        if !self.fits(ANSWER_FIXED_LEN + rdata.len()) {
            return false;
        }

        let pointer = COMPRESSION_POINTER | (name_offset as u16 & !COMPRESSION_POINTER);
        self.buf.extend_from_slice(&pointer.to_be_bytes());
        self.buf.extend_from_slice(&record_type.to_u16().to_be_bytes());
        self.buf.extend_from_slice(&CLASS_IN.to_be_bytes());
        self.buf.extend_from_slice(&ttl.to_be_bytes());
        self.buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
        self.buf.extend_from_slice(rdata);
        self.ancount += 1;
        true
    }

    pub fn set_rcode(&mut self, rcode: ResponseCode) {
        self.flags = (self.flags & !RCODE_MASK) | rcode as u16;
    }

    pub fn rcode(&self) -> Option<ResponseCode> {
        ResponseCode::from_flags(self.flags)
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn answer_count(&self) -> u16 {
        self.ancount
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.truncated {
            self.flags |= FLAG_TC;
        }
        self.buf[2..4].copy_from_slice(&self.flags.to_be_bytes());
        self.buf[4..6].copy_from_slice(&self.qdcount.to_be_bytes());
        self.buf[6..8].copy_from_slice(&self.ancount.to_be_bytes());
        // NSCOUNT and ARCOUNT stay zero.
        self.buf
    }
}

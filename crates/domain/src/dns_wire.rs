//! Constants for the RFC 1035 subset spoken by the UDP server.

use std::fmt;

pub const HEADER_LEN: usize = 12;

/// Classic UDP DNS message size without EDNS(0). Caps responses we build.
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

/// Receive buffer for datagrams: EDNS(0) queries and relayed upstream replies.
pub const MAX_UDP_RECEIVE_SIZE: usize = 4096;

pub const MAX_LABEL_LEN: usize = 63;

/// Work caps for adversarial input.
pub const MAX_QUESTIONS: usize = 10;
pub const MAX_LABELS: usize = 64;

pub const CLASS_IN: u16 = 1;

pub const FLAG_QR: u16 = 1 << 15;
pub const FLAG_AA: u16 = 1 << 10;
pub const FLAG_TC: u16 = 1 << 9;
pub const FLAG_RD: u16 = 1 << 8;
pub const FLAG_RA: u16 = 1 << 7;
pub const RCODE_MASK: u16 = 0x000F;

/// High bits marking a name compression pointer.
pub const COMPRESSION_MASK: u8 = 0xC0;
pub const COMPRESSION_POINTER: u16 = 0xC000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ResponseCode {
    NoError = 0,
    FormErr = 1,
    ServFail = 2,
    NxDomain = 3,
    NotImp = 4,
    Refused = 5,
}

impl ResponseCode {
    pub fn from_flags(flags: u16) -> Option<Self> {
        match flags & RCODE_MASK {
            0 => Some(ResponseCode::NoError),
            1 => Some(ResponseCode::FormErr),
            2 => Some(ResponseCode::ServFail),
            3 => Some(ResponseCode::NxDomain),
            4 => Some(ResponseCode::NotImp),
            5 => Some(ResponseCode::Refused),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::NxDomain => "NXDOMAIN",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::Refused => "REFUSED",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#![allow(dead_code)]

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub const TYPE_A: u16 = 1;
pub const TYPE_MX: u16 = 15;
pub const TYPE_AAAA: u16 = 28;

/// Standard query with RD set and one question per `(name, qtype)`, class IN.
pub fn query_packet(id: u16, questions: &[(&str, u16)]) -> Vec<u8> {
    let mut packet = Vec::new();
    packet.extend_from_slice(&id.to_be_bytes());
    packet.extend_from_slice(&0x0100u16.to_be_bytes());
    packet.extend_from_slice(&(questions.len() as u16).to_be_bytes());
    packet.extend_from_slice(&[0, 0, 0, 0, 0, 0]);

    for (name, qtype) in questions {
        packet.extend_from_slice(&encode_name(name));
        packet.extend_from_slice(&qtype.to_be_bytes());
        packet.extend_from_slice(&1u16.to_be_bytes());
    }
    packet
}

pub fn encode_name(name: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for label in name.split('.').filter(|l| !l.is_empty()) {
        out.push(label.len() as u8);
        out.extend_from_slice(label.as_bytes());
    }
    out.push(0);
    out
}

#[derive(Debug)]
pub struct DecodedAnswer {
    pub pointer: u16,
    pub rtype: u16,
    pub ttl: u32,
    pub ip: IpAddr,
}

/// Minimal decoder for responses built by the server: uncompressed
/// questions followed by pointer-named A/AAAA answers.
#[derive(Debug)]
pub struct DecodedResponse {
    pub id: u16,
    pub flags: u16,
    pub qdcount: u16,
    pub ancount: u16,
    pub question_offsets: Vec<usize>,
    pub answers: Vec<DecodedAnswer>,
}

impl DecodedResponse {
    pub fn decode(buf: &[u8]) -> Self {
        assert!(buf.len() >= 12, "response shorter than header");
        let word = |i: usize| u16::from_be_bytes([buf[i], buf[i + 1]]);

        let mut response = Self {
            id: word(0),
            flags: word(2),
            qdcount: word(4),
            ancount: word(6),
            question_offsets: Vec::new(),
            answers: Vec::new(),
        };

        let mut pos = 12;
        for _ in 0..response.qdcount {
            response.question_offsets.push(pos);
            while buf[pos] != 0 {
                pos += buf[pos] as usize + 1;
            }
            pos += 5;
        }

        for _ in 0..response.ancount {
            let pointer = word(pos);
            let rtype = word(pos + 2);
            let ttl = u32::from_be_bytes([buf[pos + 6], buf[pos + 7], buf[pos + 8], buf[pos + 9]]);
            let rdlen = word(pos + 10) as usize;
            let rdata = &buf[pos + 12..pos + 12 + rdlen];
            let ip = match rdlen {
                4 => IpAddr::V4(Ipv4Addr::new(rdata[0], rdata[1], rdata[2], rdata[3])),
                16 => {
                    let mut octets = [0u8; 16];
                    octets.copy_from_slice(rdata);
                    IpAddr::V6(Ipv6Addr::from(octets))
                }
                other => panic!("unexpected RDLENGTH {}", other),
            };
            response.answers.push(DecodedAnswer {
                pointer,
                rtype,
                ttl,
                ip,
            });
            pos += 12 + rdlen;
        }

        assert_eq!(pos, buf.len(), "trailing bytes after answers");
        response
    }

    pub fn rcode(&self) -> u16 {
        self.flags & 0x000F
    }

    pub fn is_response(&self) -> bool {
        self.flags & 0x8000 != 0
    }

    pub fn is_truncated(&self) -> bool {
        self.flags & 0x0200 != 0
    }

    pub fn ips(&self) -> Vec<IpAddr> {
        self.answers.iter().map(|a| a.ip).collect()
    }
}

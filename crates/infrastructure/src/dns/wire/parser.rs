use dnscached_domain::dns_wire::{
    CLASS_IN, COMPRESSION_MASK, FLAG_QR, FLAG_RD, HEADER_LEN, MAX_LABELS, MAX_LABEL_LEN,
    MAX_QUESTIONS,
};
use dnscached_domain::RecordType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    pub fn parse(buf: &[u8]) -> Option<Self> {
        if buf.len() < HEADER_LEN {
            return None;
        }
        let word = |i: usize| u16::from_be_bytes([buf[i], buf[i + 1]]);
        Some(Self {
            id: word(0),
            flags: word(2),
            qdcount: word(4),
            ancount: word(6),
            nscount: word(8),
            arcount: word(10),
        })
    }

    pub fn is_response(&self) -> bool {
        self.flags & FLAG_QR != 0
    }

    pub fn recursion_desired(&self) -> bool {
        self.flags & FLAG_RD != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Lowercased name without the trailing dot (`""` for the root).
    pub name: String,
    pub record_type: RecordType,
    pub class: u16,
    /// Offset of the first name byte in the request packet.
    pub offset: usize,
    /// Offset just past QCLASS.
    pub end: usize,
}

impl Question {
    /// The question exactly as the client encoded it.
    pub fn raw<'a>(&self, packet: &'a [u8]) -> &'a [u8] {
        &packet[self.offset..self.end]
    }

    /// IN-class A/AAAA questions are answered from the cache.
    pub fn is_local(&self) -> bool {
        self.class == CLASS_IN && self.record_type.is_address()
    }
}

#[derive(Debug)]
pub struct ParsedRequest<'a> {
    pub header: Header,
    pub questions: Vec<Question>,
    pub packet: &'a [u8],
}

impl<'a> ParsedRequest<'a> {
    pub fn question_bytes(&self, question: &Question) -> &'a [u8] {
        question.raw(self.packet)
    }

    pub fn has_non_local_question(&self) -> bool {
        self.questions.iter().any(|q| !q.is_local())
    }
}

/// Parses a query packet.
///
/// Returns `None` for packets that get no reply at all: shorter than a
/// header, or carrying the QR bit. Question parsing stops at the first
/// malformed question, keeping those before it; at most `MAX_QUESTIONS`
/// are read.
pub fn parse_request(packet: &[u8]) -> Option<ParsedRequest<'_>> {
    let header = Header::parse(packet)?;
    if header.is_response() {
        return None;
    }

    let wanted = (header.qdcount as usize).min(MAX_QUESTIONS);
    let mut questions = Vec::with_capacity(wanted);
    let mut pos = HEADER_LEN;

    for _ in 0..wanted {
        match parse_question(packet, pos) {
            Some(question) => {
                pos = question.end;
                questions.push(question);
            }
            None => break,
        }
    }

    Some(ParsedRequest {
        header,
        questions,
        packet,
    })
}

fn parse_question(buf: &[u8], start: usize) -> Option<Question> {
    let (name, name_end) = parse_name(buf, start)?;

    if name_end + 4 > buf.len() {
        return None;
    }
    let qtype = u16::from_be_bytes([buf[name_end], buf[name_end + 1]]);
    let class = u16::from_be_bytes([buf[name_end + 2], buf[name_end + 3]]);

    Some(Question {
        name,
        record_type: RecordType::from_u16(qtype),
        class,
        offset: start,
        end: name_end + 4,
    })
}

/// Uncompressed name at `start`. Returns the dotted name and the offset
/// just past the terminating zero byte.
fn parse_name(buf: &[u8], start: usize) -> Option<(String, usize)> {
    let mut pos = start;
    let mut name = String::new();
    let mut labels = 0usize;

    loop {
        let label_len = *buf.get(pos)? as usize;
        pos += 1;

        if label_len == 0 {
            return Some((name, pos));
        }
        // Pointers and the reserved 0x40/0x80 label types all exceed 63.
        if label_len as u8 & COMPRESSION_MASK != 0 || label_len > MAX_LABEL_LEN {
            return None;
        }

        labels += 1;
        if labels > MAX_LABELS {
            return None;
        }

        let label = buf.get(pos..pos + label_len)?;
        if !name.is_empty() {
            name.push('.');
        }
        name.push_str(&String::from_utf8_lossy(label).to_ascii_lowercase());
        pos += label_len;
    }
}

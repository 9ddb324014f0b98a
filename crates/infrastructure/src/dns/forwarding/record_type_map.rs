//! Mapping from `dnscached_domain::RecordType` to `hickory_proto::rr::RecordType`.
//!
//! Both sides are keyed by the IANA type code, so the mapping goes through
//! `u16` and never loses a type.

use dnscached_domain::RecordType;
use hickory_proto::rr::RecordType as HickoryRecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: &RecordType) -> HickoryRecordType {
        HickoryRecordType::from(record_type.to_u16())
    }
}

//! Wire codec for the Source A2S_RULES exchange.
//!
//! Every datagram opens with a little-endian `i32` header:
//!
//! | header | meaning                                       |
//! |--------|-----------------------------------------------|
//! | `-1`   | single packet, message follows                 |
//! | `-2`   | one part of a split message, see [`SplitPart`] |
//!
//! A reassembled split message starts with its own `-1` header.

use std::collections::BTreeMap;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::QueryError;

pub(crate) const SINGLE_HEADER: i32 = -1;
pub(crate) const SPLIT_HEADER: i32 = -2;

/// `A2S_RULES` request type.
pub(crate) const A2S_RULES: u8 = 0x56;
/// `S2C_CHALLENGE` reply type.
pub(crate) const S2C_CHALLENGE: u8 = 0x41;
/// `A2S_RULES` reply type.
pub(crate) const RULES_REPLY: u8 = 0x45;

/// Challenge value sent to ask the server for a real one.
pub(crate) const NO_CHALLENGE: i32 = -1;

const COMPRESSED_FLAG: u32 = 0x8000_0000;

/// Builds an `A2S_RULES` request carrying `challenge`.
pub fn rules_request(challenge: i32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(9);
    buf.extend_from_slice(&SINGLE_HEADER.to_le_bytes());
    buf.push(A2S_RULES);
    buf.extend_from_slice(&challenge.to_le_bytes());
    buf
}

/// One received datagram, classified by its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datagram {
    /// A complete message. Holds the bytes after the header.
    Single(Vec<u8>),
    /// One part of a split message.
    Split(SplitPart),
}

/// One part of a split reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    pub id: i32,
    pub total: u8,
    pub number: u8,
    pub payload: Vec<u8>,
}

impl Datagram {
    /// Classifies a raw datagram.
    pub fn parse(bytes: &[u8]) -> Result<Self, QueryError> {
        let mut cur = Cursor::new(bytes);
        let header = cur
            .read_i32::<LittleEndian>()
            .map_err(|_| malformed("datagram shorter than its header"))?;

        match header {
            SINGLE_HEADER => Ok(Datagram::Single(rest(&cur))),
            SPLIT_HEADER => {
                let id = cur.read_i32::<LittleEndian>().map_err(truncated)?;
                if id as u32 & COMPRESSED_FLAG != 0 {
                    return Err(QueryError::Compressed);
                }
                let total = cur.read_u8().map_err(truncated)?;
                let number = cur.read_u8().map_err(truncated)?;
                // Max split size. Not needed for reassembly.
                let _size = cur.read_u16::<LittleEndian>().map_err(truncated)?;

                if total == 0 || number >= total {
                    return Err(malformed(format!("split part {number} of {total}")));
                }
                Ok(Datagram::Split(SplitPart {
                    id,
                    total,
                    number,
                    payload: rest(&cur),
                }))
            }
            other => Err(malformed(format!("unknown header {other}"))),
        }
    }
}

/// Collects the parts of one split reply.
#[derive(Debug)]
pub struct SplitAssembler {
    id: i32,
    parts: Vec<Option<Vec<u8>>>,
}

impl SplitAssembler {
    pub fn new(id: i32, total: u8) -> Self {
        Self {
            id,
            parts: vec![None; usize::from(total)],
        }
    }

    /// Stores `part`. Once every part is in, returns the message in part
    /// order with its leading `-1` header removed.
    ///
    /// Duplicate parts overwrite the earlier copy.
    pub fn push(&mut self, part: SplitPart) -> Result<Option<Vec<u8>>, QueryError> {
        if part.id != self.id {
            return Err(malformed(format!(
                "split id {} while assembling {}",
                part.id, self.id
            )));
        }
        if usize::from(part.total) != self.parts.len() {
            return Err(malformed("split part count changed mid-reply"));
        }

        let slot = self
            .parts
            .get_mut(usize::from(part.number))
            .ok_or_else(|| malformed(format!("split part {} out of range", part.number)))?;
        *slot = Some(part.payload);
        if self.parts.iter().any(Option::is_none) {
            return Ok(None);
        }

        let joined: Vec<u8> = self.parts.iter().flatten().flatten().copied().collect();
        let mut cur = Cursor::new(joined.as_slice());
        match cur.read_i32::<LittleEndian>() {
            Ok(SINGLE_HEADER) => Ok(Some(rest(&cur))),
            _ => Err(malformed("reassembled reply lacks a single-packet header")),
        }
    }
}

/// A decoded message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Challenge(i32),
    Rules(BTreeMap<String, String>),
}

impl Reply {
    /// Decodes a message body (the bytes after the `-1` header).
    ///
    /// Servers sometimes cut a long rule list short of its advertised count.
    /// Whatever complete pairs arrived are kept.
    pub fn parse(body: &[u8]) -> Result<Self, QueryError> {
        let mut cur = Cursor::new(body);
        let kind = cur.read_u8().map_err(|_| malformed("empty reply"))?;

        match kind {
            S2C_CHALLENGE => {
                let challenge = cur.read_i32::<LittleEndian>().map_err(truncated)?;
                Ok(Reply::Challenge(challenge))
            }
            RULES_REPLY => {
                let count = cur.read_u16::<LittleEndian>().map_err(truncated)?;
                let mut rules = BTreeMap::new();
                for _ in 0..count {
                    let (Some(key), Some(value)) = (read_cstr(&mut cur), read_cstr(&mut cur))
                    else {
                        tracing::debug!(
                            advertised = count,
                            received = rules.len(),
                            "rules reply cut short"
                        );
                        break;
                    };
                    rules.insert(key, value);
                }
                Ok(Reply::Rules(rules))
            }
            other => Err(QueryError::UnexpectedReply(other)),
        }
    }
}

/// Reads a NUL-terminated string. `None` if the data ends first.
fn read_cstr(cur: &mut Cursor<&[u8]>) -> Option<String> {
    let mut bytes = Vec::new();
    loop {
        match cur.read_u8().ok()? {
            0 => return Some(String::from_utf8_lossy(&bytes).into_owned()),
            b => bytes.push(b),
        }
    }
}

fn rest(cur: &Cursor<&[u8]>) -> Vec<u8> {
    let bytes = *cur.get_ref();
    let start = (cur.position() as usize).min(bytes.len());
    bytes[start..].to_vec()
}

fn malformed(msg: impl Into<String>) -> QueryError {
    QueryError::Malformed(msg.into())
}

fn truncated(_: std::io::Error) -> QueryError {
    malformed("datagram truncated")
}

use std::collections::BTreeMap;

use thiserror::Error;

/// Canonical bencode value: `i<int>e`, `<len>:<bytes>`, `l...e`, `d<key><val>...e` with keys
/// sorted lexicographically (§4.4). `Dict` uses a `BTreeMap` so Rust's own iteration order is
/// always the canonical sort order — there is no separate "sort before encoding" step to forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenValue {
    Int(i64),
    Bytes(Vec<u8>),
    List(Vec<BenValue>),
    Dict(BTreeMap<Vec<u8>, BenValue>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BencodeError {
    #[error("unexpected end of input")]
    Eof,
    #[error("invalid integer encoding")]
    InvalidInt,
    #[error("invalid string length prefix")]
    InvalidStringLen,
    #[error("unknown value tag byte {0:#x}")]
    UnknownTag(u8),
    #[error("trailing bytes after a complete value")]
    TrailingBytes,
    #[error("dict keys out of canonical order")]
    KeysNotSorted,
}

type Result<T> = std::result::Result<T, BencodeError>;

impl BenValue {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            BenValue::Int(v) => {
                out.push(b'i');
                out.extend_from_slice(v.to_string().as_bytes());
                out.push(b'e');
            }
            BenValue::Bytes(b) => {
                out.extend_from_slice(b.len().to_string().as_bytes());
                out.push(b':');
                out.extend_from_slice(b);
            }
            BenValue::List(items) => {
                out.push(b'l');
                for item in items {
                    item.encode_into(out);
                }
                out.push(b'e');
            }
            BenValue::Dict(map) => {
                out.push(b'd');
                // BTreeMap already iterates keys in sorted byte order.
                for (key, value) in map {
                    BenValue::Bytes(key.clone()).encode_into(out);
                    value.encode_into(out);
                }
                out.push(b'e');
            }
        }
    }

    pub fn decode(buf: &[u8]) -> Result<Self> {
        let (value, consumed) = Self::decode_prefix(buf)?;
        if consumed != buf.len() {
            return Err(BencodeError::TrailingBytes);
        }
        Ok(value)
    }

    /// Decode one value starting at the front of `buf`, returning it plus bytes consumed.
    pub fn decode_prefix(buf: &[u8]) -> Result<(Self, usize)> {
        match buf.first() {
            None => Err(BencodeError::Eof),
            Some(b'i') => decode_int(buf),
            Some(b'l') => decode_list(buf),
            Some(b'd') => decode_dict(buf),
            Some(c) if c.is_ascii_digit() => decode_bytes(buf),
            Some(c) => Err(BencodeError::UnknownTag(*c)),
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, BenValue>> {
        match self {
            BenValue::Dict(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BenValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            BenValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[BenValue]> {
        match self {
            BenValue::List(items) => Some(items),
            _ => None,
        }
    }
}

fn decode_int(buf: &[u8]) -> Result<(BenValue, usize)> {
    let end = buf.iter().position(|&b| b == b'e').ok_or(BencodeError::InvalidInt)?;
    let digits = std::str::from_utf8(&buf[1..end]).map_err(|_| BencodeError::InvalidInt)?;
    let value: i64 = digits.parse().map_err(|_| BencodeError::InvalidInt)?;
    Ok((BenValue::Int(value), end + 1))
}

fn decode_bytes(buf: &[u8]) -> Result<(BenValue, usize)> {
    let colon = buf.iter().position(|&b| b == b':').ok_or(BencodeError::InvalidStringLen)?;
    let digits = std::str::from_utf8(&buf[0..colon]).map_err(|_| BencodeError::InvalidStringLen)?;
    let len: usize = digits.parse().map_err(|_| BencodeError::InvalidStringLen)?;
    let start = colon + 1;
    let end = start.checked_add(len).ok_or(BencodeError::InvalidStringLen)?;
    if end > buf.len() {
        return Err(BencodeError::Eof);
    }
    Ok((BenValue::Bytes(buf[start..end].to_vec()), end))
}

fn decode_list(buf: &[u8]) -> Result<(BenValue, usize)> {
    let mut pos = 1;
    let mut items = Vec::new();
    loop {
        match buf.get(pos) {
            None => return Err(BencodeError::Eof),
            Some(b'e') => return Ok((BenValue::List(items), pos + 1)),
            _ => {
                let (value, consumed) = BenValue::decode_prefix(&buf[pos..])?;
                items.push(value);
                pos += consumed;
            }
        }
    }
}

fn decode_dict(buf: &[u8]) -> Result<(BenValue, usize)> {
    let mut pos = 1;
    let mut map = BTreeMap::new();
    let mut last_key: Option<Vec<u8>> = None;
    loop {
        match buf.get(pos) {
            None => return Err(BencodeError::Eof),
            Some(b'e') => return Ok((BenValue::Dict(map), pos + 1)),
            _ => {
                let (key_value, key_len) = decode_bytes(&buf[pos..])?;
                let key = match key_value {
                    BenValue::Bytes(k) => k,
                    _ => unreachable!("decode_bytes only returns BenValue::Bytes"),
                };
                if let Some(prev) = &last_key {
                    if &key <= prev {
                        return Err(BencodeError::KeysNotSorted);
                    }
                }
                pos += key_len;
                let (value, value_len) = BenValue::decode_prefix(&buf[pos..])?;
                pos += value_len;
                last_key = Some(key.clone());
                map.insert(key, value);
            }
        }
    }
}

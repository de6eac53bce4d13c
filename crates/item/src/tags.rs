//! # タグのAvroエンコーディング
//!
//! ANS-104のタグはAvroの `array<record{name: bytes, value: bytes}>` として直列化される。
//!
//! - 長さ・件数はzig-zag可変長整数（Avro `long`）
//! - 全タグを1ブロックに格納し、終端に件数0のブロックを置く
//! - タグが0件の場合は空バイト列（終端ブロックも置かない）

use crate::ItemError;

/// タグ件数の上限
pub const MAX_TAG_COUNT: usize = 128;
/// タグ名の最大バイト長
pub const MAX_TAG_NAME_BYTES: usize = 1024;
/// タグ値の最大バイト長
pub const MAX_TAG_VALUE_BYTES: usize = 3072;

/// Data Itemに付与される (name, value) のメタデータ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// タグ名
    pub name: String,
    /// タグ値
    pub value: String,
}

impl Tag {
    /// タグを作成する。
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// タグ件数・長さ制限を検証する。
pub fn validate_tags(tags: &[Tag]) -> Result<(), ItemError> {
    if tags.len() > MAX_TAG_COUNT {
        return Err(ItemError::InvalidTags(format!(
            "at most {MAX_TAG_COUNT} tags allowed, got {}",
            tags.len()
        )));
    }
    for tag in tags {
        if tag.name.is_empty() || tag.name.len() > MAX_TAG_NAME_BYTES {
            return Err(ItemError::InvalidTags(format!(
                "tag name must be 1..={MAX_TAG_NAME_BYTES} bytes: {:?}",
                tag.name
            )));
        }
        if tag.value.is_empty() || tag.value.len() > MAX_TAG_VALUE_BYTES {
            return Err(ItemError::InvalidTags(format!(
                "tag value for {:?} must be 1..={MAX_TAG_VALUE_BYTES} bytes",
                tag.name
            )));
        }
    }
    Ok(())
}

/// タグ列をAvroバイナリに直列化する。
pub fn encode_tags(tags: &[Tag]) -> Vec<u8> {
    if tags.is_empty() {
        return Vec::new();
    }
    let mut buf = Vec::new();
    write_long(&mut buf, tags.len() as i64);
    for tag in tags {
        write_bytes(&mut buf, tag.name.as_bytes());
        write_bytes(&mut buf, tag.value.as_bytes());
    }
    write_long(&mut buf, 0);
    buf
}

/// Avroバイナリからタグ列を復元する。
pub fn decode_tags(bytes: &[u8]) -> Result<Vec<Tag>, ItemError> {
    let mut tags = Vec::new();
    if bytes.is_empty() {
        return Ok(tags);
    }
    let mut pos = 0;
    loop {
        let mut count = read_long(bytes, &mut pos)?;
        if count == 0 {
            break;
        }
        // 負の件数の場合、直後にブロックのバイト長が続く
        if count < 0 {
            count = count
                .checked_neg()
                .ok_or_else(|| ItemError::Malformed("tag block count overflow".into()))?;
            read_long(bytes, &mut pos)?;
        }
        for _ in 0..count {
            let name = read_string(bytes, &mut pos)?;
            let value = read_string(bytes, &mut pos)?;
            tags.push(Tag { name, value });
        }
    }
    if pos != bytes.len() {
        return Err(ItemError::Malformed(format!(
            "{} trailing bytes after tags",
            bytes.len() - pos
        )));
    }
    Ok(tags)
}

fn write_long(buf: &mut Vec<u8>, n: i64) {
    let mut z = ((n << 1) ^ (n >> 63)) as u64;
    while z >= 0x80 {
        buf.push((z as u8 & 0x7f) | 0x80);
        z >>= 7;
    }
    buf.push(z as u8);
}

fn write_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_long(buf, data.len() as i64);
    buf.extend_from_slice(data);
}

fn read_long(bytes: &[u8], pos: &mut usize) -> Result<i64, ItemError> {
    let mut z: u64 = 0;
    let mut shift = 0;
    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or_else(|| ItemError::Malformed("truncated avro long".into()))?;
        *pos += 1;
        if shift >= 64 {
            return Err(ItemError::Malformed("avro long too long".into()));
        }
        z |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    Ok(((z >> 1) as i64) ^ -((z & 1) as i64))
}

fn read_string(bytes: &[u8], pos: &mut usize) -> Result<String, ItemError> {
    let len = read_long(bytes, pos)?;
    let len = usize::try_from(len)
        .map_err(|_| ItemError::Malformed(format!("negative avro string length {len}")))?;
    let end = pos
        .checked_add(len)
        .filter(|end| *end <= bytes.len())
        .ok_or_else(|| ItemError::Malformed("truncated avro string".into()))?;
    let text = std::str::from_utf8(&bytes[*pos..end])
        .map_err(|e| ItemError::Malformed(format!("tag is not utf-8: {e}")))?
        .to_string();
    *pos = end;
    Ok(text)
}

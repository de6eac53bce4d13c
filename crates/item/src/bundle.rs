//! # ANS-104 バンドル
//!
//! 複数の署名済みData Itemを1つの提出単位にまとめる。

use crate::item::DataItem;
use crate::ItemError;

/// バンドルヘッダの1エントリ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    /// Data Item ID（生バイト列）
    pub id: [u8; 32],
    /// Data Itemバイナリのバイト長
    pub size: u64,
}

/// バンドルバイナリ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    binary: Vec<u8>,
}

impl Bundle {
    /// 署名済みData Itemをバンドル化する。
    pub fn from_items(items: &[DataItem]) -> Result<Self, ItemError> {
        if items.is_empty() {
            return Err(ItemError::EmptyBundle);
        }

        let encoded: Vec<Vec<u8>> = items.iter().map(DataItem::to_bytes).collect();
        let body_len: usize = encoded.iter().map(Vec::len).sum();
        let mut binary = Vec::with_capacity(32 + 64 * items.len() + body_len);

        binary.extend_from_slice(&u256_le(items.len() as u64));
        for (item, bytes) in items.iter().zip(&encoded) {
            binary.extend_from_slice(&u256_le(bytes.len() as u64));
            binary.extend_from_slice(&item.id());
        }
        for bytes in &encoded {
            binary.extend_from_slice(bytes);
        }

        tracing::debug!(items = items.len(), bytes = binary.len(), "バンドルを生成しました");
        Ok(Self { binary })
    }

    /// バンドルのバイナリ表現
    pub fn as_bytes(&self) -> &[u8] {
        &self.binary
    }

    /// バイナリ表現を取り出す。
    pub fn into_bytes(self) -> Vec<u8> {
        self.binary
    }

    /// バンドルバイナリのヘッダを読み取り、各Data ItemのIDとサイズを返す。
    pub fn entries(bytes: &[u8]) -> Result<Vec<BundleEntry>, ItemError> {
        let count = read_u256(bytes, 0)?;
        let count = usize::try_from(count)
            .map_err(|_| ItemError::Malformed(format!("item count {count} too large")))?;
        let header_len = count
            .checked_mul(64)
            .and_then(|n| n.checked_add(32))
            .filter(|n| *n <= bytes.len())
            .ok_or_else(|| ItemError::Malformed("truncated bundle header".into()))?;

        let mut entries = Vec::with_capacity(count);
        let mut body_len: u64 = 0;
        for i in 0..count {
            let offset = 32 + i * 64;
            let size = read_u256(bytes, offset)?;
            let mut id = [0u8; 32];
            id.copy_from_slice(&bytes[offset + 32..offset + 64]);
            body_len = body_len.saturating_add(size);
            entries.push(BundleEntry { id, size });
        }

        if (bytes.len() - header_len) as u64 != body_len {
            return Err(ItemError::Malformed(format!(
                "bundle body is {} bytes, header declares {body_len}",
                bytes.len() - header_len
            )));
        }
        Ok(entries)
    }
}

fn u256_le(n: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[..8].copy_from_slice(&n.to_le_bytes());
    out
}

fn read_u256(bytes: &[u8], offset: usize) -> Result<u64, ItemError> {
    let field = bytes
        .get(offset..offset + 32)
        .ok_or_else(|| ItemError::Malformed("truncated 32-byte integer".into()))?;
    if field[8..].iter().any(|b| *b != 0) {
        return Err(ItemError::Malformed("32-byte integer exceeds u64".into()));
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&field[..8]);
    Ok(u64::from_le_bytes(low))
}

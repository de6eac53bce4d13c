//! # 署名済みData Item
//!
//! Data Itemの署名・バイナリ化・パース・検証。

use ans104_crypto::{
    b64url_decode, b64url_encode, deep_hash, ed25519_verify_raw, rsa_pss_verify, sha256,
    DeepHashChunk,
};

use crate::tags::{decode_tags, encode_tags, validate_tags, Tag};
use crate::wallet::Wallet;
use crate::ItemError;

/// 署名種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureType {
    /// RSA-PSS 4096bit（Arweave JWKウォレット）
    Arweave,
    /// Ed25519（Solana互換鍵）
    Ed25519,
}

impl SignatureType {
    /// バイナリ上の署名種別番号
    pub fn code(self) -> u16 {
        match self {
            SignatureType::Arweave => 1,
            SignatureType::Ed25519 => 2,
        }
    }

    /// 署名のバイト長
    pub fn signature_len(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 64,
        }
    }

    /// owner（公開鍵）のバイト長
    pub fn owner_len(self) -> usize {
        match self {
            SignatureType::Arweave => 512,
            SignatureType::Ed25519 => 32,
        }
    }

    /// 署名種別番号から復元する。
    pub fn from_code(code: u16) -> Result<Self, ItemError> {
        match code {
            1 => Ok(SignatureType::Arweave),
            2 => Ok(SignatureType::Ed25519),
            other => Err(ItemError::UnsupportedSignatureType(other)),
        }
    }

    /// owner長から署名種別を判定する。
    pub fn from_owner_len(len: usize) -> Result<Self, ItemError> {
        [SignatureType::Arweave, SignatureType::Ed25519]
            .into_iter()
            .find(|t| t.owner_len() == len)
            .ok_or_else(|| ItemError::Malformed(format!("no signature type has a {len}-byte owner")))
    }
}

/// 署名済みANS-104 Data Item。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    signature_type: SignatureType,
    signature: Vec<u8>,
    owner: Vec<u8>,
    target: Option<[u8; 32]>,
    anchor: Option<[u8; 32]>,
    tags: Vec<Tag>,
    data: Vec<u8>,
}

impl DataItem {
    /// Data Itemを構築し、ウォレットの鍵で署名する。
    ///
    /// - `target`: 空文字列なら無し。それ以外は32バイトにデコードされるBase64URL
    /// - `anchor`: 空文字列なら無し。それ以外はUTF-8で32バイトちょうど
    pub fn sign(
        wallet: &Wallet,
        data: Vec<u8>,
        target: &str,
        anchor: &str,
        tags: Vec<Tag>,
    ) -> Result<Self, ItemError> {
        let target = parse_target(target)?;
        let anchor = parse_anchor(anchor)?;
        validate_tags(&tags)?;

        let mut item = DataItem {
            signature_type: wallet.signature_type(),
            signature: Vec::new(),
            owner: wallet.owner(),
            target,
            anchor,
            tags,
            data,
        };
        let message = item.signature_message();
        item.signature = wallet.sign(&message);

        tracing::debug!(id = %item.id_b64(), "Data Itemに署名しました");
        Ok(item)
    }

    /// 署名済みの各フィールドからData Itemを組み立てる。署名の検証は行わない。
    ///
    /// 署名種別はownerの長さから判定する。
    /// `target` / `anchor` の解釈は [`DataItem::sign`] と同じ。
    pub fn from_parts(
        signature: Vec<u8>,
        owner: Vec<u8>,
        target: &str,
        anchor: &str,
        tags: Vec<Tag>,
        data: Vec<u8>,
    ) -> Result<Self, ItemError> {
        let signature_type = SignatureType::from_owner_len(owner.len())?;
        if signature.len() != signature_type.signature_len() {
            return Err(ItemError::Malformed(format!(
                "signature must be {} bytes, got {}",
                signature_type.signature_len(),
                signature.len()
            )));
        }
        if owner.len() != signature_type.owner_len() {
            return Err(ItemError::Malformed(format!(
                "owner must be {} bytes, got {}",
                signature_type.owner_len(),
                owner.len()
            )));
        }
        validate_tags(&tags)?;

        Ok(DataItem {
            signature_type,
            signature,
            owner,
            target: parse_target(target)?,
            anchor: parse_anchor(anchor)?,
            tags,
            data,
        })
    }

    /// 署名対象メッセージ（Deep Hash）を計算する。
    pub fn signature_message(&self) -> [u8; 48] {
        let sig_type = self.signature_type.code().to_string();
        let tag_bytes = encode_tags(&self.tags);
        let target: &[u8] = self.target.as_ref().map(|t| t.as_slice()).unwrap_or_default();
        let anchor: &[u8] = self.anchor.as_ref().map(|a| a.as_slice()).unwrap_or_default();

        deep_hash(&DeepHashChunk::List(vec![
            DeepHashChunk::Blob(b"dataitem"),
            DeepHashChunk::Blob(b"1"),
            DeepHashChunk::Blob(sig_type.as_bytes()),
            DeepHashChunk::Blob(&self.owner),
            DeepHashChunk::Blob(target),
            DeepHashChunk::Blob(anchor),
            DeepHashChunk::Blob(&tag_bytes),
            DeepHashChunk::Blob(&self.data),
        ]))
    }

    /// 署名を検証する。
    pub fn verify(&self) -> Result<(), ItemError> {
        let message = self.signature_message();
        match self.signature_type {
            SignatureType::Arweave => rsa_pss_verify(&self.owner, &message, &self.signature)?,
            SignatureType::Ed25519 => ed25519_verify_raw(&self.owner, &message, &self.signature)?,
        }
        Ok(())
    }

    /// Data Item ID（署名のSHA-256）
    pub fn id(&self) -> [u8; 32] {
        sha256(&self.signature)
    }

    /// Base64URLエンコードされたData Item ID
    pub fn id_b64(&self) -> String {
        b64url_encode(&self.id())
    }

    /// 署名種別
    pub fn signature_type(&self) -> SignatureType {
        self.signature_type
    }

    /// 署名の生バイト列
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// ownerの生バイト列（公開鍵）
    pub fn owner(&self) -> &[u8] {
        &self.owner
    }

    /// targetの生バイト列
    pub fn target(&self) -> Option<&[u8; 32]> {
        self.target.as_ref()
    }

    /// anchorの生バイト列
    pub fn anchor(&self) -> Option<&[u8; 32]> {
        self.anchor.as_ref()
    }

    /// タグ（入力順）
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// ペイロード
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// バンドラーへ提出するバイナリ表現を生成する。
    pub fn to_bytes(&self) -> Vec<u8> {
        let tag_bytes = encode_tags(&self.tags);
        let mut buf = Vec::with_capacity(
            2 + self.signature.len() + self.owner.len() + 66 + 16 + tag_bytes.len() + self.data.len(),
        );
        buf.extend_from_slice(&self.signature_type.code().to_le_bytes());
        buf.extend_from_slice(&self.signature);
        buf.extend_from_slice(&self.owner);
        write_optional(&mut buf, self.target.as_ref());
        write_optional(&mut buf, self.anchor.as_ref());
        buf.extend_from_slice(&(self.tags.len() as u64).to_le_bytes());
        buf.extend_from_slice(&(tag_bytes.len() as u64).to_le_bytes());
        buf.extend_from_slice(&tag_bytes);
        buf.extend_from_slice(&self.data);
        buf
    }

    /// バイナリ表現からData Itemを復元する。署名の検証は行わない。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ItemError> {
        let mut reader = Reader { bytes, pos: 0 };

        let code = u16::from_le_bytes(reader.array::<2>("signature type")?);
        let signature_type = SignatureType::from_code(code)?;
        let signature = reader.take(signature_type.signature_len(), "signature")?.to_vec();
        let owner = reader.take(signature_type.owner_len(), "owner")?.to_vec();
        let target = reader.optional("target")?;
        let anchor = reader.optional("anchor")?;

        let tag_count = u64::from_le_bytes(reader.array::<8>("tag count")?);
        let tag_len = u64::from_le_bytes(reader.array::<8>("tag length")?);
        let tag_len = usize::try_from(tag_len)
            .map_err(|_| ItemError::Malformed(format!("tag length {tag_len} too large")))?;
        let tags = decode_tags(reader.take(tag_len, "tags")?)?;
        if tags.len() as u64 != tag_count {
            return Err(ItemError::Malformed(format!(
                "tag count mismatch: header {tag_count}, decoded {}",
                tags.len()
            )));
        }
        let data = reader.rest().to_vec();

        Ok(DataItem {
            signature_type,
            signature,
            owner,
            target,
            anchor,
            tags,
            data,
        })
    }
}

fn parse_target(target: &str) -> Result<Option<[u8; 32]>, ItemError> {
    if target.is_empty() {
        return Ok(None);
    }
    let raw = b64url_decode(target).map_err(|e| ItemError::InvalidTarget(e.to_string()))?;
    let len = raw.len();
    <[u8; 32]>::try_from(raw)
        .map(Some)
        .map_err(|_| ItemError::InvalidTarget(format!("target must be 32 bytes, got {len}")))
}

fn parse_anchor(anchor: &str) -> Result<Option<[u8; 32]>, ItemError> {
    if anchor.is_empty() {
        return Ok(None);
    }
    <[u8; 32]>::try_from(anchor.as_bytes()).map(Some).map_err(|_| {
        ItemError::InvalidAnchor(format!("anchor must be 32 bytes, got {}", anchor.len()))
    })
}

fn write_optional(buf: &mut Vec<u8>, field: Option<&[u8; 32]>) {
    match field {
        Some(bytes) => {
            buf.push(1);
            buf.extend_from_slice(bytes);
        }
        None => buf.push(0),
    }
}

/// 境界チェック付きの逐次リーダー
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], ItemError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| ItemError::Malformed(format!("truncated {what}")))?;
        let bytes = self.bytes;
        let slice = &bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], ItemError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn optional(&mut self, what: &str) -> Result<Option<[u8; 32]>, ItemError> {
        match self.array::<1>(what)?[0] {
            0 => Ok(None),
            1 => self.array::<32>(what).map(Some),
            flag => Err(ItemError::Malformed(format!("invalid {what} presence flag {flag}"))),
        }
    }

    fn rest(&mut self) -> &'a [u8] {
        let bytes = self.bytes;
        let slice = &bytes[self.pos..];
        self.pos = bytes.len();
        slice
    }
}

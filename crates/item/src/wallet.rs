//! # ウォレット
//!
//! ウォレットファイルの形状で鍵の種類を判定する。
//!
//! | 形状 | 鍵 | 署名種別 |
//! |------|----|---------|
//! | JSONオブジェクト（`kty: "RSA"` のJWK） | Arweave RSA 4096bit | 1 (RSA-PSS) |
//! | 64要素のバイト配列（秘密鍵32B ‖ 公開鍵32B） | Solana互換Ed25519 | 2 (Ed25519) |

use std::path::Path;

use ans104_crypto::{
    b64url_decode, b64url_encode, ed25519_sign, rsa_modulus, rsa_private_key, rsa_pss_sign,
    sha256, Ed25519SigningKey, RsaPrivateKey,
};
use base58::ToBase58;
use serde::Deserialize;
use serde_json::Value;

use crate::item::SignatureType;
use crate::ItemError;

/// Arweave JWKウォレットのうち署名に必要な要素。
///
/// `dp` / `dq` / `qi` は `p` / `q` から再計算するため読まない。
#[derive(Deserialize)]
struct Jwk {
    kty: String,
    n: String,
    e: String,
    d: Option<String>,
    p: Option<String>,
    q: Option<String>,
}

enum WalletKey {
    Arweave(Box<RsaPrivateKey>),
    Ed25519(Ed25519SigningKey),
}

/// Data Itemの署名に使うウォレット。
pub struct Wallet {
    key: WalletKey,
}

impl Wallet {
    /// ウォレットファイルを読み込む。
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ItemError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| ItemError::WalletRead {
            path: path.display().to_string(),
            source,
        })?;
        let wallet = Self::from_json(&raw)?;

        tracing::info!(
            path = %path.display(),
            signature_type = ?wallet.signature_type(),
            address = %wallet.address(),
            "ウォレットを読み込みました"
        );
        Ok(wallet)
    }

    /// ウォレットJSONを形状で判別して読み込む。
    pub fn from_json(raw: &[u8]) -> Result<Self, ItemError> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| ItemError::InvalidWallet(format!("not valid JSON: {e}")))?;
        match value {
            Value::Object(_) => {
                let jwk: Jwk = serde_json::from_value(value)
                    .map_err(|e| ItemError::InvalidWallet(format!("invalid JWK: {e}")))?;
                Self::from_jwk(&jwk)
            }
            Value::Array(_) => {
                let bytes: Vec<u8> = serde_json::from_value(value).map_err(|e| {
                    ItemError::InvalidWallet(format!("expected a JSON array of 64 bytes: {e}"))
                })?;
                Self::from_keypair_bytes(&bytes)
            }
            _ => Err(ItemError::InvalidWallet(
                "expected an Arweave JWK object or a 64-byte keypair array".into(),
            )),
        }
    }

    fn from_jwk(jwk: &Jwk) -> Result<Self, ItemError> {
        if jwk.kty != "RSA" {
            return Err(ItemError::InvalidWallet(format!(
                "unsupported JWK key type {:?}",
                jwk.kty
            )));
        }
        let n = jwk_field("n", Some(&jwk.n))?;
        let e = jwk_field("e", Some(&jwk.e))?;
        let d = jwk_field("d", jwk.d.as_ref())?;
        let p = jwk_field("p", jwk.p.as_ref())?;
        let q = jwk_field("q", jwk.q.as_ref())?;

        let key = rsa_private_key(&n, &e, &d, &[p.as_slice(), q.as_slice()])
            .map_err(|e| ItemError::InvalidWallet(e.to_string()))?;
        Self::from_rsa_key(key)
    }

    /// RSA秘密鍵からArweaveウォレットを構築する。モジュラスは4096bitであること。
    pub fn from_rsa_key(key: RsaPrivateKey) -> Result<Self, ItemError> {
        let expected = SignatureType::Arweave.owner_len();
        let actual = rsa_modulus(&key).len();
        if actual != expected {
            return Err(ItemError::InvalidWallet(format!(
                "RSA modulus must be {expected} bytes, got {actual}"
            )));
        }
        Ok(Self {
            key: WalletKey::Arweave(Box::new(key)),
        })
    }

    /// 64バイトのキーペア（秘密鍵 ‖ 公開鍵）からウォレットを構築する。
    ///
    /// 公開鍵が秘密鍵から導出されるものと一致しない場合はエラー。
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, ItemError> {
        let keypair: &[u8; 64] = bytes.try_into().map_err(|_| {
            ItemError::InvalidWallet(format!("keypair must be 64 bytes, got {}", bytes.len()))
        })?;
        let signing_key = Ed25519SigningKey::from_keypair_bytes(keypair)
            .map_err(|_| ItemError::InvalidWallet("public key does not match secret key".into()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Ed25519署名鍵から直接ウォレットを構築する。
    pub fn from_signing_key(signing_key: Ed25519SigningKey) -> Self {
        Self {
            key: WalletKey::Ed25519(signing_key),
        }
    }

    /// 64バイトのキーペア表現。Ed25519ウォレットのみ。
    pub fn to_keypair_bytes(&self) -> Option<[u8; 64]> {
        match &self.key {
            WalletKey::Ed25519(key) => Some(key.to_keypair_bytes()),
            WalletKey::Arweave(_) => None,
        }
    }

    /// このウォレットが生成する署名の種別
    pub fn signature_type(&self) -> SignatureType {
        match &self.key {
            WalletKey::Arweave(_) => SignatureType::Arweave,
            WalletKey::Ed25519(_) => SignatureType::Ed25519,
        }
    }

    /// Data Itemのowner（Arweave: RSAモジュラス、Ed25519: 公開鍵）
    pub fn owner(&self) -> Vec<u8> {
        match &self.key {
            WalletKey::Arweave(key) => rsa_modulus(key),
            WalletKey::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
        }
    }

    /// ウォレットアドレス。
    ///
    /// Arweave: ownerのSHA-256をBase64URL、Ed25519: 公開鍵のBase58。
    pub fn address(&self) -> String {
        match &self.key {
            WalletKey::Arweave(_) => b64url_encode(&sha256(&self.owner())),
            WalletKey::Ed25519(_) => self.owner().to_base58(),
        }
    }

    /// メッセージに署名する。署名長は [`SignatureType::signature_len`] と一致する。
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match &self.key {
            WalletKey::Arweave(key) => rsa_pss_sign(key, message),
            WalletKey::Ed25519(key) => ed25519_sign(key, message).to_bytes().to_vec(),
        }
    }
}

fn jwk_field(name: &str, value: Option<&String>) -> Result<Vec<u8>, ItemError> {
    let value =
        value.ok_or_else(|| ItemError::InvalidWallet(format!("JWK is missing `{name}`")))?;
    b64url_decode(value).map_err(|e| ItemError::InvalidWallet(format!("JWK `{name}`: {e}")))
}

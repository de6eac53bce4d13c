//! # ANS-104 暗号処理
//!
//! ANS-104 Data Itemの署名・識別子計算に必要な暗号プリミティブを提供する。
//!
//! ## 暗号アルゴリズム
//! | 用途 | アルゴリズム |
//! |------|------------|
//! | 署名 | RSA-PSS/SHA-256 (signature type 1, Arweave JWK) |
//! | 署名 | Ed25519 (signature type 2) |
//! | 署名対象の集約 | Deep Hash (SHA-384) |
//! | Data Item ID | SHA-256(署名) |
//! | テキスト表現 | Base64URL（パディングなし） |

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use ed25519_dalek::{Signer, Verifier};
use rsa::pss::{BlindedSigningKey, Signature as PssSignature, VerifyingKey as PssVerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier as _};
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256, Sha384};

pub use ed25519_dalek::{
    Signature as Ed25519Signature, SigningKey as Ed25519SigningKey,
    VerifyingKey as Ed25519VerifyingKey,
};
pub use rsa::{BigUint, RsaPrivateKey};

/// Arweaveウォレットの公開指数（固定）
pub const ARWEAVE_PUBLIC_EXPONENT: u32 = 65537;

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Base64URLデコードエラー
    #[error("invalid base64url: {0}")]
    Base64Error(String),
    /// 鍵長・署名長の不一致
    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// 対象（"public key"、"signature"等）
        what: &'static str,
        /// 期待されるバイト長
        expected: usize,
        /// 実際のバイト長
        actual: usize,
    },
    /// Ed25519公開鍵が曲線上の点として不正
    #[error("invalid ed25519 public key")]
    InvalidPublicKey,
    /// Ed25519署名検証エラー
    #[error("ed25519 signature verification failed")]
    SignatureVerifyError,
    /// RSA鍵の構成要素が不正
    #[error("invalid rsa key: {0}")]
    InvalidRsaKey(String),
    /// RSA-PSS署名検証エラー
    #[error("rsa-pss signature verification failed")]
    RsaVerifyError,
}

/// Base64URLエンジン。
///
/// エンコード時はパディングなし（Arweaveの慣習）、デコード時はパディングの有無を問わない。
pub fn b64url() -> GeneralPurpose {
    GeneralPurpose::new(
        &alphabet::URL_SAFE,
        GeneralPurposeConfig::new()
            .with_encode_padding(false)
            .with_decode_padding_mode(DecodePaddingMode::Indifferent),
    )
}

/// バイト列をBase64URL（パディングなし）でエンコードする。
pub fn b64url_encode(data: &[u8]) -> String {
    b64url().encode(data)
}

/// Base64URL文字列をデコードする。
pub fn b64url_decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    b64url()
        .decode(text)
        .map_err(|e| CryptoError::Base64Error(e.to_string()))
}

/// SHA-256ハッシュ計算。
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// SHA-384ハッシュ計算。
pub fn sha384(data: &[u8]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 48];
    hash.copy_from_slice(&result);
    hash
}

/// Deep Hashの入力。バイト列（blob）またはその入れ子リスト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepHashChunk<'a> {
    /// 単一のバイト列
    Blob(&'a [u8]),
    /// 子要素のリスト
    List(Vec<DeepHashChunk<'a>>),
}

/// ArweaveのDeep Hash（SHA-384）を計算する。
///
/// - blob: `SHA384(SHA384("blob" ‖ len) ‖ SHA384(data))`
/// - list: `acc = SHA384("list" ‖ count)` から始め、子要素ごとに `acc = SHA384(acc ‖ deep_hash(child))`
///
/// `len` と `count` は10進数文字列。
pub fn deep_hash(chunk: &DeepHashChunk<'_>) -> [u8; 48] {
    match chunk {
        DeepHashChunk::Blob(data) => {
            let tag = sha384(format!("blob{}", data.len()).as_bytes());
            let body = sha384(data);
            sha384(&concat48(&tag, &body))
        }
        DeepHashChunk::List(children) => {
            let mut acc = sha384(format!("list{}", children.len()).as_bytes());
            for child in children {
                acc = sha384(&concat48(&acc, &deep_hash(child)));
            }
            acc
        }
    }
}

fn concat48(a: &[u8; 48], b: &[u8; 48]) -> [u8; 96] {
    let mut out = [0u8; 96];
    out[..48].copy_from_slice(a);
    out[48..].copy_from_slice(b);
    out
}

/// Ed25519による署名。
pub fn ed25519_sign(signing_key: &Ed25519SigningKey, message: &[u8]) -> Ed25519Signature {
    signing_key.sign(message)
}

/// Ed25519による署名検証。
pub fn ed25519_verify(
    verifying_key: &Ed25519VerifyingKey,
    message: &[u8],
    signature: &Ed25519Signature,
) -> Result<(), CryptoError> {
    verifying_key
        .verify(message, signature)
        .map_err(|_| CryptoError::SignatureVerifyError)
}

/// 生バイト列の公開鍵と署名でEd25519署名を検証する。
pub fn ed25519_verify_raw(
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    let pk: [u8; 32] = public_key.try_into().map_err(|_| CryptoError::InvalidLength {
        what: "public key",
        expected: 32,
        actual: public_key.len(),
    })?;
    let sig: [u8; 64] = signature.try_into().map_err(|_| CryptoError::InvalidLength {
        what: "signature",
        expected: 64,
        actual: signature.len(),
    })?;
    let verifying_key =
        Ed25519VerifyingKey::from_bytes(&pk).map_err(|_| CryptoError::InvalidPublicKey)?;
    ed25519_verify(&verifying_key, message, &Ed25519Signature::from_bytes(&sig))
}

/// JWKの構成要素（ビッグエンディアンの生バイト列）からRSA秘密鍵を構築する。
pub fn rsa_private_key(
    n: &[u8],
    e: &[u8],
    d: &[u8],
    primes: &[&[u8]],
) -> Result<RsaPrivateKey, CryptoError> {
    let primes = primes.iter().map(|p| BigUint::from_bytes_be(p)).collect();
    RsaPrivateKey::from_components(
        BigUint::from_bytes_be(n),
        BigUint::from_bytes_be(e),
        BigUint::from_bytes_be(d),
        primes,
    )
    .and_then(|key| key.validate().map(|()| key))
    .map_err(|e| CryptoError::InvalidRsaKey(e.to_string()))
}

/// RSA公開鍵のモジュラス（鍵長ちょうどのビッグエンディアン）。Data Itemのownerになる。
pub fn rsa_modulus(key: &RsaPrivateKey) -> Vec<u8> {
    let size = key.size();
    let raw = key.n().to_bytes_be();
    let mut out = vec![0u8; size.saturating_sub(raw.len())];
    out.extend_from_slice(&raw);
    out
}

/// RSA-PSS（SHA-256、MGF1-SHA-256、ソルト長32バイト）による署名。
///
/// 署名長はモジュラス長と同じ。
pub fn rsa_pss_sign(key: &RsaPrivateKey, message: &[u8]) -> Vec<u8> {
    let signing_key = BlindedSigningKey::<Sha256>::new(key.clone());
    signing_key
        .sign_with_rng(&mut rand::rngs::OsRng, message)
        .to_vec()
}

/// モジュラスの生バイト列でRSA-PSS署名を検証する。公開指数は65537固定。
pub fn rsa_pss_verify(
    modulus: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    if signature.len() != modulus.len() {
        return Err(CryptoError::InvalidLength {
            what: "signature",
            expected: modulus.len(),
            actual: signature.len(),
        });
    }
    let public_key = RsaPublicKey::new(
        BigUint::from_bytes_be(modulus),
        BigUint::from(ARWEAVE_PUBLIC_EXPONENT),
    )
    .map_err(|e| CryptoError::InvalidRsaKey(e.to_string()))?;
    let signature = PssSignature::try_from(signature).map_err(|_| CryptoError::RsaVerifyError)?;
    PssVerifyingKey::<Sha256>::new(public_key)
        .verify(message, &signature)
        .map_err(|_| CryptoError::RsaVerifyError)
}

//! # ANS-104 Data Item
//!
//! 署名済みData Itemの構築・バイナリエンコード・バンドル化を提供する。
//! CLI / プラグイン側のアダプタはこのクレートの内部に立ち入らず、
//! `ans104-core` の能力トレイト越しに利用する。
//!
//! ## バイナリレイアウト
//! ```text
//! [2B: signature_type LE][signature][owner]
//! [1B: target有無][32B: target]?
//! [1B: anchor有無][32B: anchor]?
//! [8B: タグ数 LE][8B: タグバイト長 LE][Avroタグ][data]
//! ```
//!
//! ## 署名種別
//! | コード | 方式 | 署名 / owner |
//! |---|---|---|
//! | 1 | Arweave (RSA-PSS/SHA-256, JWKウォレット) | 512B / 512B |
//! | 2 | Ed25519 (64バイト鍵ペア) | 64B / 32B |
//!
//! ## バンドルレイアウト
//! ```text
//! [32B: item数 LE] ([32B: itemサイズ LE][32B: item ID])* [item binary]*
//! ```

pub mod bundle;
pub mod item;
pub mod tags;
pub mod wallet;

pub use bundle::{Bundle, BundleEntry};
pub use item::{DataItem, SignatureType};
pub use tags::Tag;
pub use wallet::Wallet;

use ans104_crypto::CryptoError;

/// Data Item処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// ウォレットファイルの読み込み失敗
    #[error("cannot read wallet file {path}: {source}")]
    WalletRead {
        /// ウォレットファイルのパス
        path: String,
        /// 下位のI/Oエラー
        source: std::io::Error,
    },
    /// ウォレットファイルの形式不正
    #[error("invalid wallet: {0}")]
    InvalidWallet(String),
    /// targetが32バイトのBase64URLではない
    #[error("invalid target: {0}")]
    InvalidTarget(String),
    /// anchorが32バイトではない
    #[error("invalid anchor: {0}")]
    InvalidAnchor(String),
    /// タグが制限を超えている
    #[error("invalid tags: {0}")]
    InvalidTags(String),
    /// 未対応の署名種別
    #[error("unsupported signature type: {0}")]
    UnsupportedSignatureType(u16),
    /// バイナリの構造が不正
    #[error("malformed binary: {0}")]
    Malformed(String),
    /// バンドル対象が空
    #[error("bundle requires at least one data item")]
    EmptyBundle,
    /// 暗号処理エラー
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

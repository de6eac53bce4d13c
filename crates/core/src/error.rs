//! # Bridge エラー型
//!
//! CLI・プラグインの全エントリポイントで共通のエラー型。
//! 表示文字列はそのまま `{"error": ...}` の値として出力される。

use crate::capability::SignError;

/// 入力パラメータのデコードエラー。
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// パラメータが与えられていない（空文字列を含む）
    #[error("params required")]
    ParamsRequired,
    /// JSONとして不正、またはフィールドの型が不正
    #[error("invalid params: {0}")]
    Malformed(#[from] serde_json::Error),
    /// `wallet` が無い、または空文字列
    #[error("wallet path is required")]
    MissingWallet,
    /// `data` が無い
    #[error("data is required")]
    MissingData,
}

/// Bridgeエラー型。
///
/// いずれも呼び出し単位で終端し、リトライや部分的な回復は行わない。
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// パラメータのデコード失敗
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// ウォレットからの署名者読み込み失敗
    #[error("failed to load signer: {0}")]
    SignerLoad(String),
    /// Data Itemの構築・署名失敗
    #[error("failed to create and sign data item: {0}")]
    Signing(String),
    /// Data Itemバイナリの生成失敗
    #[error("failed to generate item binary: {0}")]
    Encode(String),
    /// バンドル生成失敗
    #[error("failed to create bundle: {0}")]
    Bundle(String),
    /// 既存Data Itemへの署名（未対応）
    #[error("signing existing items not currently supported - use CreateDataItem instead")]
    Unsupported,
}

impl From<SignError> for BridgeError {
    fn from(err: SignError) -> Self {
        match err {
            SignError::Load(msg) => BridgeError::SignerLoad(msg),
            SignError::Sign(msg) => BridgeError::Signing(msg),
        }
    }
}

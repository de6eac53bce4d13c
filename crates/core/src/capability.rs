//! # 署名ライブラリの能力トレイト
//!
//! 署名・バイナリ化・バンドル化はこのクレートでは実装せず、以下のトレイト越しに
//! 外部の署名ライブラリへ委譲する。
//!
//! 実装:
//! - [`crate::backend::Ans104Backend`] — `ans104-item` によるEd25519署名（本番用）
//! - [`crate::backend::MockBackend`] — メモリ内鍵で署名（ローカル開発・テスト用）

use ans104_types::Tag;

/// 署名前のData Item。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftItem {
    /// ペイロード
    pub data: Vec<u8>,
    /// target（未指定時は空文字列）
    pub target: String,
    /// anchor（未指定時は空文字列）
    pub anchor: String,
    /// タグ（入力順）
    pub tags: Vec<Tag>,
}

/// 署名済みData Item。
///
/// `target` / `anchor` / `data` / `tags` はリクエストの値をそのまま反映する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedItem {
    /// Base64URLエンコードされたData Item ID
    pub id: String,
    /// Base64URLエンコードされた署名
    pub signature: String,
    /// Base64URLエンコードされたowner
    pub owner: String,
    /// target（未指定時は空文字列）
    pub target: String,
    /// anchor（未指定時は空文字列）
    pub anchor: String,
    /// ペイロード
    pub data: Vec<u8>,
    /// タグ（入力順）
    pub tags: Vec<Tag>,
}

/// 署名処理のエラー。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignError {
    /// ウォレットの読み込み失敗
    Load(String),
    /// 構築・署名の失敗
    Sign(String),
}

/// ウォレットを読み込み、Data Itemに署名する能力。
pub trait Signer: Send + Sync {
    /// `wallet` から署名者を読み込み、`draft` に署名する。
    fn sign(&self, wallet: &str, draft: &DraftItem) -> Result<SignedItem, SignError>;
}

/// 署名済みData Itemを提出用バイナリにエンコードする能力。
///
/// 同一のSignedItemに対しては常に同一のバイト列を返すこと。
pub trait ItemEncoder: Send + Sync {
    /// Data Itemバイナリを生成する。
    fn encode_item(&self, item: &SignedItem) -> Result<Vec<u8>, String>;
}

/// 署名済みData Itemをバンドルにまとめる能力。
pub trait Bundler: Send + Sync {
    /// バンドルバイナリを生成する。
    fn bundle(&self, items: &[SignedItem]) -> Result<Vec<u8>, String>;
}

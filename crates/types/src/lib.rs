//! # ANS-104 Bridge 共有型定義
//!
//! CLI・プラグインの入出力JSONをRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - Base64URL（パディングなし）: Data Item ID、署名、owner、target
//! - Base64（標準、パディングあり）: CLI出力の `raw`
//! - バイト配列（JSON数値配列）: プラグイン出力の `raw` / `bundle`

use serde::{Deserialize, Serialize};

/// `GetBundle` 結果に付与されるフォーマットバージョン。
pub const BUNDLE_RESULT_VERSION: &str = "2.0.0";

// ---------------------------------------------------------------------------
// 入力パラメータ
// ---------------------------------------------------------------------------

/// CLIの `--params` およびプラグイン呼び出しの入力パラメータ。
///
/// 必須項目（`wallet`, `data`）の欠落はここでは検出せず、
/// `ans104-core` のデコーダで `DecodeError` として扱う。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    /// ウォレットファイルのパス
    pub wallet: Option<String>,
    /// ペイロード（UTF-8文字列、空文字列可）
    pub data: Option<String>,
    /// Base64URLエンコードされた32バイトのtarget
    pub target: Option<String>,
    /// 32バイトのanchor
    pub anchor: Option<String>,
    /// タグ（マッピング形式またはリスト形式）
    pub tags: Option<TagsParam>,
}

/// 入力タグの形状。
///
/// JSONの形状でどちらの形式かを判別する。どちらにも当てはまらない値は
/// `Unrecognized` として受理し、タグ無しとして扱う。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagsParam {
    /// `{"App-Name": "Test", ...}`
    Mapping(serde_json::Map<String, serde_json::Value>),
    /// `[{"name": "App-Name", "value": "Test"}, ...]`
    List(Vec<serde_json::Value>),
    /// 上記以外（文字列、数値等）
    Unrecognized(serde_json::Value),
}

// ---------------------------------------------------------------------------
// 出力
// ---------------------------------------------------------------------------

/// 出力タグ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// タグ名
    pub name: String,
    /// タグ値
    pub value: String,
}

/// CLIの成功結果。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    /// Base64URLエンコードされたData Item ID
    pub id: String,
    /// Base64URLエンコードされた署名
    pub signature: String,
    /// Base64URLエンコードされたowner（公開鍵）
    pub owner: String,
    /// target（指定時のみ）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target: String,
    /// anchor（指定時のみ）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub anchor: String,
    /// ペイロード
    pub data: String,
    /// タグ（1件以上の場合のみ）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// Base64（標準）エンコードされたData Itemバイナリ
    pub raw: String,
}

/// プラグイン `CreateDataItem` の成功結果。
///
/// CLI結果と異なり `target` / `anchor` / `tags` は常に出力し、`raw` はバイト配列。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginItemResult {
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
    pub data: String,
    /// タグ
    pub tags: Vec<Tag>,
    /// Data Itemバイナリ
    pub raw: Vec<u8>,
}

/// `GetBundle` 結果の `items` 要素。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSummary {
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
    pub data: String,
}

/// プラグイン `GetBundle` の成功結果。
///
/// 単体結果とは互換性のない別形状。`version` で識別する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleResult {
    /// Data Itemバイナリ（バンドラーへの提出用）
    pub raw: Vec<u8>,
    /// バンドルバイナリ
    pub bundle: Vec<u8>,
    /// バンドルに含まれるData Itemのメタデータ
    pub items: Vec<ItemSummary>,
    /// 結果フォーマットのバージョン（[`BUNDLE_RESULT_VERSION`]）
    pub version: String,
}

/// 失敗結果。エラー時はこのフィールドのみを出力する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    /// エラーメッセージ
    pub error: String,
}

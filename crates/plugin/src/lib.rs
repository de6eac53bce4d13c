//! # ANS-104 Bridge プラグイン
//!
//! ホストアプリケーションから呼び出されるプラグイン。
//! パラメータはJSONマッピングで受け取り、結果もマッピングで返す。
//!
//! ## エクスポート
//! - `CreateDataItem` — 署名済みData Itemを作成する
//! - `SignDataItem` — 未対応（常にエラー）
//! - `GetBundle` — Data Itemを作成し、1件のバンドルにまとめる
//!
//! ホストは [`get_plugin`] でインスタンスを取得し、[`Plugin::call`] または
//! [`Plugin::call_json`] でメソッド名を指定して呼び出す。
//! ホストはこのクレートをRustライブラリとして直接リンクする。
//! 動的ロード用のシンボル（cdylib / FFI）はエクスポートしない。

use ans104_core::result::{bundle_result, error_result, plugin_item_result};
use ans104_core::{decode_params_map, Bridge, BridgeConfig, BridgeError, DecodeError};
use serde::Serialize;
use serde_json::{Map, Value};

/// `CreateDataItem` のメソッド名
pub const METHOD_CREATE_DATA_ITEM: &str = "CreateDataItem";
/// `SignDataItem` のメソッド名
pub const METHOD_SIGN_DATA_ITEM: &str = "SignDataItem";
/// `GetBundle` のメソッド名
pub const METHOD_GET_BUNDLE: &str = "GetBundle";

/// ホストに公開するメソッド名の一覧。
pub const METHODS: [&str; 3] = [
    METHOD_CREATE_DATA_ITEM,
    METHOD_SIGN_DATA_ITEM,
    METHOD_GET_BUNDLE,
];

/// プラグインのエラー型
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// パイプラインのエラー
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    /// 未知のメソッド名
    #[error("unknown method: {0}")]
    UnknownMethod(String),
    /// 結果のシリアライズ失敗
    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// ホストプラグイン本体。
pub struct Plugin {
    /// 署名パイプライン
    bridge: Bridge,
}

/// 設定（環境変数）に従ってプラグインを構築する。
pub fn get_plugin() -> Plugin {
    Plugin::from_config(&BridgeConfig::from_env())
}

impl Plugin {
    /// 設定からプラグインを構築する。
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::with_bridge(Bridge::from_config(config))
    }

    /// 任意のパイプラインでプラグインを構築する。
    pub fn with_bridge(bridge: Bridge) -> Self {
        Self { bridge }
    }

    /// 署名済みData Itemを作成する。
    ///
    /// 結果の `target` / `anchor` / `tags` は空でも常に含まれ、`raw` はバイト配列。
    pub fn create_data_item(
        &self,
        params: Map<String, Value>,
    ) -> Result<Map<String, Value>, PluginError> {
        let request = decode_params_map(params).map_err(BridgeError::from)?;
        let created = self.bridge.create_data_item(&request)?;
        to_map(&plugin_item_result(&created))
    }

    /// 既存Data Itemへの署名。現在は未対応で、常にエラーを返す。
    pub fn sign_data_item(
        &self,
        _params: Map<String, Value>,
    ) -> Result<Map<String, Value>, PluginError> {
        Err(BridgeError::Unsupported.into())
    }

    /// Data Itemを作成し、バンドルにまとめる。
    ///
    /// 結果は `{raw, bundle, items, version}`。`CreateDataItem` の結果とは別形状。
    pub fn get_bundle(
        &self,
        params: Map<String, Value>,
    ) -> Result<Map<String, Value>, PluginError> {
        let request = decode_params_map(params).map_err(BridgeError::from)?;
        let created = self.bridge.create_bundle(&request)?;
        to_map(&bundle_result(&created))
    }

    /// メソッド名でディスパッチする。
    pub fn call(
        &self,
        method: &str,
        params: Map<String, Value>,
    ) -> Result<Map<String, Value>, PluginError> {
        tracing::debug!(method, "プラグインメソッドを呼び出します");
        match method {
            METHOD_CREATE_DATA_ITEM => self.create_data_item(params),
            METHOD_SIGN_DATA_ITEM => self.sign_data_item(params),
            METHOD_GET_BUNDLE => self.get_bundle(params),
            other => Err(PluginError::UnknownMethod(other.to_string())),
        }
    }

    /// JSONテキストでやり取りするホスト向けのディスパッチ。
    ///
    /// 常にJSONドキュメントを1件返す。失敗時は `{"error": "..."}`。
    pub fn call_json(&self, method: &str, params_json: &str) -> String {
        let result = parse_params(params_json).and_then(|params| self.call(method, params));
        match result {
            Ok(map) => Value::Object(map).to_string(),
            Err(e) => {
                tracing::debug!(method, error = %e, "プラグインメソッドが失敗しました");
                serde_json::to_string(&error_result(&e))
                    .unwrap_or_else(|_| serde_json::json!({ "error": e.to_string() }).to_string())
            }
        }
    }
}

fn parse_params(text: &str) -> Result<Map<String, Value>, PluginError> {
    if text.is_empty() {
        return Err(BridgeError::from(DecodeError::ParamsRequired).into());
    }
    serde_json::from_str(text).map_err(|e| BridgeError::from(DecodeError::Malformed(e)).into())
}

fn to_map(value: &impl Serialize) -> Result<Map<String, Value>, PluginError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(PluginError::Serialize(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        )))),
    }
}

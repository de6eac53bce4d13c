//! # 結果エンコーダ
//!
//! パイプラインの成果物をCLI・プラグインの出力型に変換する。
//! バイナリはCLIでは標準Base64、プラグインではバイト配列として出力する。

use ans104_types::{
    BundleResult, ErrorResult, ItemResult, ItemSummary, PluginItemResult, BUNDLE_RESULT_VERSION,
};
use base64::Engine;

use crate::capability::SignedItem;
use crate::pipeline::{CreatedBundle, CreatedItem};

/// 標準Base64エンジン（パディングあり）
pub fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// CLIの成功結果を構築する。空の `target` / `anchor` / `tags` はシリアライズ時に省略される。
pub fn item_result(created: &CreatedItem) -> ItemResult {
    let item = &created.item;
    ItemResult {
        id: item.id.clone(),
        signature: item.signature.clone(),
        owner: item.owner.clone(),
        target: item.target.clone(),
        anchor: item.anchor.clone(),
        data: payload_text(item),
        tags: item.tags.clone(),
        raw: b64().encode(&created.binary),
    }
}

/// プラグイン `CreateDataItem` の成功結果を構築する。
pub fn plugin_item_result(created: &CreatedItem) -> PluginItemResult {
    let item = &created.item;
    PluginItemResult {
        id: item.id.clone(),
        signature: item.signature.clone(),
        owner: item.owner.clone(),
        target: item.target.clone(),
        anchor: item.anchor.clone(),
        data: payload_text(item),
        tags: item.tags.clone(),
        raw: created.binary.clone(),
    }
}

/// プラグイン `GetBundle` の成功結果を構築する。
pub fn bundle_result(created: &CreatedBundle) -> BundleResult {
    let item = &created.item;
    BundleResult {
        raw: created.binary.clone(),
        bundle: created.bundle.clone(),
        items: vec![ItemSummary {
            id: item.id.clone(),
            signature: item.signature.clone(),
            owner: item.owner.clone(),
            target: item.target.clone(),
            anchor: item.anchor.clone(),
            data: payload_text(item),
        }],
        version: BUNDLE_RESULT_VERSION.to_string(),
    }
}

/// 失敗結果を構築する。
pub fn error_result(err: &impl std::fmt::Display) -> ErrorResult {
    ErrorResult {
        error: err.to_string(),
    }
}

// ペイロードはUTF-8文字列として受け取るため、ここで置換が起きるのは
// 独自のSigner実装が非UTF-8のdataを返した場合のみ。
fn payload_text(item: &SignedItem) -> String {
    String::from_utf8_lossy(&item.data).into_owned()
}

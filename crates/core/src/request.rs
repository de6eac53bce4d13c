//! # パラメータデコーダ
//!
//! JSONテキスト（CLI）またはホストから渡されたマッピング（プラグイン）を
//! 型付きの [`Request`] に変換する。

use ans104_types::Params;
use serde_json::{Map, Value};

use crate::capability::DraftItem;
use crate::error::DecodeError;
use crate::tags::normalize_tags;

/// 1回の呼び出しで処理するリクエスト。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// ウォレットファイルのパス（空文字列にはならない）
    pub wallet: String,
    /// 署名対象
    pub item: DraftItem,
}

impl Request {
    /// デコード済みパラメータから必須項目を検証してリクエストを構築する。
    pub fn from_params(params: Params) -> Result<Self, DecodeError> {
        let wallet = params
            .wallet
            .filter(|w| !w.is_empty())
            .ok_or(DecodeError::MissingWallet)?;
        let data = params.data.ok_or(DecodeError::MissingData)?;
        let tags = normalize_tags(params.tags.as_ref());

        Ok(Self {
            wallet,
            item: DraftItem {
                data: data.into_bytes(),
                target: params.target.unwrap_or_default(),
                anchor: params.anchor.unwrap_or_default(),
                tags,
            },
        })
    }
}

/// JSONテキストをデコードする。`None` または空文字列は `ParamsRequired`。
pub fn decode_params_json(raw: Option<&str>) -> Result<Request, DecodeError> {
    let raw = raw.filter(|s| !s.is_empty()).ok_or(DecodeError::ParamsRequired)?;
    let params: Params = serde_json::from_str(raw)?;
    Request::from_params(params)
}

/// ホストから渡されたマッピングをデコードする。
pub fn decode_params_map(params: Map<String, Value>) -> Result<Request, DecodeError> {
    let params: Params = serde_json::from_value(Value::Object(params))?;
    Request::from_params(params)
}

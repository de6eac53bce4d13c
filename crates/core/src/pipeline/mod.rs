//! # 署名パイプライン
//!
//! CLI・プラグインが共有する単一段のパイプライン。
//!
//! ```text
//! Request -> Signer -> ItemEncoder -> (Bundler) -> 結果
//! ```
//!
//! 各段は一度だけ呼ばれ、リトライや分岐は行わない。

use crate::backend::{Ans104Backend, MockBackend};
use crate::capability::{Bundler, ItemEncoder, SignedItem, Signer};
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::request::Request;

/// `create_data_item` の成果物。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedItem {
    /// 署名済みData Item
    pub item: SignedItem,
    /// 提出用Data Itemバイナリ
    pub binary: Vec<u8>,
}

/// `create_bundle` の成果物。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedBundle {
    /// 署名済みData Item
    pub item: SignedItem,
    /// 提出用Data Itemバイナリ
    pub binary: Vec<u8>,
    /// バンドルバイナリ
    pub bundle: Vec<u8>,
}

/// 能力トレイトの実装を束ねたパイプライン。
pub struct Bridge {
    signer: Box<dyn Signer>,
    encoder: Box<dyn ItemEncoder>,
    bundler: Box<dyn Bundler>,
}

impl Bridge {
    /// 任意の実装からBridgeを構築する。
    pub fn new(
        signer: Box<dyn Signer>,
        encoder: Box<dyn ItemEncoder>,
        bundler: Box<dyn Bundler>,
    ) -> Self {
        Self {
            signer,
            encoder,
            bundler,
        }
    }

    /// ウォレットファイルで署名する本番用Bridge。
    pub fn ans104() -> Self {
        Self::new(
            Box::new(Ans104Backend),
            Box::new(Ans104Backend),
            Box::new(Ans104Backend),
        )
    }

    /// メモリ内鍵で署名するモックBridge。エンコード・バンドル化は本番と共通。
    pub fn mock() -> Self {
        Self::new(
            Box::new(MockBackend::new()),
            Box::new(Ans104Backend),
            Box::new(Ans104Backend),
        )
    }

    /// 設定に従ってBridgeを構築する。
    pub fn from_config(config: &BridgeConfig) -> Self {
        if config.mock_mode {
            tracing::warn!("MOCK_MODE: メモリ内鍵で署名します（ウォレットは使用されません）");
            Self::mock()
        } else {
            Self::ans104()
        }
    }

    /// Data Itemに署名し、提出用バイナリを生成する。
    pub fn create_data_item(&self, request: &Request) -> Result<CreatedItem, BridgeError> {
        tracing::debug!(
            wallet = %request.wallet,
            data_len = request.item.data.len(),
            tags = request.item.tags.len(),
            "Data Itemを作成します"
        );
        let item = self.signer.sign(&request.wallet, &request.item)?;

        tracing::debug!(id = %item.id, "Data Itemバイナリを生成します");
        let binary = self
            .encoder
            .encode_item(&item)
            .map_err(BridgeError::Encode)?;

        Ok(CreatedItem { item, binary })
    }

    /// Data Itemを作成し、1件のみを含むバンドルにまとめる。
    pub fn create_bundle(&self, request: &Request) -> Result<CreatedBundle, BridgeError> {
        let CreatedItem { item, binary } = self.create_data_item(request)?;

        tracing::debug!(id = %item.id, "バンドルを生成します");
        let bundle = self
            .bundler
            .bundle(std::slice::from_ref(&item))
            .map_err(BridgeError::Bundle)?;

        tracing::info!(
            id = %item.id,
            item_bytes = binary.len(),
            bundle_bytes = bundle.len(),
            "バンドルを生成しました"
        );
        Ok(CreatedBundle {
            item,
            binary,
            bundle,
        })
    }
}

#[cfg(test)]
mod tests;

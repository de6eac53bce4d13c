//! # ANS-104 Bridge Core
//!
//! JSONパラメータをANS-104署名ライブラリの呼び出しに変換し、
//! その出力をJSON結果に戻すアダプタ層。
//!
//! ## 処理フロー
//! 1. パラメータをデコードする（[`request`]）
//! 2. タグを正規化する（[`tags`]）
//! 3. Data Itemに署名する（[`capability::Signer`]）
//! 4. Data Itemバイナリを生成する（[`capability::ItemEncoder`]）
//! 5. 必要に応じてバンドル化する（[`capability::Bundler`]）
//! 6. 結果をJSON出力型に変換する（[`result`]）
//!
//! 署名・シリアライズ・バンドル構築はこのクレートでは行わない。

pub mod backend;
pub mod capability;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod result;
pub mod tags;

pub use capability::{Bundler, DraftItem, ItemEncoder, SignError, SignedItem, Signer};
pub use config::BridgeConfig;
pub use error::{BridgeError, DecodeError};
pub use pipeline::{Bridge, CreatedBundle, CreatedItem};
pub use request::{decode_params_json, decode_params_map, Request};

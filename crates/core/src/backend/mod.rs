//! # 署名バックエンド
//!
//! 能力トレイト（[`crate::capability`]）の実装。
//! 環境変数 `MOCK_MODE` で実装を切り替える。
//!
//! 現在のバックエンド実装:
//! - `ans104` — ウォレットファイルのEd25519鍵で署名（`ans104-item`）
//! - `mock` — ローカル開発・テスト用（メモリ内鍵生成、ウォレットパスは無視）

pub mod ans104;
pub mod mock;

pub use ans104::Ans104Backend;
pub use mock::MockBackend;

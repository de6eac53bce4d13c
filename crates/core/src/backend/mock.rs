//! # ローカル開発用モックバックエンド
//!
//! ウォレットファイルが用意できない開発環境・テストで使用する。
//! メモリ内で鍵を生成し、リクエストのウォレットパスは無視する。
//! 生成される署名・バイナリは本番バックエンドと同じ形式で、検証も通る。

use ans104_crypto::Ed25519SigningKey;
use ans104_item::Wallet;

use crate::capability::{DraftItem, SignError, SignedItem, Signer};

/// モック署名者。プロセス内で1つのEd25519鍵を使い回す。
pub struct MockBackend {
    /// メモリ内生成したウォレット
    wallet: Wallet,
}

impl MockBackend {
    /// 新しい鍵でMockBackendを初期化する。
    pub fn new() -> Self {
        Self {
            wallet: Wallet::from_signing_key(Ed25519SigningKey::generate(&mut rand::rngs::OsRng)),
        }
    }

    /// モック鍵のアドレス（Base58公開鍵）を返す。
    pub fn address(&self) -> String {
        self.wallet.address()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Signer for MockBackend {
    fn sign(&self, wallet: &str, draft: &DraftItem) -> Result<SignedItem, SignError> {
        tracing::debug!(wallet, "MOCK_MODE: ウォレットパスを無視してメモリ内鍵で署名します");
        super::ans104::sign_with(&self.wallet, draft)
    }
}

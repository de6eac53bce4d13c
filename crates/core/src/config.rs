//! # Bridge設定
//!
//! 環境変数から読み込む実行時設定。
//!
//! | 変数 | 既定値 | 説明 |
//! |------|--------|------|
//! | `MOCK_MODE` | `false` | `true` のときMockBackendで署名する（開発用） |
//! | `LOG_LEVEL` | `warn` | ログレベル（`error` / `warn` / `info` / `debug` / `trace`） |

use tracing::Level;

/// 実行時設定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// MockBackendを使用するか
    pub mock_mode: bool,
    /// ログレベル（stderrに出力）
    pub log_level: Level,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            mock_mode: false,
            log_level: Level::WARN,
        }
    }
}

impl BridgeConfig {
    /// プロセスの環境変数から設定を読み込む。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を読み込む。
    ///
    /// 不正な `LOG_LEVEL` は既定値にフォールバックする。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mock_mode = lookup("MOCK_MODE").is_some_and(|v| v == "true");
        let log_level = lookup("LOG_LEVEL")
            .and_then(|v| v.trim().parse::<Level>().ok())
            .unwrap_or(defaults.log_level);

        Self {
            mock_mode,
            log_level,
        }
    }
}

//! # ANS-104 Bridge CLI
//!
//! `--params` に渡されたJSONから署名済みData Itemを作成し、
//! 結果を1行のJSONとして標準出力に書き出す。
//!
//! ## 出力
//! - 成功: `{"id", "signature", "owner", "target"?, "anchor"?, "data", "tags"?, "raw"}`（終了コード0）
//! - 失敗: `{"error": "..."}`（終了コード1）
//!
//! ログは標準エラー出力に書き出し、標準出力はJSON 1件のみとする。

use std::io::Write;

use ans104_core::result::{error_result, item_result};
use ans104_core::{decode_params_json, Bridge, BridgeConfig, BridgeError};
use clap::error::ErrorKind;
use clap::Parser;
use serde::Serialize;

/// コマンドライン引数。
#[derive(Parser, Debug)]
#[command(
    name = "ans104-cli",
    version,
    about = "Create a signed ANS-104 data item from JSON parameters"
)]
struct Cli {
    /// JSON parameters: {"wallet", "data", "target"?, "anchor"?, "tags"?}
    #[arg(long)]
    params: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::from_env();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(config.log_level)
        .init();

    let (output, code) = match Cli::try_parse() {
        Ok(cli) => {
            let bridge = Bridge::from_config(&config);
            run(cli.params.as_deref(), &bridge)
        }
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "引数の解析に失敗しました");
            (to_json(&error_result(&arg_error_message(&e))), 1)
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{output}")?;
    stdout.flush()?;
    drop(stdout);

    std::process::exit(code);
}

/// パラメータを処理し、出力JSONと終了コードを返す。
fn run(params: Option<&str>, bridge: &Bridge) -> (String, i32) {
    match create(params, bridge) {
        Ok(output) => (output, 0),
        Err(e) => {
            tracing::debug!(error = %e, "Data Itemの作成に失敗しました");
            (to_json(&error_result(&e)), 1)
        }
    }
}

fn create(params: Option<&str>, bridge: &Bridge) -> Result<String, BridgeError> {
    let request = decode_params_json(params)?;
    let created = bridge.create_data_item(&request)?;
    Ok(to_json(&item_result(&created)))
}

fn to_json(value: &impl Serialize) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// clapのエラー表示から1行目のメッセージのみを取り出す。
fn arg_error_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_string()
}

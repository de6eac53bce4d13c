use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ans104_item::{Bundle, DataItem};
use ans104_types::Tag;

use crate::backend::Ans104Backend;
use crate::capability::{Bundler, DraftItem, ItemEncoder, SignError, SignedItem, Signer};
use crate::error::{BridgeError, DecodeError};
use crate::request::decode_params_json;

use super::*;

/// 呼び出し回数を数え、固定のSignedItemを返す署名者
struct CountingSigner {
    calls: Arc<AtomicUsize>,
}

impl Signer for CountingSigner {
    fn sign(&self, _wallet: &str, draft: &DraftItem) -> Result<SignedItem, SignError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SignedItem {
            id: "id".into(),
            signature: "sig".into(),
            owner: "owner".into(),
            target: draft.target.clone(),
            anchor: draft.anchor.clone(),
            data: draft.data.clone(),
            tags: draft.tags.clone(),
        })
    }
}

struct FailingSigner(SignError);

impl Signer for FailingSigner {
    fn sign(&self, _wallet: &str, _draft: &DraftItem) -> Result<SignedItem, SignError> {
        Err(self.0.clone())
    }
}

/// dataをそのままバイナリとして返すエンコーダ
struct EchoEncoder;

impl ItemEncoder for EchoEncoder {
    fn encode_item(&self, item: &SignedItem) -> Result<Vec<u8>, String> {
        Ok(item.data.clone())
    }
}

struct FailingEncoder;

impl ItemEncoder for FailingEncoder {
    fn encode_item(&self, _item: &SignedItem) -> Result<Vec<u8>, String> {
        Err("boom".into())
    }
}

struct CountingBundler {
    calls: Arc<AtomicUsize>,
}

impl Bundler for CountingBundler {
    fn bundle(&self, items: &[SignedItem]) -> Result<Vec<u8>, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![items.len() as u8])
    }
}

struct FailingBundler;

impl Bundler for FailingBundler {
    fn bundle(&self, _items: &[SignedItem]) -> Result<Vec<u8>, String> {
        Err("no space".into())
    }
}

fn request(json: &str) -> Request {
    decode_params_json(Some(json)).unwrap()
}

fn counting_bridge() -> (Bridge, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let sign_calls = Arc::new(AtomicUsize::new(0));
    let bundle_calls = Arc::new(AtomicUsize::new(0));
    let bridge = Bridge::new(
        Box::new(CountingSigner {
            calls: sign_calls.clone(),
        }),
        Box::new(EchoEncoder),
        Box::new(CountingBundler {
            calls: bundle_calls.clone(),
        }),
    );
    (bridge, sign_calls, bundle_calls)
}

#[test]
fn test_create_data_item_echoes_request() {
    let (bridge, sign_calls, bundle_calls) = counting_bridge();
    let req = request(
        r#"{"wallet":"w.json","data":"hello","tags":[{"name":"A","value":"1"},{"name":"A","value":"2"}]}"#,
    );

    let created = bridge.create_data_item(&req).unwrap();
    assert_eq!(created.item.data, b"hello");
    assert_eq!(created.binary, b"hello");
    assert_eq!(
        created.item.tags,
        vec![
            Tag { name: "A".into(), value: "1".into() },
            Tag { name: "A".into(), value: "2".into() },
        ]
    );
    assert_eq!(sign_calls.load(Ordering::SeqCst), 1);
    assert_eq!(bundle_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_create_bundle_calls_bundler_once() {
    let (bridge, sign_calls, bundle_calls) = counting_bridge();
    let created = bridge
        .create_bundle(&request(r#"{"wallet":"w","data":"x"}"#))
        .unwrap();

    assert_eq!(created.bundle, vec![1]);
    assert_eq!(created.binary, b"x");
    assert_eq!(sign_calls.load(Ordering::SeqCst), 1);
    assert_eq!(bundle_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_sign_errors_map_to_bridge_errors() {
    let req = request(r#"{"wallet":"w","data":"x"}"#);

    let bridge = Bridge::new(
        Box::new(FailingSigner(SignError::Load("no such file".into()))),
        Box::new(EchoEncoder),
        Box::new(FailingBundler),
    );
    let err = bridge.create_data_item(&req).unwrap_err();
    assert!(matches!(err, BridgeError::SignerLoad(_)));
    assert_eq!(err.to_string(), "failed to load signer: no such file");

    let bridge = Bridge::new(
        Box::new(FailingSigner(SignError::Sign("bad anchor".into()))),
        Box::new(EchoEncoder),
        Box::new(FailingBundler),
    );
    let err = bridge.create_data_item(&req).unwrap_err();
    assert_eq!(
        err.to_string(),
        "failed to create and sign data item: bad anchor"
    );
}

#[test]
fn test_encode_error() {
    let bridge = Bridge::new(
        Box::new(CountingSigner {
            calls: Arc::new(AtomicUsize::new(0)),
        }),
        Box::new(FailingEncoder),
        Box::new(FailingBundler),
    );
    let err = bridge
        .create_data_item(&request(r#"{"wallet":"w","data":"x"}"#))
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to generate item binary: boom");
}

#[test]
fn test_bundle_error() {
    let bridge = Bridge::new(
        Box::new(CountingSigner {
            calls: Arc::new(AtomicUsize::new(0)),
        }),
        Box::new(EchoEncoder),
        Box::new(FailingBundler),
    );
    let err = bridge
        .create_bundle(&request(r#"{"wallet":"w","data":"x"}"#))
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to create bundle: no space");
}

/// デコード失敗時は署名者が呼ばれない
#[test]
fn test_decode_error_before_signing() {
    let (_bridge, sign_calls, _) = counting_bridge();
    let err = decode_params_json(Some(r#"{"data":"x"}"#)).unwrap_err();
    assert!(matches!(err, DecodeError::MissingWallet));
    assert_eq!(sign_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_mock_bridge_produces_valid_item_and_bundle() {
    let bridge = Bridge::from_config(&BridgeConfig {
        mock_mode: true,
        ..BridgeConfig::default()
    });
    let req = request(r#"{"wallet":"ignored.json","data":"payload","tags":{"App-Name":"Test"}}"#);

    let created = bridge.create_bundle(&req).unwrap();
    let item = DataItem::from_bytes(&created.binary).unwrap();
    assert!(item.verify().is_ok());
    assert_eq!(item.id_b64(), created.item.id);
    assert_eq!(item.data(), b"payload");

    let entries = Bundle::entries(&created.bundle).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].size, created.binary.len() as u64);
}

#[test]
fn test_binary_is_deterministic() {
    let bridge = Bridge::mock();
    let created = bridge
        .create_data_item(&request(r#"{"wallet":"w","data":"same"}"#))
        .unwrap();
    assert_eq!(
        Ans104Backend.encode_item(&created.item).unwrap(),
        created.binary
    );
}

#[test]
fn test_ans104_bridge_reports_missing_wallet() {
    let bridge = Bridge::from_config(&BridgeConfig::default());
    let err = bridge
        .create_data_item(&request(r#"{"wallet":"/nonexistent/wallet.json","data":"x"}"#))
        .unwrap_err();
    assert!(matches!(err, BridgeError::SignerLoad(_)));
    assert!(err.to_string().starts_with("failed to load signer: "));
}

/// 空のタグ値は正規化を通過するが、署名ライブラリの制限で呼び出し全体が失敗する
#[test]
fn test_empty_tag_value_fails_signing() {
    let bridge = Bridge::mock();
    for raw in [
        r#"{"wallet":"w","data":"x","tags":{"Empty":"","Kept":"1"}}"#,
        r#"{"wallet":"w","data":"x","tags":[{"name":"","value":"1"}]}"#,
    ] {
        let req = request(raw);
        let empty = req
            .item
            .tags
            .iter()
            .filter(|t| t.name.is_empty() || t.value.is_empty())
            .count();
        assert_eq!(empty, 1);

        let err = bridge.create_data_item(&req).unwrap_err();
        assert!(matches!(err, BridgeError::Signing(_)));
        assert!(err
            .to_string()
            .starts_with("failed to create and sign data item: invalid tags: "));
    }
}

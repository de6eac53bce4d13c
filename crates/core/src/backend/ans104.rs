//! # ANS-104 バックエンド
//!
//! `ans104-item` を署名ライブラリとして使う本番用実装。

use ans104_crypto::{b64url_decode, b64url_encode};
use ans104_item::{Bundle, DataItem, Wallet};
use ans104_types::Tag;

use crate::capability::{Bundler, DraftItem, ItemEncoder, SignError, SignedItem, Signer};

/// ウォレットファイル（Arweave JWK または Ed25519鍵ペア）で署名するバックエンド。
#[derive(Debug, Clone, Copy, Default)]
pub struct Ans104Backend;

impl Signer for Ans104Backend {
    fn sign(&self, wallet: &str, draft: &DraftItem) -> Result<SignedItem, SignError> {
        let wallet = Wallet::from_path(wallet).map_err(|e| SignError::Load(e.to_string()))?;
        sign_with(&wallet, draft)
    }
}

impl ItemEncoder for Ans104Backend {
    fn encode_item(&self, item: &SignedItem) -> Result<Vec<u8>, String> {
        Ok(to_data_item(item)?.to_bytes())
    }
}

impl Bundler for Ans104Backend {
    fn bundle(&self, items: &[SignedItem]) -> Result<Vec<u8>, String> {
        let items = items
            .iter()
            .map(to_data_item)
            .collect::<Result<Vec<_>, _>>()?;
        let bundle = Bundle::from_items(&items).map_err(|e| e.to_string())?;
        Ok(bundle.into_bytes())
    }
}

/// 読み込み済みウォレットでDraftItemに署名する。
pub(crate) fn sign_with(wallet: &Wallet, draft: &DraftItem) -> Result<SignedItem, SignError> {
    let tags = draft
        .tags
        .iter()
        .map(|t| ans104_item::Tag::new(t.name.as_str(), t.value.as_str()))
        .collect();
    let item = DataItem::sign(wallet, draft.data.clone(), &draft.target, &draft.anchor, tags)
        .map_err(|e| SignError::Sign(e.to_string()))?;

    tracing::info!(id = %item.id_b64(), owner = %wallet.address(), "Data Itemに署名しました");

    Ok(SignedItem {
        id: item.id_b64(),
        signature: b64url_encode(item.signature()),
        owner: b64url_encode(item.owner()),
        target: draft.target.clone(),
        anchor: draft.anchor.clone(),
        data: item.data().to_vec(),
        tags: item
            .tags()
            .iter()
            .map(|t| Tag {
                name: t.name.clone(),
                value: t.value.clone(),
            })
            .collect(),
    })
}

/// SignedItemを署名ライブラリのDataItemに戻す。
fn to_data_item(item: &SignedItem) -> Result<DataItem, String> {
    let signature = b64url_decode(&item.signature).map_err(|e| format!("signature: {e}"))?;
    let owner = b64url_decode(&item.owner).map_err(|e| format!("owner: {e}"))?;
    let tags = item
        .tags
        .iter()
        .map(|t| ans104_item::Tag::new(t.name.as_str(), t.value.as_str()))
        .collect();
    DataItem::from_parts(
        signature,
        owner,
        &item.target,
        &item.anchor,
        tags,
        item.data.clone(),
    )
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_wallet(wallet: &Wallet) -> tempfile::NamedTempFile {
        let json = serde_json::to_string(&wallet.to_keypair_bytes().unwrap().to_vec()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    const ARWEAVE_WALLET: &str =
        concat!(env!("CARGO_MANIFEST_DIR"), "/../item/testdata/arweave-wallet.json");

    fn test_wallet() -> Wallet {
        Wallet::from_signing_key(ans104_crypto::Ed25519SigningKey::generate(
            &mut rand::rngs::OsRng,
        ))
    }

    fn draft() -> DraftItem {
        DraftItem {
            data: b"hello".to_vec(),
            target: String::new(),
            anchor: String::new(),
            tags: vec![
                Tag { name: "A".into(), value: "1".into() },
                Tag { name: "A".into(), value: "2".into() },
            ],
        }
    }

    #[test]
    fn test_sign_from_wallet_file() {
        let wallet = test_wallet();
        let file = write_wallet(&wallet);

        let signed = Ans104Backend
            .sign(file.path().to_str().unwrap(), &draft())
            .unwrap();
        assert_eq!(signed.owner, b64url_encode(&wallet.owner()));
        assert_eq!(signed.data, b"hello");
        assert_eq!(signed.tags, draft().tags);

        // エンコード結果はライブラリ側で検証可能
        let bytes = Ans104Backend.encode_item(&signed).unwrap();
        let parsed = DataItem::from_bytes(&bytes).unwrap();
        assert!(parsed.verify().is_ok());
        assert_eq!(parsed.id_b64(), signed.id);
    }

    #[test]
    fn test_missing_wallet_is_load_error() {
        let err = Ans104Backend.sign("/nonexistent/w.json", &draft()).unwrap_err();
        assert!(matches!(err, SignError::Load(_)));
    }

    #[test]
    fn test_invalid_anchor_is_sign_error() {
        let wallet = test_wallet();
        let mut d = draft();
        d.anchor = "short".into();
        assert!(matches!(sign_with(&wallet, &d), Err(SignError::Sign(_))));
    }

    #[test]
    fn test_encode_is_idempotent() {
        let wallet = test_wallet();
        let signed = sign_with(&wallet, &draft()).unwrap();
        assert_eq!(
            Ans104Backend.encode_item(&signed).unwrap(),
            Ans104Backend.encode_item(&signed).unwrap()
        );
    }

    #[test]
    fn test_encode_rejects_corrupt_signature() {
        let wallet = test_wallet();
        let mut signed = sign_with(&wallet, &draft()).unwrap();
        signed.signature = "AAAA".into();
        assert!(Ans104Backend.encode_item(&signed).is_err());
    }

    #[test]
    fn test_bundle_contains_item() {
        let wallet = test_wallet();
        let signed = sign_with(&wallet, &draft()).unwrap();
        let bundle = Ans104Backend.bundle(std::slice::from_ref(&signed)).unwrap();

        let entries = Bundle::entries(&bundle).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(b64url_encode(&entries[0].id), signed.id);
        assert!(Ans104Backend.bundle(&[]).is_err());
    }

    #[test]
    fn test_sign_from_arweave_jwk() {
        let signed = Ans104Backend.sign(ARWEAVE_WALLET, &draft()).unwrap();
        assert_eq!(b64url_decode(&signed.owner).unwrap().len(), 512);
        assert_eq!(b64url_decode(&signed.signature).unwrap().len(), 512);

        let bytes = Ans104Backend.encode_item(&signed).unwrap();
        assert_eq!(&bytes[..2], &[1, 0]);
        let parsed = DataItem::from_bytes(&bytes).unwrap();
        assert!(parsed.verify().is_ok());
        assert_eq!(parsed.id_b64(), signed.id);
        assert_eq!(parsed.tags().len(), 2);
    }
}

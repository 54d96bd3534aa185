// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

mod common;

use std::str::FromStr;
use std::sync::Arc;

use relational_wallet_managers::blockchain::tezos::{TezosNetworkService, TezosWalletManager};
use relational_wallet_managers::blockchain::{
    Amount, Blockchain, Fee, TransactionIntent, WalletManager,
};
use relational_wallet_managers::WalletError;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use common::*;

const KEY_ID: &str = "tezos-card";
const PUBLIC_KEY: [u8; 32] = [7u8; 32];
const SOURCE: &str = "tz1eGb6uLp6ftJe3RhpLkYLkxpw2abHXNyTC";
const FORGED: &str = "a1b2c3d4";
const OPERATION_HASH: &str = "ooWDVBH8CuEUZr6zFuc3k5yGTdd2UXiUfQrmH4jwfQ5uqoVXGye";

const CONTRACTS: &str = "/chains/main/blocks/head/context/contracts";
const HEADER: &str = "/chains/main/blocks/head/header";
const FORGE: &str = "/chains/main/blocks/head/helpers/forge/operations";
const PREAPPLY: &str = "/chains/main/blocks/head/helpers/preapply/operations";
const INJECTION: &str = "/injection/operation";

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn account_path() -> String {
    format!("{CONTRACTS}/{SOURCE}")
}

fn manager_key_path() -> String {
    format!("{CONTRACTS}/{SOURCE}/manager_key")
}

fn destination_balance_path() -> String {
    format!("{CONTRACTS}/{TEZOS_DESTINATION}/balance")
}

fn manager(transport: &Arc<FakeTransport>) -> TezosWalletManager {
    let service = TezosNetworkService::new(transport.clone(), TEZOS_RPC_URL, fast_retry(2));
    TezosWalletManager::new(PUBLIC_KEY.to_vec(), KEY_ID, service)
}

fn signer() -> FixedSigner {
    FixedSigner::new(KEY_ID, vec![0x5a; 64])
}

fn transfer(value: &str) -> TransactionIntent {
    TransactionIntent {
        source_address: SOURCE.into(),
        destination_address: TEZOS_DESTINATION.into(),
        amount: Amount::coin(Blockchain::Tezos, dec(value)),
        fee: Fee::new(Amount::coin(Blockchain::Tezos, dec("0.00135"))),
        is_fee_included: false,
        extras: None,
    }
}

fn applied(kinds: &[&str]) -> Value {
    let contents: Vec<Value> = kinds
        .iter()
        .map(|kind| json!({"kind": kind, "metadata": {"operation_result": {"status": "applied"}}}))
        .collect();
    json!([{ "contents": contents }])
}

fn script_send_path(transport: &FakeTransport) {
    transport
        .on(
            HEADER,
            Ok(json!({
                "protocol": "PtParisBxoLz5gzMmn3d9WBQNoPSZakgnkMC2VNuQ3KXfUtUQeZ",
                "hash": "BLockGenesisGenesisGenesisGenesisGenesisf79b5d1CoW2",
                "level": 5_000_000
            })),
        )
        .on(FORGE, Ok(json!(FORGED)))
        .on(INJECTION, Ok(json!(OPERATION_HASH)));
}

/// Update with counter 41, then request a fee with the given reveal state.
async fn prepared_manager(transport: &Arc<FakeTransport>, revealed: bool) -> TezosWalletManager {
    transport
        .on(&account_path(), Ok(json!({"balance": "2500000", "counter": "41"})))
        .on(
            &manager_key_path(),
            Ok(if revealed {
                json!("edpkuBknW28nW72KG6RoHtYW7p12T6GKc7nAbwYX5m8Wd9sDVC9yav")
            } else {
                Value::Null
            }),
        )
        .on(&destination_balance_path(), Ok(json!("1000000")));

    let mut manager = manager(transport);
    manager.update().await.unwrap();
    manager
        .get_fee(&Amount::coin(Blockchain::Tezos, dec("1")), TEZOS_DESTINATION)
        .await
        .unwrap();
    manager
}

#[tokio::test]
async fn update_reads_balance_and_counter() {
    let transport = FakeTransport::new();
    transport.on(&account_path(), Ok(json!({"balance": "2500000", "counter": "41"})));
    let mut manager = manager(&transport);

    assert_eq!(manager.wallet().address, SOURCE);
    manager.update().await.unwrap();

    assert_eq!(manager.wallet().coin_amount().unwrap().value, dec("2.5"));
    assert_eq!(manager.wallet().coin_amount().unwrap().symbol(), "XTZ");
    assert_eq!(manager.counter(), Some(41));
    assert_eq!(manager.public_key_revealed(), None);
}

#[tokio::test]
async fn failed_update_keeps_previous_state() {
    let transport = FakeTransport::new();
    transport.on(&account_path(), Ok(json!({"balance": "2500000", "counter": "41"})));
    let mut manager = manager(&transport);
    manager.update().await.unwrap();
    let updated_at = manager.wallet().updated_at;

    transport.replace(
        &account_path(),
        Err(WalletError::Http {
            status: 400,
            body: "bad request".into(),
        }),
    );
    let err = manager.update().await.unwrap_err();

    assert!(matches!(err, WalletError::Http { status: 400, .. }));
    assert_eq!(manager.counter(), Some(41));
    assert_eq!(manager.wallet().coin_amount().unwrap().value, dec("2.5"));
    assert_eq!(manager.wallet().updated_at, updated_at);
}

#[tokio::test]
async fn update_retries_transient_read_failure() {
    let transport = FakeTransport::new();
    transport
        .on(&account_path(), Err(WalletError::Transport("connection reset".into())))
        .on(&account_path(), Ok(json!({"balance": "2500000", "counter": "41"})));
    let mut manager = manager(&transport);

    manager.update().await.unwrap();

    assert_eq!(transport.calls_to(&account_path()).len(), 2);
    assert_eq!(manager.counter(), Some(41));
    assert_eq!(manager.wallet().coin_amount().unwrap().value, dec("2.5"));
}

#[tokio::test]
async fn fee_for_empty_destination_includes_allocation() {
    let transport = FakeTransport::new();
    transport
        .on(&manager_key_path(), Ok(json!("edpkuBknW28nW72KG6RoHtYW7p12T6GKc7nAbwYX5m8Wd9sDVC9yav")))
        .on(&destination_balance_path(), Ok(json!("0")));
    let mut manager = manager(&transport);

    let fees = manager
        .get_fee(&Amount::coin(Blockchain::Tezos, dec("1")), TEZOS_DESTINATION)
        .await
        .unwrap();

    assert_eq!(fees.len(), 3);
    assert!(fees.iter().all(|f| f.amount.value == dec("0.25835")));
    assert_eq!(manager.public_key_revealed(), Some(true));
}

#[tokio::test]
async fn fee_for_unrevealed_key_includes_reveal() {
    let transport = FakeTransport::new();
    transport
        .on(&manager_key_path(), Ok(Value::Null))
        .on(&destination_balance_path(), Ok(json!("1000000")));
    let mut manager = manager(&transport);

    let fees = manager
        .get_fee(&Amount::coin(Blockchain::Tezos, dec("1")), TEZOS_DESTINATION)
        .await
        .unwrap();

    assert_eq!(fees.len(), 3);
    assert!(fees.iter().all(|f| f.amount.value == dec("0.00265")));
    assert_eq!(manager.public_key_revealed(), Some(false));
}

#[tokio::test]
async fn fee_failure_leaves_reveal_state_unknown() {
    let transport = FakeTransport::new();
    transport
        .on(&manager_key_path(), Ok(Value::Null))
        .on(
            &destination_balance_path(),
            Err(WalletError::Http {
                status: 400,
                body: "bad request".into(),
            }),
        );
    let mut manager = manager(&transport);

    let err = manager
        .get_fee(&Amount::coin(Blockchain::Tezos, dec("1")), TEZOS_DESTINATION)
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::Http { status: 400, .. }));
    assert_eq!(manager.public_key_revealed(), None);
}

#[tokio::test]
async fn send_before_get_fee_makes_no_network_calls() {
    let transport = FakeTransport::new();
    let mut manager = manager(&transport);

    let err = manager.send(&transfer("1"), &signer()).await.unwrap_err();

    assert_eq!(err, WalletError::RevealStatusUnknown);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn send_before_update_fails_on_counter() {
    let transport = FakeTransport::new();
    transport
        .on(&manager_key_path(), Ok(Value::Null))
        .on(&destination_balance_path(), Ok(json!("1000000")));
    let mut manager = manager(&transport);
    manager
        .get_fee(&Amount::coin(Blockchain::Tezos, dec("1")), TEZOS_DESTINATION)
        .await
        .unwrap();
    let calls_after_fee = transport.call_count();

    let err = manager.send(&transfer("1"), &signer()).await.unwrap_err();

    assert_eq!(err, WalletError::CounterUnknown);
    assert_eq!(transport.call_count(), calls_after_fee);
}

#[tokio::test]
async fn send_with_unrevealed_key_prepends_reveal() {
    let transport = FakeTransport::new();
    let mut manager = prepared_manager(&transport, false).await;
    script_send_path(&transport);
    transport.on(PREAPPLY, Ok(applied(&["reveal", "transaction"])));
    let signer = signer();

    let result = manager.send(&transfer("1.5"), &signer).await.unwrap();

    assert_eq!(result.tx_hash, OPERATION_HASH);
    assert_eq!(result.explorer_url, format!("https://tzkt.io/{OPERATION_HASH}"));

    let forge = transport.calls_to(FORGE);
    assert_eq!(forge.len(), 1);
    let body = forge[0].body.as_ref().unwrap();
    assert_eq!(body["branch"], "BLockGenesisGenesisGenesisGenesisGenesisf79b5d1CoW2");
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 2);
    assert_eq!(contents[0]["kind"], "reveal");
    assert_eq!(contents[0]["counter"], "42");
    assert!(contents[0]["public_key"].as_str().unwrap().starts_with("edpk"));
    assert_eq!(contents[1]["kind"], "transaction");
    assert_eq!(contents[1]["counter"], "43");
    assert_eq!(contents[1]["amount"], "1500000");
    assert_eq!(contents[1]["destination"], TEZOS_DESTINATION);

    let preapply = transport.calls_to(PREAPPLY);
    let body = &preapply[0].body.as_ref().unwrap()[0];
    assert_eq!(body["protocol"], "PtParisBxoLz5gzMmn3d9WBQNoPSZakgnkMC2VNuQ3KXfUtUQeZ");
    assert!(body["signature"].as_str().unwrap().starts_with("edsig"));

    let injection = transport.calls_to(INJECTION);
    assert_eq!(injection.len(), 1);
    assert_eq!(
        injection[0].body.as_ref().unwrap(),
        &json!(format!("{FORGED}{}", "5a".repeat(64)))
    );

    let requests = signer.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0][0].len(), 32);

    // The counter is consumed and the key is now revealed.
    assert_eq!(manager.counter(), None);
    assert_eq!(manager.public_key_revealed(), Some(true));
}

#[tokio::test]
async fn send_with_revealed_key_is_single_transaction() {
    let transport = FakeTransport::new();
    let mut manager = prepared_manager(&transport, true).await;
    script_send_path(&transport);
    transport.on(PREAPPLY, Ok(applied(&["transaction"])));

    manager.send(&transfer("1"), &signer()).await.unwrap();

    let forge = transport.calls_to(FORGE);
    let contents = forge[0].body.as_ref().unwrap()["contents"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["kind"], "transaction");
    assert_eq!(contents[0]["counter"], "42");
}

#[tokio::test]
async fn failed_preapply_stops_before_injection() {
    let transport = FakeTransport::new();
    let mut manager = prepared_manager(&transport, true).await;
    script_send_path(&transport);
    transport.on(
        PREAPPLY,
        Ok(json!([{
            "contents": [{
                "kind": "transaction",
                "metadata": {"operation_result": {
                    "status": "failed",
                    "errors": [{"kind": "temporary", "id": "proto.alpha.contract.balance_too_low"}]
                }}
            }]
        }])),
    );

    let err = manager.send(&transfer("2"), &signer()).await.unwrap_err();

    match err {
        WalletError::Rejected(message) => assert!(message.contains("balance_too_low")),
        other => panic!("unexpected error {other:?}"),
    }
    assert!(transport.calls_to(INJECTION).is_empty());
    assert_eq!(manager.counter(), Some(41));
}

#[tokio::test]
async fn included_fee_is_deducted_from_transaction_amount() {
    let transport = FakeTransport::new();
    let mut manager = prepared_manager(&transport, true).await;
    script_send_path(&transport);
    transport.on(PREAPPLY, Ok(applied(&["transaction"])));

    let mut intent = transfer("2.5");
    intent.is_fee_included = true;
    manager.send(&intent, &signer()).await.unwrap();

    let forge = transport.calls_to(FORGE);
    let contents = &forge[0].body.as_ref().unwrap()["contents"];
    assert_eq!(contents[0]["amount"], "2498650");
}

#[tokio::test]
async fn invalid_transfers_are_rejected_before_io() {
    let transport = FakeTransport::new();
    let mut manager = prepared_manager(&transport, true).await;
    let calls_after_fee = transport.call_count();
    let signer = signer();

    // Balance is 2.5 XTZ.
    let err = manager.send(&transfer("2.5"), &signer).await.unwrap_err();
    assert!(matches!(err, WalletError::InsufficientFunds(_)));

    let err = manager.send(&transfer("0"), &signer).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(_)));

    let mut free = transfer("1");
    free.fee = Fee::new(Amount::coin(Blockchain::Tezos, Decimal::ZERO));
    let err = manager.send(&free, &signer).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(_)));

    let mut ether = transfer("1");
    ether.amount = Amount::coin(Blockchain::Ethereum, dec("1"));
    let err = manager.send(&ether, &signer).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(_)));

    let mut ether_fee = transfer("1");
    ether_fee.fee = Fee::new(Amount::coin(Blockchain::Ethereum, dec("0.00135")));
    let err = manager.send(&ether_fee, &signer).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAmount(_)));

    let mut other_source = transfer("1");
    other_source.source_address = TEZOS_DESTINATION.into();
    let err = manager.send(&other_source, &signer).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidAddress(_)));

    assert!(signer.requests.lock().unwrap().is_empty());
    assert_eq!(transport.call_count(), calls_after_fee);
    assert_eq!(manager.counter(), Some(41));
}

#[tokio::test]
async fn send_path_is_not_retried() {
    let transport = FakeTransport::new();
    let mut manager = prepared_manager(&transport, true).await;
    transport.on(HEADER, Err(WalletError::Transport("timed out".into())));

    let err = manager.send(&transfer("1"), &signer()).await.unwrap_err();

    assert!(matches!(err, WalletError::Transport(_)));
    assert_eq!(transport.calls_to(HEADER).len(), 1);
    assert!(transport.calls_to(FORGE).is_empty());
}

#[tokio::test]
async fn tokens_are_not_supported() {
    let transport = FakeTransport::new();
    let mut manager = manager(&transport);

    let token = relational_wallet_managers::blockchain::Token::new("USDT", "KT1XnTn74bUtxHfDtBmm2bGZAQfhPbvKWR8o", 6);
    assert!(matches!(
        manager.add_token(token),
        Err(WalletError::UnsupportedBlockchain(_))
    ));
}

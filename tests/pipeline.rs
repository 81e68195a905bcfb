//! End-to-end invocation tests against a scripted ledger.

use alloy::dyn_abi::DynSolValue;
use alloy::primitives::{TxKind, U256};
use bond_relay::catalog::ISSUE_BOND;
use bond_relay::client::SetupError;
use bond_relay::credentials::MemoryCredentials;
use bond_relay::{ErrorKind, TxStatus};
use futures_util::future::join_all;
use std::time::Duration;

mod common;

use common::address;

#[tokio::test]
async fn test_institution_issues_bond() {
    let ledger = common::ledger();
    ledger.set_nonce(address(common::INSTITUTION_ADDR), 1);
    let relay = common::relay(ledger.clone());
    let sbi = relay.client("sbi").unwrap();

    let receipt = sbi.issue_bond("B1", U256::from(1000)).await.unwrap();
    assert!(receipt.success);
    assert!(receipt.block_number.is_some());

    let sent = ledger.submitted_envelopes();
    assert_eq!(sent.len(), 1);
    let tx = sent[0].as_legacy().unwrap();
    assert_eq!(tx.tx().nonce, 1);
    assert_eq!(tx.tx().chain_id, Some(relay_chain_id()));
    assert_eq!(tx.tx().to, TxKind::Call(address(common::BOND_SERVICE_PROVIDER)));
    assert_eq!(&tx.tx().input[..4], &ISSUE_BOND.selector()[..]);
    assert_eq!(*tx.hash(), receipt.tx_hash);

    let sender = tx
        .signature()
        .recover_address_from_prehash(&tx.signature_hash())
        .unwrap();
    assert_eq!(sender, address(common::INSTITUTION_ADDR));
    assert_eq!(sbi.pending_nonce().await, Some(2));
}

fn relay_chain_id() -> u64 {
    common::test_config().ledger.chain_id
}

#[tokio::test]
async fn test_register_identity_targets_identity_manager() {
    let ledger = common::ledger();
    let relay = common::relay(ledger.clone());
    let eci = relay.client("eci").unwrap();

    eci.register_identity(address(common::BENEFICIARY_ADDR), "Party A", "beneficiary", b"kyc")
        .await
        .unwrap();

    let sent = ledger.submitted_envelopes();
    let tx = sent[0].as_legacy().unwrap();
    assert_eq!(tx.tx().to, TxKind::Call(address(common::IDENTITY_MANAGER)));
    assert_eq!(tx.tx().nonce, 0);
}

#[tokio::test]
async fn test_unauthorized_operation_never_reaches_ledger() {
    let ledger = common::ledger();
    let relay = common::relay(ledger.clone());
    let party = relay.client("party").unwrap();

    let err = party.redeem_bond("B1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotAuthorized);
    assert!(err.tx_hash.is_none());
    assert_eq!(ledger.calls(), 0);

    // The beneficiary's own redemption entry point is allowed.
    party.redeem().await.unwrap();
}

#[tokio::test]
async fn test_timeout_then_receipt_query() {
    let ledger = common::ledger();
    ledger.hold(true);
    let relay = common::relay(ledger.clone());
    let sbi = relay.client("sbi").unwrap();

    let err = sbi
        .invoke_with_deadline(
            "issueBond",
            vec![
                DynSolValue::String("B2".into()),
                DynSolValue::Uint(U256::from(5), 256),
            ],
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SubmissionTimedOut);
    assert!(err.kind().is_retryable());
    let tx_hash = err.tx_hash.expect("timed-out invocation carries its hash");

    assert_eq!(sbi.receipt(tx_hash).await.unwrap(), TxStatus::Pending);

    ledger.hold(false);
    let first = relay.receipt(tx_hash).await.unwrap();
    let second = relay.receipt(tx_hash).await.unwrap();
    assert!(matches!(first, TxStatus::Confirmed(ref r) if r.tx_hash == tx_hash));
    assert_eq!(first, second);
    assert_eq!(ledger.submitted_envelopes().len(), 1);
}

#[tokio::test]
async fn test_revert_is_rejected_with_reason() {
    let ledger = common::ledger();
    ledger.revert_with("bond already issued");
    let relay = common::relay(ledger.clone());
    let sbi = relay.client("sbi").unwrap();

    let err = sbi.issue_bond("B1", U256::from(1)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SubmissionRejected);
    assert!(err.tx_hash.is_some());
    assert!(err.to_string().contains("bond already issued"));
    assert!(!err.kind().is_retryable());
}

#[tokio::test]
async fn test_refused_broadcast_is_rejected() {
    let ledger = common::ledger();
    ledger.refuse_with("insufficient funds for gas");
    let relay = common::relay(ledger.clone());
    let sbi = relay.client("sbi").unwrap();

    let err = sbi.generate_bonds().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SubmissionRejected);
    assert!(err.to_string().contains("insufficient funds"));
    // The nonce was consumed by the attempt.
    assert_eq!(sbi.pending_nonce().await, Some(1));
}

#[tokio::test]
async fn test_schema_mismatch_consumes_no_nonce() {
    let ledger = common::ledger();
    ledger.set_nonce(address(common::INSTITUTION_ADDR), 3);
    let relay = common::relay(ledger.clone());
    let sbi = relay.client("sbi").unwrap();

    let err = sbi
        .invoke("issueBond", vec![DynSolValue::String("B1".into())])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);

    let err = sbi.invoke_str("issueBond", &["B1", "lots"]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    assert_eq!(ledger.calls(), 0);

    sbi.invoke_str("issueBond", &["B1", "1000"]).await.unwrap();
    assert_eq!(ledger.submitted_envelopes()[0].as_legacy().unwrap().tx().nonce, 3);
}

#[tokio::test]
async fn test_wrong_credential_fails_before_nonce() {
    let ledger = common::ledger();
    let credentials = MemoryCredentials::new().with("sbi", common::BENEFICIARY_KEY);
    let relay = common::relay_with(common::test_config(), ledger.clone(), credentials);
    let sbi = relay.client("sbi").unwrap();

    let err = sbi.generate_key_pair().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SigningError);
    assert_eq!(ledger.calls(), 0);
    assert_eq!(sbi.pending_nonce().await, None);
    assert!(!err.to_string().contains(common::BENEFICIARY_KEY));
}

#[tokio::test]
async fn test_missing_credential() {
    let ledger = common::ledger();
    let relay = common::relay_with(common::test_config(), ledger.clone(), MemoryCredentials::new());

    let err = relay.client("eci").unwrap().rti().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SigningError);

    let err = relay
        .client("sbi")
        .unwrap()
        .generate_bonds()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SigningError);
    assert_eq!(ledger.calls(), 0);
}

#[tokio::test]
async fn test_authority_discloses_user_cannot() {
    let ledger = common::ledger();
    let relay = common::relay(ledger.clone());
    let voter = relay.client("voter").unwrap();

    for op in ["rti", "shencBond", "generateKeyPair"] {
        let err = voter.invoke_str(op, &[] as &[&str]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotAuthorized, "{}", op);
    }
    assert_eq!(ledger.calls(), 0);

    let eci = relay.client("eci").unwrap();
    eci.generate_key_pair().await.unwrap();
    eci.shenc_bond("B1", &[0x04; 65]).await.unwrap();
    eci.rti().await.unwrap();
    voter
        .register_identity(address(common::USER_ADDR), "Voter", "user", b"kyc")
        .await
        .unwrap();

    let sent = ledger.submitted_envelopes();
    assert_eq!(sent.len(), 4);
    let eci_nonces: Vec<u64> = sent[..3]
        .iter()
        .map(|tx| tx.as_legacy().unwrap().tx().nonce)
        .collect();
    assert_eq!(eci_nonces, [0, 1, 2]);
}

#[tokio::test]
async fn test_unconfigured_contract_is_misconfigured() {
    let ledger = common::ledger();
    let mut config = common::test_config();
    config.contracts.bond_service_provider = String::new();
    let relay = common::relay_with(config, ledger.clone(), common::test_credentials());

    let err = relay.client("sbi").unwrap().generate_bonds().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Misconfigured);
    assert_eq!(ledger.calls(), 0);
}

#[tokio::test]
async fn test_concurrent_invocations_get_distinct_nonces() {
    let ledger = common::ledger();
    ledger.set_nonce(address(common::INSTITUTION_ADDR), 5);
    let relay = common::relay(ledger.clone());
    let sbi = relay.client("sbi").unwrap();

    let calls = (0..8).map(|i| {
        let sbi = sbi.clone();
        async move { sbi.issue_bond(&format!("B{}", i), U256::from(i)).await }
    });
    for result in join_all(calls).await {
        result.unwrap();
    }

    let mut nonces: Vec<u64> = ledger
        .submitted_envelopes()
        .iter()
        .map(|tx| tx.as_legacy().unwrap().tx().nonce)
        .collect();
    nonces.sort_unstable();
    assert_eq!(nonces, (5..13).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_resync_adopts_ledger_nonce() {
    let ledger = common::ledger();
    let relay = common::relay(ledger.clone());
    let sbi = relay.client("sbi").unwrap();

    sbi.generate_key_pair().await.unwrap();
    assert_eq!(sbi.pending_nonce().await, Some(1));

    ledger.set_nonce(address(common::INSTITUTION_ADDR), 7);
    assert_eq!(sbi.resync().await.unwrap(), 7);
    sbi.generate_key_pair().await.unwrap();
    assert_eq!(ledger.submitted_envelopes()[1].as_legacy().unwrap().tx().nonce, 7);
}

#[test]
fn test_relay_rejects_invalid_config() {
    let mut config = common::test_config();
    config.submission.poll_interval_ms = 0;
    let err = bond_relay::Relay::new(
        &config,
        common::ledger(),
        std::sync::Arc::new(common::test_credentials()),
    )
    .unwrap_err();

    assert!(matches!(err, SetupError::Config(_)));
    assert!(err.to_string().contains("submission.poll_interval_ms"));
}

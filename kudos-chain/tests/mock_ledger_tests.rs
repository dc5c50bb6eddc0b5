use kudos_chain::mock::{token_state, tx_hash, MockLedger};
use kudos_chain::{ChainError, KudosLedger};
use kudos_types::{TokenId, TransferEvent};

fn transfer(token: u64, block: u64, log_index: u64) -> TransferEvent {
    TransferEvent {
        token_id: TokenId::new(token),
        block_number: block,
        log_index,
        tx_hash: tx_hash(block * 10 + log_index),
        from: TransferEvent::ZERO_ADDRESS.to_string(),
        to: "0x00000000000000000000000000000000000000aa".to_string(),
    }
}

#[tokio::test]
async fn mock_reports_supply_and_head() {
    let ledger = MockLedger::with_tokens(5, 1_000);
    assert_eq!(ledger.total_supply().await.unwrap(), 5);
    assert_eq!(ledger.head_block().await.unwrap(), 1_000);
    assert_eq!(ledger.supply_calls(), 1);
    assert_eq!(ledger.head_calls(), 1);
}

#[tokio::test]
async fn mock_token_reads_are_recorded() {
    let ledger = MockLedger::with_tokens(3, 10);
    assert_eq!(ledger.token(TokenId::new(2)).await.unwrap(), token_state(2));
    assert_eq!(ledger.token(TokenId::new(1)).await.unwrap(), token_state(1));
    assert_eq!(ledger.token_calls(), vec![TokenId::new(2), TokenId::new(1)]);
}

#[tokio::test]
async fn mock_unknown_token_reverts() {
    let ledger = MockLedger::with_tokens(1, 10);
    let err = ledger.token(TokenId::new(9)).await.unwrap_err();
    assert!(matches!(err, ChainError::Reverted(_)));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn mock_injected_failures_run_out() {
    let ledger = MockLedger::with_tokens(1, 10);
    ledger.fail_token(1, 2, ChainError::transient("connection reset"));

    assert!(ledger.token(TokenId::new(1)).await.unwrap_err().is_transient());
    assert!(ledger.token(TokenId::new(1)).await.is_err());
    assert!(ledger.token(TokenId::new(1)).await.is_ok());
}

#[tokio::test]
async fn mock_events_filtered_and_ordered() {
    let ledger = MockLedger::with_tokens(3, 100);
    ledger.push_event(transfer(2, 50, 1));
    ledger.push_event(transfer(1, 20, 0));
    ledger.push_event(transfer(3, 50, 0));
    ledger.push_event(transfer(1, 90, 0));

    let events = ledger.transfer_events(20, 60).await.unwrap();
    let positions: Vec<_> = events.iter().map(TransferEvent::ledger_position).collect();
    assert_eq!(positions, vec![(20, 0), (50, 0), (50, 1)]);
}

#[tokio::test]
async fn mock_supply_grows_after_first_fetch() {
    let ledger = MockLedger::with_tokens(2, 10);
    ledger.grow_supply_on_first_fetch(4);

    assert_eq!(ledger.total_supply().await.unwrap(), 2);
    ledger.token(TokenId::new(1)).await.unwrap();
    assert_eq!(ledger.total_supply().await.unwrap(), 4);
    assert!(ledger.token(TokenId::new(4)).await.is_ok());
}

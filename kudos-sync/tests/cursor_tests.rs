use kudos_chain::mock::token_state;
use kudos_chain::BlockTag;
use kudos_store::{SqliteTokenStore, TokenStore};
use kudos_sync::{BlockCursor, IdCursor, SyncError};
use kudos_types::TokenId;

const SCOPE: &str = "localhost:id";

fn store_with(ids: &[u64]) -> SqliteTokenStore {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    for id in ids {
        store.upsert(&token_state(*id), None).unwrap();
    }
    store
}

// ── Block cursors ─────────────────────────────────────────────────

#[test]
fn block_rewind_subtracts_from_head() {
    assert_eq!(BlockCursor::Rewind(100).resolve(1_000).unwrap(), 900);
    assert_eq!(BlockCursor::Rewind(1_000).resolve(1_000).unwrap(), 0);
}

#[test]
fn block_rewind_past_genesis_is_rejected() {
    assert!(matches!(
        BlockCursor::Rewind(1_001).resolve(1_000),
        Err(SyncError::Config(_))
    ));
}

#[test]
fn block_tags_resolve_against_head() {
    assert_eq!(BlockCursor::At(BlockTag::Earliest).resolve(77).unwrap(), 0);
    assert_eq!(BlockCursor::At(BlockTag::Latest).resolve(77).unwrap(), 77);
    assert_eq!(BlockCursor::At(BlockTag::Number(5)).resolve(77).unwrap(), 5);
}

// ── Id cursors ────────────────────────────────────────────────────

#[test]
fn id_rewind_subtracts_from_supply() {
    let store = store_with(&[]);
    assert_eq!(
        IdCursor::Rewind(3).resolve(10, &store, SCOPE).unwrap(),
        TokenId::new(7)
    );
}

#[test]
fn id_rewind_to_zero_or_below_is_rejected() {
    let store = store_with(&[]);
    assert!(matches!(
        IdCursor::Rewind(10).resolve(10, &store, SCOPE),
        Err(SyncError::Config(_))
    ));
    assert!(matches!(
        IdCursor::Rewind(11).resolve(10, &store, SCOPE),
        Err(SyncError::Config(_))
    ));
}

#[test]
fn catch_up_starts_at_max_known_id() {
    let store = store_with(&[1, 2, 9, 4]);
    assert_eq!(
        IdCursor::CatchUp.resolve(20, &store, SCOPE).unwrap(),
        TokenId::new(9)
    );
}

#[test]
fn catch_up_on_empty_store_starts_at_first_id() {
    let store = store_with(&[]);
    assert_eq!(
        IdCursor::CatchUp.resolve(20, &store, SCOPE).unwrap(),
        TokenId::FIRST
    );
}

#[test]
fn resume_starts_after_checkpoint() {
    let store = store_with(&[1, 2, 3, 4, 5]);
    store.save_checkpoint(SCOPE, TokenId::new(3)).unwrap();
    assert_eq!(
        IdCursor::Resume.resolve(20, &store, SCOPE).unwrap(),
        TokenId::new(4)
    );
}

#[test]
fn resume_without_checkpoint_falls_back_to_catch_up() {
    let store = store_with(&[1, 2, 6]);
    store.save_checkpoint("rinkeby:id", TokenId::new(2)).unwrap();
    assert_eq!(
        IdCursor::Resume.resolve(20, &store, SCOPE).unwrap(),
        TokenId::new(6)
    );
}

#[test]
fn explicit_id_is_used_as_is() {
    let store = store_with(&[]);
    assert_eq!(
        IdCursor::At(TokenId::new(42)).resolve(10, &store, SCOPE).unwrap(),
        TokenId::new(42)
    );
}

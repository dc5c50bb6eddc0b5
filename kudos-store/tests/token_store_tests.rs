use kudos_store::{ApplyOutcome, SqliteTokenStore, TokenStore};
use kudos_types::{TokenId, TokenState, TransferRef, TxHash};
use pretty_assertions::assert_eq;

fn state(id: u64, owner: &str) -> TokenState {
    TokenState {
        id: TokenId::new(id),
        owner: owner.to_string(),
        token_uri: format!("https://gitcoin.co/kudos/{id}"),
        price_finney: 5,
        num_clones_allowed: 100,
        num_clones_in_wild: 3,
        cloned_from_id: id,
    }
}

fn transfer(byte: u8, block: u64) -> TransferRef {
    TransferRef {
        tx_hash: TxHash::from_bytes([byte; 32]),
        block_number: Some(block),
        minted: false,
    }
}

// ── Upsert ────────────────────────────────────────────────────────

#[test]
fn upsert_creates_row() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    let outcome = store.upsert(&state(1, "0xaa"), Some(&transfer(1, 10))).unwrap();
    assert_eq!(outcome, ApplyOutcome::Created);

    let record = store.get(TokenId::new(1)).unwrap().unwrap();
    assert_eq!(record.state, state(1, "0xaa"));
    assert_eq!(record.last_block, Some(10));
    assert_eq!(record.last_tx_hash, Some(TxHash::from_bytes([1; 32])));
}

#[test]
fn upsert_same_pair_is_idempotent() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    let s = state(2, "0xaa");
    let t = transfer(7, 20);

    assert_eq!(store.upsert(&s, Some(&t)).unwrap(), ApplyOutcome::Created);
    let after_first = store.get(TokenId::new(2)).unwrap();

    assert_eq!(store.upsert(&s, Some(&t)).unwrap(), ApplyOutcome::Unchanged);
    let after_second = store.get(TokenId::new(2)).unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn upsert_owner_change_updates() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    store.upsert(&state(3, "0xaa"), None).unwrap();
    let outcome = store.upsert(&state(3, "0xbb"), Some(&transfer(2, 30))).unwrap();
    assert_eq!(outcome, ApplyOutcome::Updated);
    assert_eq!(store.get(TokenId::new(3)).unwrap().unwrap().state.owner, "0xbb");
}

#[test]
fn upsert_without_transfer_keeps_cursor() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    store.upsert(&state(4, "0xaa"), Some(&transfer(9, 40))).unwrap();
    let outcome = store.upsert(&state(4, "0xaa"), None).unwrap();
    assert_eq!(outcome, ApplyOutcome::Unchanged);

    let record = store.get(TokenId::new(4)).unwrap().unwrap();
    assert_eq!(record.last_tx_hash, Some(TxHash::from_bytes([9; 32])));
}

#[test]
fn upsert_older_transfer_does_not_rewind_cursor() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    store.upsert(&state(5, "0xaa"), Some(&transfer(2, 200))).unwrap();
    let outcome = store.upsert(&state(5, "0xaa"), Some(&transfer(1, 100))).unwrap();
    assert_eq!(outcome, ApplyOutcome::Unchanged);
    assert_eq!(store.get(TokenId::new(5)).unwrap().unwrap().last_block, Some(200));
}

#[test]
fn upsert_mint_block_persists() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    let mut mint = transfer(1, 11);
    mint.minted = true;
    store.upsert(&state(6, "0xaa"), Some(&mint)).unwrap();
    store.upsert(&state(6, "0xbb"), Some(&transfer(2, 12))).unwrap();

    let record = store.get(TokenId::new(6)).unwrap().unwrap();
    assert_eq!(record.mint_block, Some(11));
    assert_eq!(record.last_block, Some(12));
}

#[test]
fn upsert_rejects_values_beyond_integer_range() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    let mut s = state(7, "0xaa");
    s.price_finney = u64::MAX;
    assert!(store.upsert(&s, None).is_err());
    assert_eq!(store.count().unwrap(), 0);
}

// ── Max known id ──────────────────────────────────────────────────

#[test]
fn max_known_id_empty_store() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    assert_eq!(store.max_known_id().unwrap(), None);
}

#[test]
fn max_known_id_returns_highest() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    for id in [3, 17, 9] {
        store.upsert(&state(id, "0xaa"), None).unwrap();
    }
    assert_eq!(store.max_known_id().unwrap(), Some(TokenId::new(17)));
}

#[test]
fn get_missing_token() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    assert!(store.get(TokenId::new(99)).unwrap().is_none());
}

// ── Checkpoints ───────────────────────────────────────────────────

#[test]
fn checkpoint_roundtrip_per_scope() {
    let store = SqliteTokenStore::open_in_memory().unwrap();
    assert_eq!(store.checkpoint("mainnet:id").unwrap(), None);

    store.save_checkpoint("mainnet:id", TokenId::new(12)).unwrap();
    store.save_checkpoint("mainnet:opensea", TokenId::new(4)).unwrap();
    store.save_checkpoint("mainnet:id", TokenId::new(13)).unwrap();

    assert_eq!(store.checkpoint("mainnet:id").unwrap(), Some(TokenId::new(13)));
    assert_eq!(store.checkpoint("mainnet:opensea").unwrap(), Some(TokenId::new(4)));
}

// ── On-disk persistence ───────────────────────────────────────────

#[test]
fn reopen_file_store_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kudos.sqlite");

    {
        let store = SqliteTokenStore::open(&path).unwrap();
        store.upsert(&state(1, "0xaa"), Some(&transfer(1, 1))).unwrap();
        store.save_checkpoint("rinkeby:id", TokenId::new(1)).unwrap();
    }

    let store = SqliteTokenStore::open(&path).unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.checkpoint("rinkeby:id").unwrap(), Some(TokenId::new(1)));
}

#[test]
fn store_is_usable_as_trait_object() {
    let store: Box<dyn TokenStore> = Box::new(SqliteTokenStore::open_in_memory().unwrap());
    store.upsert(&state(8, "0xaa"), None).unwrap();
    assert_eq!(store.max_known_id().unwrap(), Some(TokenId::new(8)));
}

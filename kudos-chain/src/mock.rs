//! In-memory ledger for tests.

use crate::error::{ChainError, ChainResult};
use crate::KudosLedger;
use async_trait::async_trait;
use kudos_types::{BlockNumber, TokenId, TokenState, TransferEvent, TxHash};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
struct MockState {
    head: BlockNumber,
    supply: u64,
    tokens: BTreeMap<TokenId, TokenState>,
    events: Vec<TransferEvent>,
    /// Remaining injected failures per token id.
    failures: HashMap<TokenId, (usize, ChainError)>,
    hanging: HashSet<TokenId>,
    grow_supply_to: Option<u64>,
    log_window: Option<u64>,
    log_delay: Option<Duration>,
    log_calls: Vec<(BlockNumber, BlockNumber)>,
    /// Remaining injected failures per event query start block.
    log_failures: HashMap<BlockNumber, (usize, ChainError)>,
    token_calls: Vec<TokenId>,
    supply_calls: usize,
    head_calls: usize,
}

/// A scripted [`KudosLedger`] that records the reads made against it.
#[derive(Default)]
pub struct MockLedger {
    state: Mutex<MockState>,
}

/// Deterministic checksummed-looking owner address for a token.
pub fn owner_for(id: u64) -> String {
    format!("0x{id:040x}")
}

/// Deterministic transaction hash for tests.
pub fn tx_hash(seed: u64) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&seed.to_be_bytes());
    TxHash::from_bytes(bytes)
}

/// Default state for token `id`.
pub fn token_state(id: u64) -> TokenState {
    TokenState {
        id: TokenId::new(id),
        owner: owner_for(id),
        token_uri: format!("https://gitcoin.co/dynamic/kudos/{id}"),
        price_finney: 2,
        num_clones_allowed: 100,
        num_clones_in_wild: 0,
        cloned_from_id: id,
    }
}

impl MockLedger {
    /// Creates a ledger with tokens `1..=supply` minted and the given head.
    pub fn with_tokens(supply: u64, head: BlockNumber) -> Self {
        let ledger = Self::default();
        {
            let mut state = ledger.lock();
            state.head = head;
            state.supply = supply;
            for id in 1..=supply {
                state.tokens.insert(TokenId::new(id), token_state(id));
            }
        }
        ledger
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overrides the stored state of a token.
    pub fn set_token(&self, token: TokenState) {
        self.lock().tokens.insert(token.id, token);
    }

    /// Appends a transfer event.
    pub fn push_event(&self, event: TransferEvent) {
        self.lock().events.push(event);
    }

    /// Sets the head block.
    pub fn set_head(&self, head: BlockNumber) {
        self.lock().head = head;
    }

    /// Makes the next `times` reads of `id` fail with `error`.
    pub fn fail_token(&self, id: u64, times: usize, error: ChainError) {
        self.lock().failures.insert(TokenId::new(id), (times, error));
    }

    /// Makes every read of `id` wait forever.
    pub fn hang_on(&self, id: u64) {
        self.lock().hanging.insert(TokenId::new(id));
    }

    /// Mints more tokens as soon as the first token read happens, so a run
    /// that already read the supply sees a stale bound.
    pub fn grow_supply_on_first_fetch(&self, new_supply: u64) {
        self.lock().grow_supply_to = Some(new_supply);
    }

    /// Caps the block span callers should request per event query.
    pub fn set_log_window(&self, blocks: u64) {
        self.lock().log_window = Some(blocks);
    }

    /// Makes every event query take `delay` before answering.
    pub fn delay_logs(&self, delay: Duration) {
        self.lock().log_delay = Some(delay);
    }

    /// Makes the next `times` event queries starting at `from` fail with `error`.
    pub fn fail_logs_from(&self, from: BlockNumber, times: usize, error: ChainError) {
        self.lock().log_failures.insert(from, (times, error));
    }

    /// Block ranges passed to `transfer_events`, in call order.
    pub fn log_calls(&self) -> Vec<(BlockNumber, BlockNumber)> {
        self.lock().log_calls.clone()
    }

    /// Token ids read so far, in call order.
    pub fn token_calls(&self) -> Vec<TokenId> {
        self.lock().token_calls.clone()
    }

    /// Number of `total_supply` reads.
    pub fn supply_calls(&self) -> usize {
        self.lock().supply_calls
    }

    /// Number of `head_block` reads.
    pub fn head_calls(&self) -> usize {
        self.lock().head_calls
    }
}

#[async_trait]
impl KudosLedger for MockLedger {
    async fn head_block(&self) -> ChainResult<BlockNumber> {
        let mut state = self.lock();
        state.head_calls += 1;
        Ok(state.head)
    }

    async fn total_supply(&self) -> ChainResult<u64> {
        let mut state = self.lock();
        state.supply_calls += 1;
        Ok(state.supply)
    }

    fn log_window(&self) -> u64 {
        self.lock().log_window.unwrap_or(BlockNumber::MAX)
    }

    async fn transfer_events(
        &self,
        from: BlockNumber,
        to: BlockNumber,
    ) -> ChainResult<Vec<TransferEvent>> {
        let delay = {
            let mut state = self.lock();
            state.log_calls.push((from, to));
            if let Some((remaining, error)) = state.log_failures.get_mut(&from) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(error.clone());
                }
            }
            state.log_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.lock();
        let mut events: Vec<TransferEvent> = state
            .events
            .iter()
            .filter(|e| e.block_number >= from && e.block_number <= to)
            .cloned()
            .collect();
        events.sort_by_key(TransferEvent::ledger_position);
        Ok(events)
    }

    async fn token(&self, id: TokenId) -> ChainResult<TokenState> {
        let hang = {
            let mut state = self.lock();
            state.token_calls.push(id);

            if let Some(new_supply) = state.grow_supply_to.take() {
                for extra in state.supply + 1..=new_supply {
                    state.tokens.insert(TokenId::new(extra), token_state(extra));
                }
                state.supply = new_supply;
            }

            if let Some((remaining, error)) = state.failures.get_mut(&id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(error.clone());
                }
            }
            state.hanging.contains(&id)
        };

        if hang {
            std::future::pending::<()>().await;
        }

        self.lock()
            .tokens
            .get(&id)
            .cloned()
            .ok_or_else(|| ChainError::Reverted(format!("ownerOf({id}): token does not exist")))
    }
}

//! The miner: pulls valid mempool transactions, assembles a candidate
//! block, and searches the nonce space in parallel for a proof that
//! satisfies [`crate::model::block::TARGET`].
//!
//! Workers are OS threads backed by a [`rayon::ThreadPool`] rather than
//! separate processes (see `DESIGN.md`): each still re-deserializes the
//! frozen candidate chain per batch, mirroring the process-isolation model
//! of independently reconstructing entity state per worker, without the
//! process-spawn cost that buys nothing on a single machine.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::chain::Chain;
use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::model::address::Address;
use crate::model::block::{Block, GENESIS_PREVIOUS_ID};
use crate::model::transaction::Transaction;
use crate::validation::{self, Depth};

/// Largest nonce the protocol allows: `2^63 - 1`.
pub const MAX_NONCE: i64 = i64::MAX;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_millis() as i64
}

/// A parallel proof-of-work miner with a fixed worker count and batch size.
pub struct Miner {
    workers: usize,
    batch_size: i64,
}

impl Miner {
    pub fn new(workers: usize, batch_size: i64) -> Result<Self> {
        if workers == 0 {
            return Err(Error::InvalidArgument("miner worker count must be at least 1".into()));
        }
        if batch_size <= 0 {
            return Err(Error::InvalidArgument("miner batch size must be at least 1".into()));
        }

        Ok(Miner { workers, batch_size })
    }

    /// Assemble and mine a new tip block.
    ///
    /// `mempool` is filtered down to the transactions that validate
    /// against `chain`'s current tip; if `reward_address` is given, a
    /// freshly minted coinbase transaction is prepended. Returns `None`
    /// if the entire nonce space is exhausted without a match.
    pub fn mine(
        &self,
        chain: &Chain,
        mempool: &[Transaction],
        reward_address: Option<Address>,
    ) -> Result<Option<Block>> {
        let mut transactions = Vec::with_capacity(mempool.len() + 1);

        if let Some(address) = reward_address {
            transactions.push(Transaction::new_coinbase(address)?);
        }

        transactions.extend(
            mempool
                .iter()
                .filter(|tx| validation::transaction_validates_against_tip(chain, tx))
                .cloned(),
        );

        let previous_block_id = chain.tip().map(|b| b.id()).unwrap_or(GENESIS_PREVIOUS_ID);
        let candidate = Block::new(previous_block_id, transactions, now_ms())?;

        let mut candidate_chain = chain.clone();
        candidate_chain.push(candidate)?;
        validation::check_transactions(&candidate_chain, Depth::Shallow)?;

        let frozen: Arc<[u8]> = Arc::from(candidate_chain.encode().into_boxed_slice());

        Ok(match self.search(frozen)? {
            Some(nonce) => {
                let mut mined = candidate_chain.blocks().last().unwrap().clone();
                mined.nonce = nonce;
                Some(mined)
            }
            None => None,
        })
    }

    /// Cooperative any-of-pending search: up to `self.workers` batches are
    /// in flight at once; as soon as one reports a nonce, remaining
    /// batches are abandoned (their results, if any, are discarded).
    fn search(&self, frozen: Arc<[u8]>) -> Result<Option<i64>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| Error::Config(format!("failed to start miner thread pool: {e}")))?;

        let (result_tx, result_rx) = mpsc::channel::<Option<i64>>();
        let mut next_start: Option<i64> = Some(0);
        let mut pending = 0usize;

        // Dispatches one batch starting at `start` and returns its
        // inclusive end, so the caller can compute where the next batch
        // should begin. `end_inclusive` is clamped to `MAX_NONCE` itself,
        // not `MAX_NONCE + 1`, so the final batch can still test
        // `i64::MAX` without overflowing the computation.
        let mut dispatch_one = |start: i64, pending: &mut usize| -> i64 {
            let end_inclusive = start.saturating_add(self.batch_size.saturating_sub(1)).min(MAX_NONCE);
            let frozen = Arc::clone(&frozen);
            let tx = result_tx.clone();
            pool.spawn(move || {
                let found = mine_in_range(&frozen, start, end_inclusive);
                let _ = tx.send(found);
            });
            *pending += 1;
            end_inclusive
        };

        // The next batch starts right after the previous one's inclusive
        // end, unless that end was already `MAX_NONCE` — then the nonce
        // space is exhausted and `start + 1` would overflow.
        let advance = |end_inclusive: i64| -> Option<i64> {
            if end_inclusive >= MAX_NONCE {
                None
            } else {
                Some(end_inclusive + 1)
            }
        };

        for _ in 0..self.workers {
            let Some(start) = next_start else { break };
            let end_inclusive = dispatch_one(start, &mut pending);
            next_start = advance(end_inclusive);
        }

        while pending > 0 {
            match result_rx.recv() {
                Ok(Some(nonce)) => return Ok(Some(nonce)),
                Ok(None) => {
                    pending -= 1;
                    if let Some(start) = next_start {
                        let end_inclusive = dispatch_one(start, &mut pending);
                        next_start = advance(end_inclusive);
                    }
                }
                Err(_) => break,
            }
        }

        Ok(None)
    }
}

/// Re-decode the frozen candidate chain and search `[start, end_inclusive]`
/// for a nonce satisfying the proof-of-work target. The bound is
/// inclusive so the last nonce in the space, `i64::MAX`, is reachable
/// without an overflowing increment past it.
fn mine_in_range(frozen: &[u8], start: i64, end_inclusive: i64) -> Option<i64> {
    let (chain, _) = Chain::decode(frozen).expect("frozen candidate chain must decode");
    let mut block = chain.blocks().last().cloned().expect("candidate chain is never empty");

    let mut nonce = start;
    loop {
        block.nonce = nonce;
        if block.check_proof() {
            return Some(nonce);
        }
        if nonce == end_inclusive {
            return None;
        }
        nonce += 1;
    }
}

// 6.1 ledger/core.rs: single source of truth. owns every loan record, the
// append-only per-address indices, the id counter, cumulative stats, and the
// event log. mutation happens only through the prepare/commit pairs in ops.rs.

use super::config::LedgerConfig;
use crate::events::{Event, EventId, EventPayload};
use crate::loan::{ActiveLoan, LoanRequest};
use crate::types::{Address, LoanId, Timestamp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct LoanLedger {
    pub(super) config: LedgerConfig,
    pub(super) requests: HashMap<LoanId, LoanRequest>,
    pub(super) loans: HashMap<LoanId, ActiveLoan>,
    pub(super) borrower_index: HashMap<Address, Vec<LoanId>>,
    pub(super) lender_index: HashMap<Address, Vec<LoanId>>,
    // strictly increasing, never reset. atomic so id assignment does not
    // need a write lock on the store.
    pub(super) next_loan_id: AtomicU64,
    pub(super) total_issued: u64,
    pub(super) total_volume: u128,
    pub(super) events: Vec<Event>,
    pub(super) next_event_id: u64,
    pub(super) current_time: Timestamp,
}

impl LoanLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            requests: HashMap::new(),
            loans: HashMap::new(),
            borrower_index: HashMap::new(),
            lender_index: HashMap::new(),
            next_loan_id: AtomicU64::new(1),
            total_issued: 0,
            total_volume: 0,
            events: Vec::new(),
            next_event_id: 1,
            current_time: Timestamp::from_secs(0),
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn set_time(&mut self, timestamp: Timestamp) {
        self.current_time = timestamp;
    }

    pub fn advance_time(&mut self, secs: i64) {
        self.current_time = self.current_time.plus_secs(secs);
    }

    pub fn time(&self) -> Timestamp {
        self.current_time
    }

    /// Hand out the next loan id. Ids are strictly increasing; an id consumed
    /// by an operation that later fails is skipped, not reused.
    pub fn allocate_loan_id(&self) -> LoanId {
        LoanId(self.next_loan_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(super) fn peek_next_loan_id(&self) -> LoanId {
        LoanId(self.next_loan_id.load(Ordering::SeqCst))
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn recent_events(&self, count: usize) -> &[Event] {
        let start = self.events.len().saturating_sub(count);
        &self.events[start..]
    }

    pub(super) fn emit_event(&mut self, payload: EventPayload) {
        let event = Event::new(EventId(self.next_event_id), self.current_time, payload);
        self.next_event_id += 1;

        if self.config.verbose {
            println!("[event {}] {:?}", event.id.0, event.payload);
        }

        self.events.push(event);

        if self.events.len() > self.config.max_events {
            let drain_count = self.events.len() - self.config.max_events;
            self.events.drain(0..drain_count);
        }
    }
}

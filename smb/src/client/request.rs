use std::collections::{HashMap, HashSet};

use crate::protocol::message::SMBMessage;

/// Message id the server uses for unsolicited notifications.
pub const UNSOLICITED_MESSAGE_ID: u64 = u64::MAX;

/// Hands out message ids and holds responses that arrived for a pending
/// request other than the one being waited on.
#[derive(Debug, Default)]
pub struct SMBRequestTracker {
    next_id: u64,
    pending: HashSet<u64>,
    parked: HashMap<u64, SMBMessage>,
}

impl SMBRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts allocation at `next_id`.
    pub fn starting_at(next_id: u64) -> Self {
        Self { next_id, ..Default::default() }
    }

    /// Reserves a fresh id: the next in sequence, wrapping at 64 bits and
    /// skipping ids still pending and the unsolicited id.
    pub fn allocate(&mut self) -> u64 {
        loop {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            if id != UNSOLICITED_MESSAGE_ID && !self.pending.contains(&id) {
                self.pending.insert(id);
                return id;
            }
        }
    }

    pub fn is_pending(&self, message_id: u64) -> bool {
        self.pending.contains(&message_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Keeps a response for a pending request until it is collected.
    pub fn park(&mut self, message: SMBMessage) {
        self.parked.insert(message.header.message_id, message);
    }

    /// Takes the parked response for `message_id`, completing the request.
    pub fn take_parked(&mut self, message_id: u64) -> Option<SMBMessage> {
        let message = self.parked.remove(&message_id)?;
        self.pending.remove(&message_id);
        Some(message)
    }

    pub fn complete(&mut self, message_id: u64) {
        self.pending.remove(&message_id);
        self.parked.remove(&message_id);
    }

    /// Drops every pending request, for when the session dies.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.parked.clear();
    }
}

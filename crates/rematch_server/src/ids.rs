//! Connection and room identifiers.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle for one live transport connection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display, derive_more::From,
)]
#[display("conn-{_0}")]
pub struct ConnectionId(u64);

/// Hands out connection ids in increasing order.
#[derive(Debug)]
pub struct ConnectionIds {
    next: AtomicU64,
}

impl ConnectionIds {
    /// Creates an allocator starting at 1.
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Allocates the next id.
    pub fn allocate(&self) -> ConnectionId {
        ConnectionId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionIds {
    fn default() -> Self {
        Self::new()
    }
}

const ROOM_ID_LEN: usize = 6;
const ROOM_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short base-36 room identifier shared with clients.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From,
)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Generates a random six-character id.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let id = (0..ROOM_ID_LEN)
            .map(|_| char::from(ROOM_ID_ALPHABET[rng.gen_range(0..ROOM_ID_ALPHABET.len())]))
            .collect();
        Self(id)
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

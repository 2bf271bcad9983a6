//! Rent/return registry for `i32` scratch buffers, keyed by length.
//!
//! A rented buffer is moved out of the pool, so two concurrent renters can
//! never observe the same memory. Contents of a reused buffer are whatever the
//! previous renter left behind: every caller overwrites the whole buffer
//! before reading from it.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use log::trace;
use parking_lot::Mutex;

static SHARED: ScratchPool = ScratchPool::new();

/// The process-wide pool used when no explicit pool is supplied.
pub fn shared() -> &'static ScratchPool {
    &SHARED
}

#[derive(Debug, Default)]
pub struct ScratchPool {
    idle: Mutex<BTreeMap<usize, Vec<Vec<i32>>>>,
    outstanding: AtomicUsize,
}

impl ScratchPool {
    pub const fn new() -> Self {
        Self {
            idle: Mutex::new(BTreeMap::new()),
            outstanding: AtomicUsize::new(0),
        }
    }

    /// Take a buffer of exactly `len` elements. Contents are unspecified.
    pub fn rent(&self, len: usize) -> Scratch<'_> {
        let reused = self.idle.lock().get_mut(&len).and_then(Vec::pop);
        let buf = reused.unwrap_or_else(|| {
            trace!("scratch pool: allocating {len} i32");
            vec![0; len]
        });
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        Scratch {
            pool: self,
            buf: Some(buf),
        }
    }

    fn give_back(&self, buf: Vec<i32>) {
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        self.idle.lock().entry(buf.len()).or_default().push(buf);
    }

    /// Idle buffers of length `len`.
    pub fn idle(&self, len: usize) -> usize {
        self.idle.lock().get(&len).map_or(0, Vec::len)
    }

    /// Idle buffers across all lengths.
    pub fn idle_total(&self) -> usize {
        self.idle.lock().values().map(Vec::len).sum()
    }

    /// Buffers currently rented and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Relaxed)
    }

    /// Ensure at least `count` idle buffers of length `len` exist.
    pub fn prewarm(&self, len: usize, count: usize) {
        let mut idle = self.idle.lock();
        let slot = idle.entry(len).or_default();
        while slot.len() < count {
            slot.push(vec![0; len]);
        }
    }

    /// Drop idle buffers beyond `max_per_len` for every length.
    pub fn trim(&self, max_per_len: usize) {
        let mut idle = self.idle.lock();
        for slot in idle.values_mut() {
            slot.truncate(max_per_len);
        }
        idle.retain(|_, slot| !slot.is_empty());
    }

    /// Drop every idle buffer. Rented buffers are unaffected.
    pub fn clear(&self) {
        self.idle.lock().clear();
    }
}

/// A rented buffer; returns itself to its pool on drop.
#[derive(Debug)]
pub struct Scratch<'a> {
    pool: &'a ScratchPool,
    buf: Option<Vec<i32>>,
}

impl Deref for Scratch<'_> {
    type Target = [i32];

    fn deref(&self) -> &[i32] {
        self.buf.as_deref().unwrap_or_default()
    }
}

impl DerefMut for Scratch<'_> {
    fn deref_mut(&mut self) -> &mut [i32] {
        self.buf.as_deref_mut().unwrap_or_default()
    }
}

impl Drop for Scratch<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.give_back(buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn rent_has_requested_length() {
        let pool = ScratchPool::new();
        assert_eq!(pool.rent(25).len(), 25);
        assert_eq!(pool.rent(0).len(), 0);
    }

    #[test]
    fn returned_buffers_are_reused() {
        let pool = ScratchPool::new();
        {
            let mut a = pool.rent(25);
            a.fill(7);
            assert_eq!(pool.outstanding(), 1);
        }
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.idle(25), 1);
        let b = pool.rent(25);
        // Stale contents are visible; callers must overwrite.
        assert!(b.iter().all(|&v| v == 7));
        assert_eq!(pool.idle(25), 0);
    }

    #[test]
    fn lengths_do_not_mix() {
        let pool = ScratchPool::new();
        drop(pool.rent(25));
        let other = pool.rent(24);
        assert_eq!(other.len(), 24);
        assert_eq!(pool.idle(25), 1);
    }

    #[test]
    fn prewarm_trim_clear() {
        let pool = ScratchPool::new();
        pool.prewarm(25, 4);
        pool.prewarm(9, 2);
        assert_eq!(pool.idle_total(), 6);
        pool.trim(1);
        assert_eq!(pool.idle(25), 1);
        assert_eq!(pool.idle(9), 1);
        pool.trim(0);
        assert_eq!(pool.idle_total(), 0);
        pool.prewarm(25, 3);
        pool.clear();
        assert_eq!(pool.idle_total(), 0);
    }

    #[test]
    fn clear_leaves_rented_buffers_alone() {
        let pool = ScratchPool::new();
        let mut held = pool.rent(25);
        held.fill(3);
        pool.clear();
        assert!(held.iter().all(|&v| v == 3));
        drop(held);
        assert_eq!(pool.idle(25), 1);
    }

    #[test]
    fn concurrent_renters_never_share_a_buffer() {
        let pool = ScratchPool::new();
        (0..2000u32).into_par_iter().for_each(|i| {
            let mut buf = pool.rent(25);
            let canary = i as i32 * 31 + 5;
            for (k, v) in buf.iter_mut().enumerate() {
                *v = canary ^ k as i32;
            }
            std::thread::yield_now();
            for (k, &v) in buf.iter().enumerate() {
                assert_eq!(v, canary ^ k as i32, "iteration {i} saw foreign data at {k}");
            }
        });
        assert_eq!(pool.outstanding(), 0);
        assert!(pool.idle(25) >= 1);
    }
}

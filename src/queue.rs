//! Defines `MpscQueue`, the bounded lock-free queue backing every partition.
//!
//! `MpscQueue` is a fixed-capacity ring of sequenced slots shared by any
//! number of producing threads and exactly one consuming thread. Producers
//! claim a ticket from the `tail` cursor with a CAS loop and publish their
//! slot by bumping its sequence number; the consumer walks the `head` cursor
//! and only reads a slot once its sequence shows the write completed. A full
//! queue refuses the item immediately instead of blocking, handing it back to
//! the caller.

use crate::cursor::Cursor;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU64, Ordering};

/// One ring slot: the value storage plus the sequence number encoding the
/// slot's state.
///
/// For a producer ticket `pos` mapping to this slot:
/// - `sequence == pos` means the slot is empty and reserved for that ticket,
/// - `sequence == pos + 1` means the slot is full and readable at head `pos`,
/// - `sequence == pos + capacity` means ticket `pos` was consumed and the
///   slot now belongs to ticket `pos + capacity`.
struct Slot<T> {
    sequence: AtomicU64,
    value: UnsafeCell<MaybeUninit<T>>,
}

/// A bounded, lock-free, multi-producer single-consumer FIFO queue.
///
/// # Safety
///
/// The slot array uses `UnsafeCell` interior mutability; all access is
/// coordinated through the per-slot sequence numbers and the two cursors:
///
/// 1. **Single writer per ticket**: a producer only writes a slot after
///    winning the `tail` CAS for that ticket, so at most one thread ever
///    writes a given slot between two sequence bumps.
/// 2. **Read-write pairing**: the producer's release store on `sequence`
///    pairs with the consumer's acquire load, so the consumer never observes
///    a partially written value.
/// 3. **Single consumer**: only one thread may call [`dequeue`](Self::dequeue)
///    at a time. `head` is written with relaxed ordering on that assumption.
///    Inside the crate this is upheld by partition assignment: each queue is
///    read by exactly one `Consumer`, whose polling takes `&mut self`.
pub(crate) struct MpscQueue<T> {
    slots: Box<[Slot<T>]>,

    /// `capacity - 1`, for mapping tickets to slot indices.
    index_mask: u64,

    /// Consumer cursor: the next ticket to dequeue.
    head: Cursor,

    /// Producer cursor: the next ticket to claim.
    tail: Cursor,
}

// SAFETY: values of type `T` only move across threads by value (in through
// `enqueue`, out through `dequeue`), and the sequence protocol above prevents
// concurrent access to any one slot. `T: Send` is therefore sufficient for
// both sharing the queue and moving it between threads.
unsafe impl<T: Send> Send for MpscQueue<T> {}
unsafe impl<T: Send> Sync for MpscQueue<T> {}

impl<T> MpscQueue<T> {
    /// Creates a queue holding up to `capacity` items.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is less than 2 or not a power of two.
    pub(crate) fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "capacity must be at least 2");
        assert!(capacity.is_power_of_two(), "capacity must be a power of 2");

        // Slot i starts out reserved for producer ticket i.
        let slots = (0..capacity as u64)
            .map(|i| Slot {
                sequence: AtomicU64::new(i),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            index_mask: capacity as u64 - 1,
            head: Cursor::new(0),
            tail: Cursor::new(0),
        }
    }

    /// Returns the total capacity of the queue.
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Attempts to enqueue `item`, returning it back in `Err` when the queue
    /// is full.
    ///
    /// Safe to call from any number of threads concurrently. A full queue is
    /// reported immediately; producers never wait on each other, though the
    /// claim loop may retry under contention.
    pub(crate) fn enqueue(&self, item: T) -> Result<(), T> {
        let mut pos = self.tail.relaxed();
        loop {
            let slot = &self.slots[(pos & self.index_mask) as usize];
            let seq = slot.sequence.load(Ordering::Acquire);
            let diff = seq.wrapping_sub(pos) as i64;

            if diff == 0 {
                // Slot is reserved for ticket `pos`; claim it via the tail.
                match self.tail.claim(pos) {
                    Ok(_) => {
                        // SAFETY: winning the claim gives this thread
                        // exclusive write access to the slot until the
                        // sequence bump below publishes it.
                        unsafe {
                            (*slot.value.get()).write(item);
                        }
                        slot.sequence
                            .store(pos.wrapping_add(1), Ordering::Release);
                        return Ok(());
                    }
                    // Lost the race (or the weak exchange failed spuriously);
                    // retry from the value the CAS observed.
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                // Sequence lags the ticket: the slot still holds an
                // unconsumed item a full lap behind us.
                return Err(item);
            } else {
                // Another producer already filled this ticket; refresh.
                pos = self.tail.relaxed();
            }
        }
    }

    /// Dequeues the next item, or `None` when the queue is empty.
    ///
    /// Must only be called by the queue's single consumer; see the type-level
    /// safety notes.
    pub(crate) fn dequeue(&self) -> Option<T> {
        let pos = self.head.relaxed();
        let slot = &self.slots[(pos & self.index_mask) as usize];

        if slot.sequence.load(Ordering::Acquire) != pos.wrapping_add(1) {
            return None;
        }

        // SAFETY: the sequence check above proves the producer's write for
        // ticket `pos` completed, and this is the only thread reading slots.
        // The value is moved out exactly once; the sequence bump below hands
        // the slot to producer ticket `pos + capacity`.
        let value = unsafe { (*slot.value.get()).assume_init_read() };

        slot.sequence.store(
            pos.wrapping_add(self.slots.len() as u64),
            Ordering::Release,
        );
        self.head.store_relaxed(pos.wrapping_add(1));

        Some(value)
    }
}

impl<T> Drop for MpscQueue<T> {
    fn drop(&mut self) {
        // Items still in flight own real payloads; move them out so they drop.
        while self.dequeue().is_some() {}
    }
}

impl<T> fmt::Debug for MpscQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MpscQueue")
            .field("capacity", &self.capacity())
            .field("head", &self.head.relaxed())
            .field("tail", &self.tail.relaxed())
            .finish_non_exhaustive()
    }
}

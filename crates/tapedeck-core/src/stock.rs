//! Chunk stock: tape storage allocated off the audio thread.
//!
//! The medium only ever takes ready-made chunks out of an SPSC ring. A
//! [`ChunkFeeder`] owns the producing end and allocates replacements from a
//! non-real-time context, either on demand via [`ChunkFeeder::top_up`] or on
//! its own thread via [`ChunkFeeder::spawn`].

use crate::lockfree::AtomicFlag;
use crate::medium::{new_chunk, Chunk};
use crate::TapeConfig;
use ringbuf::traits::{Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Consuming end of the chunk ring, owned by the medium.
pub type ChunkConsumer = HeapCons<Chunk>;

/// Producing end of the chunk ring with the bookkeeping needed to stop once
/// every tape slot could be backed.
pub struct ChunkFeeder {
    producer: HeapProd<Chunk>,
    supplied: usize,
    limit: usize,
}

/// Create the chunk ring for `config`, pre-filled with
/// `config.preallocated_chunks` chunks.
pub fn chunk_stock(config: &TapeConfig) -> (ChunkFeeder, ChunkConsumer) {
    let ring = HeapRb::<Chunk>::new(config.chunk_stock.max(config.preallocated_chunks));
    let (producer, consumer) = ring.split();

    let mut feeder = ChunkFeeder {
        producer,
        supplied: 0,
        limit: config.chunk_slots(),
    };
    feeder.supply(config.preallocated_chunks);

    (feeder, consumer)
}

impl ChunkFeeder {
    /// Refill the ring. Returns how many chunks were allocated.
    pub fn top_up(&mut self) -> usize {
        let added = self.supply(usize::MAX);
        if added > 0 {
            tracing::debug!(
                added,
                supplied = self.supplied,
                limit = self.limit,
                "Topped up tape chunk stock"
            );
        }
        added
    }

    /// Chunks allocated so far, including ones already consumed by the medium.
    pub fn supplied(&self) -> usize {
        self.supplied
    }

    /// Chunks waiting in the ring.
    pub fn available(&self) -> usize {
        self.producer.occupied_len()
    }

    /// True once enough chunks have been handed out to back the whole tape.
    pub fn is_complete(&self) -> bool {
        self.supplied >= self.limit
    }

    fn supply(&mut self, max: usize) -> usize {
        let mut added = 0;
        while added < max && !self.is_complete() && !self.producer.is_full() {
            if self.producer.try_push(new_chunk()).is_err() {
                break;
            }
            self.supplied += 1;
            added += 1;
        }
        added
    }

    /// Keep the ring topped up from a dedicated thread.
    pub fn spawn(self, interval: Duration) -> std::io::Result<FeederThread> {
        let stop = Arc::new(AtomicFlag::new(false));
        let thread_stop = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("tapedeck-feeder".into())
            .spawn(move || {
                let mut feeder = self;
                tracing::debug!("Chunk feeder started");
                while !thread_stop.get() {
                    feeder.top_up();
                    if feeder.is_complete() {
                        tracing::debug!(supplied = feeder.supplied, "Chunk stock complete");
                        break;
                    }
                    thread::park_timeout(interval);
                }
                tracing::debug!("Chunk feeder stopped");
                feeder
            })?;

        Ok(FeederThread {
            stop,
            handle: Some(handle),
        })
    }
}

/// Handle to a running feeder thread. Stops and joins on drop.
pub struct FeederThread {
    stop: Arc<AtomicFlag>,
    handle: Option<JoinHandle<ChunkFeeder>>,
}

impl FeederThread {
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the thread and hand the feeder back.
    pub fn stop(mut self) -> Option<ChunkFeeder> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<ChunkFeeder> {
        self.stop.set(true);
        let handle = self.handle.take()?;
        handle.thread().unpark();
        match handle.join() {
            Ok(feeder) => Some(feeder),
            Err(_) => {
                tracing::warn!("Chunk feeder thread panicked");
                None
            }
        }
    }
}

impl Drop for FeederThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

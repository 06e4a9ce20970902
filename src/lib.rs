//! Batch reconciliation of crime and weather time series with MapReduce.
//!
//! Raw crime incidents are tallied per date into a fixed eight-category
//! vector, raw station-hour weather observations are averaged per date,
//! and the two are joined by date and optionally rolled up into 7-day
//! windows. Every stage is a map function per input dataset plus a reducer,
//! run by the local engine in [`standalone::engine`].

use bytes::Bytes;
use std::hash::Hasher;

pub mod classify;
pub mod codec;
pub mod date;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod standalone;
pub mod utils;
pub mod workload;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// The output of an application map function.
///
/// There are 2 layers of [`anyhow::Result`]s here. The outer layer
/// accounts for errors that arise while creating the iterator.
/// The inner layer accounts for errors that occur during iteration.
///
/// This accomodates both batch (all keys emitted at once) and lazy
/// (keys only emitted when the iterator is consumed) map operations.
pub type MapOutput = anyhow::Result<Box<dyn Iterator<Item = anyhow::Result<KeyValue>>>>;

/// A map function takes a key-value pair and auxiliary arguments.
///
/// It returns an iterator that yields new key-value pairs.
pub type MapFn = fn(kv: KeyValue, aux: Bytes) -> MapOutput;

/// A reduce function takes in a key, an iterator over values for that key,
/// and an auxiliary argument. It returns an [`anyhow::Result`]
/// containing a single output value.
pub type ReduceFn = fn(
    key: Bytes,
    values: Box<dyn Iterator<Item = Bytes> + '_>,
    aux: Bytes,
) -> anyhow::Result<Bytes>;

/// A reducer that carries state from one key to the next.
///
/// One session is created per reduce partition and sees that partition's
/// keys in ascending order.
pub trait ReduceSession {
    fn reduce(
        &mut self,
        key: Bytes,
        values: Box<dyn Iterator<Item = Bytes> + '_>,
    ) -> anyhow::Result<Bytes>;
}

/// Creates a [`ReduceSession`] from the auxiliary arguments.
pub type SessionFn = fn(aux: Bytes) -> anyhow::Result<Box<dyn ReduceSession>>;

/// The reduce side of a [`Workload`].
#[derive(Copy, Clone)]
pub enum Reducer {
    /// Called independently for every key; safe to spread over partitions.
    Stateless(ReduceFn),
    /// Stateful across keys; the engine runs it in a single partition.
    Session(SessionFn),
}

/// A map reduce application.
///
/// `map_fns` holds one map function per input dataset, matched positionally
/// against the inputs of a job.
#[derive(Copy, Clone)]
pub struct Workload {
    pub map_fns: &'static [MapFn],
    pub reducer: Reducer,
}

impl Workload {
    /// The number of reduce partitions to use when `requested` were asked for.
    pub fn partitions(&self, requested: u32) -> u32 {
        match self.reducer {
            Reducer::Stateless(_) => requested.max(1),
            Reducer::Session(_) => 1,
        }
    }
}

/////////////////////////////////////////////////////////////////////////////
// Key-value pairs
/////////////////////////////////////////////////////////////////////////////

/// A single key-value pair.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct KeyValue {
    /// The key.
    pub key: Bytes,
    /// The value.
    pub value: Bytes,
}

impl KeyValue {
    /// Construct a new key-value pair from the given key and value.
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }

    /// Get the key of this key-value pair.
    ///
    /// This method is cheap, since [`Bytes`] are cheaply cloneable.
    #[inline]
    pub fn key(&self) -> Bytes {
        self.key.clone()
    }

    /// Consumes the key-value pair and returns the value.
    #[inline]
    pub fn into_value(self) -> Bytes {
        self.value
    }
}

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::with_key(0);
    hasher.write(key);
    // masked to 31 bits, always fits
    (hasher.finish() & 0x7fff_ffff) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_reduce(
        _key: Bytes,
        _values: Box<dyn Iterator<Item = Bytes> + '_>,
        _aux: Bytes,
    ) -> anyhow::Result<Bytes> {
        Ok(Bytes::new())
    }

    fn noop_session(_aux: Bytes) -> anyhow::Result<Box<dyn ReduceSession>> {
        anyhow::bail!("unused")
    }

    #[test]
    fn key_value_parts() {
        let kv = KeyValue::new(Bytes::from("2018-01-02"), Bytes::from("1"));
        assert_eq!(kv.key(), Bytes::from("2018-01-02"));
        assert_eq!(kv.into_value(), Bytes::from("1"));
    }

    #[test]
    fn ihash_is_stable_and_positive() {
        assert_eq!(ihash(b"2018-01-02"), ihash(b"2018-01-02"));
        assert!(ihash(b"2018-01-02") <= 0x7fff_ffff);
    }

    #[test]
    fn session_reducers_are_pinned_to_one_partition() {
        let stateless = Workload {
            map_fns: &[],
            reducer: Reducer::Stateless(noop_reduce),
        };
        let session = Workload {
            map_fns: &[],
            reducer: Reducer::Session(noop_session),
        };
        assert_eq!(stateless.partitions(11), 11);
        assert_eq!(stateless.partitions(0), 1);
        assert_eq!(session.partitions(11), 1);
    }
}

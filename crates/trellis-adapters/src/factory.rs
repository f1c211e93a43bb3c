use crate::adapter::ElementAdapter;
use crate::context::FrameContext;
use crate::key::{AdapterKind, RecyclerKey};
use crate::params::AdapterParameters;
use crate::pool::RecyclerPool;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use trellis_core::model::Element;
use trellis_core::{Result, TrellisConfig};

/// What a factory needs from the adapters it pools.
pub trait Recyclable: Send + 'static {
    fn pool_key(&self) -> Option<&RecyclerKey>;
    /// Puts the adapter into its released state before it is pooled.
    fn prepare_for_pool(&mut self, params: &AdapterParameters);
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub gets: usize,
    pub creations: usize,
    pub recycled: usize,
    pub releases: usize,
    pub discarded: usize,
    pub pooled: usize,
}

#[derive(Debug, Default)]
struct Counters {
    gets: AtomicUsize,
    creations: AtomicUsize,
    recycled: AtomicUsize,
    releases: AtomicUsize,
    discarded: AtomicUsize,
}

/// Supplies adapters of one kind, reusing released ones with an equal key.
/// The pool is host-scoped and may be hit by concurrent frames, so every
/// pool operation takes the lock.
pub struct AdapterFactory<A> {
    kind: AdapterKind,
    pool: Mutex<RecyclerPool<A>>,
    counters: Counters,
}

impl<A> std::fmt::Debug for AdapterFactory<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterFactory")
            .field("kind", &self.kind)
            .field("pooled", &self.pool.lock().len())
            .finish()
    }
}

impl<A: Recyclable> AdapterFactory<A> {
    pub fn new(kind: AdapterKind, config: &TrellisConfig) -> Self {
        AdapterFactory {
            kind,
            pool: Mutex::new(RecyclerPool::new(
                config.pool_capacity_per_key,
                config.max_pool_keys,
            )),
            counters: Counters::default(),
        }
    }

    pub fn kind(&self) -> AdapterKind {
        self.kind
    }

    /// Pops a pooled adapter for `key` or builds one with `make`. Never
    /// creates or binds; that is up to the caller.
    pub fn get_with(&self, key: &RecyclerKey, make: impl FnOnce() -> A) -> A {
        self.counters.gets.fetch_add(1, Ordering::Relaxed);
        let pooled = self.pool.lock().pop(key);
        match pooled {
            Some(adapter) => {
                self.counters.recycled.fetch_add(1, Ordering::Relaxed);
                log::debug!("{:?}: recycled adapter for {key:?}", self.kind);
                adapter
            }
            None => {
                self.counters.creations.fetch_add(1, Ordering::Relaxed);
                make()
            }
        }
    }

    pub fn release(&self, mut adapter: A, params: &AdapterParameters) {
        self.counters.releases.fetch_add(1, Ordering::Relaxed);
        adapter.prepare_for_pool(params);
        let Some(key) = adapter.pool_key().cloned() else {
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
            return;
        };
        let rejected = self.pool.lock().push(key, adapter);
        if rejected.is_err() {
            self.counters.discarded.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn purge(&self) {
        let mut pool = self.pool.lock();
        if !pool.is_empty() {
            log::debug!("{:?}: purging {} pooled adapters", self.kind, pool.len());
        }
        pool.clear();
    }

    pub fn pooled(&self) -> usize {
        self.pool.lock().len()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            gets: self.counters.gets.load(Ordering::Relaxed),
            creations: self.counters.creations.load(Ordering::Relaxed),
            recycled: self.counters.recycled.load(Ordering::Relaxed),
            releases: self.counters.releases.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
            pooled: self.pooled(),
        }
    }
}

impl<A: ElementAdapter + Recyclable> AdapterFactory<A> {
    /// Adapter for `element`, keyed by the kind's recycler key.
    pub fn get(
        &self,
        element: &Element,
        ctx: &FrameContext,
        params: &AdapterParameters,
    ) -> Result<A> {
        let model = A::model_from_element(element)?;
        let key = A::recycler_key(model, element, ctx, params);
        Ok(self.get_with(&key, || A::new_adapter(params)))
    }
}

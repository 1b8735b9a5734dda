/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use fixedbitset::FixedBitSet;
use rand::Rng;
use thiserror::Error;

/// A backend that can be stored in a [`WeightedDirectory`].
pub trait DirectoryBackend: Send + Sync {
    fn is_healthy(&self) -> bool;
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("backend already present")]
    Duplicate,
    #[error("weight should be a finite non-negative number")]
    InvalidWeight,
    #[error("out of memory while growing the directory")]
    Capacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSummary {
    pub any_healthy: bool,
    /// The health view differs from the one seen by the previous recompute.
    pub changed: bool,
}

struct DirectoryInner<B> {
    backends: Vec<Arc<B>>,
    weights: Vec<f64>,
    healthy: FixedBitSet,
    total_weight: f64,
    /// Bitmap as of the last `recompute_health` call.
    observed: FixedBitSet,
    membership_changed: bool,
}

impl<B> DirectoryInner<B> {
    fn position(&self, backend: &Arc<B>) -> Option<usize> {
        self.backends.iter().position(|b| Arc::ptr_eq(b, backend))
    }

    fn update_total_weight(&mut self) {
        self.total_weight = self.healthy.ones().map(|i| self.weights[i]).sum();
    }

    fn is_eligible(&self, i: usize, excluding: Option<&Arc<B>>) -> bool {
        if !self.healthy.contains(i) {
            return false;
        }
        match excluding {
            Some(e) => !Arc::ptr_eq(&self.backends[i], e),
            None => true,
        }
    }

    fn weight_excluding(&self, excluding: Option<&Arc<B>>) -> f64 {
        self.healthy
            .ones()
            .filter(|i| self.is_eligible(*i, excluding))
            .map(|i| self.weights[i])
            .sum()
    }

    fn reserve(&mut self, additional: usize) -> Result<(), DirectoryError> {
        self.backends
            .try_reserve(additional)
            .map_err(|_| DirectoryError::Capacity)?;
        self.weights
            .try_reserve(additional)
            .map_err(|_| DirectoryError::Capacity)
    }

    fn push(&mut self, backend: Arc<B>, weight: f64, healthy: bool) {
        let id = self.backends.len();
        self.backends.push(backend);
        self.weights.push(weight);
        self.healthy.grow(id + 1);
        self.healthy.set(id, healthy);
    }

    /// Drop every slot matching `remove`, keeping the order of the others.
    fn remove_where<F>(&mut self, remove: F) -> usize
    where
        F: Fn(&Arc<B>) -> bool,
    {
        let old_len = self.backends.len();
        let mut healthy = FixedBitSet::with_capacity(old_len);
        let mut kept = 0;
        for i in 0..old_len {
            if remove(&self.backends[i]) {
                continue;
            }
            healthy.set(kept, self.healthy.contains(i));
            self.backends.swap(kept, i);
            self.weights.swap(kept, i);
            kept += 1;
        }

        let removed = old_len - kept;
        if removed > 0 {
            self.backends.truncate(kept);
            self.weights.truncate(kept);
            self.healthy = healthy;
        }
        removed
    }
}

fn check_weight(weight: f64) -> Result<(), DirectoryError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(())
    } else {
        Err(DirectoryError::InvalidWeight)
    }
}

/// A health aware set of weighted backends.
///
/// Pickers take the read side of a single lock, all updates take the write
/// side. The directory only holds `Arc` clones, so the owner of a backend
/// should remove it from here before dropping its own handle.
///
/// `total_weight` always equals the sum of the weights of healthy entries.
pub struct WeightedDirectory<B> {
    inner: RwLock<DirectoryInner<B>>,
    rr_id: AtomicUsize,
}

impl<B> Default for WeightedDirectory<B> {
    fn default() -> Self {
        WeightedDirectory {
            inner: RwLock::new(DirectoryInner {
                backends: Vec::new(),
                weights: Vec::new(),
                healthy: FixedBitSet::new(),
                total_weight: 0.0,
                observed: FixedBitSet::new(),
                membership_changed: false,
            }),
            rr_id: AtomicUsize::new(0),
        }
    }
}

impl<B: DirectoryBackend> WeightedDirectory<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_backend(&self, backend: Arc<B>, weight: f64) -> Result<(), DirectoryError> {
        check_weight(weight)?;
        let healthy = backend.is_healthy();

        let mut inner = self.inner.write().unwrap();
        if inner.position(&backend).is_some() {
            return Err(DirectoryError::Duplicate);
        }
        inner.reserve(1)?;
        inner.push(backend, weight, healthy);
        inner.membership_changed = true;
        inner.update_total_weight();
        Ok(())
    }

    /// Remove all slots holding `backend` and return how many were removed.
    pub fn remove_backend(&self, backend: &Arc<B>) -> usize {
        let mut inner = self.inner.write().unwrap();
        let removed = inner.remove_where(|b| Arc::ptr_eq(b, backend));
        if removed > 0 {
            inner.membership_changed = true;
            inner.update_total_weight();
        }
        removed
    }

    /// Apply a batch of removals followed by additions under one write lock.
    ///
    /// Pickers see either the state before the batch or the state after it.
    /// On error nothing is changed. Returns the number of removed slots.
    pub fn update(
        &self,
        remove: &[Arc<B>],
        add: Vec<(Arc<B>, f64)>,
    ) -> Result<usize, DirectoryError> {
        for (_, weight) in &add {
            check_weight(*weight)?;
        }
        let health: Vec<bool> = add.iter().map(|(b, _)| b.is_healthy()).collect();
        let is_removed = |b: &Arc<B>| remove.iter().any(|r| Arc::ptr_eq(r, b));

        let mut inner = self.inner.write().unwrap();
        for (i, (backend, _)) in add.iter().enumerate() {
            let present = inner.position(backend).is_some() && !is_removed(backend);
            if present || add[..i].iter().any(|(o, _)| Arc::ptr_eq(o, backend)) {
                return Err(DirectoryError::Duplicate);
            }
        }
        inner.reserve(add.len())?;

        let removed = inner.remove_where(is_removed);
        let added = add.len();
        for ((backend, weight), healthy) in add.into_iter().zip(health) {
            inner.push(backend, weight, healthy);
        }
        if removed > 0 || added > 0 {
            inner.membership_changed = true;
            inner.update_total_weight();
        }
        Ok(removed)
    }

    /// Query the health of every backend once and rebuild the health view.
    pub fn recompute_health(&self) -> HealthSummary {
        let mut inner = self.inner.write().unwrap();
        let mut healthy = FixedBitSet::with_capacity(inner.backends.len());
        for (i, backend) in inner.backends.iter().enumerate() {
            healthy.set(i, backend.is_healthy());
        }

        let changed = inner.membership_changed || healthy != inner.observed;
        inner.healthy = healthy;
        inner.observed = inner.healthy.clone();
        inner.membership_changed = false;
        inner.update_total_weight();

        HealthSummary {
            any_healthy: !inner.healthy.is_clear(),
            changed,
        }
    }

    /// Weighted selection by cumulative weight over the healthy entries.
    ///
    /// `w` should be in `[0, total_weight_excluding(excluding))`. A value past
    /// the end selects the last eligible entry.
    pub fn pick_by_weight(&self, excluding: Option<&Arc<B>>, w: f64) -> Option<Arc<B>> {
        let inner = self.inner.read().unwrap();
        let mut last = None;
        let mut cumulative = 0.0;
        for i in inner.healthy.ones() {
            if !inner.is_eligible(i, excluding) {
                continue;
            }
            cumulative += inner.weights[i];
            if w < cumulative {
                return Some(Arc::clone(&inner.backends[i]));
            }
            last = Some(i);
        }
        last.map(|i| Arc::clone(&inner.backends[i]))
    }

    /// The healthy entry at `index_hint` modulo the healthy count.
    pub fn pick_by_index(&self, index_hint: usize) -> Option<Arc<B>> {
        let inner = self.inner.read().unwrap();
        let count = inner.healthy.count_ones(..);
        if count == 0 {
            return None;
        }
        inner
            .healthy
            .ones()
            .nth(index_hint % count)
            .map(|i| Arc::clone(&inner.backends[i]))
    }

    pub fn pick_random(&self, excluding: Option<&Arc<B>>) -> Option<Arc<B>> {
        let total = self.total_weight_excluding(excluding);
        let w = if total > 0.0 {
            rand::rng().random_range(0.0..total)
        } else {
            0.0
        };
        self.pick_by_weight(excluding, w)
    }

    pub fn pick_round_robin(&self) -> Option<Arc<B>> {
        let id = self.rr_id.fetch_add(1, Ordering::Relaxed);
        self.pick_by_index(id)
    }

    pub fn total_weight(&self) -> f64 {
        self.inner.read().unwrap().total_weight
    }

    pub fn total_weight_excluding(&self, excluding: Option<&Arc<B>>) -> f64 {
        let inner = self.inner.read().unwrap();
        match excluding {
            Some(_) => inner.weight_excluding(excluding),
            None => inner.total_weight,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn healthy_count(&self) -> usize {
        self.inner.read().unwrap().healthy.count_ones(..)
    }

    pub fn contains(&self, backend: &Arc<B>) -> bool {
        self.inner.read().unwrap().position(backend).is_some()
    }

    /// Copy out `(backend, weight, healthy)` for every slot, in order.
    pub fn snapshot(&self) -> Vec<(Arc<B>, f64, bool)> {
        let inner = self.inner.read().unwrap();
        inner
            .backends
            .iter()
            .zip(inner.weights.iter())
            .enumerate()
            .map(|(i, (b, w))| (Arc::clone(b), *w, inner.healthy.contains(i)))
            .collect()
    }
}

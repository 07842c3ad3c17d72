// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Orbit closure under the elementary transformations.
//!
//! The orbit of a matrix is everything reachable from it by repeated
//! `conditional_add_col` / `conditional_add_row` steps, taken up to
//! isomorphism: each reachable matrix is identified by its canonical key.
//!
//! Two ways to use an orbit walk:
//!
//! - **Population** ([`OrbitEngine::populate`]): the first candidate of an
//!   orbit is emitted and every canonical key of its orbit is recorded in a
//!   shared [`ShardedKeySet`], so later members of the same orbit are
//!   absorbed without a walk.
//! - **Minimality** ([`OrbitEngine::is_orbit_minimum`]): the walk uses a
//!   private visited set and accepts the candidate only if no key in its
//!   orbit is smaller than its own canonical key. Decisions are
//!   independent of input order, so candidates can be tested in parallel.
//!
//! For a fully walked orbit, [`Emission::orbit_minimum`] of the population
//! walk equals the canonical key of every candidate the minimality test
//! accepts.
//!
//! The worklist holds the transformed matrices as produced, not their
//! canonical forms; canonical keys are only used for identity and order.

pub mod frontier;
pub mod neighbors;

pub use frontier::OrbitFrontier;
pub use neighbors::{for_each_neighbor, try_for_each_neighbor};

use crate::canon::{CanonicalOracle, RefinementOracle};
use crate::keyset::{FlatKeySet, ShardedKeySet};
use crate::pack::PackedKey;
use std::ops::ControlFlow;
use tracing::{trace, warn};

/// A visited set grown beyond this many slots is released rather than
/// cleared between walks.
const VISITED_RETAIN_CAPACITY: usize = 1 << 16;

/// Bounds on a single orbit walk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OrbitLimits {
    /// Give up on a walk that needs to queue more than this many
    /// matrices, the seed included. `None` walks every orbit to exhaustion.
    pub max_frontier: Option<usize>,
}

impl OrbitLimits {
    pub fn unbounded() -> Self {
        OrbitLimits { max_frontier: None }
    }

    pub fn with_max_frontier(max_frontier: usize) -> Self {
        OrbitLimits {
            max_frontier: Some(max_frontier),
        }
    }

    /// True when no further matrix may be queued.
    #[inline]
    fn full(&self, frontier: &OrbitFrontier) -> bool {
        self.max_frontier.is_some_and(|max| frontier.total() >= max)
    }
}

/// Why a minimality walk stopped early.
enum Stop {
    Smaller(PackedKey),
    Full,
}

/// A new representative found by [`OrbitEngine::populate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Emission {
    /// The candidate as given.
    pub candidate: PackedKey,
    /// Canonical key of the candidate.
    pub canonical: PackedKey,
    /// Smallest canonical key recorded by this walk.
    pub orbit_minimum: PackedKey,
    /// Canonical keys recorded by this walk, the candidate's included.
    pub orbit_size: usize,
    /// False if the walk stopped at [`OrbitLimits::max_frontier`]. A
    /// complete walk never queued more than the limit.
    pub complete: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Population {
    /// The candidate's orbit was already recorded.
    Absorbed,
    Emitted(Emission),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Minimality {
    /// No key in the orbit is below the candidate's canonical key.
    Minimal {
        canonical: PackedKey,
        orbit_size: usize,
    },
    /// The walk reached a strictly smaller canonical key.
    NotMinimal { smaller: PackedKey },
    /// The walk stopped at the frontier limit without finding a smaller key.
    Undecided { explored: usize },
}

impl Minimality {
    pub fn is_minimal(&self) -> bool {
        matches!(self, Minimality::Minimal { .. })
    }
}

/// Per-thread orbit walker: a canonical oracle plus reusable worklist and
/// visited set.
pub struct OrbitEngine<O: CanonicalOracle = RefinementOracle> {
    oracle: O,
    frontier: OrbitFrontier,
    visited: FlatKeySet<PackedKey>,
    limits: OrbitLimits,
}

impl Default for OrbitEngine<RefinementOracle> {
    fn default() -> Self {
        OrbitEngine::new(RefinementOracle::new())
    }
}

impl<O: CanonicalOracle> OrbitEngine<O> {
    pub fn new(oracle: O) -> Self {
        Self::with_limits(oracle, OrbitLimits::unbounded())
    }

    pub fn with_limits(oracle: O, limits: OrbitLimits) -> Self {
        OrbitEngine {
            oracle,
            frontier: OrbitFrontier::new(),
            visited: FlatKeySet::new(),
            limits,
        }
    }

    pub fn limits(&self) -> OrbitLimits {
        self.limits
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    /// Emit `candidate` if its orbit is new to `global`, recording the
    /// whole orbit there.
    ///
    /// Exactly one of any number of concurrent calls with the same
    /// canonical key emits; the others are absorbed.
    pub fn populate(&mut self, global: &ShardedKeySet, candidate: PackedKey) -> Population {
        let Self {
            oracle,
            frontier,
            limits,
            ..
        } = self;
        let matrix = candidate.unpack();
        let canonical = oracle.canonical_key(&matrix);
        if global.lookup(&canonical) || !global.insert_if_absent(canonical) {
            trace!("[Populate] absorbed {}", candidate);
            return Population::Absorbed;
        }

        frontier.reset();
        frontier.push(matrix);
        let mut orbit_minimum = canonical;
        let mut orbit_size = 1;
        let mut complete = true;
        while let Some(current) = frontier.pop_front() {
            let flow = try_for_each_neighbor(&current, |next| {
                let key = oracle.canonical_key(&next);
                if !global.insert_if_absent(key) {
                    return ControlFlow::Continue(());
                }
                orbit_minimum = orbit_minimum.min(key);
                orbit_size += 1;
                if limits.full(frontier) {
                    return ControlFlow::Break(());
                }
                frontier.push(next);
                ControlFlow::Continue(())
            });
            if flow.is_break() {
                complete = false;
                break;
            }
        }
        if !complete {
            warn!(
                "[Populate] orbit of {} truncated after {} keys",
                candidate, orbit_size
            );
        }
        trace!(
            "[Populate] emitted {} with orbit of {} keys",
            candidate,
            orbit_size
        );
        Population::Emitted(Emission {
            candidate,
            canonical,
            orbit_minimum,
            orbit_size,
            complete,
        })
    }

    /// Decide whether the canonical key of `candidate` is the smallest in
    /// its orbit.
    pub fn is_orbit_minimum(&mut self, candidate: PackedKey) -> Minimality {
        let Self {
            oracle,
            frontier,
            visited,
            limits,
        } = self;
        let matrix = candidate.unpack();
        let seed = oracle.canonical_key(&matrix);

        if visited.capacity() > VISITED_RETAIN_CAPACITY {
            *visited = FlatKeySet::new();
        } else {
            visited.clear();
        }
        visited.insert_if_absent(seed);
        frontier.reset();
        frontier.push(matrix);

        while let Some(current) = frontier.pop_front() {
            let flow = try_for_each_neighbor(&current, |next| {
                let key = oracle.canonical_key(&next);
                if key < seed {
                    return ControlFlow::Break(Stop::Smaller(key));
                }
                if visited.insert_if_absent(key) {
                    if limits.full(frontier) {
                        return ControlFlow::Break(Stop::Full);
                    }
                    frontier.push(next);
                }
                ControlFlow::Continue(())
            });
            match flow {
                ControlFlow::Continue(()) => {}
                ControlFlow::Break(Stop::Smaller(smaller)) => {
                    return Minimality::NotMinimal { smaller };
                }
                ControlFlow::Break(Stop::Full) => {
                    warn!(
                        "[Minimal] walk from {} undecided after {} keys",
                        candidate,
                        visited.len()
                    );
                    return Minimality::Undecided {
                        explored: visited.len(),
                    };
                }
            }
        }
        Minimality::Minimal {
            canonical: seed,
            orbit_size: visited.len(),
        }
    }
}

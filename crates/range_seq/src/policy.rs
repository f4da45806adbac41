//! Policy (monoid + lazy action) for the rank-indexed sequence.
//!
//! The tree code never does tag arithmetic itself; it goes through one of
//! these policies. `agg_merge` folds a subtree aggregate out of the left
//! aggregate, the node's own key, and the right aggregate; `act_*` describe
//! how a pending range action composes and lands on keys and aggregates.

/// A monoid over `Key` with a lazy action `Act`.
///
/// Because the container supports range reversal, `agg_merge` must be
/// invariant under reversing the key order (minimum and sum both are).
/// `key_unit()` is a key that is neutral in `agg_merge`; the two boundary
/// sentinels hold it so they can never surface in a fold.
pub trait LazyMapMonoid {
    type Key: Copy;
    type Agg: Copy;
    type Act: Copy;

    /// Neutral key that contributes nothing to the aggregate.
    fn key_unit() -> Self::Key;

    fn agg_unit() -> Self::Agg;
    fn agg_from_key(key: &Self::Key) -> Self::Agg;

    /// Merge aggregates as `left + [key] + right`.
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg;

    fn act_unit() -> Self::Act;

    /// Compose actions as `new ∘ old` (apply `old` first, then `new`).
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act;

    fn act_apply_key(key: &Self::Key, act: &Self::Act) -> Self::Key;

    /// Apply `act` to an aggregate of length `len` (number of affected keys).
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg;
}

/// Range minimum under range add. The policy the container was built for.
#[derive(Clone, Copy, Debug)]
pub enum RangeMinRangeAdd {}

impl LazyMapMonoid for RangeMinRangeAdd {
    type Key = i64;
    type Agg = i64;
    type Act = i64;

    #[inline(always)]
    fn key_unit() -> Self::Key {
        i64::MAX
    }

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        i64::MAX
    }

    #[inline(always)]
    fn agg_from_key(key: &Self::Key) -> Self::Agg {
        *key
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg {
        (*left).min(*key).min(*right)
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {
        0
    }

    #[inline(always)]
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act {
        new.wrapping_add(*old)
    }

    #[inline(always)]
    fn act_apply_key(key: &Self::Key, act: &Self::Act) -> Self::Key {
        key.wrapping_add(*act)
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg {
        if len == 0 {
            *agg
        } else {
            agg.wrapping_add(*act)
        }
    }
}

/// Range sum under range add. Used to cross-check the lazy plumbing with a
/// second algebra.
#[derive(Clone, Copy, Debug)]
pub enum RangeSumRangeAdd {}

impl LazyMapMonoid for RangeSumRangeAdd {
    type Key = i64;
    type Agg = i64;
    type Act = i64;

    #[inline(always)]
    fn key_unit() -> Self::Key {
        0
    }

    #[inline(always)]
    fn agg_unit() -> Self::Agg {
        0
    }

    #[inline(always)]
    fn agg_from_key(key: &Self::Key) -> Self::Agg {
        *key
    }

    #[inline(always)]
    fn agg_merge(left: &Self::Agg, key: &Self::Key, right: &Self::Agg) -> Self::Agg {
        left.wrapping_add(*key).wrapping_add(*right)
    }

    #[inline(always)]
    fn act_unit() -> Self::Act {
        0
    }

    #[inline(always)]
    fn act_compose(new: &Self::Act, old: &Self::Act) -> Self::Act {
        new.wrapping_add(*old)
    }

    #[inline(always)]
    fn act_apply_key(key: &Self::Key, act: &Self::Act) -> Self::Key {
        key.wrapping_add(*act)
    }

    #[inline(always)]
    fn act_apply_agg(agg: &Self::Agg, act: &Self::Act, len: usize) -> Self::Agg {
        agg.wrapping_add(act.wrapping_mul(len as i64))
    }
}

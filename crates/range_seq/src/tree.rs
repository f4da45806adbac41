use slab::Slab;
use thiserror::Error;

use crate::policy::{LazyMapMonoid, RangeMinRangeAdd};

#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Id(u32);

impl Id {
    const NIL: Self = Self(u32::MAX);

    #[inline(always)]
    fn is_nil(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline(always)]
    fn idx(self) -> usize {
        self.0 as usize
    }
}

#[inline(always)]
fn id(v: usize) -> Id {
    debug_assert!(v < u32::MAX as usize);
    Id(v as u32)
}

#[derive(Debug)]
struct Node<P: LazyMapMonoid> {
    ch: [Id; 2],
    p: Id,
    rev: bool,
    sentinel: bool,

    key: P::Key,
    agg: P::Agg,
    sz: u32,

    lazy: P::Act,
    lazy_pending: bool,
}

// Not derived: derives would bound `P` itself, but every field is already
// `Copy` through the trait's `Key`/`Agg`/`Act` bounds.
impl<P: LazyMapMonoid> Clone for Node<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: LazyMapMonoid> Copy for Node<P> {}

impl<P: LazyMapMonoid> Node<P> {
    fn new(key: P::Key) -> Self {
        let agg = P::agg_from_key(&key);
        Self {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            rev: false,
            sentinel: false,
            key,
            agg,
            sz: 1,
            lazy: P::act_unit(),
            lazy_pending: false,
        }
    }

    fn boundary() -> Self {
        Self {
            ch: [Id::NIL, Id::NIL],
            p: Id::NIL,
            rev: false,
            sentinel: true,
            key: P::key_unit(),
            agg: P::agg_unit(),
            sz: 1,
            lazy: P::act_unit(),
            lazy_pending: false,
        }
    }
}

/// Precondition failure of a positional operation. Checked before any splay,
/// so a rejected call never mutates the tree.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SeqError {
    /// Positional access against a sequence with no elements.
    #[error("sequence is empty")]
    Empty,
    /// `lo..=hi` is not a valid 1-based range for a sequence of length `len`.
    #[error("invalid range {lo}..={hi} for length {len}")]
    InvalidRange { lo: usize, hi: usize, len: usize },
}

/// Rank-indexed sequence over a bottom-up splay tree.
///
/// Positions are 1-based and inclusive on both ends. Two permanent sentinel
/// nodes sit at in-order ranks `0` and `len + 1`, so every range `lo..=hi`
/// can be isolated by splaying the node before `lo` to the root and the node
/// after `hi` just below it; the range is then exactly the latter's left
/// subtree.
///
/// Nodes live in a slab and refer to each other by index, parent links
/// included. All operations are amortized `O(log n)`; access is
/// single-threaded by design.
pub struct SplaySeq<P: LazyMapMonoid = RangeMinRangeAdd> {
    nodes: Slab<Node<P>>,
    root: Id,
    len: usize,
}

impl<P: LazyMapMonoid> SplaySeq<P> {
    /// Builds the sequence from `values`, balanced from the start.
    pub fn new(values: &[P::Key]) -> Self {
        let mut seq = Self {
            nodes: Slab::with_capacity(values.len() + 2),
            root: Id::NIL,
            len: values.len(),
        };
        let mut order = Vec::with_capacity(values.len() + 2);
        order.push(seq.alloc(Node::boundary()));
        for &v in values {
            order.push(seq.alloc(Node::new(v)));
        }
        order.push(seq.alloc(Node::boundary()));
        seq.root = seq.build_balanced(&order, Id::NIL);
        seq
    }

    /// Number of elements, sentinels excluded.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn alloc(&mut self, node: Node<P>) -> Id {
        let k = self.nodes.insert(node);
        debug_assert!(k < u32::MAX as usize);
        id(k)
    }

    fn build_balanced(&mut self, order: &[Id], parent: Id) -> Id {
        if order.is_empty() {
            return Id::NIL;
        }
        let mid = order.len() / 2;
        let x = order[mid];
        let l = self.build_balanced(&order[..mid], x);
        let r = self.build_balanced(&order[mid + 1..], x);
        let nx = self.node_mut(x);
        nx.p = parent;
        nx.ch = [l, r];
        self.pull(x);
        x
    }

    #[inline(always)]
    fn node(&self, x: Id) -> &Node<P> {
        debug_assert!(!x.is_nil());
        &self.nodes[x.idx()]
    }

    #[inline(always)]
    fn node_mut(&mut self, x: Id) -> &mut Node<P> {
        debug_assert!(!x.is_nil());
        &mut self.nodes[x.idx()]
    }

    #[inline(always)]
    fn sz(&self, x: Id) -> u32 {
        if x.is_nil() { 0 } else { self.node(x).sz }
    }

    #[inline(always)]
    fn agg(&self, x: Id) -> P::Agg {
        if x.is_nil() {
            P::agg_unit()
        } else {
            self.node(x).agg
        }
    }

    /// Marks `x`'s subtree as mirrored. Nothing moves until `x` is next
    /// pushed.
    fn apply_rev(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        self.node_mut(x).rev ^= true;
    }

    /// Folds `act` into `x`: the key and aggregate absorb it immediately,
    /// the composed remainder stays pending for the children.
    fn apply_act(&mut self, x: Id, act: P::Act) {
        if x.is_nil() {
            return;
        }
        let nx = self.node_mut(x);
        debug_assert!(!nx.sentinel);
        let len = nx.sz as usize;
        nx.key = P::act_apply_key(&nx.key, &act);
        nx.agg = P::act_apply_agg(&nx.agg, &act, len);
        if nx.lazy_pending {
            nx.lazy = P::act_compose(&act, &nx.lazy);
        } else {
            nx.lazy = act;
            nx.lazy_pending = true;
        }
    }

    /// Distributes `x`'s pending tags to its children and clears them on
    /// `x`. Reversal goes first: swap `x`'s own child pair, toggle each
    /// child. Each tag is cleared right after distribution so it can never
    /// land twice.
    fn push(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let (rev, lazy_pending, lazy) = {
            let nx = self.node(x);
            (nx.rev, nx.lazy_pending, nx.lazy)
        };

        if rev {
            let nx = self.node_mut(x);
            nx.ch.swap(0, 1);
            nx.rev = false;
            let [l, r] = nx.ch;
            self.apply_rev(l);
            self.apply_rev(r);
        }

        if lazy_pending {
            let [l, r] = self.node(x).ch;
            self.apply_act(l, lazy);
            self.apply_act(r, lazy);
            let nx = self.node_mut(x);
            nx.lazy = P::act_unit();
            nx.lazy_pending = false;
        }
    }

    /// Recomputes `x`'s size and aggregate from its children. Children's
    /// cached aggregates must be current.
    fn pull(&mut self, x: Id) {
        if x.is_nil() {
            return;
        }
        let (l, r, key) = {
            let nx = self.node(x);
            (nx.ch[0], nx.ch[1], nx.key)
        };
        let sz = 1 + self.sz(l) + self.sz(r);
        let agg = P::agg_merge(&self.agg(l), &key, &self.agg(r));
        let nx = self.node_mut(x);
        nx.sz = sz;
        nx.agg = agg;
    }

    /// Single rotation promoting `x` one level. `x`, its parent, and its
    /// grandparent must already be pushed. Pulls the demoted parent first,
    /// then `x`.
    fn rotate(&mut self, x: Id) {
        let p = self.node(x).p;
        debug_assert!(!p.is_nil());
        let g = self.node(p).p;
        let dir = usize::from(self.node(p).ch[1] == x);
        let b = self.node(x).ch[dir ^ 1];

        if g.is_nil() {
            self.root = x;
        } else {
            let ng = self.node_mut(g);
            if ng.ch[0] == p {
                ng.ch[0] = x;
            } else {
                ng.ch[1] = x;
            }
        }
        self.node_mut(x).p = g;

        self.node_mut(x).ch[dir ^ 1] = p;
        self.node_mut(p).p = x;

        self.node_mut(p).ch[dir] = b;
        if !b.is_nil() {
            self.node_mut(b).p = p;
        }

        self.pull(p);
        self.pull(x);
    }

    /// Rotates `x` up until its parent is `goal` (`NIL` splays to the
    /// root). Iterative; each step pushes grandparent, parent, and `x`
    /// top-down before inspecting shape, and takes the zig-zig double
    /// rotation when `x`, parent, and grandparent turn the same way.
    fn splay(&mut self, x: Id, goal: Id) {
        debug_assert!(x != goal);
        while self.node(x).p != goal {
            let p = self.node(x).p;
            let g = self.node(p).p;
            self.push(g);
            self.push(p);
            self.push(x);
            if g == goal {
                self.rotate(x);
            } else if (self.node(g).ch[0] == p) == (self.node(p).ch[0] == x) {
                self.rotate(p);
                self.rotate(x);
            } else {
                self.rotate(x);
                self.rotate(x);
            }
        }
    }

    /// Node at in-order index `idx`, sentinels included (head sentinel at
    /// `0`, element `i` at `i`, tail sentinel at `len + 1`). Pushes every
    /// node on the way down so the size comparison always sees settled
    /// children. Callers splay the returned node immediately.
    fn locate(&mut self, mut idx: usize) -> Id {
        debug_assert!(idx < self.len + 2);
        let mut x = self.root;
        loop {
            self.push(x);
            let l = self.node(x).ch[0];
            let lsz = self.sz(l) as usize;
            if idx < lsz {
                x = l;
            } else if idx == lsz {
                return x;
            } else {
                idx -= lsz + 1;
                x = self.node(x).ch[1];
            }
        }
    }

    /// Splays the node before `lo` to the root and the node after `hi` just
    /// below it; returns the root of the isolated range `lo..=hi`.
    fn isolate(&mut self, lo: usize, hi: usize) -> Id {
        let left = self.locate(lo - 1);
        self.splay(left, Id::NIL);
        let right = self.locate(hi + 1);
        self.splay(right, left);
        self.node(right).ch[0]
    }

    fn check_range(&self, lo: usize, hi: usize) -> Result<(), SeqError> {
        if self.len == 0 {
            return Err(SeqError::Empty);
        }
        if lo == 0 || lo > hi || hi > self.len {
            return Err(SeqError::InvalidRange {
                lo,
                hi,
                len: self.len,
            });
        }
        Ok(())
    }

    fn check_pos(&self, pos: usize) -> Result<(), SeqError> {
        if self.len == 0 {
            return Err(SeqError::Empty);
        }
        if pos == 0 || pos > self.len {
            return Err(SeqError::InvalidRange {
                lo: pos,
                hi: pos,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Applies `act` to every element of `lo..=hi`.
    pub fn range_apply(&mut self, lo: usize, hi: usize, act: P::Act) -> Result<(), SeqError> {
        self.check_range(lo, hi)?;
        let mid = self.isolate(lo, hi);
        self.apply_act(mid, act);
        let right = self.node(mid).p;
        let left = self.node(right).p;
        self.pull(right);
        self.pull(left);
        Ok(())
    }

    /// Reverses `lo..=hi` in place. Only a tag flip on the isolated range
    /// root; the mirroring happens lazily on later descents.
    pub fn range_reverse(&mut self, lo: usize, hi: usize) -> Result<(), SeqError> {
        self.check_range(lo, hi)?;
        let mid = self.isolate(lo, hi);
        self.apply_rev(mid);
        let right = self.node(mid).p;
        let left = self.node(right).p;
        self.pull(right);
        self.pull(left);
        Ok(())
    }

    /// Cyclically rotates `lo..=hi` right by `amount` positions. `amount`
    /// is taken modulo the range length, so negative values rotate left; a
    /// multiple of the length is a no-op. Built from three reversals.
    pub fn range_rotate_right(
        &mut self,
        lo: usize,
        hi: usize,
        amount: i64,
    ) -> Result<(), SeqError> {
        self.check_range(lo, hi)?;
        let range_len = (hi - lo + 1) as i64;
        let shift = amount.rem_euclid(range_len) as usize;
        debug_assert!(shift < range_len as usize);
        if shift == 0 {
            return Ok(());
        }
        self.range_reverse(lo, hi)?;
        self.range_reverse(lo, lo + shift - 1)?;
        self.range_reverse(lo + shift, hi)?;
        Ok(())
    }

    /// Inserts `key` immediately after position `pos` (`0` inserts at the
    /// front).
    pub fn insert_after(&mut self, pos: usize, key: P::Key) -> Result<(), SeqError> {
        if pos > self.len {
            return Err(SeqError::InvalidRange {
                lo: pos,
                hi: pos,
                len: self.len,
            });
        }
        let left = self.locate(pos);
        self.splay(left, Id::NIL);
        let right = self.locate(pos + 1);
        self.splay(right, left);
        debug_assert!(self.node(right).ch[0].is_nil());

        let x = self.alloc(Node::new(key));
        self.node_mut(x).p = right;
        self.node_mut(right).ch[0] = x;
        self.pull(right);
        self.pull(left);
        self.len += 1;
        Ok(())
    }

    /// Removes the element at `pos` and returns its key. The isolated node
    /// is a leaf by construction, so exactly one slab slot is released.
    pub fn delete_at(&mut self, pos: usize) -> Result<P::Key, SeqError> {
        self.check_pos(pos)?;
        let left = self.locate(pos - 1);
        self.splay(left, Id::NIL);
        let right = self.locate(pos + 1);
        self.splay(right, left);
        let target = self.node(right).ch[0];
        debug_assert_eq!(self.sz(target), 1);

        self.node_mut(right).ch[0] = Id::NIL;
        let removed = self.nodes.remove(target.idx());
        self.pull(right);
        self.pull(left);
        self.len -= 1;
        Ok(removed.key)
    }

    /// Aggregate over `lo..=hi`. A pure read: the isolated range root's
    /// cached aggregate is already current.
    pub fn range_fold(&mut self, lo: usize, hi: usize) -> Result<P::Agg, SeqError> {
        self.check_range(lo, hi)?;
        let mid = self.isolate(lo, hi);
        Ok(self.node(mid).agg)
    }

    /// Current key at `pos`.
    pub fn get(&mut self, pos: usize) -> Result<P::Key, SeqError> {
        self.check_pos(pos)?;
        let x = self.locate(pos);
        self.splay(x, Id::NIL);
        Ok(self.node(x).key)
    }

    /// In-order keys, sentinels excluded. Resolves pending tags on the way;
    /// iterative, so pathological tree shapes cannot overflow the stack.
    pub fn to_vec(&mut self) -> Vec<P::Key> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut x = self.root;
        loop {
            while !x.is_nil() {
                self.push(x);
                stack.push(x);
                x = self.node(x).ch[0];
            }
            let Some(y) = stack.pop() else {
                break;
            };
            let ny = self.node(y);
            if !ny.sentinel {
                out.push(ny.key);
            }
            x = ny.ch[1];
        }
        out
    }
}

impl SplaySeq<RangeMinRangeAdd> {
    /// Adds `delta` to every element of `lo..=hi`.
    pub fn range_add(&mut self, lo: usize, hi: usize, delta: i64) -> Result<(), SeqError> {
        self.range_apply(lo, hi, delta)
    }

    /// Minimum over `lo..=hi`.
    pub fn range_min(&mut self, lo: usize, hi: usize) -> Result<i64, SeqError> {
        self.range_fold(lo, hi)
    }
}

impl<P: LazyMapMonoid> Clone for SplaySeq<P> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
        }
    }
}

impl<P: LazyMapMonoid> Default for SplaySeq<P> {
    fn default() -> Self {
        Self::new(&[])
    }
}

#[cfg(test)]
impl<P: LazyMapMonoid> SplaySeq<P>
where
    P::Agg: PartialEq + std::fmt::Debug,
{
    /// Settles every pending tag, then checks parent links, cached sizes,
    /// aggregates, and sentinel placement over the whole tree.
    fn is_valid(&mut self) {
        let mut stack = vec![self.root];
        while let Some(x) = stack.pop() {
            if x.is_nil() {
                continue;
            }
            self.push(x);
            let nx = self.node(x);
            stack.push(nx.ch[0]);
            stack.push(nx.ch[1]);
        }
        let (sz, _) = self.verify(self.root, Id::NIL);
        assert_eq!(sz as usize, self.len + 2);
        assert_eq!(self.nodes.len(), self.len + 2);

        let mut in_order = Vec::new();
        let mut stack = Vec::new();
        let mut x = self.root;
        loop {
            while !x.is_nil() {
                stack.push(x);
                x = self.node(x).ch[0];
            }
            let Some(y) = stack.pop() else {
                break;
            };
            in_order.push(self.node(y).sentinel);
            x = self.node(y).ch[1];
        }
        assert!(in_order[0] && in_order[in_order.len() - 1]);
        assert!(!in_order[1..in_order.len() - 1].iter().any(|&s| s));
    }

    fn verify(&self, x: Id, parent: Id) -> (u32, P::Agg) {
        if x.is_nil() {
            return (0, P::agg_unit());
        }
        let nx = self.node(x);
        assert_eq!(nx.p, parent);
        assert!(!nx.rev);
        assert!(!nx.lazy_pending);
        let (lsz, lagg) = self.verify(nx.ch[0], x);
        let (rsz, ragg) = self.verify(nx.ch[1], x);
        assert_eq!(nx.sz, 1 + lsz + rsz);
        assert_eq!(nx.agg, P::agg_merge(&lagg, &nx.key, &ragg));
        (nx.sz, nx.agg)
    }
}

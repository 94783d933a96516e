// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Ownership wrappers around opaque GPU object handles.
//!
//! Backends hand out plain integer identifiers ([`RawHandle`]). The wrappers in
//! this module tie such an identifier to the object that created it and destroy
//! it exactly once:
//!
//! - [`UniqueHandle`] has exactly one owner and destroys on drop or [`UniqueHandle::reset`].
//! - [`SharedHandle`] is reference counted; the last owner to go away destroys.
//!
//! The destroy primitive is chosen by the [`HandleKind`] of the handle, so the
//! same ownership contract works for device objects ([`Texture`], [`Buffer`], ...)
//! and for compositor objects such as swapchains.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use super::device::GpuDevice;
use super::error::ResourceError;

/// A category of GPU object together with the primitive that destroys it.
pub trait HandleKind: Sized + 'static {
    /// The object that created the handle and is able to destroy it.
    type Owner: ?Sized + Send + Sync;
    /// Error reported by the destroy primitive.
    type Error: fmt::Display;
    /// Human readable name of the kind, used in logs.
    const NAME: &'static str;

    /// Destroys the object behind `handle`.
    fn destroy(owner: &Self::Owner, handle: RawHandle<Self>) -> Result<(), Self::Error>;
}

/// An opaque identifier for a GPU object of kind `K`.
///
/// It carries no ownership. [`RawHandle::INVALID`] is the sentinel for "no object".
pub struct RawHandle<K> {
    index: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> RawHandle<K> {
    /// The sentinel value held by empty, reset and moved-from handles.
    pub const INVALID: Self = Self::from_index(u32::MAX);

    /// Wraps a backend index.
    pub const fn from_index(index: u32) -> Self {
        Self {
            index,
            _kind: PhantomData,
        }
    }

    /// The backend index.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// `true` unless this is the invalid sentinel.
    pub const fn is_valid(self) -> bool {
        self.index != u32::MAX
    }
}

impl<K> Clone for RawHandle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for RawHandle<K> {}

impl<K> PartialEq for RawHandle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<K> Eq for RawHandle<K> {}

impl<K> Hash for RawHandle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<K> Default for RawHandle<K> {
    fn default() -> Self {
        Self::INVALID
    }
}

impl<K> fmt::Debug for RawHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "RawHandle({})", self.index)
        } else {
            write!(f, "RawHandle(INVALID)")
        }
    }
}

macro_rules! device_handle_kinds {
    ($($(#[$doc:meta])* $kind:ident => $name:literal, $destroy:ident;)*) => {
        $(
            $(#[$doc])*
            #[derive(Debug)]
            pub enum $kind {}

            impl HandleKind for $kind {
                type Owner = dyn GpuDevice;
                type Error = ResourceError;
                const NAME: &'static str = $name;

                fn destroy(owner: &Self::Owner, handle: RawHandle<Self>) -> Result<(), ResourceError> {
                    owner.$destroy(handle)
                }
            }
        )*
    };
}

device_handle_kinds! {
    /// A sampled or renderable texture.
    Texture => "texture", destroy_texture;
    /// A vertex, index or uniform buffer.
    Buffer => "buffer", destroy_buffer;
    /// A single compiled shader stage.
    Shader => "shader", destroy_shader;
    /// A linked vertex + fragment program.
    Program => "program", destroy_program;
    /// A named uniform slot (samplers, vectors, matrices).
    Uniform => "uniform", destroy_uniform;
}

/// A handle with exactly one owner.
///
/// Dropping it, or calling [`UniqueHandle::reset`], destroys the object. It cannot be
/// cloned; ownership moves with the value or through [`UniqueHandle::take`] and
/// [`UniqueHandle::assign`].
pub struct UniqueHandle<K: HandleKind> {
    raw: RawHandle<K>,
    owner: Arc<K::Owner>,
}

impl<K: HandleKind> UniqueHandle<K> {
    /// Takes ownership of an already created handle.
    pub fn new(owner: Arc<K::Owner>, raw: RawHandle<K>) -> Self {
        Self { raw, owner }
    }

    /// An invalid handle bound to `owner`, ready to be filled with [`UniqueHandle::put`].
    pub fn empty(owner: Arc<K::Owner>) -> Self {
        Self::new(owner, RawHandle::INVALID)
    }

    /// Runs `factory` against `owner` and takes ownership of the handle it returns.
    pub fn create<E>(
        owner: Arc<K::Owner>,
        factory: impl FnOnce(&K::Owner) -> Result<RawHandle<K>, E>,
    ) -> Result<Self, E> {
        let raw = factory(&owner)?;
        Ok(Self::new(owner, raw))
    }

    /// The raw handle. Ownership is unaffected.
    pub fn get(&self) -> RawHandle<K> {
        self.raw
    }

    /// `true` while an object is owned.
    pub fn is_valid(&self) -> bool {
        self.raw.is_valid()
    }

    /// The object able to destroy this handle.
    pub fn owner(&self) -> &Arc<K::Owner> {
        &self.owner
    }

    /// Destroys the current object, if any, and hands out the slot for a new one.
    pub fn put(&mut self) -> &mut RawHandle<K> {
        self.reset();
        &mut self.raw
    }

    /// Destroys the current object, then stores the handle produced by `factory`.
    ///
    /// On error the handle is left invalid.
    pub fn put_with<E>(
        &mut self,
        factory: impl FnOnce(&K::Owner) -> Result<RawHandle<K>, E>,
    ) -> Result<(), E> {
        self.reset();
        self.raw = factory(&self.owner)?;
        Ok(())
    }

    /// Destroys the owned object and leaves the handle invalid.
    ///
    /// Calling it on an invalid handle does nothing.
    pub fn reset(&mut self) {
        if !self.raw.is_valid() {
            return;
        }
        let raw = std::mem::replace(&mut self.raw, RawHandle::INVALID);
        if let Err(e) = K::destroy(&self.owner, raw) {
            log::warn!("Failed to destroy {} {:?}: {}", K::NAME, raw, e);
        }
    }

    /// Moves the object out into a new owner, leaving `self` invalid.
    #[must_use]
    pub fn take(&mut self) -> Self {
        let raw = std::mem::replace(&mut self.raw, RawHandle::INVALID);
        Self::new(self.owner.clone(), raw)
    }

    /// Move-assignment: destroys the current object and adopts `other`'s.
    ///
    /// When both wrap the same underlying id, nothing is destroyed and `self`
    /// keeps the object.
    pub fn assign(&mut self, mut other: Self) {
        if self.raw == other.raw {
            other.raw = RawHandle::INVALID;
            return;
        }
        self.reset();
        self.raw = std::mem::replace(&mut other.raw, RawHandle::INVALID);
        self.owner = other.owner.clone();
    }

    /// Gives up ownership without destroying. The caller becomes responsible for the object.
    #[must_use]
    pub fn release(&mut self) -> RawHandle<K> {
        std::mem::replace(&mut self.raw, RawHandle::INVALID)
    }
}

impl<K: HandleKind> Drop for UniqueHandle<K> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<K: HandleKind> fmt::Debug for UniqueHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniqueHandle")
            .field("kind", &K::NAME)
            .field("raw", &self.raw)
            .finish()
    }
}

struct SharedSlot<K: HandleKind> {
    raw: RawHandle<K>,
    owner: Arc<K::Owner>,
}

impl<K: HandleKind> Drop for SharedSlot<K> {
    fn drop(&mut self) {
        if let Err(e) = K::destroy(&self.owner, self.raw) {
            log::warn!("Failed to destroy shared {} {:?}: {}", K::NAME, self.raw, e);
        }
    }
}

/// A reference counted handle.
///
/// Cloning adds an owner. The object is destroyed when the count drops from one
/// to zero, whichever clone goes last.
pub struct SharedHandle<K: HandleKind> {
    slot: Option<Arc<SharedSlot<K>>>,
}

impl<K: HandleKind> SharedHandle<K> {
    /// Takes ownership of an already created handle with a count of one.
    ///
    /// An invalid `raw` produces an empty handle.
    pub fn new(owner: Arc<K::Owner>, raw: RawHandle<K>) -> Self {
        let slot = raw.is_valid().then(|| Arc::new(SharedSlot { raw, owner }));
        Self { slot }
    }

    /// A handle owning nothing.
    pub const fn empty() -> Self {
        Self { slot: None }
    }

    /// Runs `factory` against `owner` and shares the handle it returns.
    pub fn create<E>(
        owner: Arc<K::Owner>,
        factory: impl FnOnce(&K::Owner) -> Result<RawHandle<K>, E>,
    ) -> Result<Self, E> {
        let raw = factory(&owner)?;
        Ok(Self::new(owner, raw))
    }

    /// The raw handle, or [`RawHandle::INVALID`] when empty.
    pub fn get(&self) -> RawHandle<K> {
        self.slot
            .as_ref()
            .map_or(RawHandle::INVALID, |slot| slot.raw)
    }

    /// `true` while an object is owned.
    pub fn is_valid(&self) -> bool {
        self.slot.is_some()
    }

    /// Number of live owners of the object, `0` when empty.
    pub fn use_count(&self) -> usize {
        self.slot.as_ref().map_or(0, Arc::strong_count)
    }

    /// `true` when both handles share the same count.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.slot, &other.slot) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Drops this owner. The object is destroyed if it was the last one.
    pub fn reset(&mut self) {
        self.slot = None;
    }

    /// Drops this owner, then shares the handle produced by `factory`.
    pub fn put_with<E>(
        &mut self,
        owner: Arc<K::Owner>,
        factory: impl FnOnce(&K::Owner) -> Result<RawHandle<K>, E>,
    ) -> Result<(), E> {
        self.reset();
        *self = Self::create(owner, factory)?;
        Ok(())
    }
}

impl<K: HandleKind> Clone for SharedHandle<K> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
        }
    }
}

impl<K: HandleKind> Default for SharedHandle<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: HandleKind> From<UniqueHandle<K>> for SharedHandle<K> {
    fn from(mut unique: UniqueHandle<K>) -> Self {
        let raw = unique.release();
        Self::new(unique.owner.clone(), raw)
    }
}

impl<K: HandleKind> fmt::Debug for SharedHandle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedHandle")
            .field("kind", &K::NAME)
            .field("raw", &self.get())
            .field("use_count", &self.use_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Ledger {
        destroyed: Mutex<Vec<u32>>,
    }

    impl Ledger {
        fn destroyed(&self) -> Vec<u32> {
            self.destroyed.lock().unwrap().clone()
        }
    }

    enum Probe {}

    impl HandleKind for Probe {
        type Owner = Ledger;
        type Error = String;
        const NAME: &'static str = "probe";

        fn destroy(owner: &Ledger, handle: RawHandle<Self>) -> Result<(), String> {
            owner.destroyed.lock().unwrap().push(handle.index());
            Ok(())
        }
    }

    fn ledger() -> Arc<Ledger> {
        Arc::new(Ledger::default())
    }

    #[test]
    fn test_raw_handle_sentinel() {
        let raw = RawHandle::<Probe>::default();
        assert!(!raw.is_valid());
        assert_eq!(raw, RawHandle::INVALID);
        assert!(RawHandle::<Probe>::from_index(0).is_valid());
        assert_eq!(format!("{:?}", raw), "RawHandle(INVALID)");
    }

    #[test]
    fn test_unique_destroys_once_on_drop() {
        let owner = ledger();
        {
            let handle = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(7));
            assert!(handle.is_valid());
        }
        assert_eq!(owner.destroyed(), vec![7]);
    }

    #[test]
    fn test_unique_reset_is_idempotent() {
        let owner = ledger();
        let mut handle = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(3));
        handle.reset();
        handle.reset();
        assert!(!handle.is_valid());
        drop(handle);
        assert_eq!(owner.destroyed(), vec![3]);
    }

    #[test]
    fn test_unique_take_moves_ownership() {
        let owner = ledger();
        let mut first = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(1));
        let second = first.take();
        assert!(!first.is_valid());
        assert_eq!(second.get().index(), 1);
        drop(first);
        assert!(owner.destroyed().is_empty());
        drop(second);
        assert_eq!(owner.destroyed(), vec![1]);
    }

    #[test]
    fn test_unique_assign_destroys_previous_object() {
        let owner = ledger();
        let mut target = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(1));
        target.assign(UniqueHandle::new(owner.clone(), RawHandle::from_index(2)));
        assert_eq!(owner.destroyed(), vec![1]);
        assert_eq!(target.get().index(), 2);
        drop(target);
        assert_eq!(owner.destroyed(), vec![1, 2]);
    }

    #[test]
    fn test_unique_assign_same_id_is_noop() {
        let owner = ledger();
        let mut target = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(5));
        target.assign(UniqueHandle::new(owner.clone(), RawHandle::from_index(5)));
        assert!(owner.destroyed().is_empty());
        assert!(target.is_valid());
        drop(target);
        assert_eq!(owner.destroyed(), vec![5]);
    }

    #[test]
    fn test_unique_put_resets_before_refill() {
        let owner = ledger();
        let mut handle = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(4));
        *handle.put() = RawHandle::from_index(9);
        assert_eq!(owner.destroyed(), vec![4]);

        let failed: Result<(), &str> = handle.put_with(|_| Err("no memory"));
        assert!(failed.is_err());
        assert!(!handle.is_valid());
        assert_eq!(owner.destroyed(), vec![4, 9]);
    }

    #[test]
    fn test_unique_release_skips_destroy() {
        let owner = ledger();
        let mut handle = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(8));
        let raw = handle.release();
        drop(handle);
        assert_eq!(raw.index(), 8);
        assert!(owner.destroyed().is_empty());
    }

    #[test]
    fn test_shared_destroys_when_last_owner_drops() {
        let owner = ledger();
        let first = SharedHandle::<Probe>::new(owner.clone(), RawHandle::from_index(11));
        let second = first.clone();
        let third = second.clone();
        assert_eq!(first.use_count(), 3);
        assert!(first.ptr_eq(&third));

        drop(first);
        drop(third);
        assert!(owner.destroyed().is_empty());
        assert_eq!(second.use_count(), 1);

        drop(second);
        assert_eq!(owner.destroyed(), vec![11]);
    }

    #[test]
    fn test_shared_reset_only_drops_one_owner() {
        let owner = ledger();
        let mut first = SharedHandle::<Probe>::new(owner.clone(), RawHandle::from_index(2));
        let second = first.clone();
        first.reset();
        first.reset();
        assert_eq!(first.use_count(), 0);
        assert_eq!(first.get(), RawHandle::INVALID);
        assert_eq!(second.use_count(), 1);
        assert!(owner.destroyed().is_empty());
        drop(second);
        assert_eq!(owner.destroyed(), vec![2]);
    }

    #[test]
    fn test_shared_from_unique_transfers_without_destroy() {
        let owner = ledger();
        let unique = UniqueHandle::<Probe>::new(owner.clone(), RawHandle::from_index(6));
        let shared = SharedHandle::from(unique);
        assert!(owner.destroyed().is_empty());
        assert_eq!(shared.use_count(), 1);
        drop(shared);
        assert_eq!(owner.destroyed(), vec![6]);
    }

    #[test]
    fn test_shared_invalid_raw_is_empty() {
        let owner = ledger();
        let shared = SharedHandle::<Probe>::new(owner.clone(), RawHandle::INVALID);
        assert!(!shared.is_valid());
        drop(shared);
        assert!(owner.destroyed().is_empty());
    }
}

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

mod common;

use std::sync::Arc;

use common::MockDevice;
use xrscene_core::graphics::{
    GpuDevice, ResourceError, SharedHandle, Texture, TextureDescriptor, UniqueHandle,
};

fn texture(device: &Arc<dyn GpuDevice>) -> UniqueHandle<Texture> {
    UniqueHandle::<Texture>::create(device.clone(), |d| {
        d.create_texture(&TextureDescriptor::default())
    })
    .unwrap()
}

fn device() -> (Arc<MockDevice>, Arc<dyn GpuDevice>) {
    let mock = MockDevice::shared();
    let device: Arc<dyn GpuDevice> = mock.clone();
    (mock, device)
}

#[test]
fn test_chain_of_moves_destroys_once_at_the_end() {
    let (mock, device) = device();
    let mut first = texture(&device);
    let id = first.get().index();

    // Move the object through several owners.
    let mut second = first.take();
    let mut third = UniqueHandle::<Texture>::empty(device.clone());
    third.assign(second.take());
    let fourth = third.take();
    drop(first);
    drop(second);
    drop(third);
    assert!(mock.destroyed_textures().is_empty(), "Moved-from handles own nothing");

    drop(fourth);
    assert_eq!(mock.destroyed_textures(), vec![id]);
}

#[test]
fn test_assign_replaces_and_destroys_previous_object() {
    let (mock, device) = device();
    let mut target = texture(&device);
    let old = target.get().index();
    let source = texture(&device);
    let new = source.get().index();

    target.assign(source);

    assert_eq!(mock.destroyed_textures(), vec![old]);
    assert_eq!(target.get().index(), new);
    drop(target);
    assert_eq!(mock.destroyed_textures(), vec![old, new]);
}

#[test]
fn test_put_with_recreates_in_place() {
    let (mock, device) = device();
    let mut handle = texture(&device);
    let old = handle.get().index();

    handle
        .put_with(|d| d.create_texture(&TextureDescriptor::default()))
        .unwrap();

    assert_eq!(mock.destroyed_textures(), vec![old]);
    assert!(handle.is_valid());
    assert_ne!(handle.get().index(), old);
}

#[test]
fn test_put_with_failure_leaves_handle_invalid() {
    let (mock, device) = device();
    let mut handle = texture(&device);

    let result: Result<(), ResourceError> =
        handle.put_with(|_| Err(ResourceError::InvalidHandle));

    assert!(result.is_err());
    assert!(!handle.is_valid());
    assert_eq!(mock.destroyed_textures().len(), 1);
}

#[test]
fn test_shared_copies_destroy_with_last_owner() {
    let (mock, device) = device();
    let shared = SharedHandle::from(texture(&device));
    let id = shared.get().index();

    let copies: Vec<_> = (0..5).map(|_| shared.clone()).collect();
    assert_eq!(shared.use_count(), 6);
    drop(shared);
    for (i, copy) in copies.into_iter().enumerate() {
        assert!(mock.destroyed_textures().is_empty(), "Copy {i} is still alive");
        drop(copy);
    }

    assert_eq!(mock.destroyed_textures(), vec![id]);
}

#[test]
fn test_shared_reset_is_idempotent() {
    let (mock, device) = device();
    let mut shared = SharedHandle::from(texture(&device));

    shared.reset();
    shared.reset();
    drop(shared);

    assert_eq!(mock.destroyed_textures().len(), 1);
}

#[test]
fn test_shared_handles_cross_threads() {
    let (mock, device) = device();
    let shared = SharedHandle::from(texture(&device));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let copy = shared.clone();
            std::thread::spawn(move || copy.get())
        })
        .collect();
    let raws: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    assert!(raws.iter().all(|r| *r == shared.get()));
    assert_eq!(shared.use_count(), 1);
    drop(shared);
    assert_eq!(mock.destroyed_textures().len(), 1);
}

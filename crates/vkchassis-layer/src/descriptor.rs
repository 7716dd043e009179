//! Descriptor set layout, pool and set forwarding.
//!
//! Descriptor sets die implicitly with their pool (destroy or reset), so the
//! layer remembers which outer sets came from which pool and drops them in
//! bulk.

use std::slice;

use ash::vk;
use ash::vk::Handle;

use crate::dispatch::{DeviceData, LayerContext};
use crate::forward::{create_destroy, create_one, entry_points, forward_one, wrap_outputs};
use crate::scratch::Scratch;

create_destroy! {
    create_descriptor_set_layout / destroy_descriptor_set_layout:
        DescriptorSetLayoutCreateInfo => DescriptorSetLayout, v1_0;
}

impl DeviceData {
    pub unsafe fn get_descriptor_set_layout_support(
        &self,
        device: vk::Device,
        p_create_info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
        p_support: *mut vk::DescriptorSetLayoutSupport<'_>,
    ) {
        forward_one(self, p_create_info, |info| {
            (self.table.v1_1.get_descriptor_set_layout_support)(device, info, p_support)
        })
    }

    // ── Pool ────────────────────────────────────────────────

    pub unsafe fn create_descriptor_pool(
        &self,
        device: vk::Device,
        p_create_info: *const vk::DescriptorPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_descriptor_pool: *mut vk::DescriptorPool,
    ) -> vk::Result {
        create_one(self, p_create_info, p_descriptor_pool, |info| {
            (self.table.v1_0.create_descriptor_pool)(device, info, p_allocator, p_descriptor_pool)
        })
    }

    pub unsafe fn destroy_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        let destroy_descriptor_pool = self.table.v1_0.destroy_descriptor_pool;
        if !self.wrap_handles() {
            return destroy_descriptor_pool(device, descriptor_pool, p_allocator);
        }
        self.retire_pool_sets(descriptor_pool);
        let pool = self.translator().pop_handle(descriptor_pool);
        destroy_descriptor_pool(device, pool, p_allocator)
    }

    pub unsafe fn reset_descriptor_pool(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        flags: vk::DescriptorPoolResetFlags,
    ) -> vk::Result {
        let reset_descriptor_pool = self.table.v1_0.reset_descriptor_pool;
        if !self.wrap_handles() {
            return reset_descriptor_pool(device, descriptor_pool, flags);
        }
        self.retire_pool_sets(descriptor_pool);
        let pool = self.translator().unwrap_handle(descriptor_pool);
        reset_descriptor_pool(device, pool, flags)
    }

    /// Drop every outer set allocated from `pool`. Returns how many were dropped.
    pub fn retire_pool_sets(&self, pool: vk::DescriptorPool) -> usize {
        let Some((_, sets)) = self.pool_sets.remove(&pool.as_raw()) else {
            return 0;
        };
        for set in &sets {
            self.translator().pop(*set);
        }
        tracing::trace!(pool = pool.as_raw(), count = sets.len(), "retired descriptor sets");
        sets.len()
    }

    /// Number of live outer sets recorded against `pool`.
    pub fn pool_set_count(&self, pool: vk::DescriptorPool) -> usize {
        self.pool_sets.get(&pool.as_raw()).map_or(0, |sets| sets.len())
    }

    // ── Sets ────────────────────────────────────────────────

    pub unsafe fn allocate_descriptor_sets(
        &self,
        device: vk::Device,
        p_allocate_info: *const vk::DescriptorSetAllocateInfo<'_>,
        p_descriptor_sets: *mut vk::DescriptorSet,
    ) -> vk::Result {
        let allocate_descriptor_sets = self.table.v1_0.allocate_descriptor_sets;
        if !self.wrap_handles() || p_allocate_info.is_null() {
            return allocate_descriptor_sets(device, p_allocate_info, p_descriptor_sets);
        }
        let scratch = Scratch::new();
        let info = self.unwrapper(&scratch).one(p_allocate_info);
        let result = allocate_descriptor_sets(device, info, p_descriptor_sets);
        if result != vk::Result::SUCCESS || p_descriptor_sets.is_null() {
            return result;
        }

        let count = (*p_allocate_info).descriptor_set_count;
        wrap_outputs(self.translator(), p_descriptor_sets, count);
        let pool = (*p_allocate_info).descriptor_pool.as_raw();
        let mut sets = self.pool_sets.entry(pool).or_default();
        for set in slice::from_raw_parts(p_descriptor_sets, count as usize) {
            sets.insert(set.as_raw());
        }
        result
    }

    pub unsafe fn free_descriptor_sets(
        &self,
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        descriptor_set_count: u32,
        p_descriptor_sets: *const vk::DescriptorSet,
    ) -> vk::Result {
        let free_descriptor_sets = self.table.v1_0.free_descriptor_sets;
        if !self.wrap_handles() {
            return free_descriptor_sets(device, descriptor_pool, descriptor_set_count, p_descriptor_sets);
        }
        let scratch = Scratch::new();
        let mut sets: &[vk::DescriptorSet] = &[];
        if !p_descriptor_sets.is_null() && descriptor_set_count > 0 {
            let outer = slice::from_raw_parts(p_descriptor_sets, descriptor_set_count as usize);
            if let Some(mut pool_sets) = self.pool_sets.get_mut(&descriptor_pool.as_raw()) {
                for set in outer {
                    pool_sets.remove(&set.as_raw());
                }
            }
            sets = scratch.fill_iter(outer.iter().map(|set| self.translator().pop_handle(*set)));
        }
        let pool = self.translator().unwrap_handle(descriptor_pool);
        let p_sets = if sets.is_empty() { p_descriptor_sets } else { sets.as_ptr() };
        free_descriptor_sets(device, pool, descriptor_set_count, p_sets)
    }

    pub unsafe fn update_descriptor_sets(
        &self,
        device: vk::Device,
        descriptor_write_count: u32,
        p_descriptor_writes: *const vk::WriteDescriptorSet<'_>,
        descriptor_copy_count: u32,
        p_descriptor_copies: *const vk::CopyDescriptorSet<'_>,
    ) {
        let update_descriptor_sets = self.table.v1_0.update_descriptor_sets;
        if !self.wrap_handles() {
            return update_descriptor_sets(
                device,
                descriptor_write_count,
                p_descriptor_writes,
                descriptor_copy_count,
                p_descriptor_copies,
            );
        }
        let scratch = Scratch::new();
        let cx = self.unwrapper(&scratch);
        let writes = cx.structs(p_descriptor_writes, descriptor_write_count);
        let copies = cx.structs(p_descriptor_copies, descriptor_copy_count);
        update_descriptor_sets(device, descriptor_write_count, writes, descriptor_copy_count, copies)
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateDescriptorSetLayout(
        device: vk::Device,
        p_create_info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_set_layout: *mut vk::DescriptorSetLayout,
    ) -> vk::Result => create_descriptor_set_layout;
    fn vkDestroyDescriptorSetLayout(
        device: vk::Device,
        descriptor_set_layout: vk::DescriptorSetLayout,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_descriptor_set_layout;
    fn vkGetDescriptorSetLayoutSupport(
        device: vk::Device,
        p_create_info: *const vk::DescriptorSetLayoutCreateInfo<'_>,
        p_support: *mut vk::DescriptorSetLayoutSupport<'_>,
    ) => get_descriptor_set_layout_support;
    fn vkCreateDescriptorPool(
        device: vk::Device,
        p_create_info: *const vk::DescriptorPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_descriptor_pool: *mut vk::DescriptorPool,
    ) -> vk::Result => create_descriptor_pool;
    fn vkDestroyDescriptorPool(
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_descriptor_pool;
    fn vkResetDescriptorPool(
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        flags: vk::DescriptorPoolResetFlags,
    ) -> vk::Result => reset_descriptor_pool;
    fn vkAllocateDescriptorSets(
        device: vk::Device,
        p_allocate_info: *const vk::DescriptorSetAllocateInfo<'_>,
        p_descriptor_sets: *mut vk::DescriptorSet,
    ) -> vk::Result => allocate_descriptor_sets;
    fn vkFreeDescriptorSets(
        device: vk::Device,
        descriptor_pool: vk::DescriptorPool,
        descriptor_set_count: u32,
        p_descriptor_sets: *const vk::DescriptorSet,
    ) -> vk::Result => free_descriptor_sets;
    fn vkUpdateDescriptorSets(
        device: vk::Device,
        descriptor_write_count: u32,
        p_descriptor_writes: *const vk::WriteDescriptorSet<'_>,
        descriptor_copy_count: u32,
        p_descriptor_copies: *const vk::CopyDescriptorSet<'_>,
    ) => update_descriptor_sets;
}

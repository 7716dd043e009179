//! Device memory and buffer forwarding.

use std::ffi::c_void;

use ash::vk;

use crate::dispatch::DeviceData;
use crate::forward::{create_one, destroy_one, entry_points, forward_one, forward_structs};
use crate::unwrap::passthrough;

impl DeviceData {
    // ── Memory ──────────────────────────────────────────────

    pub unsafe fn allocate_memory(
        &self,
        device: vk::Device,
        p_allocate_info: *const vk::MemoryAllocateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_memory: *mut vk::DeviceMemory,
    ) -> vk::Result {
        create_one(self, p_allocate_info, p_memory, |info| {
            (self.table.v1_0.allocate_memory)(device, info, p_allocator, p_memory)
        })
    }

    pub unsafe fn free_memory(
        &self,
        device: vk::Device,
        memory: vk::DeviceMemory,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, memory, |memory| {
            (self.table.v1_0.free_memory)(device, memory, p_allocator)
        })
    }

    pub unsafe fn flush_mapped_memory_ranges(
        &self,
        device: vk::Device,
        memory_range_count: u32,
        p_memory_ranges: *const vk::MappedMemoryRange<'_>,
    ) -> vk::Result {
        forward_structs(self, p_memory_ranges, memory_range_count, |ranges| {
            (self.table.v1_0.flush_mapped_memory_ranges)(device, memory_range_count, ranges)
        })
    }

    pub unsafe fn invalidate_mapped_memory_ranges(
        &self,
        device: vk::Device,
        memory_range_count: u32,
        p_memory_ranges: *const vk::MappedMemoryRange<'_>,
    ) -> vk::Result {
        forward_structs(self, p_memory_ranges, memory_range_count, |ranges| {
            (self.table.v1_0.invalidate_mapped_memory_ranges)(device, memory_range_count, ranges)
        })
    }

    pub unsafe fn bind_buffer_memory2(
        &self,
        device: vk::Device,
        bind_info_count: u32,
        p_bind_infos: *const vk::BindBufferMemoryInfo<'_>,
    ) -> vk::Result {
        forward_structs(self, p_bind_infos, bind_info_count, |infos| {
            (self.table.v1_1.bind_buffer_memory2)(device, bind_info_count, infos)
        })
    }

    pub unsafe fn bind_image_memory2(
        &self,
        device: vk::Device,
        bind_info_count: u32,
        p_bind_infos: *const vk::BindImageMemoryInfo<'_>,
    ) -> vk::Result {
        forward_structs(self, p_bind_infos, bind_info_count, |infos| {
            (self.table.v1_1.bind_image_memory2)(device, bind_info_count, infos)
        })
    }

    // ── Buffer ──────────────────────────────────────────────

    pub unsafe fn create_buffer(
        &self,
        device: vk::Device,
        p_create_info: *const vk::BufferCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_buffer: *mut vk::Buffer,
    ) -> vk::Result {
        create_one(self, p_create_info, p_buffer, |info| {
            (self.table.v1_0.create_buffer)(device, info, p_allocator, p_buffer)
        })
    }

    pub unsafe fn destroy_buffer(
        &self,
        device: vk::Device,
        buffer: vk::Buffer,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, buffer, |buffer| {
            (self.table.v1_0.destroy_buffer)(device, buffer, p_allocator)
        })
    }

    pub unsafe fn get_buffer_memory_requirements2(
        &self,
        device: vk::Device,
        p_info: *const vk::BufferMemoryRequirementsInfo2<'_>,
        p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
    ) {
        forward_one(self, p_info, |info| {
            (self.table.v1_1.get_buffer_memory_requirements2)(device, info, p_memory_requirements)
        })
    }

    pub unsafe fn get_image_memory_requirements2(
        &self,
        device: vk::Device,
        p_info: *const vk::ImageMemoryRequirementsInfo2<'_>,
        p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
    ) {
        forward_one(self, p_info, |info| {
            (self.table.v1_1.get_image_memory_requirements2)(device, info, p_memory_requirements)
        })
    }

    pub unsafe fn get_buffer_device_address(
        &self,
        device: vk::Device,
        p_info: *const vk::BufferDeviceAddressInfo<'_>,
    ) -> vk::DeviceAddress {
        forward_one(self, p_info, |info| {
            (self.table.v1_2.get_buffer_device_address)(device, info)
        })
    }
}

passthrough! {
    impl DeviceData {
        fn map_memory(
            device: vk::Device,
            memory: vk::DeviceMemory,
            offset: vk::DeviceSize,
            size: vk::DeviceSize,
            flags: vk::MemoryMapFlags,
            pp_data: *mut *mut c_void,
        ) -> vk::Result => v1_0.map_memory;
        fn unmap_memory(device: vk::Device, memory: vk::DeviceMemory) => v1_0.unmap_memory;
        fn get_device_memory_commitment(
            device: vk::Device,
            memory: vk::DeviceMemory,
            p_committed_memory_in_bytes: *mut vk::DeviceSize,
        ) => v1_0.get_device_memory_commitment;
        fn bind_buffer_memory(
            device: vk::Device,
            buffer: vk::Buffer,
            memory: vk::DeviceMemory,
            memory_offset: vk::DeviceSize,
        ) -> vk::Result => v1_0.bind_buffer_memory;
        fn bind_image_memory(
            device: vk::Device,
            image: vk::Image,
            memory: vk::DeviceMemory,
            memory_offset: vk::DeviceSize,
        ) -> vk::Result => v1_0.bind_image_memory;
        fn get_buffer_memory_requirements(
            device: vk::Device,
            buffer: vk::Buffer,
            p_memory_requirements: *mut vk::MemoryRequirements,
        ) => v1_0.get_buffer_memory_requirements;
        fn get_image_memory_requirements(
            device: vk::Device,
            image: vk::Image,
            p_memory_requirements: *mut vk::MemoryRequirements,
        ) => v1_0.get_image_memory_requirements;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkAllocateMemory(
        device: vk::Device,
        p_allocate_info: *const vk::MemoryAllocateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_memory: *mut vk::DeviceMemory,
    ) -> vk::Result => allocate_memory;
    fn vkFreeMemory(
        device: vk::Device,
        memory: vk::DeviceMemory,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => free_memory;
    fn vkMapMemory(
        device: vk::Device,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        flags: vk::MemoryMapFlags,
        pp_data: *mut *mut c_void,
    ) -> vk::Result => map_memory;
    fn vkUnmapMemory(device: vk::Device, memory: vk::DeviceMemory) => unmap_memory;
    fn vkFlushMappedMemoryRanges(
        device: vk::Device,
        memory_range_count: u32,
        p_memory_ranges: *const vk::MappedMemoryRange<'_>,
    ) -> vk::Result => flush_mapped_memory_ranges;
    fn vkInvalidateMappedMemoryRanges(
        device: vk::Device,
        memory_range_count: u32,
        p_memory_ranges: *const vk::MappedMemoryRange<'_>,
    ) -> vk::Result => invalidate_mapped_memory_ranges;
    fn vkGetDeviceMemoryCommitment(
        device: vk::Device,
        memory: vk::DeviceMemory,
        p_committed_memory_in_bytes: *mut vk::DeviceSize,
    ) => get_device_memory_commitment;
    fn vkBindBufferMemory(
        device: vk::Device,
        buffer: vk::Buffer,
        memory: vk::DeviceMemory,
        memory_offset: vk::DeviceSize,
    ) -> vk::Result => bind_buffer_memory;
    fn vkBindImageMemory(
        device: vk::Device,
        image: vk::Image,
        memory: vk::DeviceMemory,
        memory_offset: vk::DeviceSize,
    ) -> vk::Result => bind_image_memory;
    fn vkBindBufferMemory2(
        device: vk::Device,
        bind_info_count: u32,
        p_bind_infos: *const vk::BindBufferMemoryInfo<'_>,
    ) -> vk::Result => bind_buffer_memory2;
    fn vkBindImageMemory2(
        device: vk::Device,
        bind_info_count: u32,
        p_bind_infos: *const vk::BindImageMemoryInfo<'_>,
    ) -> vk::Result => bind_image_memory2;
    fn vkCreateBuffer(
        device: vk::Device,
        p_create_info: *const vk::BufferCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_buffer: *mut vk::Buffer,
    ) -> vk::Result => create_buffer;
    fn vkDestroyBuffer(
        device: vk::Device,
        buffer: vk::Buffer,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_buffer;
    fn vkGetBufferMemoryRequirements(
        device: vk::Device,
        buffer: vk::Buffer,
        p_memory_requirements: *mut vk::MemoryRequirements,
    ) => get_buffer_memory_requirements;
    fn vkGetImageMemoryRequirements(
        device: vk::Device,
        image: vk::Image,
        p_memory_requirements: *mut vk::MemoryRequirements,
    ) => get_image_memory_requirements;
    fn vkGetBufferMemoryRequirements2(
        device: vk::Device,
        p_info: *const vk::BufferMemoryRequirementsInfo2<'_>,
        p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
    ) => get_buffer_memory_requirements2;
    fn vkGetImageMemoryRequirements2(
        device: vk::Device,
        p_info: *const vk::ImageMemoryRequirementsInfo2<'_>,
        p_memory_requirements: *mut vk::MemoryRequirements2<'_>,
    ) => get_image_memory_requirements2;
    fn vkGetBufferDeviceAddress(
        device: vk::Device,
        p_info: *const vk::BufferDeviceAddressInfo<'_>,
    ) -> vk::DeviceAddress => get_buffer_device_address;
}

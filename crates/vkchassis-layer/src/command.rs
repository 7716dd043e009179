//! Command pool, command buffer, query and vkCmd* forwarding.
//!
//! Command buffers are dispatchable and never wrapped; only the objects they
//! reference are. The layer does remember which command buffers are
//! secondary, since only those have their inheritance info read at begin.

use std::ffi::c_void;
use std::slice;

use ash::vk;
use ash::vk::Handle;

use crate::dispatch::{DeviceData, LayerContext};
use crate::forward::{create_destroy, create_one, entry_points, forward_one};
use crate::scratch::Scratch;
use crate::unwrap::passthrough;

create_destroy! {
    create_query_pool / destroy_query_pool: QueryPoolCreateInfo => QueryPool, v1_0;
}

impl DeviceData {
    // ── Command pool ────────────────────────────────────────

    pub unsafe fn create_command_pool(
        &self,
        device: vk::Device,
        p_create_info: *const vk::CommandPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_command_pool: *mut vk::CommandPool,
    ) -> vk::Result {
        create_one(self, p_create_info, p_command_pool, |info| {
            (self.table.v1_0.create_command_pool)(device, info, p_allocator, p_command_pool)
        })
    }

    pub unsafe fn destroy_command_pool(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        let destroy_command_pool = self.table.v1_0.destroy_command_pool;
        if !self.wrap_handles() {
            return destroy_command_pool(device, command_pool, p_allocator);
        }
        let outer = command_pool.as_raw();
        self.secondary_command_buffers.retain(|_, pool| *pool != outer);
        destroy_command_pool(device, self.translator().pop_handle(command_pool), p_allocator)
    }

    // ── Command buffers ─────────────────────────────────────

    pub unsafe fn allocate_command_buffers(
        &self,
        device: vk::Device,
        p_allocate_info: *const vk::CommandBufferAllocateInfo<'_>,
        p_command_buffers: *mut vk::CommandBuffer,
    ) -> vk::Result {
        let result = forward_one(self, p_allocate_info, |info| {
            (self.table.v1_0.allocate_command_buffers)(device, info, p_command_buffers)
        });
        if result != vk::Result::SUCCESS || !self.wrap_handles() || p_command_buffers.is_null() {
            return result;
        }
        let info = &*p_allocate_info;
        if info.level == vk::CommandBufferLevel::SECONDARY {
            let pool = info.command_pool.as_raw();
            for cb in slice::from_raw_parts(p_command_buffers, info.command_buffer_count as usize) {
                self.secondary_command_buffers.insert(cb.as_raw(), pool);
            }
        }
        result
    }

    pub unsafe fn free_command_buffers(
        &self,
        device: vk::Device,
        command_pool: vk::CommandPool,
        command_buffer_count: u32,
        p_command_buffers: *const vk::CommandBuffer,
    ) {
        if self.wrap_handles() && !p_command_buffers.is_null() {
            for cb in slice::from_raw_parts(p_command_buffers, command_buffer_count as usize) {
                self.secondary_command_buffers.remove(&cb.as_raw());
            }
        }
        (self.table.v1_0.free_command_buffers)(
            device,
            self.unwrapped(command_pool),
            command_buffer_count,
            p_command_buffers,
        )
    }

    pub unsafe fn begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        p_begin_info: *const vk::CommandBufferBeginInfo<'_>,
    ) -> vk::Result {
        let begin_command_buffer = self.table.v1_0.begin_command_buffer;
        if !self.wrap_handles() || p_begin_info.is_null() {
            return begin_command_buffer(command_buffer, p_begin_info);
        }
        let scratch = Scratch::new();
        let cx = self.unwrapper(&scratch);
        let info = scratch.alloc(*p_begin_info);
        info.p_next = cx.chain(info.p_next);
        // ignored, and possibly dangling, for primary command buffers
        if self.secondary_command_buffers.contains_key(&command_buffer.as_raw()) {
            info.p_inheritance_info = cx.one(info.p_inheritance_info);
        }
        begin_command_buffer(command_buffer, info)
    }

    // ── Binding ─────────────────────────────────────────────

    pub unsafe fn cmd_bind_descriptor_sets(
        &self,
        command_buffer: vk::CommandBuffer,
        pipeline_bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        descriptor_set_count: u32,
        p_descriptor_sets: *const vk::DescriptorSet,
        dynamic_offset_count: u32,
        p_dynamic_offsets: *const u32,
    ) {
        let cmd_bind_descriptor_sets = self.table.v1_0.cmd_bind_descriptor_sets;
        if !self.wrap_handles() {
            return cmd_bind_descriptor_sets(
                command_buffer,
                pipeline_bind_point,
                layout,
                first_set,
                descriptor_set_count,
                p_descriptor_sets,
                dynamic_offset_count,
                p_dynamic_offsets,
            );
        }
        let scratch = Scratch::new();
        let cx = self.unwrapper(&scratch);
        cmd_bind_descriptor_sets(
            command_buffer,
            pipeline_bind_point,
            cx.handle(layout),
            first_set,
            descriptor_set_count,
            cx.handles(p_descriptor_sets, descriptor_set_count),
            dynamic_offset_count,
            p_dynamic_offsets,
        )
    }

    pub unsafe fn cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        binding_count: u32,
        p_buffers: *const vk::Buffer,
        p_offsets: *const vk::DeviceSize,
    ) {
        let cmd_bind_vertex_buffers = self.table.v1_0.cmd_bind_vertex_buffers;
        if !self.wrap_handles() {
            return cmd_bind_vertex_buffers(command_buffer, first_binding, binding_count, p_buffers, p_offsets);
        }
        let scratch = Scratch::new();
        let buffers = self.unwrapper(&scratch).handles(p_buffers, binding_count);
        cmd_bind_vertex_buffers(command_buffer, first_binding, binding_count, buffers, p_offsets)
    }

    // ── Barriers ────────────────────────────────────────────

    pub unsafe fn cmd_pipeline_barrier(
        &self,
        command_buffer: vk::CommandBuffer,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barrier_count: u32,
        p_memory_barriers: *const vk::MemoryBarrier<'_>,
        buffer_memory_barrier_count: u32,
        p_buffer_memory_barriers: *const vk::BufferMemoryBarrier<'_>,
        image_memory_barrier_count: u32,
        p_image_memory_barriers: *const vk::ImageMemoryBarrier<'_>,
    ) {
        let cmd_pipeline_barrier = self.table.v1_0.cmd_pipeline_barrier;
        if !self.wrap_handles() {
            return cmd_pipeline_barrier(
                command_buffer,
                src_stage_mask,
                dst_stage_mask,
                dependency_flags,
                memory_barrier_count,
                p_memory_barriers,
                buffer_memory_barrier_count,
                p_buffer_memory_barriers,
                image_memory_barrier_count,
                p_image_memory_barriers,
            );
        }
        let scratch = Scratch::new();
        let cx = self.unwrapper(&scratch);
        cmd_pipeline_barrier(
            command_buffer,
            src_stage_mask,
            dst_stage_mask,
            dependency_flags,
            memory_barrier_count,
            p_memory_barriers,
            buffer_memory_barrier_count,
            cx.structs(p_buffer_memory_barriers, buffer_memory_barrier_count),
            image_memory_barrier_count,
            cx.structs(p_image_memory_barriers, image_memory_barrier_count),
        )
    }

    pub unsafe fn cmd_pipeline_barrier2(
        &self,
        command_buffer: vk::CommandBuffer,
        p_dependency_info: *const vk::DependencyInfo<'_>,
    ) {
        forward_one(self, p_dependency_info, |info| {
            (self.table.v1_3.cmd_pipeline_barrier2)(command_buffer, info)
        })
    }
}

passthrough! {
    impl DeviceData {
        fn reset_command_pool(
            device: vk::Device,
            command_pool: vk::CommandPool,
            flags: vk::CommandPoolResetFlags,
        ) -> vk::Result => v1_0.reset_command_pool;
        fn trim_command_pool(
            device: vk::Device,
            command_pool: vk::CommandPool,
            flags: vk::CommandPoolTrimFlags,
        ) => v1_1.trim_command_pool;
        fn end_command_buffer(command_buffer: vk::CommandBuffer) -> vk::Result => v1_0.end_command_buffer;
        fn reset_command_buffer(
            command_buffer: vk::CommandBuffer,
            flags: vk::CommandBufferResetFlags,
        ) -> vk::Result => v1_0.reset_command_buffer;
        fn cmd_execute_commands(
            command_buffer: vk::CommandBuffer,
            command_buffer_count: u32,
            p_command_buffers: *const vk::CommandBuffer,
        ) => v1_0.cmd_execute_commands;

        fn cmd_bind_pipeline(
            command_buffer: vk::CommandBuffer,
            pipeline_bind_point: vk::PipelineBindPoint,
            pipeline: vk::Pipeline,
        ) => v1_0.cmd_bind_pipeline;
        fn cmd_bind_index_buffer(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize,
            index_type: vk::IndexType,
        ) => v1_0.cmd_bind_index_buffer;
        fn cmd_push_constants(
            command_buffer: vk::CommandBuffer,
            layout: vk::PipelineLayout,
            stage_flags: vk::ShaderStageFlags,
            offset: u32,
            size: u32,
            p_values: *const c_void,
        ) => v1_0.cmd_push_constants;
        fn cmd_set_viewport(
            command_buffer: vk::CommandBuffer,
            first_viewport: u32,
            viewport_count: u32,
            p_viewports: *const vk::Viewport,
        ) => v1_0.cmd_set_viewport;
        fn cmd_set_scissor(
            command_buffer: vk::CommandBuffer,
            first_scissor: u32,
            scissor_count: u32,
            p_scissors: *const vk::Rect2D,
        ) => v1_0.cmd_set_scissor;

        fn cmd_draw(
            command_buffer: vk::CommandBuffer,
            vertex_count: u32,
            instance_count: u32,
            first_vertex: u32,
            first_instance: u32,
        ) => v1_0.cmd_draw;
        fn cmd_draw_indexed(
            command_buffer: vk::CommandBuffer,
            index_count: u32,
            instance_count: u32,
            first_index: u32,
            vertex_offset: i32,
            first_instance: u32,
        ) => v1_0.cmd_draw_indexed;
        fn cmd_draw_indirect(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize,
            draw_count: u32,
            stride: u32,
        ) => v1_0.cmd_draw_indirect;
        fn cmd_draw_indexed_indirect(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize,
            draw_count: u32,
            stride: u32,
        ) => v1_0.cmd_draw_indexed_indirect;
        fn cmd_dispatch(
            command_buffer: vk::CommandBuffer,
            group_count_x: u32,
            group_count_y: u32,
            group_count_z: u32,
        ) => v1_0.cmd_dispatch;
        fn cmd_dispatch_indirect(
            command_buffer: vk::CommandBuffer,
            buffer: vk::Buffer,
            offset: vk::DeviceSize,
        ) => v1_0.cmd_dispatch_indirect;

        fn cmd_copy_buffer(
            command_buffer: vk::CommandBuffer,
            src_buffer: vk::Buffer,
            dst_buffer: vk::Buffer,
            region_count: u32,
            p_regions: *const vk::BufferCopy,
        ) => v1_0.cmd_copy_buffer;
        fn cmd_copy_image(
            command_buffer: vk::CommandBuffer,
            src_image: vk::Image,
            src_image_layout: vk::ImageLayout,
            dst_image: vk::Image,
            dst_image_layout: vk::ImageLayout,
            region_count: u32,
            p_regions: *const vk::ImageCopy,
        ) => v1_0.cmd_copy_image;
        fn cmd_blit_image(
            command_buffer: vk::CommandBuffer,
            src_image: vk::Image,
            src_image_layout: vk::ImageLayout,
            dst_image: vk::Image,
            dst_image_layout: vk::ImageLayout,
            region_count: u32,
            p_regions: *const vk::ImageBlit,
            filter: vk::Filter,
        ) => v1_0.cmd_blit_image;
        fn cmd_copy_buffer_to_image(
            command_buffer: vk::CommandBuffer,
            src_buffer: vk::Buffer,
            dst_image: vk::Image,
            dst_image_layout: vk::ImageLayout,
            region_count: u32,
            p_regions: *const vk::BufferImageCopy,
        ) => v1_0.cmd_copy_buffer_to_image;
        fn cmd_copy_image_to_buffer(
            command_buffer: vk::CommandBuffer,
            src_image: vk::Image,
            src_image_layout: vk::ImageLayout,
            dst_buffer: vk::Buffer,
            region_count: u32,
            p_regions: *const vk::BufferImageCopy,
        ) => v1_0.cmd_copy_image_to_buffer;
        fn cmd_fill_buffer(
            command_buffer: vk::CommandBuffer,
            dst_buffer: vk::Buffer,
            dst_offset: vk::DeviceSize,
            size: vk::DeviceSize,
            data: u32,
        ) => v1_0.cmd_fill_buffer;
        fn cmd_update_buffer(
            command_buffer: vk::CommandBuffer,
            dst_buffer: vk::Buffer,
            dst_offset: vk::DeviceSize,
            data_size: vk::DeviceSize,
            p_data: *const c_void,
        ) => v1_0.cmd_update_buffer;
        fn cmd_clear_color_image(
            command_buffer: vk::CommandBuffer,
            image: vk::Image,
            image_layout: vk::ImageLayout,
            p_color: *const vk::ClearColorValue,
            range_count: u32,
            p_ranges: *const vk::ImageSubresourceRange,
        ) => v1_0.cmd_clear_color_image;

        fn cmd_set_event(
            command_buffer: vk::CommandBuffer,
            event: vk::Event,
            stage_mask: vk::PipelineStageFlags,
        ) => v1_0.cmd_set_event;
        fn cmd_reset_event(
            command_buffer: vk::CommandBuffer,
            event: vk::Event,
            stage_mask: vk::PipelineStageFlags,
        ) => v1_0.cmd_reset_event;

        fn get_query_pool_results(
            device: vk::Device,
            query_pool: vk::QueryPool,
            first_query: u32,
            query_count: u32,
            data_size: usize,
            p_data: *mut c_void,
            stride: vk::DeviceSize,
            flags: vk::QueryResultFlags,
        ) -> vk::Result => v1_0.get_query_pool_results;
        fn cmd_reset_query_pool(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            first_query: u32,
            query_count: u32,
        ) => v1_0.cmd_reset_query_pool;
        fn cmd_begin_query(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            query: u32,
            flags: vk::QueryControlFlags,
        ) => v1_0.cmd_begin_query;
        fn cmd_end_query(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            query: u32,
        ) => v1_0.cmd_end_query;
        fn cmd_write_timestamp(
            command_buffer: vk::CommandBuffer,
            pipeline_stage: vk::PipelineStageFlags,
            query_pool: vk::QueryPool,
            query: u32,
        ) => v1_0.cmd_write_timestamp;
        fn cmd_copy_query_pool_results(
            command_buffer: vk::CommandBuffer,
            query_pool: vk::QueryPool,
            first_query: u32,
            query_count: u32,
            dst_buffer: vk::Buffer,
            dst_offset: vk::DeviceSize,
            stride: vk::DeviceSize,
            flags: vk::QueryResultFlags,
        ) => v1_0.cmd_copy_query_pool_results;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateCommandPool(
        device: vk::Device,
        p_create_info: *const vk::CommandPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_command_pool: *mut vk::CommandPool,
    ) -> vk::Result => create_command_pool;
    fn vkDestroyCommandPool(
        device: vk::Device,
        command_pool: vk::CommandPool,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_command_pool;
    fn vkResetCommandPool(
        device: vk::Device,
        command_pool: vk::CommandPool,
        flags: vk::CommandPoolResetFlags,
    ) -> vk::Result => reset_command_pool;
    fn vkTrimCommandPool(
        device: vk::Device,
        command_pool: vk::CommandPool,
        flags: vk::CommandPoolTrimFlags,
    ) => trim_command_pool;
    fn vkAllocateCommandBuffers(
        device: vk::Device,
        p_allocate_info: *const vk::CommandBufferAllocateInfo<'_>,
        p_command_buffers: *mut vk::CommandBuffer,
    ) -> vk::Result => allocate_command_buffers;
    fn vkFreeCommandBuffers(
        device: vk::Device,
        command_pool: vk::CommandPool,
        command_buffer_count: u32,
        p_command_buffers: *const vk::CommandBuffer,
    ) => free_command_buffers;
    fn vkBeginCommandBuffer(
        command_buffer: vk::CommandBuffer,
        p_begin_info: *const vk::CommandBufferBeginInfo<'_>,
    ) -> vk::Result => begin_command_buffer;
    fn vkEndCommandBuffer(command_buffer: vk::CommandBuffer) -> vk::Result => end_command_buffer;
    fn vkResetCommandBuffer(
        command_buffer: vk::CommandBuffer,
        flags: vk::CommandBufferResetFlags,
    ) -> vk::Result => reset_command_buffer;
    fn vkCmdExecuteCommands(
        command_buffer: vk::CommandBuffer,
        command_buffer_count: u32,
        p_command_buffers: *const vk::CommandBuffer,
    ) => cmd_execute_commands;
    fn vkCmdBindPipeline(
        command_buffer: vk::CommandBuffer,
        pipeline_bind_point: vk::PipelineBindPoint,
        pipeline: vk::Pipeline,
    ) => cmd_bind_pipeline;
    fn vkCmdBindDescriptorSets(
        command_buffer: vk::CommandBuffer,
        pipeline_bind_point: vk::PipelineBindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        descriptor_set_count: u32,
        p_descriptor_sets: *const vk::DescriptorSet,
        dynamic_offset_count: u32,
        p_dynamic_offsets: *const u32,
    ) => cmd_bind_descriptor_sets;
    fn vkCmdBindVertexBuffers(
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        binding_count: u32,
        p_buffers: *const vk::Buffer,
        p_offsets: *const vk::DeviceSize,
    ) => cmd_bind_vertex_buffers;
    fn vkCmdBindIndexBuffer(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        index_type: vk::IndexType,
    ) => cmd_bind_index_buffer;
    fn vkCmdPushConstants(
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stage_flags: vk::ShaderStageFlags,
        offset: u32,
        size: u32,
        p_values: *const c_void,
    ) => cmd_push_constants;
    fn vkCmdSetViewport(
        command_buffer: vk::CommandBuffer,
        first_viewport: u32,
        viewport_count: u32,
        p_viewports: *const vk::Viewport,
    ) => cmd_set_viewport;
    fn vkCmdSetScissor(
        command_buffer: vk::CommandBuffer,
        first_scissor: u32,
        scissor_count: u32,
        p_scissors: *const vk::Rect2D,
    ) => cmd_set_scissor;
    fn vkCmdDraw(
        command_buffer: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) => cmd_draw;
    fn vkCmdDrawIndexed(
        command_buffer: vk::CommandBuffer,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) => cmd_draw_indexed;
    fn vkCmdDrawIndirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32,
    ) => cmd_draw_indirect;
    fn vkCmdDrawIndexedIndirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        draw_count: u32,
        stride: u32,
    ) => cmd_draw_indexed_indirect;
    fn vkCmdDispatch(
        command_buffer: vk::CommandBuffer,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) => cmd_dispatch;
    fn vkCmdDispatchIndirect(
        command_buffer: vk::CommandBuffer,
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
    ) => cmd_dispatch_indirect;
    fn vkCmdCopyBuffer(
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_buffer: vk::Buffer,
        region_count: u32,
        p_regions: *const vk::BufferCopy,
    ) => cmd_copy_buffer;
    fn vkCmdCopyImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageCopy,
    ) => cmd_copy_image;
    fn vkCmdBlitImage(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::ImageBlit,
        filter: vk::Filter,
    ) => cmd_blit_image;
    fn vkCmdCopyBufferToImage(
        command_buffer: vk::CommandBuffer,
        src_buffer: vk::Buffer,
        dst_image: vk::Image,
        dst_image_layout: vk::ImageLayout,
        region_count: u32,
        p_regions: *const vk::BufferImageCopy,
    ) => cmd_copy_buffer_to_image;
    fn vkCmdCopyImageToBuffer(
        command_buffer: vk::CommandBuffer,
        src_image: vk::Image,
        src_image_layout: vk::ImageLayout,
        dst_buffer: vk::Buffer,
        region_count: u32,
        p_regions: *const vk::BufferImageCopy,
    ) => cmd_copy_image_to_buffer;
    fn vkCmdFillBuffer(
        command_buffer: vk::CommandBuffer,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        size: vk::DeviceSize,
        data: u32,
    ) => cmd_fill_buffer;
    fn vkCmdUpdateBuffer(
        command_buffer: vk::CommandBuffer,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        data_size: vk::DeviceSize,
        p_data: *const c_void,
    ) => cmd_update_buffer;
    fn vkCmdClearColorImage(
        command_buffer: vk::CommandBuffer,
        image: vk::Image,
        image_layout: vk::ImageLayout,
        p_color: *const vk::ClearColorValue,
        range_count: u32,
        p_ranges: *const vk::ImageSubresourceRange,
    ) => cmd_clear_color_image;
    fn vkCmdPipelineBarrier(
        command_buffer: vk::CommandBuffer,
        src_stage_mask: vk::PipelineStageFlags,
        dst_stage_mask: vk::PipelineStageFlags,
        dependency_flags: vk::DependencyFlags,
        memory_barrier_count: u32,
        p_memory_barriers: *const vk::MemoryBarrier<'_>,
        buffer_memory_barrier_count: u32,
        p_buffer_memory_barriers: *const vk::BufferMemoryBarrier<'_>,
        image_memory_barrier_count: u32,
        p_image_memory_barriers: *const vk::ImageMemoryBarrier<'_>,
    ) => cmd_pipeline_barrier;
    fn vkCmdPipelineBarrier2(
        command_buffer: vk::CommandBuffer,
        p_dependency_info: *const vk::DependencyInfo<'_>,
    ) => cmd_pipeline_barrier2;
    fn vkCmdSetEvent(
        command_buffer: vk::CommandBuffer,
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags,
    ) => cmd_set_event;
    fn vkCmdResetEvent(
        command_buffer: vk::CommandBuffer,
        event: vk::Event,
        stage_mask: vk::PipelineStageFlags,
    ) => cmd_reset_event;
    fn vkCreateQueryPool(
        device: vk::Device,
        p_create_info: *const vk::QueryPoolCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_query_pool: *mut vk::QueryPool,
    ) -> vk::Result => create_query_pool;
    fn vkDestroyQueryPool(
        device: vk::Device,
        query_pool: vk::QueryPool,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_query_pool;
    fn vkGetQueryPoolResults(
        device: vk::Device,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        data_size: usize,
        p_data: *mut c_void,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags,
    ) -> vk::Result => get_query_pool_results;
    fn vkCmdResetQueryPool(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
    ) => cmd_reset_query_pool;
    fn vkCmdBeginQuery(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        query: u32,
        flags: vk::QueryControlFlags,
    ) => cmd_begin_query;
    fn vkCmdEndQuery(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        query: u32,
    ) => cmd_end_query;
    fn vkCmdWriteTimestamp(
        command_buffer: vk::CommandBuffer,
        pipeline_stage: vk::PipelineStageFlags,
        query_pool: vk::QueryPool,
        query: u32,
    ) => cmd_write_timestamp;
    fn vkCmdCopyQueryPoolResults(
        command_buffer: vk::CommandBuffer,
        query_pool: vk::QueryPool,
        first_query: u32,
        query_count: u32,
        dst_buffer: vk::Buffer,
        dst_offset: vk::DeviceSize,
        stride: vk::DeviceSize,
        flags: vk::QueryResultFlags,
    ) => cmd_copy_query_pool_results;
}

//! Render pass, framebuffer and dynamic rendering forwarding.

use ash::vk;

use crate::dispatch::DeviceData;
use crate::forward::{create_destroy, create_one, entry_points, forward_one};
use crate::unwrap::passthrough;

create_destroy! {
    create_render_pass / destroy_render_pass: RenderPassCreateInfo => RenderPass, v1_0;
    create_framebuffer / destroy_framebuffer: FramebufferCreateInfo => Framebuffer, v1_0;
}

impl DeviceData {
    pub unsafe fn create_render_pass2(
        &self,
        device: vk::Device,
        p_create_info: *const vk::RenderPassCreateInfo2<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_render_pass: *mut vk::RenderPass,
    ) -> vk::Result {
        create_one(self, p_create_info, p_render_pass, |info| {
            (self.table.v1_2.create_render_pass2)(device, info, p_allocator, p_render_pass)
        })
    }

    pub unsafe fn cmd_begin_render_pass(
        &self,
        command_buffer: vk::CommandBuffer,
        p_render_pass_begin: *const vk::RenderPassBeginInfo<'_>,
        contents: vk::SubpassContents,
    ) {
        forward_one(self, p_render_pass_begin, |begin| {
            (self.table.v1_0.cmd_begin_render_pass)(command_buffer, begin, contents)
        })
    }

    pub unsafe fn cmd_begin_render_pass2(
        &self,
        command_buffer: vk::CommandBuffer,
        p_render_pass_begin: *const vk::RenderPassBeginInfo<'_>,
        p_subpass_begin_info: *const vk::SubpassBeginInfo<'_>,
    ) {
        forward_one(self, p_render_pass_begin, |begin| {
            (self.table.v1_2.cmd_begin_render_pass2)(command_buffer, begin, p_subpass_begin_info)
        })
    }

    pub unsafe fn cmd_begin_rendering(
        &self,
        command_buffer: vk::CommandBuffer,
        p_rendering_info: *const vk::RenderingInfo<'_>,
    ) {
        forward_one(self, p_rendering_info, |info| {
            (self.table.v1_3.cmd_begin_rendering)(command_buffer, info)
        })
    }
}

passthrough! {
    impl DeviceData {
        fn get_render_area_granularity(
            device: vk::Device,
            render_pass: vk::RenderPass,
            p_granularity: *mut vk::Extent2D,
        ) => v1_0.get_render_area_granularity;
        fn cmd_next_subpass(
            command_buffer: vk::CommandBuffer,
            contents: vk::SubpassContents,
        ) => v1_0.cmd_next_subpass;
        fn cmd_end_render_pass(command_buffer: vk::CommandBuffer) => v1_0.cmd_end_render_pass;
        fn cmd_end_rendering(command_buffer: vk::CommandBuffer) => v1_3.cmd_end_rendering;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateRenderPass(
        device: vk::Device,
        p_create_info: *const vk::RenderPassCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_render_pass: *mut vk::RenderPass,
    ) -> vk::Result => create_render_pass;
    fn vkCreateRenderPass2(
        device: vk::Device,
        p_create_info: *const vk::RenderPassCreateInfo2<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_render_pass: *mut vk::RenderPass,
    ) -> vk::Result => create_render_pass2;
    fn vkDestroyRenderPass(
        device: vk::Device,
        render_pass: vk::RenderPass,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_render_pass;
    fn vkGetRenderAreaGranularity(
        device: vk::Device,
        render_pass: vk::RenderPass,
        p_granularity: *mut vk::Extent2D,
    ) => get_render_area_granularity;
    fn vkCreateFramebuffer(
        device: vk::Device,
        p_create_info: *const vk::FramebufferCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_framebuffer: *mut vk::Framebuffer,
    ) -> vk::Result => create_framebuffer;
    fn vkDestroyFramebuffer(
        device: vk::Device,
        framebuffer: vk::Framebuffer,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_framebuffer;
    fn vkCmdBeginRenderPass(
        command_buffer: vk::CommandBuffer,
        p_render_pass_begin: *const vk::RenderPassBeginInfo<'_>,
        contents: vk::SubpassContents,
    ) => cmd_begin_render_pass;
    fn vkCmdBeginRenderPass2(
        command_buffer: vk::CommandBuffer,
        p_render_pass_begin: *const vk::RenderPassBeginInfo<'_>,
        p_subpass_begin_info: *const vk::SubpassBeginInfo<'_>,
    ) => cmd_begin_render_pass2;
    fn vkCmdNextSubpass(
        command_buffer: vk::CommandBuffer,
        contents: vk::SubpassContents,
    ) => cmd_next_subpass;
    fn vkCmdEndRenderPass(command_buffer: vk::CommandBuffer) => cmd_end_render_pass;
    fn vkCmdBeginRendering(
        command_buffer: vk::CommandBuffer,
        p_rendering_info: *const vk::RenderingInfo<'_>,
    ) => cmd_begin_rendering;
    fn vkCmdEndRendering(command_buffer: vk::CommandBuffer) => cmd_end_rendering;
}

//! Shader module, pipeline cache, pipeline layout and pipeline forwarding.
//!
//! Graphics and compute pipeline creation may fail for some create infos
//! while succeeding for others; the driver writes null for the failures, so
//! every non-null output is wrapped regardless of the returned code.

use std::ffi::c_void;

use ash::vk;

use crate::dispatch::{DeviceData, LayerContext};
use crate::forward::{create_destroy, create_many, destroy_one, entry_points};
use crate::scratch::Scratch;
use crate::unwrap::passthrough;

create_destroy! {
    create_shader_module / destroy_shader_module: ShaderModuleCreateInfo => ShaderModule, v1_0;
    create_pipeline_cache / destroy_pipeline_cache: PipelineCacheCreateInfo => PipelineCache, v1_0;
    create_pipeline_layout / destroy_pipeline_layout: PipelineLayoutCreateInfo => PipelineLayout, v1_0;
}

impl DeviceData {
    pub unsafe fn merge_pipeline_caches(
        &self,
        device: vk::Device,
        dst_cache: vk::PipelineCache,
        src_cache_count: u32,
        p_src_caches: *const vk::PipelineCache,
    ) -> vk::Result {
        let merge_pipeline_caches = self.table.v1_0.merge_pipeline_caches;
        if !self.wrap_handles() {
            return merge_pipeline_caches(device, dst_cache, src_cache_count, p_src_caches);
        }
        let scratch = Scratch::new();
        let cx = self.unwrapper(&scratch);
        let src_caches = cx.handles(p_src_caches, src_cache_count);
        merge_pipeline_caches(device, cx.handle(dst_cache), src_cache_count, src_caches)
    }

    pub unsafe fn create_graphics_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::GraphicsPipelineCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result {
        let cache = self.unwrapped(pipeline_cache);
        create_many(self, p_create_infos, create_info_count, p_pipelines, |infos| {
            (self.table.v1_0.create_graphics_pipelines)(
                device,
                cache,
                create_info_count,
                infos,
                p_allocator,
                p_pipelines,
            )
        })
    }

    pub unsafe fn create_compute_pipelines(
        &self,
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::ComputePipelineCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result {
        let cache = self.unwrapped(pipeline_cache);
        create_many(self, p_create_infos, create_info_count, p_pipelines, |infos| {
            (self.table.v1_0.create_compute_pipelines)(
                device,
                cache,
                create_info_count,
                infos,
                p_allocator,
                p_pipelines,
            )
        })
    }

    pub unsafe fn destroy_pipeline(
        &self,
        device: vk::Device,
        pipeline: vk::Pipeline,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, pipeline, |pipeline| {
            (self.table.v1_0.destroy_pipeline)(device, pipeline, p_allocator)
        })
    }
}

passthrough! {
    impl DeviceData {
        fn get_pipeline_cache_data(
            device: vk::Device,
            pipeline_cache: vk::PipelineCache,
            p_data_size: *mut usize,
            p_data: *mut c_void,
        ) -> vk::Result => v1_0.get_pipeline_cache_data;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateShaderModule(
        device: vk::Device,
        p_create_info: *const vk::ShaderModuleCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_shader_module: *mut vk::ShaderModule,
    ) -> vk::Result => create_shader_module;
    fn vkDestroyShaderModule(
        device: vk::Device,
        shader_module: vk::ShaderModule,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_shader_module;
    fn vkCreatePipelineCache(
        device: vk::Device,
        p_create_info: *const vk::PipelineCacheCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipeline_cache: *mut vk::PipelineCache,
    ) -> vk::Result => create_pipeline_cache;
    fn vkDestroyPipelineCache(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_pipeline_cache;
    fn vkGetPipelineCacheData(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        p_data_size: *mut usize,
        p_data: *mut c_void,
    ) -> vk::Result => get_pipeline_cache_data;
    fn vkMergePipelineCaches(
        device: vk::Device,
        dst_cache: vk::PipelineCache,
        src_cache_count: u32,
        p_src_caches: *const vk::PipelineCache,
    ) -> vk::Result => merge_pipeline_caches;
    fn vkCreatePipelineLayout(
        device: vk::Device,
        p_create_info: *const vk::PipelineLayoutCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipeline_layout: *mut vk::PipelineLayout,
    ) -> vk::Result => create_pipeline_layout;
    fn vkDestroyPipelineLayout(
        device: vk::Device,
        pipeline_layout: vk::PipelineLayout,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_pipeline_layout;
    fn vkCreateGraphicsPipelines(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::GraphicsPipelineCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result => create_graphics_pipelines;
    fn vkCreateComputePipelines(
        device: vk::Device,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::ComputePipelineCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result => create_compute_pipelines;
    fn vkDestroyPipeline(
        device: vk::Device,
        pipeline: vk::Pipeline,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_pipeline;
}

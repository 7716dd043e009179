//! Acceleration structure, ray tracing pipeline and deferred host operation
//! forwarding.
//!
//! Host-side builds, copies and ray tracing pipeline creation may return
//! `VK_OPERATION_DEFERRED_KHR`, in which case the driver keeps reading the
//! unwrapped copies after the call returns. Their scratch arena is handed to
//! [`DeferredOperations`](crate::deferred::DeferredOperations) and freed when
//! the operation is observed complete.

use std::ffi::c_void;

use ash::vk;
use ash::vk::Handle;
use vkchassis_core::HandleTranslator;

use crate::dispatch::{DeviceData, LayerContext};
use crate::forward::{create_destroy, entry_points, forward_one, forward_structs, wrap_outputs};
use crate::scratch::Scratch;
use crate::unwrap::{passthrough, Unwrapper};

create_destroy! {
    create_acceleration_structure_khr / destroy_acceleration_structure_khr:
        AccelerationStructureCreateInfoKHR => AccelerationStructureKHR, acceleration_structure;
}

/// Pipeline output array the driver fills in once a deferred creation ends.
struct DeferredPipelines {
    ptr: *mut vk::Pipeline,
    count: u32,
}

// The application keeps the output array alive until the operation completes.
unsafe impl Send for DeferredPipelines {}

impl DeferredPipelines {
    unsafe fn wrap(self, translator: &HandleTranslator) {
        wrap_outputs(translator, self.ptr, self.count);
    }
}

impl DeviceData {
    /// Run a deferrable command against a fresh scratch arena. If the driver
    /// defers, the arena moves to the operation instead of dropping here.
    unsafe fn deferrable(
        &self,
        deferred_operation: vk::DeferredOperationKHR,
        call: impl FnOnce(&Unwrapper<'_>, vk::DeferredOperationKHR) -> vk::Result,
    ) -> vk::Result {
        let scratch = Scratch::new();
        let result = {
            let cx = self.unwrapper(&scratch);
            call(&cx, cx.handle(deferred_operation))
        };
        if result == vk::Result::OPERATION_DEFERRED_KHR && deferred_operation != vk::DeferredOperationKHR::null() {
            tracing::debug!(
                bytes = scratch.allocated_bytes(),
                "deferring scratch to operation {:#x}",
                deferred_operation.as_raw()
            );
            self.deferred().defer(deferred_operation.as_raw(), scratch);
        }
        result
    }

    // ── Deferred operations ─────────────────────────────────

    pub unsafe fn create_deferred_operation_khr(
        &self,
        device: vk::Device,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_deferred_operation: *mut vk::DeferredOperationKHR,
    ) -> vk::Result {
        let result =
            (self.table.deferred_host_operations.create_deferred_operation_khr)(device, p_allocator, p_deferred_operation);
        if result == vk::Result::SUCCESS && self.wrap_handles() && !p_deferred_operation.is_null() {
            *p_deferred_operation = self.translator().wrap(*p_deferred_operation);
            self.deferred().track((*p_deferred_operation).as_raw());
        }
        result
    }

    pub unsafe fn destroy_deferred_operation_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        let destroy_deferred_operation_khr = self.table.deferred_host_operations.destroy_deferred_operation_khr;
        if !self.wrap_handles() {
            return destroy_deferred_operation_khr(device, operation, p_allocator);
        }
        self.deferred().complete(operation.as_raw(), self.translator());
        destroy_deferred_operation_khr(device, self.translator().pop_handle(operation), p_allocator)
    }

    pub unsafe fn deferred_operation_join_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
    ) -> vk::Result {
        let deferred_operation_join_khr = self.table.deferred_host_operations.deferred_operation_join_khr;
        if !self.wrap_handles() {
            return deferred_operation_join_khr(device, operation);
        }
        let result = deferred_operation_join_khr(device, self.translator().unwrap_handle(operation));
        // THREAD_DONE and THREAD_IDLE mean other threads still hold the work
        if result == vk::Result::SUCCESS {
            self.deferred().complete(operation.as_raw(), self.translator());
        }
        result
    }

    pub unsafe fn get_deferred_operation_result_khr(
        &self,
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
    ) -> vk::Result {
        let get_deferred_operation_result_khr = self.table.deferred_host_operations.get_deferred_operation_result_khr;
        if !self.wrap_handles() {
            return get_deferred_operation_result_khr(device, operation);
        }
        let result = get_deferred_operation_result_khr(device, self.translator().unwrap_handle(operation));
        if result != vk::Result::NOT_READY {
            self.deferred().complete(operation.as_raw(), self.translator());
        }
        result
    }

    // ── Host builds and copies ──────────────────────────────

    pub unsafe fn build_acceleration_structures_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        info_count: u32,
        p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
        pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
    ) -> vk::Result {
        let build_acceleration_structures_khr = self.table.acceleration_structure.build_acceleration_structures_khr;
        if !self.wrap_handles() {
            return build_acceleration_structures_khr(
                device,
                deferred_operation,
                info_count,
                p_infos,
                pp_build_range_infos,
            );
        }
        self.deferrable(deferred_operation, |cx, op| {
            build_acceleration_structures_khr(device, op, info_count, cx.structs(p_infos, info_count), pp_build_range_infos)
        })
    }

    pub unsafe fn copy_acceleration_structure_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        p_info: *const vk::CopyAccelerationStructureInfoKHR<'_>,
    ) -> vk::Result {
        let copy_acceleration_structure_khr = self.table.acceleration_structure.copy_acceleration_structure_khr;
        if !self.wrap_handles() {
            return copy_acceleration_structure_khr(device, deferred_operation, p_info);
        }
        self.deferrable(deferred_operation, |cx, op| {
            copy_acceleration_structure_khr(device, op, cx.one(p_info))
        })
    }

    pub unsafe fn copy_acceleration_structure_to_memory_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        p_info: *const vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
    ) -> vk::Result {
        let copy = self.table.acceleration_structure.copy_acceleration_structure_to_memory_khr;
        if !self.wrap_handles() {
            return copy(device, deferred_operation, p_info);
        }
        self.deferrable(deferred_operation, |cx, op| copy(device, op, cx.one(p_info)))
    }

    pub unsafe fn copy_memory_to_acceleration_structure_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        p_info: *const vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
    ) -> vk::Result {
        let copy = self.table.acceleration_structure.copy_memory_to_acceleration_structure_khr;
        if !self.wrap_handles() {
            return copy(device, deferred_operation, p_info);
        }
        self.deferrable(deferred_operation, |cx, op| copy(device, op, cx.one(p_info)))
    }

    pub unsafe fn get_acceleration_structure_device_address_khr(
        &self,
        device: vk::Device,
        p_info: *const vk::AccelerationStructureDeviceAddressInfoKHR<'_>,
    ) -> vk::DeviceAddress {
        forward_one(self, p_info, |info| {
            (self.table.acceleration_structure.get_acceleration_structure_device_address_khr)(device, info)
        })
    }

    pub unsafe fn get_acceleration_structure_build_sizes_khr(
        &self,
        device: vk::Device,
        build_type: vk::AccelerationStructureBuildTypeKHR,
        p_build_info: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
        p_max_primitive_counts: *const u32,
        p_size_info: *mut vk::AccelerationStructureBuildSizesInfoKHR<'_>,
    ) {
        forward_one(self, p_build_info, |info| {
            (self.table.acceleration_structure.get_acceleration_structure_build_sizes_khr)(
                device,
                build_type,
                info,
                p_max_primitive_counts,
                p_size_info,
            )
        })
    }

    // ── Device-side builds and copies ───────────────────────

    pub unsafe fn cmd_build_acceleration_structures_khr(
        &self,
        command_buffer: vk::CommandBuffer,
        info_count: u32,
        p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
        pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
    ) {
        forward_structs(self, p_infos, info_count, |infos| {
            (self.table.acceleration_structure.cmd_build_acceleration_structures_khr)(
                command_buffer,
                info_count,
                infos,
                pp_build_range_infos,
            )
        })
    }

    pub unsafe fn cmd_copy_acceleration_structure_khr(
        &self,
        command_buffer: vk::CommandBuffer,
        p_info: *const vk::CopyAccelerationStructureInfoKHR<'_>,
    ) {
        forward_one(self, p_info, |info| {
            (self.table.acceleration_structure.cmd_copy_acceleration_structure_khr)(command_buffer, info)
        })
    }

    pub unsafe fn cmd_copy_acceleration_structure_to_memory_khr(
        &self,
        command_buffer: vk::CommandBuffer,
        p_info: *const vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
    ) {
        forward_one(self, p_info, |info| {
            (self.table.acceleration_structure.cmd_copy_acceleration_structure_to_memory_khr)(command_buffer, info)
        })
    }

    pub unsafe fn cmd_copy_memory_to_acceleration_structure_khr(
        &self,
        command_buffer: vk::CommandBuffer,
        p_info: *const vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
    ) {
        forward_one(self, p_info, |info| {
            (self.table.acceleration_structure.cmd_copy_memory_to_acceleration_structure_khr)(command_buffer, info)
        })
    }

    // ── Ray tracing pipelines ───────────────────────────────

    /// Outputs are wrapped as soon as they exist: right away when the driver
    /// finishes inline, or when the deferred operation completes.
    pub unsafe fn create_ray_tracing_pipelines_khr(
        &self,
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::RayTracingPipelineCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result {
        let create_ray_tracing_pipelines_khr = self.table.ray_tracing_pipeline.create_ray_tracing_pipelines_khr;
        if !self.wrap_handles() {
            return create_ray_tracing_pipelines_khr(
                device,
                deferred_operation,
                pipeline_cache,
                create_info_count,
                p_create_infos,
                p_allocator,
                p_pipelines,
            );
        }
        let result = self.deferrable(deferred_operation, |cx, op| {
            create_ray_tracing_pipelines_khr(
                device,
                op,
                cx.handle(pipeline_cache),
                create_info_count,
                cx.structs(p_create_infos, create_info_count),
                p_allocator,
                p_pipelines,
            )
        });
        if result == vk::Result::OPERATION_DEFERRED_KHR && deferred_operation != vk::DeferredOperationKHR::null() {
            let outputs = DeferredPipelines { ptr: p_pipelines, count: create_info_count };
            self.deferred().on_complete(
                deferred_operation.as_raw(),
                Box::new(move |translator: &HandleTranslator| unsafe { outputs.wrap(translator) }),
            );
        } else {
            wrap_outputs(self.translator(), p_pipelines, create_info_count);
        }
        result
    }
}

passthrough! {
    impl DeviceData {
        fn get_deferred_operation_max_concurrency_khr(
            device: vk::Device,
            operation: vk::DeferredOperationKHR,
        ) -> u32 => deferred_host_operations.get_deferred_operation_max_concurrency_khr;
        fn get_ray_tracing_shader_group_handles_khr(
            device: vk::Device,
            pipeline: vk::Pipeline,
            first_group: u32,
            group_count: u32,
            data_size: usize,
            p_data: *mut c_void,
        ) -> vk::Result => ray_tracing_pipeline.get_ray_tracing_shader_group_handles_khr;
        fn cmd_trace_rays_khr(
            command_buffer: vk::CommandBuffer,
            p_raygen_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
            p_miss_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
            p_hit_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
            p_callable_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
            width: u32,
            height: u32,
            depth: u32,
        ) => ray_tracing_pipeline.cmd_trace_rays_khr;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateDeferredOperationKHR(
        device: vk::Device,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_deferred_operation: *mut vk::DeferredOperationKHR,
    ) -> vk::Result => create_deferred_operation_khr;
    fn vkDestroyDeferredOperationKHR(
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_deferred_operation_khr;
    fn vkDeferredOperationJoinKHR(
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
    ) -> vk::Result => deferred_operation_join_khr;
    fn vkGetDeferredOperationResultKHR(
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
    ) -> vk::Result => get_deferred_operation_result_khr;
    fn vkGetDeferredOperationMaxConcurrencyKHR(
        device: vk::Device,
        operation: vk::DeferredOperationKHR,
    ) -> u32 => get_deferred_operation_max_concurrency_khr;
    fn vkCreateAccelerationStructureKHR(
        device: vk::Device,
        p_create_info: *const vk::AccelerationStructureCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_acceleration_structure: *mut vk::AccelerationStructureKHR,
    ) -> vk::Result => create_acceleration_structure_khr;
    fn vkDestroyAccelerationStructureKHR(
        device: vk::Device,
        acceleration_structure: vk::AccelerationStructureKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_acceleration_structure_khr;
    fn vkGetAccelerationStructureDeviceAddressKHR(
        device: vk::Device,
        p_info: *const vk::AccelerationStructureDeviceAddressInfoKHR<'_>,
    ) -> vk::DeviceAddress => get_acceleration_structure_device_address_khr;
    fn vkGetAccelerationStructureBuildSizesKHR(
        device: vk::Device,
        build_type: vk::AccelerationStructureBuildTypeKHR,
        p_build_info: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
        p_max_primitive_counts: *const u32,
        p_size_info: *mut vk::AccelerationStructureBuildSizesInfoKHR<'_>,
    ) => get_acceleration_structure_build_sizes_khr;
    fn vkBuildAccelerationStructuresKHR(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        info_count: u32,
        p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
        pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
    ) -> vk::Result => build_acceleration_structures_khr;
    fn vkCopyAccelerationStructureKHR(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        p_info: *const vk::CopyAccelerationStructureInfoKHR<'_>,
    ) -> vk::Result => copy_acceleration_structure_khr;
    fn vkCopyAccelerationStructureToMemoryKHR(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        p_info: *const vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
    ) -> vk::Result => copy_acceleration_structure_to_memory_khr;
    fn vkCopyMemoryToAccelerationStructureKHR(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        p_info: *const vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
    ) -> vk::Result => copy_memory_to_acceleration_structure_khr;
    fn vkCmdBuildAccelerationStructuresKHR(
        command_buffer: vk::CommandBuffer,
        info_count: u32,
        p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
        pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
    ) => cmd_build_acceleration_structures_khr;
    fn vkCmdCopyAccelerationStructureKHR(
        command_buffer: vk::CommandBuffer,
        p_info: *const vk::CopyAccelerationStructureInfoKHR<'_>,
    ) => cmd_copy_acceleration_structure_khr;
    fn vkCmdCopyAccelerationStructureToMemoryKHR(
        command_buffer: vk::CommandBuffer,
        p_info: *const vk::CopyAccelerationStructureToMemoryInfoKHR<'_>,
    ) => cmd_copy_acceleration_structure_to_memory_khr;
    fn vkCmdCopyMemoryToAccelerationStructureKHR(
        command_buffer: vk::CommandBuffer,
        p_info: *const vk::CopyMemoryToAccelerationStructureInfoKHR<'_>,
    ) => cmd_copy_memory_to_acceleration_structure_khr;
    fn vkCreateRayTracingPipelinesKHR(
        device: vk::Device,
        deferred_operation: vk::DeferredOperationKHR,
        pipeline_cache: vk::PipelineCache,
        create_info_count: u32,
        p_create_infos: *const vk::RayTracingPipelineCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_pipelines: *mut vk::Pipeline,
    ) -> vk::Result => create_ray_tracing_pipelines_khr;
    fn vkGetRayTracingShaderGroupHandlesKHR(
        device: vk::Device,
        pipeline: vk::Pipeline,
        first_group: u32,
        group_count: u32,
        data_size: usize,
        p_data: *mut c_void,
    ) -> vk::Result => get_ray_tracing_shader_group_handles_khr;
    fn vkCmdTraceRaysKHR(
        command_buffer: vk::CommandBuffer,
        p_raygen_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_miss_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_hit_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        p_callable_shader_binding_table: *const vk::StridedDeviceAddressRegionKHR,
        width: u32,
        height: u32,
        depth: u32,
    ) => cmd_trace_rays_khr;
}

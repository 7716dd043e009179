//! [`UnwrapHandles`] for every input structure the layer forwards.

use ash::vk;

use crate::unwrap::{unwrap_struct, UnwrapHandles, Unwrapper};

unwrap_struct! {
    // ── Memory and resources ────────────────────────────────
    vk::MemoryAllocateInfo<'_> { next p_next }
    vk::MappedMemoryRange<'_> { next p_next, handle memory }
    vk::BindBufferMemoryInfo<'_> { next p_next, handle buffer, handle memory }
    vk::BindImageMemoryInfo<'_> { next p_next, handle image, handle memory }
    vk::MemoryDedicatedAllocateInfo<'_> { next p_next, handle image, handle buffer }
    vk::DedicatedAllocationMemoryAllocateInfoNV<'_> { next p_next, handle image, handle buffer }
    vk::BufferCreateInfo<'_> { next p_next }
    vk::BufferViewCreateInfo<'_> { next p_next, handle buffer }
    vk::BufferDeviceAddressInfo<'_> { next p_next, handle buffer }
    vk::BufferMemoryRequirementsInfo2<'_> { next p_next, handle buffer }
    vk::ImageMemoryRequirementsInfo2<'_> { next p_next, handle image }
    vk::ImageCreateInfo<'_> { next p_next }
    vk::ImageViewCreateInfo<'_> { next p_next, handle image }
    vk::SamplerCreateInfo<'_> { next p_next }
    vk::SamplerYcbcrConversionInfo<'_> { next p_next, handle conversion }
    vk::SamplerYcbcrConversionCreateInfo<'_> { next p_next }

    // ── Synchronization ─────────────────────────────────────
    vk::FenceCreateInfo<'_> { next p_next }
    vk::SemaphoreCreateInfo<'_> { next p_next }
    vk::EventCreateInfo<'_> { next p_next }
    vk::QueryPoolCreateInfo<'_> { next p_next }
    vk::SemaphoreWaitInfo<'_> { next p_next, handles p_semaphores[semaphore_count] }
    vk::SemaphoreSignalInfo<'_> { next p_next, handle semaphore }
    vk::SubmitInfo<'_> {
        next p_next,
        handles p_wait_semaphores[wait_semaphore_count],
        handles p_signal_semaphores[signal_semaphore_count],
    }
    vk::SemaphoreSubmitInfo<'_> { next p_next, handle semaphore }
    vk::SubmitInfo2<'_> {
        next p_next,
        structs p_wait_semaphore_infos[wait_semaphore_info_count],
        structs p_signal_semaphore_infos[signal_semaphore_info_count],
    }
    vk::BufferMemoryBarrier<'_> { next p_next, handle buffer }
    vk::ImageMemoryBarrier<'_> { next p_next, handle image }
    vk::BufferMemoryBarrier2<'_> { next p_next, handle buffer }
    vk::ImageMemoryBarrier2<'_> { next p_next, handle image }
    vk::DependencyInfo<'_> {
        next p_next,
        structs p_buffer_memory_barriers[buffer_memory_barrier_count],
        structs p_image_memory_barriers[image_memory_barrier_count],
    }

    // ── Descriptors and layouts ─────────────────────────────
    vk::DescriptorSetLayoutCreateInfo<'_> { next p_next, structs p_bindings[binding_count] }
    vk::PipelineLayoutCreateInfo<'_> { next p_next, handles p_set_layouts[set_layout_count] }
    vk::DescriptorPoolCreateInfo<'_> { next p_next }
    vk::DescriptorSetAllocateInfo<'_> {
        next p_next,
        handle descriptor_pool,
        handles p_set_layouts[descriptor_set_count],
    }
    vk::DescriptorBufferInfo { handle buffer }
    vk::CopyDescriptorSet<'_> { next p_next, handle src_set, handle dst_set }
    vk::WriteDescriptorSetAccelerationStructureKHR<'_> {
        next p_next,
        handles p_acceleration_structures[acceleration_structure_count],
    }

    // ── Pipelines ───────────────────────────────────────────
    vk::ShaderModuleCreateInfo<'_> { next p_next }
    vk::PipelineCacheCreateInfo<'_> { next p_next }
    vk::PipelineShaderStageCreateInfo<'_> { next p_next, handle module }
    vk::ComputePipelineCreateInfo<'_> {
        next p_next,
        inline stage,
        handle layout,
        handle base_pipeline_handle,
    }
    vk::GraphicsPipelineCreateInfo<'_> {
        next p_next,
        structs p_stages[stage_count],
        handle layout,
        handle render_pass,
        handle base_pipeline_handle,
    }
    vk::PipelineLibraryCreateInfoKHR<'_> { next p_next, handles p_libraries[library_count] }
    vk::GraphicsShaderGroupCreateInfoNV<'_> { next p_next, structs p_stages[stage_count] }
    vk::GraphicsPipelineShaderGroupsCreateInfoNV<'_> {
        next p_next,
        structs p_groups[group_count],
        handles p_pipelines[pipeline_count],
    }
    vk::RayTracingPipelineCreateInfoKHR<'_> {
        next p_next,
        structs p_stages[stage_count],
        one p_library_info,
        handle layout,
        handle base_pipeline_handle,
    }

    // ── Render passes ───────────────────────────────────────
    vk::RenderPassCreateInfo<'_> { next p_next }
    vk::RenderPassCreateInfo2<'_> { next p_next }
    vk::RenderPassBeginInfo<'_> { next p_next, handle render_pass, handle framebuffer }
    vk::RenderPassAttachmentBeginInfo<'_> { next p_next, handles p_attachments[attachment_count] }
    vk::RenderingAttachmentInfo<'_> { next p_next, handle image_view, handle resolve_image_view }
    vk::RenderingInfo<'_> {
        next p_next,
        structs p_color_attachments[color_attachment_count],
        one p_depth_attachment,
        one p_stencil_attachment,
    }
    vk::RenderingFragmentShadingRateAttachmentInfoKHR<'_> { next p_next, handle image_view }
    vk::RenderingFragmentDensityMapAttachmentInfoEXT<'_> { next p_next, handle image_view }

    // ── Command buffers ─────────────────────────────────────
    vk::CommandPoolCreateInfo<'_> { next p_next }
    vk::CommandBufferAllocateInfo<'_> { next p_next, handle command_pool }
    vk::CommandBufferInheritanceInfo<'_> { next p_next, handle render_pass, handle framebuffer }

    // ── Presentation ────────────────────────────────────────
    vk::SwapchainCreateInfoKHR<'_> { next p_next, handle surface, handle old_swapchain }
    vk::PresentInfoKHR<'_> {
        next p_next,
        handles p_wait_semaphores[wait_semaphore_count],
        handles p_swapchains[swapchain_count],
    }
    vk::SwapchainPresentFenceInfoEXT<'_> { next p_next, handles p_fences[swapchain_count] }
    vk::AcquireNextImageInfoKHR<'_> { next p_next, handle swapchain, handle semaphore, handle fence }
    vk::ImageSwapchainCreateInfoKHR<'_> { next p_next, handle swapchain }
    vk::BindImageMemorySwapchainInfoKHR<'_> { next p_next, handle swapchain }
    vk::HeadlessSurfaceCreateInfoEXT<'_> { next p_next }

    // ── Acceleration structures ─────────────────────────────
    vk::AccelerationStructureCreateInfoKHR<'_> { next p_next, handle buffer }
    vk::AccelerationStructureBuildGeometryInfoKHR<'_> {
        next p_next,
        handle src_acceleration_structure,
        handle dst_acceleration_structure,
    }
    vk::CopyAccelerationStructureInfoKHR<'_> { next p_next, handle src, handle dst }
    vk::CopyAccelerationStructureToMemoryInfoKHR<'_> { next p_next, handle src }
    vk::CopyMemoryToAccelerationStructureInfoKHR<'_> { next p_next, handle dst }
    vk::AccelerationStructureDeviceAddressInfoKHR<'_> { next p_next, handle acceleration_structure }

    // ── Debug ───────────────────────────────────────────────
    vk::DebugUtilsMessengerCreateInfoEXT<'_> { next p_next }
}

#[cfg(windows)]
unwrap_struct! {
    vk::Win32SurfaceCreateInfoKHR<'_> { next p_next }
    vk::Win32KeyedMutexAcquireReleaseInfoKHR<'_> {
        next p_next,
        handles p_acquire_syncs[acquire_count],
        handles p_release_syncs[release_count],
    }
    vk::Win32KeyedMutexAcquireReleaseInfoNV<'_> {
        next p_next,
        handles p_acquire_syncs[acquire_count],
        handles p_release_syncs[release_count],
    }
}

#[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
unwrap_struct! {
    vk::WaylandSurfaceCreateInfoKHR<'_> { next p_next }
}

#[cfg(any(target_os = "macos", target_os = "ios"))]
unwrap_struct! {
    vk::ExportMetalBufferInfoEXT<'_> { next p_next, handle memory }
    vk::ExportMetalTextureInfoEXT<'_> {
        next p_next,
        handle image,
        handle image_view,
        handle buffer_view,
    }
    vk::ExportMetalIOSurfaceInfoEXT<'_> { next p_next, handle image }
    vk::ExportMetalSharedEventInfoEXT<'_> { next p_next, handle semaphore, handle event }
}

// ── Irregular shapes ────────────────────────────────────────

fn is_sampler_type(ty: vk::DescriptorType) -> bool {
    matches!(
        ty,
        vk::DescriptorType::SAMPLER | vk::DescriptorType::COMBINED_IMAGE_SAMPLER
    )
}

// Immutable samplers are only read for sampler descriptor types; any other
// binding may carry a stale pointer.
impl UnwrapHandles for vk::DescriptorSetLayoutBinding<'_> {
    unsafe fn unwrap_handles(&mut self, cx: &Unwrapper<'_>) {
        if is_sampler_type(self.descriptor_type) {
            self.p_immutable_samplers = cx.handles(self.p_immutable_samplers, self.descriptor_count);
        }
    }
}

// The descriptor type selects which of the three payload arrays is live,
// and within image infos which of sampler and view are read.
impl UnwrapHandles for vk::WriteDescriptorSet<'_> {
    unsafe fn unwrap_handles(&mut self, cx: &Unwrapper<'_>) {
        self.p_next = cx.chain(self.p_next);
        self.dst_set = cx.handle(self.dst_set);
        match self.descriptor_type {
            vk::DescriptorType::SAMPLER
            | vk::DescriptorType::COMBINED_IMAGE_SAMPLER
            | vk::DescriptorType::SAMPLED_IMAGE
            | vk::DescriptorType::STORAGE_IMAGE
            | vk::DescriptorType::INPUT_ATTACHMENT => {
                let ty = self.descriptor_type;
                let Some(infos) = cx.copy_slice(self.p_image_info, self.descriptor_count) else {
                    return;
                };
                for info in infos.iter_mut() {
                    if is_sampler_type(ty) {
                        info.sampler = cx.handle(info.sampler);
                    }
                    if ty != vk::DescriptorType::SAMPLER {
                        info.image_view = cx.handle(info.image_view);
                    }
                }
                self.p_image_info = infos.as_ptr();
            }
            vk::DescriptorType::UNIFORM_BUFFER
            | vk::DescriptorType::STORAGE_BUFFER
            | vk::DescriptorType::UNIFORM_BUFFER_DYNAMIC
            | vk::DescriptorType::STORAGE_BUFFER_DYNAMIC => {
                self.p_buffer_info = cx.structs(self.p_buffer_info, self.descriptor_count);
            }
            vk::DescriptorType::UNIFORM_TEXEL_BUFFER | vk::DescriptorType::STORAGE_TEXEL_BUFFER => {
                self.p_texel_buffer_view = cx.handles(self.p_texel_buffer_view, self.descriptor_count);
            }
            // inline uniform blocks and acceleration structures ride in pNext
            _ => {}
        }
    }
}

// Attachments are ignored for imageless framebuffers.
impl UnwrapHandles for vk::FramebufferCreateInfo<'_> {
    unsafe fn unwrap_handles(&mut self, cx: &Unwrapper<'_>) {
        self.p_next = cx.chain(self.p_next);
        self.render_pass = cx.handle(self.render_pass);
        if !self.flags.contains(vk::FramebufferCreateFlags::IMAGELESS) {
            self.p_attachments = cx.handles(self.p_attachments, self.attachment_count);
        }
    }
}

// Dispatchable objects are never wrapped, and names may be attached to
// objects created before the layer saw them, so a miss keeps the raw value.
impl UnwrapHandles for vk::DebugUtilsObjectNameInfoEXT<'_> {
    unsafe fn unwrap_handles(&mut self, cx: &Unwrapper<'_>) {
        self.p_next = cx.chain(self.p_next);
        if is_dispatchable(self.object_type) {
            return;
        }
        if let Ok(inner) = cx.translator().try_unwrap(self.object_handle) {
            self.object_handle = inner;
        }
    }
}

pub(crate) fn is_dispatchable(ty: vk::ObjectType) -> bool {
    matches!(
        ty,
        vk::ObjectType::INSTANCE
            | vk::ObjectType::PHYSICAL_DEVICE
            | vk::ObjectType::DEVICE
            | vk::ObjectType::QUEUE
            | vk::ObjectType::COMMAND_BUFFER
    )
}

//! Integration test: forwarders
//!
//! Drives device-level forwarders against the mock next layer and checks
//! what actually reached it: wrapped outputs, unwrapped inputs, implicit
//! child bookkeeping and the pass-through fast path.
//!
//! Run with: cargo test --test forwarding_test

mod common;

use std::ffi::c_void;
use std::ptr;

use ash::vk;
use ash::vk::Handle;
use vkchassis_layer::dispatch::{DeviceData, LayerContext};

use common::{device, last_call, queue};

unsafe fn create_buffer(data: &DeviceData) -> (vk::Buffer, u64) {
    let info = vk::BufferCreateInfo::default()
        .size(256)
        .usage(vk::BufferUsageFlags::UNIFORM_BUFFER);
    let mut buffer = vk::Buffer::null();
    let result = data.create_buffer(device(), &info, ptr::null(), &mut buffer);
    assert_eq!(result, vk::Result::SUCCESS);
    (buffer, last_call("vkCreateBuffer").handles[0])
}

unsafe fn create_semaphore(data: &DeviceData) -> (vk::Semaphore, u64) {
    let info = vk::SemaphoreCreateInfo::default();
    let mut semaphore = vk::Semaphore::null();
    assert_eq!(
        data.create_semaphore(device(), &info, ptr::null(), &mut semaphore),
        vk::Result::SUCCESS
    );
    (semaphore, last_call("vkCreateSemaphore").handles[0])
}

#[test]
fn test_create_and_destroy_buffer() {
    let data = common::device_data(true);

    unsafe {
        let (buffer, inner) = create_buffer(&data);
        assert_ne!(buffer.as_raw(), inner);
        assert_eq!(data.translator().unwrap(buffer.as_raw()), inner);
        assert_eq!(data.live_handles(), 1);

        data.destroy_buffer(device(), buffer, ptr::null());
        assert_eq!(last_call("vkDestroyBuffer").handles, vec![inner]);
        assert!(!data.translator().contains(buffer.as_raw()));
        assert_eq!(data.live_handles(), 0);

        // A second destroy of the same outer value finds nothing and sends null down.
        data.destroy_buffer(device(), buffer, ptr::null());
        assert_eq!(last_call("vkDestroyBuffer").handles, vec![0]);
    }
}

#[test]
fn test_outer_values_are_unique() {
    let data = common::device_data(true);

    unsafe {
        let (first, _) = create_buffer(&data);
        let (second, _) = create_buffer(&data);
        assert_ne!(first, second);
        assert_eq!(data.live_handles(), 2);
    }
}

#[test]
fn test_queue_submit_unwraps_semaphores_and_fence() {
    let data = common::device_data(true);

    unsafe {
        let mut outer = Vec::new();
        let mut inner = Vec::new();
        for _ in 0..5 {
            let (semaphore, raw) = create_semaphore(&data);
            outer.push(semaphore);
            inner.push(raw);
        }
        let mut fence = vk::Fence::null();
        let fence_info = vk::FenceCreateInfo::default();
        assert_eq!(
            data.create_fence(device(), &fence_info, ptr::null(), &mut fence),
            vk::Result::SUCCESS
        );
        let fence_inner = last_call("vkCreateFence").handles[0];

        let stages = [vk::PipelineStageFlags::ALL_COMMANDS; 3];
        let submit = vk::SubmitInfo::default()
            .wait_semaphores(&outer[..3])
            .wait_dst_stage_mask(&stages)
            .signal_semaphores(&outer[3..]);

        let result = data.queue_submit(queue(), 1, &submit, fence);
        assert_eq!(result, vk::Result::SUCCESS);

        let call = last_call("vkQueueSubmit");
        let mut expected = inner.clone();
        expected.push(fence_inner);
        assert_eq!(call.handles, expected);

        // The application's arrays were never touched.
        assert_eq!(*submit.p_wait_semaphores, outer[0]);
        assert_eq!(*submit.p_signal_semaphores.add(1), outer[4]);
    }
}

#[test]
fn test_fast_path_forwards_original_pointers() {
    let data = common::device_data(false);

    unsafe {
        let info = vk::BufferCreateInfo::default().size(64);
        let mut buffer = vk::Buffer::null();
        assert_eq!(
            data.create_buffer(device(), &info, ptr::null(), &mut buffer),
            vk::Result::SUCCESS
        );
        let call = last_call("vkCreateBuffer");
        assert_eq!(call.pointer, &info as *const _ as usize);
        assert_eq!(buffer.as_raw(), call.handles[0]);
        assert_eq!(data.live_handles(), 0);

        let semaphore = vk::Semaphore::from_raw(0x5e3a);
        let submit = vk::SubmitInfo::default().signal_semaphores(std::slice::from_ref(&semaphore));
        data.queue_submit(queue(), 1, &submit, vk::Fence::null());
        let call = last_call("vkQueueSubmit");
        assert_eq!(call.pointer, &submit as *const _ as usize);
        assert_eq!(call.handles, vec![0x5e3a, 0]);
    }
}

#[test]
fn test_dedicated_allocation_is_unwrapped() {
    let data = common::device_data(true);

    unsafe {
        let (buffer, buffer_inner) = create_buffer(&data);
        let mut dedicated = vk::MemoryDedicatedAllocateInfo::default().buffer(buffer);
        let info = vk::MemoryAllocateInfo::default()
            .allocation_size(256)
            .push_next(&mut dedicated);

        let mut memory = vk::DeviceMemory::null();
        assert_eq!(
            data.allocate_memory(device(), &info, ptr::null(), &mut memory),
            vk::Result::SUCCESS
        );

        let call = last_call("vkAllocateMemory");
        assert_eq!(call.handles, vec![0, buffer_inner]);
        assert_ne!(call.pointer, info.p_next as usize);
        assert_eq!(dedicated.buffer, buffer);
        assert!(data.translator().contains(memory.as_raw()));
    }
}

#[test]
fn test_dedicated_allocation_behind_host_pointer_import() {
    let data = common::device_data(true);

    unsafe {
        let (buffer, buffer_inner) = create_buffer(&data);
        let mut host = [0u8; 256];
        let mut dedicated = vk::MemoryDedicatedAllocateInfo::default().buffer(buffer);
        let mut import = vk::ImportMemoryHostPointerInfoEXT::default()
            .handle_type(vk::ExternalMemoryHandleTypeFlags::HOST_ALLOCATION_EXT)
            .host_pointer(host.as_mut_ptr() as *mut c_void);
        // info -> import -> dedicated
        let info = vk::MemoryAllocateInfo::default()
            .allocation_size(256)
            .push_next(&mut dedicated)
            .push_next(&mut import);

        let mut memory = vk::DeviceMemory::null();
        assert_eq!(
            data.allocate_memory(device(), &info, ptr::null(), &mut memory),
            vk::Result::SUCCESS
        );

        let call = last_call("vkAllocateMemory");
        assert_eq!(call.handles, vec![0, buffer_inner]);
        assert_ne!(call.pointer, info.p_next as usize);
        assert_eq!(dedicated.buffer, buffer);
        assert_eq!(data.translator().misses(), 0);
    }
}

#[test]
fn test_handle_free_chain_passes_by_address() {
    let data = common::device_data(true);

    unsafe {
        let mut flags = vk::MemoryAllocateFlagsInfo::default().flags(vk::MemoryAllocateFlags::DEVICE_ADDRESS);
        let mut priority = vk::MemoryPriorityAllocateInfoEXT::default().priority(0.75);
        let info = vk::MemoryAllocateInfo::default()
            .allocation_size(64)
            .push_next(&mut flags)
            .push_next(&mut priority);

        let mut memory = vk::DeviceMemory::null();
        data.allocate_memory(device(), &info, ptr::null(), &mut memory);

        let call = last_call("vkAllocateMemory");
        assert!(call.handles.is_empty());
        assert_eq!(call.pointer, info.p_next as usize);
    }
}

unsafe fn descriptor_pool(data: &DeviceData) -> (vk::DescriptorPool, u64, vk::DescriptorSetLayout, u64) {
    let sizes = [vk::DescriptorPoolSize {
        ty: vk::DescriptorType::UNIFORM_BUFFER,
        descriptor_count: 8,
    }];
    let pool_info = vk::DescriptorPoolCreateInfo::default()
        .max_sets(8)
        .pool_sizes(&sizes)
        .flags(vk::DescriptorPoolCreateFlags::FREE_DESCRIPTOR_SET);
    let mut pool = vk::DescriptorPool::null();
    data.create_descriptor_pool(device(), &pool_info, ptr::null(), &mut pool);
    let pool_inner = last_call("vkCreateDescriptorPool").handles[0];

    let layout_info = vk::DescriptorSetLayoutCreateInfo::default();
    let mut layout = vk::DescriptorSetLayout::null();
    data.create_descriptor_set_layout(device(), &layout_info, ptr::null(), &mut layout);
    let layout_inner = last_call("vkCreateDescriptorSetLayout").handles[0];

    (pool, pool_inner, layout, layout_inner)
}

unsafe fn allocate_sets(data: &DeviceData, pool: vk::DescriptorPool, layout: vk::DescriptorSetLayout) -> Vec<vk::DescriptorSet> {
    let layouts = [layout; 2];
    let info = vk::DescriptorSetAllocateInfo::default()
        .descriptor_pool(pool)
        .set_layouts(&layouts);
    let mut sets = vec![vk::DescriptorSet::null(); 2];
    assert_eq!(
        data.allocate_descriptor_sets(device(), &info, sets.as_mut_ptr()),
        vk::Result::SUCCESS
    );
    sets
}

#[test]
fn test_pool_reset_retires_its_sets() {
    let data = common::device_data(true);

    unsafe {
        let (pool, pool_inner, layout, layout_inner) = descriptor_pool(&data);
        let sets = allocate_sets(&data, pool, layout);
        assert_eq!(
            last_call("vkAllocateDescriptorSets").handles,
            vec![pool_inner, layout_inner, layout_inner]
        );
        assert_eq!(data.pool_set_count(pool), 2);
        assert!(sets.iter().all(|s| data.translator().contains(s.as_raw())));

        let result = data.reset_descriptor_pool(device(), pool, vk::DescriptorPoolResetFlags::empty());
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(last_call("vkResetDescriptorPool").handles, vec![pool_inner]);
        assert_eq!(data.pool_set_count(pool), 0);
        assert!(sets.iter().all(|s| !data.translator().contains(s.as_raw())));

        // The pool itself survives a reset.
        assert!(data.translator().contains(pool.as_raw()));
    }
}

#[test]
fn test_pool_destroy_retires_its_sets() {
    let data = common::device_data(true);

    unsafe {
        let (pool, pool_inner, layout, _) = descriptor_pool(&data);
        let sets = allocate_sets(&data, pool, layout);

        data.destroy_descriptor_pool(device(), pool, ptr::null());
        assert_eq!(last_call("vkDestroyDescriptorPool").handles, vec![pool_inner]);
        assert!(!data.translator().contains(pool.as_raw()));
        assert!(sets.iter().all(|s| !data.translator().contains(s.as_raw())));
    }
}

#[test]
fn test_free_descriptor_sets() {
    let data = common::device_data(true);

    unsafe {
        let (pool, pool_inner, layout, _) = descriptor_pool(&data);
        let sets = allocate_sets(&data, pool, layout);
        let first_inner = data.translator().unwrap(sets[0].as_raw());

        let result = data.free_descriptor_sets(device(), pool, 1, sets.as_ptr());
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(last_call("vkFreeDescriptorSets").handles, vec![pool_inner, first_inner]);
        assert_eq!(data.pool_set_count(pool), 1);
        assert!(!data.translator().contains(sets[0].as_raw()));
        assert!(data.translator().contains(sets[1].as_raw()));
    }
}

#[test]
fn test_update_descriptor_sets_unwraps_payloads() {
    let data = common::device_data(true);

    unsafe {
        let (pool, _, layout, _) = descriptor_pool(&data);
        let sets = allocate_sets(&data, pool, layout);
        let set_inner = data.translator().unwrap(sets[0].as_raw());
        let (buffer, buffer_inner) = create_buffer(&data);

        let sampler = vk::Sampler::from_raw(data.translator().wrap_new(0x5a_0001));
        let view = vk::ImageView::from_raw(data.translator().wrap_new(0x1e_0001));

        let image_info = [vk::DescriptorImageInfo {
            sampler,
            image_view: view,
            image_layout: vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        }];
        let buffer_info = [vk::DescriptorBufferInfo {
            buffer,
            offset: 0,
            range: vk::WHOLE_SIZE,
        }];
        let writes = [
            vk::WriteDescriptorSet::default()
                .dst_set(sets[0])
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .image_info(&image_info),
            vk::WriteDescriptorSet::default()
                .dst_set(sets[0])
                .dst_binding(1)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&buffer_info),
        ];

        data.update_descriptor_sets(device(), 2, writes.as_ptr(), 0, ptr::null());

        assert_eq!(
            last_call("vkUpdateDescriptorSets").handles,
            vec![set_inner, 0x5a_0001, 0x1e_0001, set_inner, buffer_inner]
        );
        assert_eq!(image_info[0].sampler, sampler);
        assert_eq!(buffer_info[0].buffer, buffer);
    }
}

#[test]
fn test_swapchain_images_keep_their_outer_values() {
    let data = common::device_data(true);

    unsafe {
        let info = vk::SwapchainCreateInfoKHR::default().min_image_count(3);
        let mut swapchain = vk::SwapchainKHR::null();
        assert_eq!(
            data.create_swapchain_khr(device(), &info, ptr::null(), &mut swapchain),
            vk::Result::SUCCESS
        );
        let swapchain_inner = last_call("vkCreateSwapchainKHR").handles[0];

        let mut count = 0u32;
        data.get_swapchain_images_khr(device(), swapchain, &mut count, ptr::null_mut());
        assert_eq!(count, 3);
        assert_eq!(last_call("vkGetSwapchainImagesKHR").handles, vec![swapchain_inner]);
        assert_eq!(data.swapchain_image_count(swapchain), 0);

        let mut first = vec![vk::Image::null(); 3];
        let result = data.get_swapchain_images_khr(device(), swapchain, &mut count, first.as_mut_ptr());
        assert_eq!(result, vk::Result::SUCCESS);
        for (image, inner) in first.iter().zip(common::SWAPCHAIN_IMAGES) {
            assert_ne!(image.as_raw(), inner);
            assert_eq!(data.translator().unwrap(image.as_raw()), inner);
        }
        assert_eq!(data.swapchain_image_count(swapchain), 3);

        let mut second = vec![vk::Image::null(); 3];
        data.get_swapchain_images_khr(device(), swapchain, &mut count, second.as_mut_ptr());
        assert_eq!(first, second);

        let mut partial = vec![vk::Image::null(); 2];
        let mut partial_count = 2u32;
        let result = data.get_swapchain_images_khr(device(), swapchain, &mut partial_count, partial.as_mut_ptr());
        assert_eq!(result, vk::Result::INCOMPLETE);
        assert_eq!(partial[..], first[..2]);
        assert_eq!(data.swapchain_image_count(swapchain), 3);

        data.destroy_swapchain_khr(device(), swapchain, ptr::null());
        assert_eq!(last_call("vkDestroySwapchainKHR").handles, vec![swapchain_inner]);
        assert_eq!(data.swapchain_image_count(swapchain), 0);
        assert!(first.iter().all(|image| !data.translator().contains(image.as_raw())));
        assert_eq!(data.live_handles(), 0);
    }
}

#[test]
fn test_graphics_pipelines_partial_failure() {
    let data = common::device_data(true);

    unsafe {
        let code = [0x0723_0203u32];
        let module_info = vk::ShaderModuleCreateInfo::default().code(&code);
        let mut module = vk::ShaderModule::null();
        data.create_shader_module(device(), &module_info, ptr::null(), &mut module);
        let module_inner = last_call("vkCreateShaderModule").handles[0];

        let layout_info = vk::PipelineLayoutCreateInfo::default();
        let mut layout = vk::PipelineLayout::null();
        data.create_pipeline_layout(device(), &layout_info, ptr::null(), &mut layout);
        let layout_inner = last_call("vkCreatePipelineLayout").handles[0];

        let render_pass_info = vk::RenderPassCreateInfo::default();
        let mut render_pass = vk::RenderPass::null();
        data.create_render_pass(device(), &render_pass_info, ptr::null(), &mut render_pass);
        let render_pass_inner = last_call("vkCreateRenderPass").handles[0];

        let library = vk::Pipeline::from_raw(data.translator().wrap_new(0x11b_0001));
        let libraries = [library];
        let mut library_info = vk::PipelineLibraryCreateInfoKHR::default().libraries(&libraries);

        let stages = [vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(module)
            .name(c"main")];
        let infos = [
            vk::GraphicsPipelineCreateInfo::default()
                .stages(&stages)
                .layout(layout)
                .render_pass(render_pass)
                .push_next(&mut library_info),
            vk::GraphicsPipelineCreateInfo::default()
                .flags(vk::PipelineCreateFlags::FAIL_ON_PIPELINE_COMPILE_REQUIRED)
                .stages(&stages)
                .layout(layout)
                .render_pass(render_pass),
        ];

        let mut pipelines = [vk::Pipeline::null(); 2];
        let result = data.create_graphics_pipelines(
            device(),
            vk::PipelineCache::null(),
            2,
            infos.as_ptr(),
            ptr::null(),
            pipelines.as_mut_ptr(),
        );
        assert_eq!(result, vk::Result::PIPELINE_COMPILE_REQUIRED);

        assert_eq!(
            last_call("vkCreateGraphicsPipelines").handles,
            vec![
                0,
                module_inner,
                layout_inner,
                render_pass_inner,
                0x11b_0001,
                module_inner,
                layout_inner,
                render_pass_inner,
            ]
        );

        assert!(data.translator().contains(pipelines[0].as_raw()));
        assert_eq!(pipelines[1], vk::Pipeline::null());

        // Nested application structures keep their outer values.
        assert_eq!(stages[0].module, module);
        assert_eq!(libraries[0], library);

        data.destroy_pipeline(device(), pipelines[0], ptr::null());
        assert!(!data.translator().contains(pipelines[0].as_raw()));
    }
}

#[test]
fn test_linked_pipeline_libraries_behind_library_flags() {
    let data = common::device_data(true);

    unsafe {
        let libraries = [
            vk::Pipeline::from_raw(data.translator().wrap_new(0x11b_0011)),
            vk::Pipeline::from_raw(data.translator().wrap_new(0x11b_0012)),
        ];
        let mut library_info = vk::PipelineLibraryCreateInfoKHR::default().libraries(&libraries);
        let mut library_flags = vk::GraphicsPipelineLibraryCreateInfoEXT::default()
            .flags(vk::GraphicsPipelineLibraryFlagsEXT::FRAGMENT_OUTPUT_INTERFACE);
        // info -> library flags -> linked libraries
        let infos = [vk::GraphicsPipelineCreateInfo::default()
            .flags(vk::PipelineCreateFlags::LIBRARY_KHR)
            .push_next(&mut library_info)
            .push_next(&mut library_flags)];

        let mut pipelines = [vk::Pipeline::null(); 1];
        let result = data.create_graphics_pipelines(
            device(),
            vk::PipelineCache::null(),
            1,
            infos.as_ptr(),
            ptr::null(),
            pipelines.as_mut_ptr(),
        );
        assert_eq!(result, vk::Result::SUCCESS);
        assert_eq!(
            last_call("vkCreateGraphicsPipelines").handles,
            vec![0, 0, 0, 0x11b_0011, 0x11b_0012]
        );
        assert_ne!(libraries[0].as_raw(), 0x11b_0011);
        assert!(data.translator().contains(pipelines[0].as_raw()));
        assert_eq!(data.translator().misses(), 0);
    }
}

#[test]
fn test_unknown_handle_forwards_null() {
    let data = common::device_data(true);

    unsafe {
        let stray = vk::Fence::from_raw(0xdead_beef);
        data.queue_submit(queue(), 0, ptr::null(), stray);
        assert_eq!(last_call("vkQueueSubmit").handles, vec![0]);
        assert_eq!(data.translator().misses(), 1);

        data.destroy_buffer(device(), vk::Buffer::from_raw(0xdead_beef), ptr::null());
        assert_eq!(last_call("vkDestroyBuffer").handles, vec![0]);
    }
}

#[test]
fn test_null_arrays_forward_untouched() {
    let data = common::device_data(true);

    unsafe {
        data.update_descriptor_sets(device(), 0, ptr::null(), 0, ptr::null());
        let call = last_call("vkUpdateDescriptorSets");
        assert!(call.handles.is_empty());
        assert_eq!(call.pointer, ptr::null::<c_void>() as usize);
    }
}

//! Mock next layer for driving the layer without a Vulkan driver.
//!
//! Every mock command records what reached it (the handle values it saw and
//! the address of its main input) in a thread-local log, so tests running in
//! parallel never see each other's calls. Created handles come from a
//! process-wide counter well away from the layer's own outer ids.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::ffi::{c_char, c_void, CStr};
use std::slice;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ash::vk;
use ash::vk::Handle;
use vkchassis_core::LayerSettings;
use vkchassis_layer::dispatch::{DeviceData, DeviceDispatchTable, InstanceData, InstanceDispatchTable};

/// One call that reached the mock.
#[derive(Debug, Clone)]
pub struct Call {
    pub name: &'static str,
    pub handles: Vec<u64>,
    pub pointer: usize,
}

thread_local! {
    static CALLS: RefCell<Vec<Call>> = const { RefCell::new(Vec::new()) };
    static JOIN_RESULT: Cell<vk::Result> = const { Cell::new(vk::Result::SUCCESS) };
    static OPERATION_RESULT: Cell<vk::Result> = const { Cell::new(vk::Result::SUCCESS) };
}

static NEXT_INNER: AtomicU64 = AtomicU64::new(0x7000_0000_0000);

/// Fixed inner values of the images every mock swapchain owns.
pub const SWAPCHAIN_IMAGES: [u64; 3] = [0x5ca1_0001, 0x5ca1_0002, 0x5ca1_0003];

pub fn next_inner() -> u64 {
    NEXT_INNER.fetch_add(0x10, Ordering::Relaxed)
}

/// View a counted array the way a driver would; null or empty is no items.
unsafe fn items<'a, T>(ptr: *const T, count: u32) -> &'a [T] {
    if ptr.is_null() || count == 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr, count as usize)
    }
}

fn record(name: &'static str, handles: Vec<u64>, pointer: usize) {
    CALLS.with(|calls| calls.borrow_mut().push(Call { name, handles, pointer }));
}

/// Drain this thread's call log.
pub fn take_calls() -> Vec<Call> {
    CALLS.with(|calls| std::mem::take(&mut *calls.borrow_mut()))
}

/// Most recent call named `name` on this thread.
pub fn last_call(name: &str) -> Call {
    CALLS.with(|calls| {
        calls
            .borrow()
            .iter()
            .rev()
            .find(|call| call.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("{name} never reached the mock"))
    })
}

pub fn call_count(name: &str) -> usize {
    CALLS.with(|calls| calls.borrow().iter().filter(|call| call.name == name).count())
}

/// Result the mock's vkDeferredOperationJoinKHR returns on this thread.
pub fn set_join_result(result: vk::Result) {
    JOIN_RESULT.with(|r| r.set(result));
}

/// Result the mock's vkGetDeferredOperationResultKHR returns on this thread.
pub fn set_operation_result(result: vk::Result) {
    OPERATION_RESULT.with(|r| r.set(result));
}

/// A fake dispatchable object: its first word plays the loader dispatch
/// table pointer, which is what the layer keys on.
pub fn dispatchable(key: usize) -> u64 {
    Box::leak(Box::new(key)) as *mut usize as u64
}

/// A dispatch key nobody else uses.
pub fn fresh_key() -> usize {
    Box::leak(Box::new(0u64)) as *mut u64 as usize
}

pub fn device() -> vk::Device {
    vk::Device::from_raw(0xd1ce)
}

pub fn queue() -> vk::Queue {
    vk::Queue::from_raw(0x0e0e)
}

pub fn command_buffer() -> vk::CommandBuffer {
    vk::CommandBuffer::from_raw(0xcb00)
}

// ── Object lifetime ─────────────────────────────────────────

macro_rules! mock_create {
    ($($fn_name:ident: $cmd:literal, $info:ident => $handle:ident;)*) => {
        $(
            pub unsafe extern "system" fn $fn_name(
                _device: vk::Device,
                p_create_info: *const vk::$info<'_>,
                _p_allocator: *const vk::AllocationCallbacks<'_>,
                p_handle: *mut vk::$handle,
            ) -> vk::Result {
                let inner = next_inner();
                *p_handle = vk::$handle::from_raw(inner);
                record($cmd, vec![inner], p_create_info as usize);
                vk::Result::SUCCESS
            }
        )*
    };
}

macro_rules! mock_destroy {
    ($($fn_name:ident: $cmd:literal, $handle:ident;)*) => {
        $(
            pub unsafe extern "system" fn $fn_name(
                _device: vk::Device,
                handle: vk::$handle,
                _p_allocator: *const vk::AllocationCallbacks<'_>,
            ) {
                record($cmd, vec![handle.as_raw()], 0);
            }
        )*
    };
}

mock_create! {
    mock_create_buffer: "vkCreateBuffer", BufferCreateInfo => Buffer;
    mock_create_semaphore: "vkCreateSemaphore", SemaphoreCreateInfo => Semaphore;
    mock_create_fence: "vkCreateFence", FenceCreateInfo => Fence;
    mock_create_image_view: "vkCreateImageView", ImageViewCreateInfo => ImageView;
    mock_create_shader_module: "vkCreateShaderModule", ShaderModuleCreateInfo => ShaderModule;
    mock_create_pipeline_layout: "vkCreatePipelineLayout", PipelineLayoutCreateInfo => PipelineLayout;
    mock_create_render_pass: "vkCreateRenderPass", RenderPassCreateInfo => RenderPass;
    mock_create_descriptor_pool: "vkCreateDescriptorPool", DescriptorPoolCreateInfo => DescriptorPool;
    mock_create_descriptor_set_layout: "vkCreateDescriptorSetLayout", DescriptorSetLayoutCreateInfo => DescriptorSetLayout;
    mock_create_swapchain: "vkCreateSwapchainKHR", SwapchainCreateInfoKHR => SwapchainKHR;
    mock_create_acceleration_structure: "vkCreateAccelerationStructureKHR", AccelerationStructureCreateInfoKHR => AccelerationStructureKHR;
}

mock_destroy! {
    mock_destroy_buffer: "vkDestroyBuffer", Buffer;
    mock_destroy_pipeline: "vkDestroyPipeline", Pipeline;
    mock_destroy_descriptor_pool: "vkDestroyDescriptorPool", DescriptorPool;
    mock_destroy_swapchain: "vkDestroySwapchainKHR", SwapchainKHR;
    mock_destroy_deferred_operation: "vkDestroyDeferredOperationKHR", DeferredOperationKHR;
}

// ── Memory ──────────────────────────────────────────────────

/// Records the image and buffer of a dedicated-allocation node and the
/// address of the chain it received.
pub unsafe extern "system" fn mock_allocate_memory(
    _device: vk::Device,
    p_allocate_info: *const vk::MemoryAllocateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_memory: *mut vk::DeviceMemory,
) -> vk::Result {
    let info = &*p_allocate_info;
    let mut handles = Vec::new();
    let mut node = info.p_next.cast::<vk::BaseInStructure<'_>>();
    while !node.is_null() {
        if (*node).s_type == vk::StructureType::MEMORY_DEDICATED_ALLOCATE_INFO {
            let dedicated = &*node.cast::<vk::MemoryDedicatedAllocateInfo<'_>>();
            handles.push(dedicated.image.as_raw());
            handles.push(dedicated.buffer.as_raw());
        }
        node = (*node).p_next;
    }
    let inner = next_inner();
    *p_memory = vk::DeviceMemory::from_raw(inner);
    record("vkAllocateMemory", handles, info.p_next as usize);
    vk::Result::SUCCESS
}

// ── Submission ──────────────────────────────────────────────

/// Records wait semaphores, then signal semaphores, then the fence.
pub unsafe extern "system" fn mock_queue_submit(
    _queue: vk::Queue,
    submit_count: u32,
    p_submits: *const vk::SubmitInfo<'_>,
    fence: vk::Fence,
) -> vk::Result {
    let mut handles = Vec::new();
    for submit in items(p_submits, submit_count) {
        let waits = items(submit.p_wait_semaphores, submit.wait_semaphore_count);
        let signals = items(submit.p_signal_semaphores, submit.signal_semaphore_count);
        handles.extend(waits.iter().map(|s| s.as_raw()));
        handles.extend(signals.iter().map(|s| s.as_raw()));
    }
    handles.push(fence.as_raw());
    record("vkQueueSubmit", handles, p_submits as usize);
    vk::Result::SUCCESS
}

// ── Descriptors ─────────────────────────────────────────────

pub unsafe extern "system" fn mock_allocate_descriptor_sets(
    _device: vk::Device,
    p_allocate_info: *const vk::DescriptorSetAllocateInfo<'_>,
    p_descriptor_sets: *mut vk::DescriptorSet,
) -> vk::Result {
    let info = &*p_allocate_info;
    let mut handles = vec![info.descriptor_pool.as_raw()];
    let layouts = items(info.p_set_layouts, info.descriptor_set_count);
    handles.extend(layouts.iter().map(|l| l.as_raw()));
    for set in slice::from_raw_parts_mut(p_descriptor_sets, info.descriptor_set_count as usize) {
        *set = vk::DescriptorSet::from_raw(next_inner());
    }
    record("vkAllocateDescriptorSets", handles, p_allocate_info as usize);
    vk::Result::SUCCESS
}

/// Records the pool, then every set.
pub unsafe extern "system" fn mock_free_descriptor_sets(
    _device: vk::Device,
    descriptor_pool: vk::DescriptorPool,
    descriptor_set_count: u32,
    p_descriptor_sets: *const vk::DescriptorSet,
) -> vk::Result {
    let mut handles = vec![descriptor_pool.as_raw()];
    let sets = items(p_descriptor_sets, descriptor_set_count);
    handles.extend(sets.iter().map(|s| s.as_raw()));
    record("vkFreeDescriptorSets", handles, p_descriptor_sets as usize);
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn mock_reset_descriptor_pool(
    _device: vk::Device,
    descriptor_pool: vk::DescriptorPool,
    _flags: vk::DescriptorPoolResetFlags,
) -> vk::Result {
    record("vkResetDescriptorPool", vec![descriptor_pool.as_raw()], 0);
    vk::Result::SUCCESS
}

/// Records, per write: the set, then every live payload handle.
pub unsafe extern "system" fn mock_update_descriptor_sets(
    _device: vk::Device,
    descriptor_write_count: u32,
    p_descriptor_writes: *const vk::WriteDescriptorSet<'_>,
    _descriptor_copy_count: u32,
    _p_descriptor_copies: *const vk::CopyDescriptorSet<'_>,
) {
    let mut handles = Vec::new();
    for write in items(p_descriptor_writes, descriptor_write_count) {
        handles.push(write.dst_set.as_raw());
        match write.descriptor_type {
            vk::DescriptorType::COMBINED_IMAGE_SAMPLER => {
                for info in items(write.p_image_info, write.descriptor_count) {
                    handles.push(info.sampler.as_raw());
                    handles.push(info.image_view.as_raw());
                }
            }
            vk::DescriptorType::SAMPLED_IMAGE | vk::DescriptorType::STORAGE_IMAGE => {
                for info in items(write.p_image_info, write.descriptor_count) {
                    handles.push(info.image_view.as_raw());
                }
            }
            vk::DescriptorType::UNIFORM_BUFFER | vk::DescriptorType::STORAGE_BUFFER => {
                for info in items(write.p_buffer_info, write.descriptor_count) {
                    handles.push(info.buffer.as_raw());
                }
            }
            _ => {}
        }
    }
    record("vkUpdateDescriptorSets", handles, p_descriptor_writes as usize);
}

// ── Pipelines ───────────────────────────────────────────────

/// Records, per create info: stage modules, layout, render pass and any
/// library pipelines. An info flagged FAIL_ON_PIPELINE_COMPILE_REQUIRED gets
/// a null output and the call reports PIPELINE_COMPILE_REQUIRED.
pub unsafe extern "system" fn mock_create_graphics_pipelines(
    _device: vk::Device,
    pipeline_cache: vk::PipelineCache,
    create_info_count: u32,
    p_create_infos: *const vk::GraphicsPipelineCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_pipelines: *mut vk::Pipeline,
) -> vk::Result {
    let infos = items(p_create_infos, create_info_count);
    let outputs = slice::from_raw_parts_mut(p_pipelines, create_info_count as usize);
    let mut handles = vec![pipeline_cache.as_raw()];
    let mut result = vk::Result::SUCCESS;
    for (info, output) in infos.iter().zip(outputs.iter_mut()) {
        for stage in items(info.p_stages, info.stage_count) {
            handles.push(stage.module.as_raw());
        }
        handles.push(info.layout.as_raw());
        handles.push(info.render_pass.as_raw());
        let mut node = info.p_next.cast::<vk::BaseInStructure<'_>>();
        while !node.is_null() {
            if (*node).s_type == vk::StructureType::PIPELINE_LIBRARY_CREATE_INFO_KHR {
                let library = &*node.cast::<vk::PipelineLibraryCreateInfoKHR<'_>>();
                let libraries = items(library.p_libraries, library.library_count);
                handles.extend(libraries.iter().map(|p| p.as_raw()));
            }
            node = (*node).p_next;
        }
        if info.flags.contains(vk::PipelineCreateFlags::FAIL_ON_PIPELINE_COMPILE_REQUIRED) {
            *output = vk::Pipeline::null();
            result = vk::Result::PIPELINE_COMPILE_REQUIRED;
        } else {
            *output = vk::Pipeline::from_raw(next_inner());
        }
    }
    record("vkCreateGraphicsPipelines", handles, p_create_infos as usize);
    result
}

// ── Swapchain ───────────────────────────────────────────────

pub unsafe extern "system" fn mock_get_swapchain_images(
    _device: vk::Device,
    swapchain: vk::SwapchainKHR,
    p_swapchain_image_count: *mut u32,
    p_swapchain_images: *mut vk::Image,
) -> vk::Result {
    record("vkGetSwapchainImagesKHR", vec![swapchain.as_raw()], p_swapchain_images as usize);
    if p_swapchain_images.is_null() {
        *p_swapchain_image_count = SWAPCHAIN_IMAGES.len() as u32;
        return vk::Result::SUCCESS;
    }
    let count = (*p_swapchain_image_count as usize).min(SWAPCHAIN_IMAGES.len());
    for (i, image) in slice::from_raw_parts_mut(p_swapchain_images, count).iter_mut().enumerate() {
        *image = vk::Image::from_raw(SWAPCHAIN_IMAGES[i]);
    }
    *p_swapchain_image_count = count as u32;
    if count < SWAPCHAIN_IMAGES.len() {
        vk::Result::INCOMPLETE
    } else {
        vk::Result::SUCCESS
    }
}

// ── Deferred host operations ────────────────────────────────

pub unsafe extern "system" fn mock_create_deferred_operation(
    _device: vk::Device,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_deferred_operation: *mut vk::DeferredOperationKHR,
) -> vk::Result {
    let inner = next_inner();
    *p_deferred_operation = vk::DeferredOperationKHR::from_raw(inner);
    record("vkCreateDeferredOperationKHR", vec![inner], 0);
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn mock_deferred_operation_join(
    _device: vk::Device,
    operation: vk::DeferredOperationKHR,
) -> vk::Result {
    record("vkDeferredOperationJoinKHR", vec![operation.as_raw()], 0);
    JOIN_RESULT.with(Cell::get)
}

pub unsafe extern "system" fn mock_get_deferred_operation_result(
    _device: vk::Device,
    operation: vk::DeferredOperationKHR,
) -> vk::Result {
    record("vkGetDeferredOperationResultKHR", vec![operation.as_raw()], 0);
    OPERATION_RESULT.with(Cell::get)
}

/// Defers whenever it is given an operation. Records the operation, then the
/// destination of every build.
pub unsafe extern "system" fn mock_build_acceleration_structures(
    _device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    info_count: u32,
    p_infos: *const vk::AccelerationStructureBuildGeometryInfoKHR<'_>,
    _pp_build_range_infos: *const *const vk::AccelerationStructureBuildRangeInfoKHR,
) -> vk::Result {
    let mut handles = vec![deferred_operation.as_raw()];
    for info in items(p_infos, info_count) {
        handles.push(info.dst_acceleration_structure.as_raw());
    }
    record("vkBuildAccelerationStructuresKHR", handles, p_infos as usize);
    if deferred_operation == vk::DeferredOperationKHR::null() {
        vk::Result::SUCCESS
    } else {
        vk::Result::OPERATION_DEFERRED_KHR
    }
}

/// Writes its outputs right away but defers whenever given an operation.
pub unsafe extern "system" fn mock_create_ray_tracing_pipelines(
    _device: vk::Device,
    deferred_operation: vk::DeferredOperationKHR,
    _pipeline_cache: vk::PipelineCache,
    create_info_count: u32,
    p_create_infos: *const vk::RayTracingPipelineCreateInfoKHR<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_pipelines: *mut vk::Pipeline,
) -> vk::Result {
    let mut handles = vec![deferred_operation.as_raw()];
    for info in items(p_create_infos, create_info_count) {
        handles.push(info.layout.as_raw());
    }
    for pipeline in slice::from_raw_parts_mut(p_pipelines, create_info_count as usize) {
        *pipeline = vk::Pipeline::from_raw(next_inner());
    }
    record("vkCreateRayTracingPipelinesKHR", handles, p_create_infos as usize);
    if deferred_operation == vk::DeferredOperationKHR::null() {
        vk::Result::SUCCESS
    } else {
        vk::Result::OPERATION_DEFERRED_KHR
    }
}

// ── Commands the layer does not intercept ───────────────────

pub unsafe extern "system" fn mock_cmd_set_line_width(_command_buffer: vk::CommandBuffer, _line_width: f32) {
    record("vkCmdSetLineWidth", Vec::new(), 0);
}

// ── Instance and device creation ────────────────────────────

pub unsafe extern "system" fn mock_create_instance(
    _p_create_info: *const vk::InstanceCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    let instance = dispatchable(fresh_key());
    *p_instance = vk::Instance::from_raw(instance);
    record("vkCreateInstance", vec![instance], 0);
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn mock_destroy_instance(
    instance: vk::Instance,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    record("vkDestroyInstance", vec![instance.as_raw()], 0);
}

pub unsafe extern "system" fn mock_create_device(
    _physical_device: vk::PhysicalDevice,
    _p_create_info: *const vk::DeviceCreateInfo<'_>,
    _p_allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) -> vk::Result {
    let device = dispatchable(fresh_key());
    *p_device = vk::Device::from_raw(device);
    record("vkCreateDevice", vec![device], 0);
    vk::Result::SUCCESS
}

pub unsafe extern "system" fn mock_destroy_device(device: vk::Device, _p_allocator: *const vk::AllocationCallbacks<'_>) {
    record("vkDestroyDevice", vec![device.as_raw()], 0);
}

// ── Name lookup ─────────────────────────────────────────────

pub fn instance_lookup(name: &CStr) -> *const c_void {
    match name.to_bytes() {
        b"vkCreateInstance" => mock_create_instance as *const c_void,
        b"vkDestroyInstance" => mock_destroy_instance as *const c_void,
        b"vkCreateDevice" => mock_create_device as *const c_void,
        _ => std::ptr::null(),
    }
}

pub fn device_lookup(name: &CStr) -> *const c_void {
    match name.to_bytes() {
        b"vkDestroyDevice" => mock_destroy_device as *const c_void,
        b"vkCreateBuffer" => mock_create_buffer as *const c_void,
        b"vkDestroyBuffer" => mock_destroy_buffer as *const c_void,
        b"vkCreateSemaphore" => mock_create_semaphore as *const c_void,
        b"vkCreateFence" => mock_create_fence as *const c_void,
        b"vkCreateImageView" => mock_create_image_view as *const c_void,
        b"vkCreateShaderModule" => mock_create_shader_module as *const c_void,
        b"vkCreatePipelineLayout" => mock_create_pipeline_layout as *const c_void,
        b"vkCreateRenderPass" => mock_create_render_pass as *const c_void,
        b"vkCreateDescriptorPool" => mock_create_descriptor_pool as *const c_void,
        b"vkCreateDescriptorSetLayout" => mock_create_descriptor_set_layout as *const c_void,
        b"vkDestroyDescriptorPool" => mock_destroy_descriptor_pool as *const c_void,
        b"vkResetDescriptorPool" => mock_reset_descriptor_pool as *const c_void,
        b"vkAllocateDescriptorSets" => mock_allocate_descriptor_sets as *const c_void,
        b"vkFreeDescriptorSets" => mock_free_descriptor_sets as *const c_void,
        b"vkUpdateDescriptorSets" => mock_update_descriptor_sets as *const c_void,
        b"vkAllocateMemory" => mock_allocate_memory as *const c_void,
        b"vkQueueSubmit" => mock_queue_submit as *const c_void,
        b"vkCreateGraphicsPipelines" => mock_create_graphics_pipelines as *const c_void,
        b"vkDestroyPipeline" => mock_destroy_pipeline as *const c_void,
        b"vkCreateSwapchainKHR" => mock_create_swapchain as *const c_void,
        b"vkDestroySwapchainKHR" => mock_destroy_swapchain as *const c_void,
        b"vkGetSwapchainImagesKHR" => mock_get_swapchain_images as *const c_void,
        b"vkCreateAccelerationStructureKHR" => mock_create_acceleration_structure as *const c_void,
        b"vkCreateDeferredOperationKHR" => mock_create_deferred_operation as *const c_void,
        b"vkDestroyDeferredOperationKHR" => mock_destroy_deferred_operation as *const c_void,
        b"vkDeferredOperationJoinKHR" => mock_deferred_operation_join as *const c_void,
        b"vkGetDeferredOperationResultKHR" => mock_get_deferred_operation_result as *const c_void,
        b"vkBuildAccelerationStructuresKHR" => mock_build_acceleration_structures as *const c_void,
        b"vkCreateRayTracingPipelinesKHR" => mock_create_ray_tracing_pipelines as *const c_void,
        b"vkCmdSetLineWidth" => mock_cmd_set_line_width as *const c_void,
        _ => std::ptr::null(),
    }
}

fn as_pfn(ptr: *const c_void) -> vk::PFN_vkVoidFunction {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { std::mem::transmute::<*const c_void, unsafe extern "system" fn()>(ptr) })
    }
}

pub unsafe extern "system" fn mock_get_instance_proc_addr(
    _instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = CStr::from_ptr(p_name);
    let ptr = instance_lookup(name);
    as_pfn(if ptr.is_null() { device_lookup(name) } else { ptr })
}

pub unsafe extern "system" fn mock_get_device_proc_addr(
    _device: vk::Device,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    as_pfn(device_lookup(CStr::from_ptr(p_name)))
}

// ── Contexts ────────────────────────────────────────────────

pub fn instance_data(wrap_handles: bool) -> Arc<InstanceData> {
    let settings = LayerSettings {
        wrap_handles,
        ..LayerSettings::default()
    };
    let table = InstanceDispatchTable::load_with(mock_get_instance_proc_addr, instance_lookup);
    Arc::new(InstanceData::new(vk::Instance::from_raw(0x1457), table, settings))
}

/// A device context whose next layer is the mock.
pub fn device_data(wrap_handles: bool) -> DeviceData {
    let table = DeviceDispatchTable::load_with(mock_get_device_proc_addr, device_lookup);
    DeviceData::new(device(), instance_data(wrap_handles), table)
}

//! Device creation and teardown, queues and object naming.

use std::sync::Arc;

use ash::vk;

use crate::dispatch::{device_context, devices, dispatch_key, instance_context, DeviceData, DeviceDispatchTable};
use crate::error::LayerError;
use crate::forward::{entry_points, forward_one, void_fn};
use crate::loader;
use crate::unwrap::passthrough;

fn report(err: LayerError) -> vk::Result {
    tracing::error!(error = %err, "device creation failed");
    err.into()
}

pub unsafe extern "system" fn vkCreateDevice(
    physical_device: vk::PhysicalDevice,
    p_create_info: *const vk::DeviceCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_device: *mut vk::Device,
) -> vk::Result {
    let Some(instance) = instance_context(physical_device) else {
        return report(LayerError::UnknownDispatchable("vkCreateDevice"));
    };
    if p_create_info.is_null() || p_device.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }

    let Some(link) = loader::take_device_link(p_create_info) else {
        return report(LayerError::MissingLinkInfo("vkCreateDevice"));
    };
    let Some(create_device) = (link.get_instance_proc_addr)(instance.instance, c"vkCreateDevice".as_ptr()) else {
        return report(LayerError::MissingEntryPoint("vkCreateDevice"));
    };
    let create_device: vk::PFN_vkCreateDevice = std::mem::transmute(create_device);

    let result = create_device(physical_device, p_create_info, p_allocator, p_device);
    if result != vk::Result::SUCCESS {
        return result;
    }

    let device = *p_device;
    let table = DeviceDispatchTable::load(link.get_device_proc_addr, device);
    let key = dispatch_key(device);
    devices().insert(key, Arc::new(DeviceData::new(device, instance, table)));
    tracing::debug!("device created, dispatch key {key:#x}");
    result
}

pub unsafe extern "system" fn vkDestroyDevice(device: vk::Device, p_allocator: *const vk::AllocationCallbacks<'_>) {
    let key = dispatch_key(device);
    let Some((_, data)) = devices().remove(&key) else {
        tracing::error!(command = "vkDestroyDevice", "no dispatch context for handle");
        return;
    };
    tracing::debug!(live_handles = data.live_handles(), "device destroyed, dispatch key {key:#x}");
    (data.table.v1_0.destroy_device)(device, p_allocator)
}

impl DeviceData {
    /// Outer handles still recorded against this device.
    pub fn live_handles(&self) -> usize {
        crate::dispatch::LayerContext::translator(self).len()
    }

    pub unsafe fn set_debug_utils_object_name_ext(
        &self,
        device: vk::Device,
        p_name_info: *const vk::DebugUtilsObjectNameInfoEXT<'_>,
    ) -> vk::Result {
        forward_one(self, p_name_info, |info| {
            (self.table.debug_utils.set_debug_utils_object_name_ext)(device, info)
        })
    }
}

passthrough! {
    impl DeviceData {
        fn get_device_queue(
            device: vk::Device,
            queue_family_index: u32,
            queue_index: u32,
            p_queue: *mut vk::Queue,
        ) => v1_0.get_device_queue;
        fn get_device_queue2(
            device: vk::Device,
            p_queue_info: *const vk::DeviceQueueInfo2<'_>,
            p_queue: *mut vk::Queue,
        ) => v1_1.get_device_queue2;
        fn device_wait_idle(device: vk::Device) -> vk::Result => v1_0.device_wait_idle;
        fn queue_wait_idle(queue: vk::Queue) -> vk::Result => v1_0.queue_wait_idle;
        fn cmd_begin_debug_utils_label_ext(
            command_buffer: vk::CommandBuffer,
            p_label_info: *const vk::DebugUtilsLabelEXT<'_>,
        ) => debug_utils.cmd_begin_debug_utils_label_ext;
        fn cmd_end_debug_utils_label_ext(command_buffer: vk::CommandBuffer) => debug_utils.cmd_end_debug_utils_label_ext;
    }
}

entry_points! {
    device_context => context_proc_addr;
    fn vkGetDeviceQueue(
        device: vk::Device,
        queue_family_index: u32,
        queue_index: u32,
        p_queue: *mut vk::Queue,
    ) => get_device_queue;
    fn vkGetDeviceQueue2(
        device: vk::Device,
        p_queue_info: *const vk::DeviceQueueInfo2<'_>,
        p_queue: *mut vk::Queue,
    ) => get_device_queue2;
    fn vkDeviceWaitIdle(device: vk::Device) -> vk::Result => device_wait_idle;
    fn vkQueueWaitIdle(queue: vk::Queue) -> vk::Result => queue_wait_idle;
    fn vkSetDebugUtilsObjectNameEXT(
        device: vk::Device,
        p_name_info: *const vk::DebugUtilsObjectNameInfoEXT<'_>,
    ) -> vk::Result => set_debug_utils_object_name_ext;
    fn vkCmdBeginDebugUtilsLabelEXT(
        command_buffer: vk::CommandBuffer,
        p_label_info: *const vk::DebugUtilsLabelEXT<'_>,
    ) => cmd_begin_debug_utils_label_ext;
    fn vkCmdEndDebugUtilsLabelEXT(command_buffer: vk::CommandBuffer) => cmd_end_debug_utils_label_ext;
}

/// Resolve a device-lifetime command this layer intercepts.
pub fn proc_addr(name: &str) -> vk::PFN_vkVoidFunction {
    match name {
        "vkCreateDevice" => void_fn(vkCreateDevice as *const ()),
        "vkDestroyDevice" => void_fn(vkDestroyDevice as *const ()),
        _ => context_proc_addr(name),
    }
}

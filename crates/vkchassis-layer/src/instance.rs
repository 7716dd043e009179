//! Instance creation and teardown, surfaces and debug messengers.

use std::sync::Arc;

use ash::vk;

use crate::dispatch::{dispatch_key, instances, InstanceData, InstanceDispatchTable, LayerContext};
use crate::error::LayerError;
use crate::forward::{create_one, destroy_one, entry_points, void_fn};
use crate::loader;

fn report(err: LayerError) -> vk::Result {
    tracing::error!(error = %err, "instance creation failed");
    err.into()
}

pub unsafe extern "system" fn vkCreateInstance(
    p_create_info: *const vk::InstanceCreateInfo<'_>,
    p_allocator: *const vk::AllocationCallbacks<'_>,
    p_instance: *mut vk::Instance,
) -> vk::Result {
    let config = crate::layer_config();
    if p_create_info.is_null() || p_instance.is_null() {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }

    let Some(link) = loader::take_instance_link(p_create_info) else {
        return report(LayerError::MissingLinkInfo("vkCreateInstance"));
    };
    let get_instance_proc_addr = link.get_instance_proc_addr;
    let Some(create_instance) = get_instance_proc_addr(vk::Instance::null(), c"vkCreateInstance".as_ptr()) else {
        return report(LayerError::MissingEntryPoint("vkCreateInstance"));
    };
    let create_instance: vk::PFN_vkCreateInstance = std::mem::transmute(create_instance);

    let result = create_instance(p_create_info, p_allocator, p_instance);
    if result != vk::Result::SUCCESS {
        return result;
    }

    let instance = *p_instance;
    let table = InstanceDispatchTable::load(get_instance_proc_addr, instance);
    let key = dispatch_key(instance);
    instances().insert(key, Arc::new(InstanceData::new(instance, table, config.layer.clone())));
    tracing::debug!(
        wrap_handles = config.layer.wrap_handles,
        policy = ?config.layer.unknown_handles,
        "instance created, dispatch key {key:#x}"
    );
    result
}

pub unsafe extern "system" fn vkDestroyInstance(
    instance: vk::Instance,
    p_allocator: *const vk::AllocationCallbacks<'_>,
) {
    let key = dispatch_key(instance);
    let Some((_, data)) = instances().remove(&key) else {
        tracing::error!(command = "vkDestroyInstance", "no dispatch context for handle");
        return;
    };
    tracing::debug!(live_handles = data.translator().len(), "instance destroyed, dispatch key {key:#x}");
    (data.table.v1_0.destroy_instance)(instance, p_allocator)
}

impl InstanceData {
    pub unsafe fn destroy_surface_khr(
        &self,
        instance: vk::Instance,
        surface: vk::SurfaceKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, surface, |surface| {
            (self.table.surface.destroy_surface_khr)(instance, surface, p_allocator)
        })
    }

    pub unsafe fn create_headless_surface_ext(
        &self,
        instance: vk::Instance,
        p_create_info: *const vk::HeadlessSurfaceCreateInfoEXT<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_surface: *mut vk::SurfaceKHR,
    ) -> vk::Result {
        create_one(self, p_create_info, p_surface, |info| {
            (self.table.headless_surface.create_headless_surface_ext)(instance, info, p_allocator, p_surface)
        })
    }

    #[cfg(windows)]
    pub unsafe fn create_win32_surface_khr(
        &self,
        instance: vk::Instance,
        p_create_info: *const vk::Win32SurfaceCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_surface: *mut vk::SurfaceKHR,
    ) -> vk::Result {
        create_one(self, p_create_info, p_surface, |info| {
            (self.table.win32_surface.create_win32_surface_khr)(instance, info, p_allocator, p_surface)
        })
    }

    #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
    pub unsafe fn create_wayland_surface_khr(
        &self,
        instance: vk::Instance,
        p_create_info: *const vk::WaylandSurfaceCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_surface: *mut vk::SurfaceKHR,
    ) -> vk::Result {
        create_one(self, p_create_info, p_surface, |info| {
            (self.table.wayland_surface.create_wayland_surface_khr)(instance, info, p_allocator, p_surface)
        })
    }

    pub unsafe fn create_debug_utils_messenger_ext(
        &self,
        instance: vk::Instance,
        p_create_info: *const vk::DebugUtilsMessengerCreateInfoEXT<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_messenger: *mut vk::DebugUtilsMessengerEXT,
    ) -> vk::Result {
        create_one(self, p_create_info, p_messenger, |info| {
            (self.table.debug_utils.create_debug_utils_messenger_ext)(instance, info, p_allocator, p_messenger)
        })
    }

    pub unsafe fn destroy_debug_utils_messenger_ext(
        &self,
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, messenger, |messenger| {
            (self.table.debug_utils.destroy_debug_utils_messenger_ext)(instance, messenger, p_allocator)
        })
    }

    pub unsafe fn enumerate_physical_devices(
        &self,
        instance: vk::Instance,
        p_physical_device_count: *mut u32,
        p_physical_devices: *mut vk::PhysicalDevice,
    ) -> vk::Result {
        (self.table.v1_0.enumerate_physical_devices)(instance, p_physical_device_count, p_physical_devices)
    }
}

entry_points! {
    instance_context => context_proc_addr;
    fn vkEnumeratePhysicalDevices(
        instance: vk::Instance,
        p_physical_device_count: *mut u32,
        p_physical_devices: *mut vk::PhysicalDevice,
    ) -> vk::Result => enumerate_physical_devices;
    fn vkDestroySurfaceKHR(
        instance: vk::Instance,
        surface: vk::SurfaceKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_surface_khr;
    fn vkCreateHeadlessSurfaceEXT(
        instance: vk::Instance,
        p_create_info: *const vk::HeadlessSurfaceCreateInfoEXT<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_surface: *mut vk::SurfaceKHR,
    ) -> vk::Result => create_headless_surface_ext;
    #[cfg(windows)]
    fn vkCreateWin32SurfaceKHR(
        instance: vk::Instance,
        p_create_info: *const vk::Win32SurfaceCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_surface: *mut vk::SurfaceKHR,
    ) -> vk::Result => create_win32_surface_khr;
    #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
    fn vkCreateWaylandSurfaceKHR(
        instance: vk::Instance,
        p_create_info: *const vk::WaylandSurfaceCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_surface: *mut vk::SurfaceKHR,
    ) -> vk::Result => create_wayland_surface_khr;
    fn vkCreateDebugUtilsMessengerEXT(
        instance: vk::Instance,
        p_create_info: *const vk::DebugUtilsMessengerCreateInfoEXT<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_messenger: *mut vk::DebugUtilsMessengerEXT,
    ) -> vk::Result => create_debug_utils_messenger_ext;
    fn vkDestroyDebugUtilsMessengerEXT(
        instance: vk::Instance,
        messenger: vk::DebugUtilsMessengerEXT,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_debug_utils_messenger_ext;
}

/// Resolve an instance-level command this layer intercepts.
pub fn proc_addr(name: &str) -> vk::PFN_vkVoidFunction {
    match name {
        "vkCreateInstance" => void_fn(vkCreateInstance as *const ()),
        "vkDestroyInstance" => void_fn(vkDestroyInstance as *const ()),
        _ => context_proc_addr(name),
    }
}

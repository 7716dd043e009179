//! Per-instance and per-device dispatch contexts.
//!
//! The Vulkan loader stores its dispatch table pointer in the first
//! `sizeof(void*)` bytes of every dispatchable handle (VkInstance,
//! VkPhysicalDevice, VkDevice, VkQueue, VkCommandBuffer). Children share their
//! parent's table, so that pointer is a stable key for the owning instance or
//! device regardless of which dispatchable handle a call arrives on.

use std::collections::{HashMap, HashSet};
use std::ffi::{c_void, CStr};
use std::sync::{Arc, OnceLock};

use ash::vk;
use ash::vk::Handle;
use dashmap::DashMap;
use parking_lot::Mutex;
use vkchassis_core::{HandleTranslator, LayerSettings};

use crate::deferred::DeferredOperations;
use crate::scratch::Scratch;
use crate::unwrap::{UnwrapArg, Unwrapper};

/// The loader dispatch table pointer read out of a dispatchable handle.
pub type DispatchKey = usize;

/// Read the dispatch key of a dispatchable handle. Null yields key 0.
///
/// # Safety
/// `handle` must be null or a live dispatchable object created through the loader.
pub unsafe fn dispatch_key<H: Handle>(handle: H) -> DispatchKey {
    let ptr = handle.as_raw() as usize as *const DispatchKey;
    if ptr.is_null() {
        return 0;
    }
    *ptr
}

/// Registry of contexts keyed by dispatch key.
pub type LayerDataMap<T> = DashMap<DispatchKey, Arc<T>>;

macro_rules! layer_data_map {
    ($map_name:ident, $fn_map:ident, $data:ty) => {
        static $map_name: OnceLock<LayerDataMap<$data>> = OnceLock::new();

        pub fn $fn_map() -> &'static LayerDataMap<$data> {
            $map_name.get_or_init(DashMap::new)
        }
    };
}

layer_data_map!(INSTANCE_MAP, instances, InstanceData);
layer_data_map!(DEVICE_MAP, devices, DeviceData);

/// Look up the instance context owning an instance or physical device.
///
/// # Safety
/// See [`dispatch_key`].
pub unsafe fn instance_context<H: Handle>(handle: H) -> Option<Arc<InstanceData>> {
    instances().get(&dispatch_key(handle)).map(|v| v.clone())
}

/// Look up the device context owning a device, queue or command buffer.
///
/// # Safety
/// See [`dispatch_key`].
pub unsafe fn device_context<H: Handle>(handle: H) -> Option<Arc<DeviceData>> {
    devices().get(&dispatch_key(handle)).map(|v| v.clone())
}

/// Common view of a dispatch context used by the generic forwarding helpers.
pub trait LayerContext {
    fn wrap_handles(&self) -> bool;
    fn translator(&self) -> &HandleTranslator;

    fn unwrapper<'a>(&'a self, scratch: &'a Scratch) -> Unwrapper<'a> {
        Unwrapper::new(self.translator(), scratch)
    }

    /// Translate a by-value argument, or return it as-is when wrapping is off.
    fn unwrapped<A: UnwrapArg>(&self, arg: A) -> A {
        if self.wrap_handles() {
            arg.unwrap_arg(self.translator())
        } else {
            arg
        }
    }
}

// ── Dispatch tables ─────────────────────────────────────────

/// Next-layer instance-level entry points.
pub struct InstanceDispatchTable {
    pub get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    pub v1_0: ash::InstanceFnV1_0,
    pub surface: ash::khr::surface::InstanceFn,
    pub headless_surface: ash::ext::headless_surface::InstanceFn,
    #[cfg(windows)]
    pub win32_surface: ash::khr::win32_surface::InstanceFn,
    #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
    pub wayland_surface: ash::khr::wayland_surface::InstanceFn,
    pub debug_utils: ash::ext::debug_utils::InstanceFn,
}

impl InstanceDispatchTable {
    /// Resolve every entry point through the next layer's `vkGetInstanceProcAddr`.
    ///
    /// # Safety
    /// `get_instance_proc_addr` must be a valid resolver for `instance`.
    pub unsafe fn load(
        get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
        instance: vk::Instance,
    ) -> Self {
        Self::load_with(get_instance_proc_addr, |name| {
            std::mem::transmute::<vk::PFN_vkVoidFunction, *const c_void>(get_instance_proc_addr(
                instance,
                name.as_ptr(),
            ))
        })
    }

    /// Build a table from an arbitrary name resolver.
    pub fn load_with<F: FnMut(&CStr) -> *const c_void>(
        get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
        mut f: F,
    ) -> Self {
        Self {
            get_instance_proc_addr,
            v1_0: ash::InstanceFnV1_0::load(&mut f),
            surface: ash::khr::surface::InstanceFn::load(&mut f),
            headless_surface: ash::ext::headless_surface::InstanceFn::load(&mut f),
            #[cfg(windows)]
            win32_surface: ash::khr::win32_surface::InstanceFn::load(&mut f),
            #[cfg(all(unix, not(any(target_os = "macos", target_os = "ios", target_os = "android"))))]
            wayland_surface: ash::khr::wayland_surface::InstanceFn::load(&mut f),
            debug_utils: ash::ext::debug_utils::InstanceFn::load(&mut f),
        }
    }
}

/// Next-layer device-level entry points.
pub struct DeviceDispatchTable {
    pub get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
    pub v1_0: ash::DeviceFnV1_0,
    pub v1_1: ash::DeviceFnV1_1,
    pub v1_2: ash::DeviceFnV1_2,
    pub v1_3: ash::DeviceFnV1_3,
    pub swapchain: ash::khr::swapchain::DeviceFn,
    pub acceleration_structure: ash::khr::acceleration_structure::DeviceFn,
    pub ray_tracing_pipeline: ash::khr::ray_tracing_pipeline::DeviceFn,
    pub deferred_host_operations: ash::khr::deferred_host_operations::DeviceFn,
    pub debug_utils: ash::ext::debug_utils::DeviceFn,
}

impl DeviceDispatchTable {
    /// Resolve every entry point through the next layer's `vkGetDeviceProcAddr`.
    ///
    /// # Safety
    /// `get_device_proc_addr` must be a valid resolver for `device`.
    pub unsafe fn load(get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr, device: vk::Device) -> Self {
        Self::load_with(get_device_proc_addr, |name| {
            std::mem::transmute::<vk::PFN_vkVoidFunction, *const c_void>(get_device_proc_addr(
                device,
                name.as_ptr(),
            ))
        })
    }

    /// Build a table from an arbitrary name resolver.
    pub fn load_with<F: FnMut(&CStr) -> *const c_void>(
        get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
        mut f: F,
    ) -> Self {
        Self {
            get_device_proc_addr,
            v1_0: ash::DeviceFnV1_0::load(&mut f),
            v1_1: ash::DeviceFnV1_1::load(&mut f),
            v1_2: ash::DeviceFnV1_2::load(&mut f),
            v1_3: ash::DeviceFnV1_3::load(&mut f),
            swapchain: ash::khr::swapchain::DeviceFn::load(&mut f),
            acceleration_structure: ash::khr::acceleration_structure::DeviceFn::load(&mut f),
            ray_tracing_pipeline: ash::khr::ray_tracing_pipeline::DeviceFn::load(&mut f),
            deferred_host_operations: ash::khr::deferred_host_operations::DeviceFn::load(&mut f),
            debug_utils: ash::ext::debug_utils::DeviceFn::load(&mut f),
        }
    }
}

// ── Contexts ────────────────────────────────────────────────

/// State for one VkInstance, shared by its physical devices.
pub struct InstanceData {
    pub instance: vk::Instance,
    pub table: InstanceDispatchTable,
    pub settings: LayerSettings,
    translator: Arc<HandleTranslator>,
}

impl InstanceData {
    pub fn new(instance: vk::Instance, table: InstanceDispatchTable, settings: LayerSettings) -> Self {
        Self {
            instance,
            table,
            translator: Arc::new(HandleTranslator::with_policy(settings.unknown_handles)),
            settings,
        }
    }

    pub fn shared_translator(&self) -> Arc<HandleTranslator> {
        self.translator.clone()
    }
}

impl LayerContext for InstanceData {
    fn wrap_handles(&self) -> bool {
        self.settings.wrap_handles
    }

    fn translator(&self) -> &HandleTranslator {
        &self.translator
    }
}

/// Wrapped images owned by one swapchain, in driver order.
#[derive(Default)]
pub(crate) struct SwapchainImages {
    /// (inner, outer) pairs
    pub images: Vec<(u64, u64)>,
}

/// State for one VkDevice, shared by its queues and command buffers.
pub struct DeviceData {
    pub device: vk::Device,
    pub instance: Arc<InstanceData>,
    pub table: DeviceDispatchTable,
    translator: HandleTranslator,
    deferred: DeferredOperations,
    /// Descriptor pool outer handle -> outer handles of sets allocated from it
    pub(crate) pool_sets: DashMap<u64, HashSet<u64>>,
    /// Swapchain outer handle -> its wrapped images
    pub(crate) swapchain_images: Mutex<HashMap<u64, SwapchainImages>>,
    /// Secondary command buffer -> outer handle of its pool
    pub(crate) secondary_command_buffers: DashMap<u64, u64>,
}

impl DeviceData {
    pub fn new(device: vk::Device, instance: Arc<InstanceData>, table: DeviceDispatchTable) -> Self {
        Self {
            device,
            translator: HandleTranslator::with_parent(instance.shared_translator()),
            instance,
            table,
            deferred: DeferredOperations::new(),
            pool_sets: DashMap::new(),
            swapchain_images: Mutex::new(HashMap::new()),
            secondary_command_buffers: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &LayerSettings {
        &self.instance.settings
    }

    pub fn deferred(&self) -> &DeferredOperations {
        &self.deferred
    }
}

impl LayerContext for DeviceData {
    fn wrap_handles(&self) -> bool {
        self.instance.settings.wrap_handles
    }

    fn translator(&self) -> &HandleTranslator {
        &self.translator
    }
}

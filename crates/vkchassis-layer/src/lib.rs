//! vkchassis Vulkan layer
//!
//! This cdylib sits between an application and the driver in the Vulkan
//! loader chain. Every non-dispatchable handle the driver creates is replaced
//! by a layer-owned outer handle; every call going down the chain has its
//! handles, including those buried in structure arrays and pNext chains,
//! translated back to the driver's values.

use std::ffi::{c_char, CStr};
use std::sync::OnceLock;

use ash::vk;
use vkchassis_common::logging::init_logging;
use vkchassis_common::platform::{platform_extension_families, platform_name};
use vkchassis_core::config::{default_config_path, ChassisConfig};

pub mod acceleration;
pub mod command;
pub mod deferred;
pub mod descriptor;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod forward;
pub mod image;
pub mod instance;
pub mod loader;
pub mod memory;
pub mod physical_device;
pub mod pipeline;
pub mod pnext;
pub mod renderpass;
pub mod scratch;
pub mod structs;
pub mod swapchain;
pub mod sync;
pub mod unwrap;

use dispatch::{device_context, instance_context};
use forward::void_fn;
use loader::NegotiateLayerInterface;

/// Name this layer is registered under in its manifest.
pub const LAYER_NAME: &str = "VK_LAYER_VKCHASSIS_handle_wrapping";

// ── Configuration ───────────────────────────────────────────

static CONFIG: OnceLock<ChassisConfig> = OnceLock::new();

/// Process-wide configuration, loaded on first use. Logging is brought up
/// at the same time.
pub fn layer_config() -> &'static ChassisConfig {
    CONFIG.get_or_init(|| {
        let config = ChassisConfig::load_or_default(&default_config_path());
        init_logging(&config.logging.filter);
        tracing::info!(
            platform = platform_name(),
            families = ?platform_extension_families(),
            wrap_handles = config.layer.wrap_handles,
            "{LAYER_NAME} loaded"
        );
        config
    })
}

// ── Proc-addr tables ────────────────────────────────────────

/// Commands dispatched on an instance or physical device.
fn instance_command(name: &str) -> vk::PFN_vkVoidFunction {
    instance::proc_addr(name).or_else(|| physical_device::proc_addr(name))
}

/// Commands dispatched on a device, queue or command buffer.
fn device_command(name: &str) -> vk::PFN_vkVoidFunction {
    device::proc_addr(name)
        .or_else(|| sync::proc_addr(name))
        .or_else(|| memory::proc_addr(name))
        .or_else(|| image::proc_addr(name))
        .or_else(|| descriptor::proc_addr(name))
        .or_else(|| pipeline::proc_addr(name))
        .or_else(|| renderpass::proc_addr(name))
        .or_else(|| command::proc_addr(name))
        .or_else(|| swapchain::proc_addr(name))
        .or_else(|| acceleration::proc_addr(name))
}

/// Resolver entry points, answered without consulting the next layer.
fn resolver_command(name: &str) -> vk::PFN_vkVoidFunction {
    match name {
        "vkGetInstanceProcAddr" => void_fn(vkGetInstanceProcAddr as *const ()),
        "vkGetDeviceProcAddr" => void_fn(vkGetDeviceProcAddr as *const ()),
        _ => None,
    }
}

unsafe fn command_name<'a>(p_name: *const c_char) -> Option<&'a str> {
    if p_name.is_null() {
        return None;
    }
    CStr::from_ptr(p_name).to_str().ok()
}

// ── Loader interface ────────────────────────────────────────

/// Negotiate the loader/layer interface version.
#[no_mangle]
pub unsafe extern "system" fn vkNegotiateLoaderLayerInterfaceVersion(
    p_version_struct: *mut NegotiateLayerInterface,
) -> vk::Result {
    if p_version_struct.is_null() || (*p_version_struct).s_type != loader::LAYER_NEGOTIATE_INTERFACE_STRUCT {
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    let negotiate = &mut *p_version_struct;
    if negotiate.loader_layer_interface_version < loader::LAYER_INTERFACE_VERSION {
        tracing::warn!(
            loader_version = negotiate.loader_layer_interface_version,
            "loader interface too old for {LAYER_NAME}"
        );
        return vk::Result::ERROR_INITIALIZATION_FAILED;
    }
    negotiate.loader_layer_interface_version = loader::LAYER_INTERFACE_VERSION;
    negotiate.pfn_get_instance_proc_addr = void_fn(vkGetInstanceProcAddr as *const ());
    negotiate.pfn_get_device_proc_addr = void_fn(vkGetDeviceProcAddr as *const ());
    negotiate.pfn_get_physical_device_proc_addr = None;
    vk::Result::SUCCESS
}

/// Resolve an instance-level (or device-level) command name.
///
/// Intercepted commands are only handed out when the next layer exposes
/// them too, so disabled extensions still resolve to null.
#[no_mangle]
pub unsafe extern "system" fn vkGetInstanceProcAddr(
    instance: vk::Instance,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = command_name(p_name)?;
    if let Some(pfn) = resolver_command(name) {
        return Some(pfn);
    }
    if name == "vkCreateInstance" {
        return instance::proc_addr(name);
    }

    let data = instance_context(instance)?;
    let next = (data.table.get_instance_proc_addr)(instance, p_name);
    next?;
    instance_command(name).or_else(|| device_command(name)).or(next)
}

/// Resolve a device-level command name.
#[no_mangle]
pub unsafe extern "system" fn vkGetDeviceProcAddr(
    device: vk::Device,
    p_name: *const c_char,
) -> vk::PFN_vkVoidFunction {
    let name = command_name(p_name)?;
    if let Some(pfn) = resolver_command(name) {
        return Some(pfn);
    }

    let data = device_context(device)?;
    let next = (data.table.get_device_proc_addr)(device, p_name);
    next?;
    device_command(name).or(next)
}

//! Vulkan loader <-> layer interface (vk_layer.h).
//!
//! The loader threads a `VkLayer*CreateInfo` with `function == LINK_INFO`
//! through the create-info pNext chain. Each layer takes the next layer's
//! proc-addr resolvers from the head link and advances the head before
//! calling down, so the next layer sees its own link.

use std::ffi::c_void;

use ash::vk;

pub const LOADER_INSTANCE_CREATE_INFO: vk::StructureType = vk::StructureType::from_raw(47);
pub const LOADER_DEVICE_CREATE_INFO: vk::StructureType = vk::StructureType::from_raw(48);

/// `VkLayerFunction::VK_LAYER_LINK_INFO`
pub const LAYER_LINK_INFO: u32 = 0;

/// `VkNegotiateLayerStructType::LAYER_NEGOTIATE_INTERFACE_STRUCT`
pub const LAYER_NEGOTIATE_INTERFACE_STRUCT: u32 = 1;

/// Highest loader-layer interface version this layer speaks.
pub const LAYER_INTERFACE_VERSION: u32 = 2;

#[repr(C)]
pub struct LayerInstanceLink {
    pub p_next: *mut LayerInstanceLink,
    pub pfn_next_get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    pub pfn_next_get_physical_device_proc_addr: vk::PFN_vkVoidFunction,
}

// Only the `pLayerInfo` member of the C union is ever read.
#[repr(C)]
pub struct LayerInstanceCreateInfo {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub function: u32,
    pub p_layer_info: *mut LayerInstanceLink,
}

#[repr(C)]
pub struct LayerDeviceLink {
    pub p_next: *mut LayerDeviceLink,
    pub pfn_next_get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    pub pfn_next_get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
}

#[repr(C)]
pub struct LayerDeviceCreateInfo {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub function: u32,
    pub p_layer_info: *mut LayerDeviceLink,
}

#[repr(C)]
pub struct NegotiateLayerInterface {
    pub s_type: u32,
    pub p_next: *mut c_void,
    pub loader_layer_interface_version: u32,
    pub pfn_get_instance_proc_addr: vk::PFN_vkVoidFunction,
    pub pfn_get_device_proc_addr: vk::PFN_vkVoidFunction,
    pub pfn_get_physical_device_proc_addr: vk::PFN_vkVoidFunction,
}

/// Next-layer resolvers taken from an instance create chain.
#[derive(Clone, Copy)]
pub struct InstanceLink {
    pub get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
}

/// Next-layer resolvers taken from a device create chain.
#[derive(Clone, Copy)]
pub struct DeviceLink {
    pub get_instance_proc_addr: vk::PFN_vkGetInstanceProcAddr,
    pub get_device_proc_addr: vk::PFN_vkGetDeviceProcAddr,
}

unsafe fn find_link_info<T>(mut p: *const c_void, s_type: vk::StructureType) -> Option<*mut T> {
    while !p.is_null() {
        let base = &*(p as *const vk::BaseInStructure<'_>);
        if base.s_type == s_type {
            // both create-info layouts share this prefix
            let info = &*(p as *const LayerInstanceCreateInfo);
            if info.function == LAYER_LINK_INFO && !info.p_layer_info.is_null() {
                return Some(p as *mut T);
            }
        }
        p = base.p_next as *const c_void;
    }
    None
}

/// Take this layer's link out of an instance create chain and advance it.
///
/// # Safety
/// `p_create_info` must be the loader-provided create info.
pub unsafe fn take_instance_link(p_create_info: *const vk::InstanceCreateInfo<'_>) -> Option<InstanceLink> {
    let info = find_link_info::<LayerInstanceCreateInfo>((*p_create_info).p_next, LOADER_INSTANCE_CREATE_INFO)?;
    let link = (*info).p_layer_info;
    let taken = InstanceLink {
        get_instance_proc_addr: (*link).pfn_next_get_instance_proc_addr,
    };
    (*info).p_layer_info = (*link).p_next;
    Some(taken)
}

/// Take this layer's link out of a device create chain and advance it.
///
/// # Safety
/// `p_create_info` must be the loader-provided create info.
pub unsafe fn take_device_link(p_create_info: *const vk::DeviceCreateInfo<'_>) -> Option<DeviceLink> {
    let info = find_link_info::<LayerDeviceCreateInfo>((*p_create_info).p_next, LOADER_DEVICE_CREATE_INFO)?;
    let link = (*info).p_layer_info;
    let taken = DeviceLink {
        get_instance_proc_addr: (*link).pfn_next_get_instance_proc_addr,
        get_device_proc_addr: (*link).pfn_next_get_device_proc_addr,
    };
    (*info).p_layer_info = (*link).p_next;
    Some(taken)
}

//! Physical device and surface queries.
//!
//! Physical devices are dispatchable, so almost everything here forwards by
//! value; only surfaces need unwrapping.

use std::ffi::{c_char, CStr};

use ash::vk;

use crate::dispatch::InstanceData;
use crate::forward::entry_points;
use crate::unwrap::passthrough;

impl InstanceData {
    /// This layer adds no device extensions, so a query naming it answers
    /// with an empty list instead of going down the chain.
    pub unsafe fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        p_layer_name: *const c_char,
        p_property_count: *mut u32,
        p_properties: *mut vk::ExtensionProperties,
    ) -> vk::Result {
        if !p_layer_name.is_null() && CStr::from_ptr(p_layer_name).to_bytes() == crate::LAYER_NAME.as_bytes() {
            if !p_property_count.is_null() {
                *p_property_count = 0;
            }
            return vk::Result::SUCCESS;
        }
        (self.table.v1_0.enumerate_device_extension_properties)(
            physical_device,
            p_layer_name,
            p_property_count,
            p_properties,
        )
    }
}

passthrough! {
    impl InstanceData {
        fn get_physical_device_properties(
            physical_device: vk::PhysicalDevice,
            p_properties: *mut vk::PhysicalDeviceProperties,
        ) => v1_0.get_physical_device_properties;
        fn get_physical_device_features(
            physical_device: vk::PhysicalDevice,
            p_features: *mut vk::PhysicalDeviceFeatures,
        ) => v1_0.get_physical_device_features;
        fn get_physical_device_memory_properties(
            physical_device: vk::PhysicalDevice,
            p_memory_properties: *mut vk::PhysicalDeviceMemoryProperties,
        ) => v1_0.get_physical_device_memory_properties;
        fn get_physical_device_queue_family_properties(
            physical_device: vk::PhysicalDevice,
            p_queue_family_property_count: *mut u32,
            p_queue_family_properties: *mut vk::QueueFamilyProperties,
        ) => v1_0.get_physical_device_queue_family_properties;
        fn get_physical_device_format_properties(
            physical_device: vk::PhysicalDevice,
            format: vk::Format,
            p_format_properties: *mut vk::FormatProperties,
        ) => v1_0.get_physical_device_format_properties;
        fn get_physical_device_image_format_properties(
            physical_device: vk::PhysicalDevice,
            format: vk::Format,
            ty: vk::ImageType,
            tiling: vk::ImageTiling,
            usage: vk::ImageUsageFlags,
            flags: vk::ImageCreateFlags,
            p_image_format_properties: *mut vk::ImageFormatProperties,
        ) -> vk::Result => v1_0.get_physical_device_image_format_properties;

        fn get_physical_device_surface_support_khr(
            physical_device: vk::PhysicalDevice,
            queue_family_index: u32,
            surface: vk::SurfaceKHR,
            p_supported: *mut vk::Bool32,
        ) -> vk::Result => surface.get_physical_device_surface_support_khr;
        fn get_physical_device_surface_capabilities_khr(
            physical_device: vk::PhysicalDevice,
            surface: vk::SurfaceKHR,
            p_surface_capabilities: *mut vk::SurfaceCapabilitiesKHR,
        ) -> vk::Result => surface.get_physical_device_surface_capabilities_khr;
        fn get_physical_device_surface_formats_khr(
            physical_device: vk::PhysicalDevice,
            surface: vk::SurfaceKHR,
            p_surface_format_count: *mut u32,
            p_surface_formats: *mut vk::SurfaceFormatKHR,
        ) -> vk::Result => surface.get_physical_device_surface_formats_khr;
        fn get_physical_device_surface_present_modes_khr(
            physical_device: vk::PhysicalDevice,
            surface: vk::SurfaceKHR,
            p_present_mode_count: *mut u32,
            p_present_modes: *mut vk::PresentModeKHR,
        ) -> vk::Result => surface.get_physical_device_surface_present_modes_khr;
    }
}

entry_points! {
    instance_context => proc_addr;
    fn vkEnumerateDeviceExtensionProperties(
        physical_device: vk::PhysicalDevice,
        p_layer_name: *const c_char,
        p_property_count: *mut u32,
        p_properties: *mut vk::ExtensionProperties,
    ) -> vk::Result => enumerate_device_extension_properties;
    fn vkGetPhysicalDeviceProperties(
        physical_device: vk::PhysicalDevice,
        p_properties: *mut vk::PhysicalDeviceProperties,
    ) => get_physical_device_properties;
    fn vkGetPhysicalDeviceFeatures(
        physical_device: vk::PhysicalDevice,
        p_features: *mut vk::PhysicalDeviceFeatures,
    ) => get_physical_device_features;
    fn vkGetPhysicalDeviceMemoryProperties(
        physical_device: vk::PhysicalDevice,
        p_memory_properties: *mut vk::PhysicalDeviceMemoryProperties,
    ) => get_physical_device_memory_properties;
    fn vkGetPhysicalDeviceQueueFamilyProperties(
        physical_device: vk::PhysicalDevice,
        p_queue_family_property_count: *mut u32,
        p_queue_family_properties: *mut vk::QueueFamilyProperties,
    ) => get_physical_device_queue_family_properties;
    fn vkGetPhysicalDeviceFormatProperties(
        physical_device: vk::PhysicalDevice,
        format: vk::Format,
        p_format_properties: *mut vk::FormatProperties,
    ) => get_physical_device_format_properties;
    fn vkGetPhysicalDeviceImageFormatProperties(
        physical_device: vk::PhysicalDevice,
        format: vk::Format,
        ty: vk::ImageType,
        tiling: vk::ImageTiling,
        usage: vk::ImageUsageFlags,
        flags: vk::ImageCreateFlags,
        p_image_format_properties: *mut vk::ImageFormatProperties,
    ) -> vk::Result => get_physical_device_image_format_properties;
    fn vkGetPhysicalDeviceSurfaceSupportKHR(
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
        p_supported: *mut vk::Bool32,
    ) -> vk::Result => get_physical_device_surface_support_khr;
    fn vkGetPhysicalDeviceSurfaceCapabilitiesKHR(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        p_surface_capabilities: *mut vk::SurfaceCapabilitiesKHR,
    ) -> vk::Result => get_physical_device_surface_capabilities_khr;
    fn vkGetPhysicalDeviceSurfaceFormatsKHR(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        p_surface_format_count: *mut u32,
        p_surface_formats: *mut vk::SurfaceFormatKHR,
    ) -> vk::Result => get_physical_device_surface_formats_khr;
    fn vkGetPhysicalDeviceSurfacePresentModesKHR(
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        p_present_mode_count: *mut u32,
        p_present_modes: *mut vk::PresentModeKHR,
    ) -> vk::Result => get_physical_device_surface_present_modes_khr;
}

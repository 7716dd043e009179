//! Image, view and sampler forwarding.

use ash::vk;

use crate::dispatch::DeviceData;
use crate::forward::{create_destroy, entry_points};
use crate::unwrap::passthrough;

create_destroy! {
    create_image / destroy_image: ImageCreateInfo => Image, v1_0;
    create_image_view / destroy_image_view: ImageViewCreateInfo => ImageView, v1_0;
    create_buffer_view / destroy_buffer_view: BufferViewCreateInfo => BufferView, v1_0;
    create_sampler / destroy_sampler: SamplerCreateInfo => Sampler, v1_0;
    create_sampler_ycbcr_conversion / destroy_sampler_ycbcr_conversion:
        SamplerYcbcrConversionCreateInfo => SamplerYcbcrConversion, v1_1;
}

passthrough! {
    impl DeviceData {
        fn get_image_subresource_layout(
            device: vk::Device,
            image: vk::Image,
            p_subresource: *const vk::ImageSubresource,
            p_layout: *mut vk::SubresourceLayout,
        ) => v1_0.get_image_subresource_layout;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateImage(
        device: vk::Device,
        p_create_info: *const vk::ImageCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_image: *mut vk::Image,
    ) -> vk::Result => create_image;
    fn vkDestroyImage(
        device: vk::Device,
        image: vk::Image,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_image;
    fn vkGetImageSubresourceLayout(
        device: vk::Device,
        image: vk::Image,
        p_subresource: *const vk::ImageSubresource,
        p_layout: *mut vk::SubresourceLayout,
    ) => get_image_subresource_layout;
    fn vkCreateImageView(
        device: vk::Device,
        p_create_info: *const vk::ImageViewCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_view: *mut vk::ImageView,
    ) -> vk::Result => create_image_view;
    fn vkDestroyImageView(
        device: vk::Device,
        image_view: vk::ImageView,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_image_view;
    fn vkCreateBufferView(
        device: vk::Device,
        p_create_info: *const vk::BufferViewCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_view: *mut vk::BufferView,
    ) -> vk::Result => create_buffer_view;
    fn vkDestroyBufferView(
        device: vk::Device,
        buffer_view: vk::BufferView,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_buffer_view;
    fn vkCreateSampler(
        device: vk::Device,
        p_create_info: *const vk::SamplerCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_sampler: *mut vk::Sampler,
    ) -> vk::Result => create_sampler;
    fn vkDestroySampler(
        device: vk::Device,
        sampler: vk::Sampler,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_sampler;
    fn vkCreateSamplerYcbcrConversion(
        device: vk::Device,
        p_create_info: *const vk::SamplerYcbcrConversionCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_ycbcr_conversion: *mut vk::SamplerYcbcrConversion,
    ) -> vk::Result => create_sampler_ycbcr_conversion;
    fn vkDestroySamplerYcbcrConversion(
        device: vk::Device,
        ycbcr_conversion: vk::SamplerYcbcrConversion,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_sampler_ycbcr_conversion;
}

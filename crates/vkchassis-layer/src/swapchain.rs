//! VK_KHR_swapchain forwarding.
//!
//! Swapchain images are owned by the swapchain and never destroyed by the
//! application, so the layer keeps them per swapchain: each inner image gets
//! one outer handle on first query, later queries hand back the same one,
//! and destroying the swapchain drops them all.

use std::slice;

use ash::vk;
use ash::vk::Handle;

use crate::dispatch::{DeviceData, LayerContext};
use crate::forward::{create_one, entry_points, forward_one};
use crate::unwrap::passthrough;

impl DeviceData {
    pub unsafe fn create_swapchain_khr(
        &self,
        device: vk::Device,
        p_create_info: *const vk::SwapchainCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_swapchain: *mut vk::SwapchainKHR,
    ) -> vk::Result {
        create_one(self, p_create_info, p_swapchain, |info| {
            (self.table.swapchain.create_swapchain_khr)(device, info, p_allocator, p_swapchain)
        })
    }

    pub unsafe fn destroy_swapchain_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        let destroy_swapchain_khr = self.table.swapchain.destroy_swapchain_khr;
        if !self.wrap_handles() {
            return destroy_swapchain_khr(device, swapchain, p_allocator);
        }
        let images = self.swapchain_images.lock().remove(&swapchain.as_raw());
        if let Some(images) = images {
            for (_, outer) in &images.images {
                self.translator().pop(*outer);
            }
            tracing::trace!(count = images.images.len(), "retired swapchain images");
        }
        destroy_swapchain_khr(device, self.translator().pop_handle(swapchain), p_allocator)
    }

    pub unsafe fn get_swapchain_images_khr(
        &self,
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        p_swapchain_image_count: *mut u32,
        p_swapchain_images: *mut vk::Image,
    ) -> vk::Result {
        let get_swapchain_images_khr = self.table.swapchain.get_swapchain_images_khr;
        if !self.wrap_handles() {
            return get_swapchain_images_khr(device, swapchain, p_swapchain_image_count, p_swapchain_images);
        }
        let result = get_swapchain_images_khr(
            device,
            self.translator().unwrap_handle(swapchain),
            p_swapchain_image_count,
            p_swapchain_images,
        );
        if p_swapchain_images.is_null()
            || !matches!(result, vk::Result::SUCCESS | vk::Result::INCOMPLETE)
        {
            return result;
        }

        let images = slice::from_raw_parts_mut(p_swapchain_images, *p_swapchain_image_count as usize);
        let mut owned = self.swapchain_images.lock();
        let known = owned.entry(swapchain.as_raw()).or_default();
        for image in images {
            let inner = image.as_raw();
            if inner == 0 {
                continue;
            }
            let outer = match known.images.iter().find(|(i, _)| *i == inner) {
                Some(&(_, outer)) => outer,
                None => {
                    let outer = self.translator().wrap_new(inner);
                    known.images.push((inner, outer));
                    outer
                }
            };
            *image = vk::Image::from_raw(outer);
        }
        result
    }

    pub unsafe fn acquire_next_image2_khr(
        &self,
        device: vk::Device,
        p_acquire_info: *const vk::AcquireNextImageInfoKHR<'_>,
        p_image_index: *mut u32,
    ) -> vk::Result {
        forward_one(self, p_acquire_info, |info| {
            (self.table.swapchain.acquire_next_image2_khr)(device, info, p_image_index)
        })
    }

    pub unsafe fn queue_present_khr(
        &self,
        queue: vk::Queue,
        p_present_info: *const vk::PresentInfoKHR<'_>,
    ) -> vk::Result {
        forward_one(self, p_present_info, |info| {
            (self.table.swapchain.queue_present_khr)(queue, info)
        })
    }

    /// Number of wrapped images recorded for `swapchain`.
    pub fn swapchain_image_count(&self, swapchain: vk::SwapchainKHR) -> usize {
        self.swapchain_images
            .lock()
            .get(&swapchain.as_raw())
            .map_or(0, |owned| owned.images.len())
    }
}

passthrough! {
    impl DeviceData {
        fn acquire_next_image_khr(
            device: vk::Device,
            swapchain: vk::SwapchainKHR,
            timeout: u64,
            semaphore: vk::Semaphore,
            fence: vk::Fence,
            p_image_index: *mut u32,
        ) -> vk::Result => swapchain.acquire_next_image_khr;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateSwapchainKHR(
        device: vk::Device,
        p_create_info: *const vk::SwapchainCreateInfoKHR<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_swapchain: *mut vk::SwapchainKHR,
    ) -> vk::Result => create_swapchain_khr;
    fn vkDestroySwapchainKHR(
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_swapchain_khr;
    fn vkGetSwapchainImagesKHR(
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        p_swapchain_image_count: *mut u32,
        p_swapchain_images: *mut vk::Image,
    ) -> vk::Result => get_swapchain_images_khr;
    fn vkAcquireNextImageKHR(
        device: vk::Device,
        swapchain: vk::SwapchainKHR,
        timeout: u64,
        semaphore: vk::Semaphore,
        fence: vk::Fence,
        p_image_index: *mut u32,
    ) -> vk::Result => acquire_next_image_khr;
    fn vkAcquireNextImage2KHR(
        device: vk::Device,
        p_acquire_info: *const vk::AcquireNextImageInfoKHR<'_>,
        p_image_index: *mut u32,
    ) -> vk::Result => acquire_next_image2_khr;
    fn vkQueuePresentKHR(
        queue: vk::Queue,
        p_present_info: *const vk::PresentInfoKHR<'_>,
    ) -> vk::Result => queue_present_khr;
}

//! Fence, semaphore, event and queue submission forwarding.

use ash::vk;

use crate::dispatch::{DeviceData, LayerContext};
use crate::forward::{create_one, destroy_one, entry_points, forward_one, forward_structs};
use crate::scratch::Scratch;
use crate::unwrap::passthrough;

impl DeviceData {
    // ── Fence ───────────────────────────────────────────────

    pub unsafe fn create_fence(
        &self,
        device: vk::Device,
        p_create_info: *const vk::FenceCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_fence: *mut vk::Fence,
    ) -> vk::Result {
        create_one(self, p_create_info, p_fence, |info| {
            (self.table.v1_0.create_fence)(device, info, p_allocator, p_fence)
        })
    }

    pub unsafe fn destroy_fence(
        &self,
        device: vk::Device,
        fence: vk::Fence,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, fence, |fence| {
            (self.table.v1_0.destroy_fence)(device, fence, p_allocator)
        })
    }

    pub unsafe fn reset_fences(&self, device: vk::Device, fence_count: u32, p_fences: *const vk::Fence) -> vk::Result {
        let reset_fences = self.table.v1_0.reset_fences;
        if !self.wrap_handles() {
            return reset_fences(device, fence_count, p_fences);
        }
        let scratch = Scratch::new();
        let fences = self.unwrapper(&scratch).handles(p_fences, fence_count);
        reset_fences(device, fence_count, fences)
    }

    pub unsafe fn wait_for_fences(
        &self,
        device: vk::Device,
        fence_count: u32,
        p_fences: *const vk::Fence,
        wait_all: vk::Bool32,
        timeout: u64,
    ) -> vk::Result {
        let wait_for_fences = self.table.v1_0.wait_for_fences;
        if !self.wrap_handles() {
            return wait_for_fences(device, fence_count, p_fences, wait_all, timeout);
        }
        let scratch = Scratch::new();
        let fences = self.unwrapper(&scratch).handles(p_fences, fence_count);
        wait_for_fences(device, fence_count, fences, wait_all, timeout)
    }

    // ── Semaphore ───────────────────────────────────────────

    pub unsafe fn create_semaphore(
        &self,
        device: vk::Device,
        p_create_info: *const vk::SemaphoreCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_semaphore: *mut vk::Semaphore,
    ) -> vk::Result {
        create_one(self, p_create_info, p_semaphore, |info| {
            (self.table.v1_0.create_semaphore)(device, info, p_allocator, p_semaphore)
        })
    }

    pub unsafe fn destroy_semaphore(
        &self,
        device: vk::Device,
        semaphore: vk::Semaphore,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, semaphore, |semaphore| {
            (self.table.v1_0.destroy_semaphore)(device, semaphore, p_allocator)
        })
    }

    pub unsafe fn wait_semaphores(
        &self,
        device: vk::Device,
        p_wait_info: *const vk::SemaphoreWaitInfo<'_>,
        timeout: u64,
    ) -> vk::Result {
        forward_one(self, p_wait_info, |info| {
            (self.table.v1_2.wait_semaphores)(device, info, timeout)
        })
    }

    pub unsafe fn signal_semaphore(
        &self,
        device: vk::Device,
        p_signal_info: *const vk::SemaphoreSignalInfo<'_>,
    ) -> vk::Result {
        forward_one(self, p_signal_info, |info| {
            (self.table.v1_2.signal_semaphore)(device, info)
        })
    }

    // ── Event ───────────────────────────────────────────────

    pub unsafe fn create_event(
        &self,
        device: vk::Device,
        p_create_info: *const vk::EventCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_event: *mut vk::Event,
    ) -> vk::Result {
        create_one(self, p_create_info, p_event, |info| {
            (self.table.v1_0.create_event)(device, info, p_allocator, p_event)
        })
    }

    pub unsafe fn destroy_event(
        &self,
        device: vk::Device,
        event: vk::Event,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) {
        destroy_one(self, event, |event| {
            (self.table.v1_0.destroy_event)(device, event, p_allocator)
        })
    }

    // ── Submission ──────────────────────────────────────────

    pub unsafe fn queue_submit(
        &self,
        queue: vk::Queue,
        submit_count: u32,
        p_submits: *const vk::SubmitInfo<'_>,
        fence: vk::Fence,
    ) -> vk::Result {
        let queue_submit = self.table.v1_0.queue_submit;
        if !self.wrap_handles() {
            return queue_submit(queue, submit_count, p_submits, fence);
        }
        let scratch = Scratch::new();
        let cx = self.unwrapper(&scratch);
        let submits = cx.structs(p_submits, submit_count);
        queue_submit(queue, submit_count, submits, cx.handle(fence))
    }

    pub unsafe fn queue_submit2(
        &self,
        queue: vk::Queue,
        submit_count: u32,
        p_submits: *const vk::SubmitInfo2<'_>,
        fence: vk::Fence,
    ) -> vk::Result {
        let queue_submit2 = self.table.v1_3.queue_submit2;
        if !self.wrap_handles() {
            return queue_submit2(queue, submit_count, p_submits, fence);
        }
        let fence = self.translator().unwrap_handle(fence);
        forward_structs(self, p_submits, submit_count, |submits| {
            queue_submit2(queue, submit_count, submits, fence)
        })
    }
}

passthrough! {
    impl DeviceData {
        fn get_fence_status(device: vk::Device, fence: vk::Fence) -> vk::Result => v1_0.get_fence_status;
        fn get_event_status(device: vk::Device, event: vk::Event) -> vk::Result => v1_0.get_event_status;
        fn set_event(device: vk::Device, event: vk::Event) -> vk::Result => v1_0.set_event;
        fn reset_event(device: vk::Device, event: vk::Event) -> vk::Result => v1_0.reset_event;
        fn get_semaphore_counter_value(
            device: vk::Device,
            semaphore: vk::Semaphore,
            p_value: *mut u64,
        ) -> vk::Result => v1_2.get_semaphore_counter_value;
    }
}

entry_points! {
    device_context => proc_addr;
    fn vkCreateFence(
        device: vk::Device,
        p_create_info: *const vk::FenceCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_fence: *mut vk::Fence,
    ) -> vk::Result => create_fence;
    fn vkDestroyFence(
        device: vk::Device,
        fence: vk::Fence,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_fence;
    fn vkResetFences(device: vk::Device, fence_count: u32, p_fences: *const vk::Fence) -> vk::Result => reset_fences;
    fn vkGetFenceStatus(device: vk::Device, fence: vk::Fence) -> vk::Result => get_fence_status;
    fn vkWaitForFences(
        device: vk::Device,
        fence_count: u32,
        p_fences: *const vk::Fence,
        wait_all: vk::Bool32,
        timeout: u64,
    ) -> vk::Result => wait_for_fences;
    fn vkCreateSemaphore(
        device: vk::Device,
        p_create_info: *const vk::SemaphoreCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_semaphore: *mut vk::Semaphore,
    ) -> vk::Result => create_semaphore;
    fn vkDestroySemaphore(
        device: vk::Device,
        semaphore: vk::Semaphore,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_semaphore;
    fn vkGetSemaphoreCounterValue(
        device: vk::Device,
        semaphore: vk::Semaphore,
        p_value: *mut u64,
    ) -> vk::Result => get_semaphore_counter_value;
    fn vkWaitSemaphores(
        device: vk::Device,
        p_wait_info: *const vk::SemaphoreWaitInfo<'_>,
        timeout: u64,
    ) -> vk::Result => wait_semaphores;
    fn vkSignalSemaphore(
        device: vk::Device,
        p_signal_info: *const vk::SemaphoreSignalInfo<'_>,
    ) -> vk::Result => signal_semaphore;
    fn vkCreateEvent(
        device: vk::Device,
        p_create_info: *const vk::EventCreateInfo<'_>,
        p_allocator: *const vk::AllocationCallbacks<'_>,
        p_event: *mut vk::Event,
    ) -> vk::Result => create_event;
    fn vkDestroyEvent(
        device: vk::Device,
        event: vk::Event,
        p_allocator: *const vk::AllocationCallbacks<'_>,
    ) => destroy_event;
    fn vkGetEventStatus(device: vk::Device, event: vk::Event) -> vk::Result => get_event_status;
    fn vkSetEvent(device: vk::Device, event: vk::Event) -> vk::Result => set_event;
    fn vkResetEvent(device: vk::Device, event: vk::Event) -> vk::Result => reset_event;
    fn vkQueueSubmit(
        queue: vk::Queue,
        submit_count: u32,
        p_submits: *const vk::SubmitInfo<'_>,
        fence: vk::Fence,
    ) -> vk::Result => queue_submit;
    fn vkQueueSubmit2(
        queue: vk::Queue,
        submit_count: u32,
        p_submits: *const vk::SubmitInfo2<'_>,
        fence: vk::Fence,
    ) -> vk::Result => queue_submit2;
}

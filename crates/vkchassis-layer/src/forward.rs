//! Shared forwarding machinery: entry point generation and the
//! create/destroy helpers every object family goes through.

use std::slice;

use ash::vk;
use ash::vk::Handle;
use vkchassis_core::HandleTranslator;

use crate::dispatch::LayerContext;
use crate::scratch::Scratch;
use crate::unwrap::UnwrapHandles;

/// Value returned by an entry point whose dispatchable handle has no context.
pub trait Fallback {
    fn fallback() -> Self;
}

impl Fallback for () {
    fn fallback() -> Self {}
}

impl Fallback for vk::Result {
    fn fallback() -> Self {
        vk::Result::ERROR_DEVICE_LOST
    }
}

impl Fallback for u32 {
    fn fallback() -> Self {
        0
    }
}

impl Fallback for u64 {
    fn fallback() -> Self {
        0
    }
}

/// Generate `extern "system"` entry points that resolve their context from
/// the first (dispatchable) argument and call the same-named context method,
/// plus a resolver mapping Vulkan command names to those entry points.
macro_rules! entry_points {
    (
        $lookup:ident => $resolver:ident;
        $(
            $(#[$meta:meta])*
            fn $name:ident($first:ident: $first_ty:ty $(, $arg:ident: $ty:ty)* $(,)?) $(-> $ret:ty)? => $method:ident;
        )*
    ) => {
        $(
            $(#[$meta])*
            #[allow(non_snake_case, clippy::too_many_arguments)]
            pub unsafe extern "system" fn $name($first: $first_ty $(, $arg: $ty)*) $(-> $ret)? {
                let Some(data) = $crate::dispatch::$lookup($first) else {
                    tracing::error!(command = stringify!($name), "no dispatch context for handle");
                    return $crate::forward::Fallback::fallback();
                };
                data.$method($first $(, $arg)*)
            }
        )*

        /// Resolve a command name to this module's entry point.
        pub fn $resolver(name: &str) -> ash::vk::PFN_vkVoidFunction {
            $(
                $(#[$meta])*
                {
                    if name == stringify!($name) {
                        return $crate::forward::void_fn($name as *const ());
                    }
                }
            )*
            None
        }
    };
}

pub(crate) use entry_points;

/// Erase an entry point to the loader's generic function pointer type.
pub(crate) fn void_fn(entry: *const ()) -> vk::PFN_vkVoidFunction {
    // SAFETY: every caller passes an `extern "system"` fn item cast to a pointer
    Some(unsafe { std::mem::transmute::<*const (), unsafe extern "system" fn()>(entry) })
}

/// Generate a create/destroy method pair for an object whose create info
/// goes through [`create_one`](crate::forward::create_one).
macro_rules! create_destroy {
    ($(
        $create:ident / $destroy:ident: $info:ident => $handle:ident, $table:ident;
    )*) => {
        impl $crate::dispatch::DeviceData {
            $(
                pub unsafe fn $create(
                    &self,
                    device: ash::vk::Device,
                    p_create_info: *const ash::vk::$info<'_>,
                    p_allocator: *const ash::vk::AllocationCallbacks<'_>,
                    p_handle: *mut ash::vk::$handle,
                ) -> ash::vk::Result {
                    $crate::forward::create_one(self, p_create_info, p_handle, |info| {
                        (self.table.$table.$create)(device, info, p_allocator, p_handle)
                    })
                }

                pub unsafe fn $destroy(
                    &self,
                    device: ash::vk::Device,
                    handle: ash::vk::$handle,
                    p_allocator: *const ash::vk::AllocationCallbacks<'_>,
                ) {
                    $crate::forward::destroy_one(self, handle, |handle| {
                        (self.table.$table.$destroy)(device, handle, p_allocator)
                    })
                }
            )*
        }
    };
}

pub(crate) use create_destroy;

// ── Create / destroy helpers ────────────────────────────────

/// Forward a create command with one input structure and one output handle.
/// The output is wrapped only on success.
pub(crate) unsafe fn create_one<C, T, H>(
    cx: &C,
    p_create_info: *const T,
    p_handle: *mut H,
    call: impl FnOnce(*const T) -> vk::Result,
) -> vk::Result
where
    C: LayerContext + ?Sized,
    T: UnwrapHandles + Copy,
    H: Handle + Copy,
{
    if !cx.wrap_handles() {
        return call(p_create_info);
    }
    let scratch = Scratch::new();
    let info = cx.unwrapper(&scratch).one(p_create_info);
    let result = call(info);
    if result == vk::Result::SUCCESS && !p_handle.is_null() {
        *p_handle = cx.translator().wrap(*p_handle);
    }
    result
}

/// Forward a create command with `count` input structures and as many
/// outputs. Every non-null output is wrapped whatever the result, since
/// pipeline creation may succeed partially.
pub(crate) unsafe fn create_many<C, T, H>(
    cx: &C,
    p_create_infos: *const T,
    count: u32,
    p_handles: *mut H,
    call: impl FnOnce(*const T) -> vk::Result,
) -> vk::Result
where
    C: LayerContext + ?Sized,
    T: UnwrapHandles + Copy,
    H: Handle + Copy,
{
    if !cx.wrap_handles() {
        return call(p_create_infos);
    }
    let scratch = Scratch::new();
    let infos = cx.unwrapper(&scratch).structs(p_create_infos, count);
    let result = call(infos);
    wrap_outputs(cx.translator(), p_handles, count);
    result
}

/// Forward a destroy command: the entry is removed first, then the inner
/// value (null for an unknown handle) goes down the chain.
pub(crate) unsafe fn destroy_one<C, H>(cx: &C, handle: H, call: impl FnOnce(H))
where
    C: LayerContext + ?Sized,
    H: Handle + Copy,
{
    if !cx.wrap_handles() {
        return call(handle);
    }
    call(cx.translator().pop_handle(handle))
}

/// Run `call` with `ptr` replaced by its unwrapped copy.
pub(crate) unsafe fn forward_one<C, T, R>(cx: &C, ptr: *const T, call: impl FnOnce(*const T) -> R) -> R
where
    C: LayerContext + ?Sized,
    T: UnwrapHandles + Copy,
{
    if !cx.wrap_handles() {
        return call(ptr);
    }
    let scratch = Scratch::new();
    let copy = cx.unwrapper(&scratch).one(ptr);
    call(copy)
}

/// Run `call` with a counted structure array replaced by unwrapped copies.
pub(crate) unsafe fn forward_structs<C, T, R>(
    cx: &C,
    ptr: *const T,
    count: u32,
    call: impl FnOnce(*const T) -> R,
) -> R
where
    C: LayerContext + ?Sized,
    T: UnwrapHandles + Copy,
{
    if !cx.wrap_handles() {
        return call(ptr);
    }
    let scratch = Scratch::new();
    let copies = cx.unwrapper(&scratch).structs(ptr, count);
    call(copies)
}

/// Wrap `count` driver-written handles in place. Null entries stay null.
pub(crate) unsafe fn wrap_outputs<H: Handle + Copy>(translator: &HandleTranslator, p_handles: *mut H, count: u32) {
    if p_handles.is_null() || count == 0 {
        return;
    }
    for handle in slice::from_raw_parts_mut(p_handles, count as usize) {
        *handle = translator.wrap(*handle);
    }
}

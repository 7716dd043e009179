//! Deep-copy-and-unwrap visitor for application input structures.
//!
//! Application memory is never written. Any structure that carries an outer
//! handle, directly, through a pointed-to array, or through its pNext chain,
//! is copied into a [`Scratch`] arena and the copy is rewritten in place. Each
//! pointer is redirected at its rewritten copy. Structures with nothing to
//! translate are forwarded by address.

use std::ffi::c_void;
use std::slice;

use ash::vk;
use ash::vk::Handle;
use vkchassis_core::HandleTranslator;

use crate::pnext;
use crate::scratch::Scratch;

/// A structure whose copy can have its embedded outer handles replaced.
pub trait UnwrapHandles {
    /// Rewrite `self`, which is already a scratch copy, in place.
    ///
    /// # Safety
    /// Every pointer field must satisfy the validity rules of the Vulkan
    /// command the structure was passed to.
    unsafe fn unwrap_handles(&mut self, cx: &Unwrapper<'_>);
}

pub struct Unwrapper<'a> {
    translator: &'a HandleTranslator,
    scratch: &'a Scratch,
}

impl<'a> Unwrapper<'a> {
    pub fn new(translator: &'a HandleTranslator, scratch: &'a Scratch) -> Self {
        Self { translator, scratch }
    }

    pub fn translator(&self) -> &'a HandleTranslator {
        self.translator
    }

    pub fn scratch(&self) -> &'a Scratch {
        self.scratch
    }

    pub fn handle<H: Handle>(&self, outer: H) -> H {
        self.translator.unwrap_handle(outer)
    }

    /// Copy a counted handle array and translate each element.
    ///
    /// # Safety
    /// `ptr` must be null or point at `count` readable handles.
    pub unsafe fn handles<H: Handle + Copy>(&self, ptr: *const H, count: u32) -> *const H {
        if ptr.is_null() || count == 0 {
            return ptr;
        }
        let src = slice::from_raw_parts(ptr, count as usize);
        self.scratch
            .fill_iter(src.iter().map(|h| self.handle(*h)))
            .as_ptr()
    }

    /// Copy a single pointed-to structure and unwrap it.
    ///
    /// # Safety
    /// `ptr` must be null or point at a valid `T`.
    pub unsafe fn one<T: UnwrapHandles + Copy>(&self, ptr: *const T) -> *const T {
        if ptr.is_null() {
            return ptr;
        }
        let copy = self.scratch.alloc(*ptr);
        copy.unwrap_handles(self);
        copy
    }

    /// Copy a counted structure array and unwrap every element.
    ///
    /// # Safety
    /// `ptr` must be null or point at `count` valid `T`s.
    pub unsafe fn structs<T: UnwrapHandles + Copy>(&self, ptr: *const T, count: u32) -> *const T {
        let Some(copies) = self.copy_slice(ptr, count) else {
            return ptr;
        };
        for copy in copies.iter_mut() {
            copy.unwrap_handles(self);
        }
        copies.as_ptr()
    }

    /// Copy a counted array without touching its contents.
    ///
    /// # Safety
    /// `ptr` must be null or point at `count` valid `T`s.
    pub unsafe fn copy_slice<T: Copy>(&self, ptr: *const T, count: u32) -> Option<&'a mut [T]> {
        if ptr.is_null() || count == 0 {
            return None;
        }
        Some(self.scratch.copy_slice(slice::from_raw_parts(ptr, count as usize)))
    }

    /// Rewrite a pNext chain; see [`pnext::PnextRegistry::unwrap_chain`].
    ///
    /// # Safety
    /// `p_next` must be null or a valid Vulkan structure chain.
    pub unsafe fn chain(&self, p_next: *const c_void) -> *const c_void {
        pnext::registry().unwrap_chain(self, p_next)
    }
}

/// Generate [`UnwrapHandles`] for structures with a regular shape.
///
/// Field kinds:
/// - `next f`: pNext chain
/// - `handle f`: a single non-dispatchable handle
/// - `handles f[n]`: handle array counted by field `n`
/// - `one f`: pointer to a single nested structure
/// - `structs f[n]`: nested structure array counted by field `n`
/// - `inline f`: nested structure embedded by value
macro_rules! unwrap_struct {
    ($( $ty:ty { $($kind:ident $field:ident $([$count:ident])?),* $(,)? } )*) => {
        $(
            impl $crate::unwrap::UnwrapHandles for $ty {
                #[allow(unused_variables)]
                unsafe fn unwrap_handles(&mut self, cx: &$crate::unwrap::Unwrapper<'_>) {
                    $( $crate::unwrap::unwrap_struct!(@field self, cx, $kind $field $([$count])?); )*
                }
            }
        )*
    };
    (@field $s:ident, $cx:ident, next $f:ident) => {
        $s.$f = $cx.chain($s.$f);
    };
    (@field $s:ident, $cx:ident, handle $f:ident) => {
        $s.$f = $cx.handle($s.$f);
    };
    (@field $s:ident, $cx:ident, handles $f:ident [$n:ident]) => {
        $s.$f = $cx.handles($s.$f, $s.$n);
    };
    (@field $s:ident, $cx:ident, one $f:ident) => {
        $s.$f = $cx.one($s.$f);
    };
    (@field $s:ident, $cx:ident, structs $f:ident [$n:ident]) => {
        $s.$f = $cx.structs($s.$f, $s.$n);
    };
    (@field $s:ident, $cx:ident, inline $f:ident) => {
        $crate::unwrap::UnwrapHandles::unwrap_handles(&mut $s.$f, $cx);
    };
}

pub(crate) use unwrap_struct;

// ── By-value arguments ──────────────────────────────────────

/// Translation of a command argument passed by value.
///
/// Non-dispatchable handles are unwrapped; everything else, including
/// dispatchable handles and raw pointers, passes through unchanged.
pub trait UnwrapArg: Copy {
    fn unwrap_arg(self, translator: &HandleTranslator) -> Self;
}

impl<T> UnwrapArg for *const T {
    #[inline]
    fn unwrap_arg(self, _: &HandleTranslator) -> Self {
        self
    }
}

impl<T> UnwrapArg for *mut T {
    #[inline]
    fn unwrap_arg(self, _: &HandleTranslator) -> Self {
        self
    }
}

macro_rules! unwrap_arg_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl UnwrapArg for $ty {
                #[inline]
                fn unwrap_arg(self, _: &HandleTranslator) -> Self {
                    self
                }
            }
        )*
    };
}

macro_rules! unwrap_arg_handle {
    ($($ty:ty),* $(,)?) => {
        $(
            impl UnwrapArg for $ty {
                #[inline]
                fn unwrap_arg(self, translator: &HandleTranslator) -> Self {
                    translator.unwrap_handle(self)
                }
            }
        )*
    };
}

unwrap_arg_identity!(
    u32,
    u64,
    i32,
    f32,
    usize,
    vk::Instance,
    vk::PhysicalDevice,
    vk::Device,
    vk::Queue,
    vk::CommandBuffer,
    vk::PipelineBindPoint,
    vk::IndexType,
    vk::ShaderStageFlags,
    vk::PipelineStageFlags,
    vk::PipelineStageFlags2,
    vk::DependencyFlags,
    vk::ImageLayout,
    vk::Filter,
    vk::MemoryMapFlags,
    vk::CommandPoolResetFlags,
    vk::CommandBufferResetFlags,
    vk::DescriptorPoolResetFlags,
    vk::CommandPoolTrimFlags,
    vk::QueryControlFlags,
    vk::QueryResultFlags,
    vk::SubpassContents,
    vk::StencilFaceFlags,
    vk::CullModeFlags,
    vk::FrontFace,
    vk::PrimitiveTopology,
    vk::CompareOp,
    vk::StencilOp,
    vk::AccelerationStructureTypeKHR,
    vk::Format,
    vk::ImageType,
    vk::ImageTiling,
    vk::ImageUsageFlags,
    vk::ImageCreateFlags,
);

unwrap_arg_handle!(
    vk::Buffer,
    vk::BufferView,
    vk::Image,
    vk::ImageView,
    vk::Sampler,
    vk::DeviceMemory,
    vk::Fence,
    vk::Semaphore,
    vk::Event,
    vk::QueryPool,
    vk::ShaderModule,
    vk::PipelineCache,
    vk::PipelineLayout,
    vk::Pipeline,
    vk::RenderPass,
    vk::Framebuffer,
    vk::DescriptorSetLayout,
    vk::DescriptorPool,
    vk::DescriptorSet,
    vk::CommandPool,
    vk::SamplerYcbcrConversion,
    vk::SurfaceKHR,
    vk::SwapchainKHR,
    vk::AccelerationStructureKHR,
    vk::DeferredOperationKHR,
    vk::DebugUtilsMessengerEXT,
);

/// Generate forwarders for commands whose arguments are all scalars,
/// by-value handles or raw pointers the layer does not need to inspect.
///
/// With wrapping disabled the original arguments go straight through.
macro_rules! passthrough {
    (impl $data:ident { $( fn $name:ident($($arg:ident: $ty:ty),* $(,)?) $(-> $ret:ty)? => $table:ident.$field:ident; )* }) => {
        impl $data {
            $(
                #[allow(clippy::too_many_arguments)]
                pub unsafe fn $name(&self, $($arg: $ty),*) $(-> $ret)? {
                    let pfn = self.table.$table.$field;
                    if !$crate::dispatch::LayerContext::wrap_handles(self) {
                        return pfn($($arg),*);
                    }
                    let translator = $crate::dispatch::LayerContext::translator(self);
                    pfn($($crate::unwrap::UnwrapArg::unwrap_arg($arg, translator)),*)
                }
            )*
        }
    };
}

pub(crate) use passthrough;

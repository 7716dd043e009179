//! pNext chain translation.
//!
//! A chain is always walked to its end through the common `sType`/`pNext`
//! header. It is copied node by node only as far as its last handle-bearing
//! node; everything after that is linked by reference. A node whose sType is
//! not registered cannot be copied, so when a handle-bearing node follows it
//! the node is left out of the forwarded chain. A chain with nothing to
//! translate comes back as the original pointer.

use std::collections::HashMap;
use std::ffi::c_void;
use std::ptr;
use std::sync::OnceLock;

use ash::vk;
use ash::vk::TaggedStructure;

use crate::scratch::Scratch;
use crate::unwrap::{UnwrapHandles, Unwrapper};

type CopyNodeFn = unsafe fn(&Scratch, *const vk::BaseInStructure<'static>) -> *mut vk::BaseOutStructure<'static>;
type UnwrapNodeFn = unsafe fn(*mut vk::BaseOutStructure<'static>, &Unwrapper<'_>);

#[derive(Clone, Copy)]
struct PnextEntry {
    copy: CopyNodeFn,
    /// `None` for nodes copied only so a later node can be reached.
    unwrap: Option<UnwrapNodeFn>,
}

unsafe fn copy_node<T: Copy>(
    scratch: &Scratch,
    src: *const vk::BaseInStructure<'static>,
) -> *mut vk::BaseOutStructure<'static> {
    let copy: *mut T = scratch.alloc(ptr::read(src.cast::<T>()));
    copy.cast()
}

unsafe fn unwrap_node<T: UnwrapHandles>(node: *mut vk::BaseOutStructure<'static>, cx: &Unwrapper<'_>) {
    (*node.cast::<T>()).unwrap_handles(cx);
}

/// Table of every structure type the layer knows how to copy.
#[derive(Default)]
pub struct PnextRegistry {
    entries: HashMap<vk::StructureType, PnextEntry>,
}

impl PnextRegistry {
    /// Register a structure that carries handles of its own.
    pub fn register_handles<T: TaggedStructure + UnwrapHandles + Copy>(&mut self) {
        self.entries.insert(
            T::STRUCTURE_TYPE,
            PnextEntry {
                copy: copy_node::<T>,
                unwrap: Some(unwrap_node::<T>),
            },
        );
    }

    /// Register a handle-free structure so later nodes stay reachable.
    pub fn register_plain<T: TaggedStructure + Copy>(&mut self) {
        self.entries.insert(
            T::STRUCTURE_TYPE,
            PnextEntry {
                copy: copy_node::<T>,
                unwrap: None,
            },
        );
    }

    pub fn is_known(&self, s_type: vk::StructureType) -> bool {
        self.entries.contains_key(&s_type)
    }

    pub fn is_handle_bearing(&self, s_type: vk::StructureType) -> bool {
        self.entries
            .get(&s_type)
            .is_some_and(|entry| entry.unwrap.is_some())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when a handle-bearing node appears anywhere in the chain.
    ///
    /// # Safety
    /// `head` must be null or a valid structure chain.
    pub unsafe fn needs_copy(&self, head: *const c_void) -> bool {
        let mut node = head.cast::<vk::BaseInStructure<'static>>();
        while !node.is_null() {
            if self.is_handle_bearing((*node).s_type) {
                return true;
            }
            node = (*node).p_next;
        }
        false
    }

    /// Produce a chain equivalent to `head` with every embedded handle
    /// translated. Copies live in the unwrapper's scratch arena.
    ///
    /// # Safety
    /// `head` must be null or a valid structure chain.
    pub unsafe fn unwrap_chain(&self, cx: &Unwrapper<'_>, head: *const c_void) -> *const c_void {
        if !self.needs_copy(head) {
            return head;
        }
        let src = head.cast::<vk::BaseInStructure<'static>>();
        let Some(entry) = self.entries.get(&(*src).s_type) else {
            tracing::warn!(
                s_type = ?(*src).s_type,
                "unrecognized pNext node ahead of a handle-bearing node, dropped from the forwarded chain"
            );
            return self.unwrap_chain(cx, (*src).p_next as *const c_void);
        };
        let copy = (entry.copy)(cx.scratch(), src);
        match entry.unwrap {
            // handle-bearing nodes rewrite their own p_next
            Some(unwrap) => unwrap(copy, cx),
            None => {
                let tail = self.unwrap_chain(cx, (*copy).p_next as *const c_void);
                (*copy).p_next = tail as *mut vk::BaseOutStructure<'static>;
            }
        }
        copy as *const c_void
    }
}

static REGISTRY: OnceLock<PnextRegistry> = OnceLock::new();

/// The process-wide registry, built on first use.
pub fn registry() -> &'static PnextRegistry {
    REGISTRY.get_or_init(build_registry)
}

fn build_registry() -> PnextRegistry {
    let mut r = PnextRegistry::default();

    // ── Handle-bearing ──────────────────────────────────────
    r.register_handles::<vk::MemoryDedicatedAllocateInfo<'static>>();
    r.register_handles::<vk::DedicatedAllocationMemoryAllocateInfoNV<'static>>();
    r.register_handles::<vk::ImageSwapchainCreateInfoKHR<'static>>();
    r.register_handles::<vk::BindImageMemorySwapchainInfoKHR<'static>>();
    r.register_handles::<vk::SamplerYcbcrConversionInfo<'static>>();
    r.register_handles::<vk::SwapchainPresentFenceInfoEXT<'static>>();
    r.register_handles::<vk::WriteDescriptorSetAccelerationStructureKHR<'static>>();
    r.register_handles::<vk::PipelineLibraryCreateInfoKHR<'static>>();
    r.register_handles::<vk::GraphicsPipelineShaderGroupsCreateInfoNV<'static>>();
    r.register_handles::<vk::RenderPassAttachmentBeginInfo<'static>>();
    r.register_handles::<vk::RenderingFragmentShadingRateAttachmentInfoKHR<'static>>();
    r.register_handles::<vk::RenderingFragmentDensityMapAttachmentInfoEXT<'static>>();
    #[cfg(windows)]
    {
        r.register_handles::<vk::Win32KeyedMutexAcquireReleaseInfoKHR<'static>>();
        r.register_handles::<vk::Win32KeyedMutexAcquireReleaseInfoNV<'static>>();
    }
    #[cfg(any(target_os = "macos", target_os = "ios"))]
    {
        r.register_handles::<vk::ExportMetalBufferInfoEXT<'static>>();
        r.register_handles::<vk::ExportMetalTextureInfoEXT<'static>>();
        r.register_handles::<vk::ExportMetalIOSurfaceInfoEXT<'static>>();
        r.register_handles::<vk::ExportMetalSharedEventInfoEXT<'static>>();
    }

    // ── Handle-free ─────────────────────────────────────────
    r.register_plain::<vk::TimelineSemaphoreSubmitInfo<'static>>();
    r.register_plain::<vk::DeviceGroupSubmitInfo<'static>>();
    r.register_plain::<vk::ProtectedSubmitInfo<'static>>();
    r.register_plain::<vk::MemoryAllocateFlagsInfo<'static>>();
    r.register_plain::<vk::MemoryPriorityAllocateInfoEXT<'static>>();
    r.register_plain::<vk::MemoryOpaqueCaptureAddressAllocateInfo<'static>>();
    r.register_plain::<vk::ImportMemoryHostPointerInfoEXT<'static>>();
    r.register_plain::<vk::ImportMemoryFdInfoKHR<'static>>();
    r.register_plain::<vk::ExportMemoryAllocateInfo<'static>>();
    r.register_plain::<vk::ExternalMemoryBufferCreateInfo<'static>>();
    r.register_plain::<vk::ExternalMemoryImageCreateInfo<'static>>();
    r.register_plain::<vk::BufferOpaqueCaptureAddressCreateInfo<'static>>();
    r.register_plain::<vk::ImageFormatListCreateInfo<'static>>();
    r.register_plain::<vk::ImageViewUsageCreateInfo<'static>>();
    r.register_plain::<vk::SamplerReductionModeCreateInfo<'static>>();
    r.register_plain::<vk::SemaphoreTypeCreateInfo<'static>>();
    r.register_plain::<vk::ExportSemaphoreCreateInfo<'static>>();
    r.register_plain::<vk::ExportFenceCreateInfo<'static>>();
    r.register_plain::<vk::ShaderModuleCreateInfo<'static>>();
    r.register_plain::<vk::PipelineShaderStageRequiredSubgroupSizeCreateInfo<'static>>();
    r.register_plain::<vk::PipelineRenderingCreateInfo<'static>>();
    r.register_plain::<vk::PipelineCreationFeedbackCreateInfo<'static>>();
    r.register_plain::<vk::GraphicsPipelineLibraryCreateInfoEXT<'static>>();
    r.register_plain::<vk::PipelineRobustnessCreateInfoEXT<'static>>();
    r.register_plain::<vk::PipelineCreateFlags2CreateInfoKHR<'static>>();
    r.register_plain::<vk::PipelineRasterizationStateRasterizationOrderAMD<'static>>();
    r.register_plain::<vk::DescriptorSetLayoutBindingFlagsCreateInfo<'static>>();
    r.register_plain::<vk::DescriptorSetVariableDescriptorCountAllocateInfo<'static>>();
    r.register_plain::<vk::DescriptorPoolInlineUniformBlockCreateInfo<'static>>();
    r.register_plain::<vk::WriteDescriptorSetInlineUniformBlock<'static>>();
    r.register_plain::<vk::DeviceGroupRenderPassBeginInfo<'static>>();
    r.register_plain::<vk::DeviceGroupPresentInfoKHR<'static>>();
    r.register_plain::<vk::PresentIdKHR<'static>>();

    tracing::debug!(entries = r.len(), "pNext registry built");
    r
}

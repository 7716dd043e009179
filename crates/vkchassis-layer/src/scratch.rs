use bumpalo::Bump;

/// Per-call arena holding unwrapped copies of application structures.
///
/// Every copy lives until the arena is dropped, which is after the driver
/// call returns, or after the deferred operation that consumes the copies
/// completes. Nothing is freed individually.
#[derive(Default)]
pub struct Scratch {
    bump: Bump,
}

impl Scratch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc<T: Copy>(&self, value: T) -> &mut T {
        self.bump.alloc(value)
    }

    pub fn copy_slice<T: Copy>(&self, src: &[T]) -> &mut [T] {
        self.bump.alloc_slice_copy(src)
    }

    pub fn fill_iter<T, I>(&self, iter: I) -> &mut [T]
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.bump.alloc_slice_fill_iter(iter)
    }

    /// Bytes reserved by the arena so far.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

//! Runtime trait definitions.

use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;

use crate::element::NativeType;
use crate::error::Result;

/// Opaque reference to an object owned by the foreign runtime.
///
/// The reference does not keep the object alive. Whether it still names a
/// live object is only known to the runtime that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ObjectRef(NonNull<c_void>);

impl ObjectRef {
    /// Wrap a raw object pointer received across the boundary.
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    /// Raw pointer to hand back across the boundary.
    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }

    /// Address of the object, used as its identity.
    #[inline]
    pub fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:#x})", self.addr())
    }
}

// SAFETY: an ObjectRef is an identifier. It is never dereferenced outside the
// runtime that issued it, so moving the identifier between threads is harmless;
// every access still goes through a runtime value, which is not Send.
unsafe impl Send for ObjectRef {}
unsafe impl Sync for ObjectRef {}

/// Opaque reference to a foreign array object.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ArrayRef(ObjectRef);

impl ArrayRef {
    /// Wrap a raw array pointer received across the boundary.
    pub fn from_raw(ptr: *mut c_void) -> Option<Self> {
        ObjectRef::from_raw(ptr).map(Self)
    }

    /// Treat an object reference as an array.
    ///
    /// Runtimes use this for objects they know to be arrays; the runtime
    /// still validates the handle on every query.
    pub fn from_object(object: ObjectRef) -> Self {
        Self(object)
    }

    /// The array as a generic object reference.
    #[inline]
    pub fn as_object(self) -> ObjectRef {
        self.0
    }

    /// Raw pointer to hand back across the boundary.
    #[inline]
    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

impl From<ArrayRef> for ObjectRef {
    fn from(array: ArrayRef) -> Self {
        array.0
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayRef({:#x})", self.0.addr())
    }
}

/// Location of the per-axis extent slots inside a foreign array header.
///
/// Slot `i` lives at `ptr.add(i * step)`. A `step` of 1 means the extents are
/// packed; larger steps mean other header words are interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawExtents {
    pub ptr: *const usize,
    pub len: usize,
    pub step: usize,
}

/// Identifies one frame of GC roots pushed on a runtime's root stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(usize);

impl FrameId {
    /// Create a frame id from the depth of the root stack.
    pub const fn new(depth: usize) -> Self {
        Self(depth)
    }

    /// Depth of the frame on the root stack.
    pub const fn depth(self) -> usize {
        self.0
    }
}

/// The foreign runtime's embedding interface.
///
/// Every primitive here is a synchronous call into the runtime. Allocation and
/// reallocation are only ever performed by the runtime, which alone knows how
/// to register the result with its garbage collector.
///
/// Implementations are not required to be thread-safe; the adaptors built on
/// top of them assume a single native caller.
pub trait Runtime: Clone + 'static {
    /// Runtime name for debugging.
    fn name() -> &'static str;

    /// Identifies this runtime instance for process-wide caches.
    ///
    /// An instance that shuts down should pass its id to
    /// [`evict_descriptors`](crate::container::evict_descriptors).
    fn instance_id(&self) -> u64;

    // ========================================================================
    // Type system
    // ========================================================================

    /// Foreign datatype for a native element type.
    fn map_native_type(&self, ty: NativeType) -> Result<ObjectRef>;

    /// Foreign array type `Array{element, rank}`.
    fn apply_array_type(&self, element: ObjectRef, rank: usize) -> Result<ObjectRef>;

    /// Foreign tuple type holding `rank` extents.
    fn shape_tuple_type(&self, rank: usize) -> Result<ObjectRef>;

    // ========================================================================
    // Allocation
    // ========================================================================

    /// Box a shape as a foreign dims value of the given tuple type.
    fn new_dims(&self, tuple_type: ObjectRef, dims: &[usize]) -> Result<ObjectRef>;

    /// Allocate a new array of `array_type` with extents `dims`.
    fn allocate_array(&self, array_type: ObjectRef, dims: ObjectRef) -> Result<ArrayRef>;

    /// Reinterpret `array`'s buffer under new extents `dims`.
    ///
    /// The total element count must not change. The returned handle may
    /// differ from `array`; the buffer it points to is shared.
    fn reshape_array(
        &self,
        array_type: ObjectRef,
        array: ArrayRef,
        dims: ObjectRef,
    ) -> Result<ArrayRef>;

    // ========================================================================
    // Array queries
    // ========================================================================

    /// Number of elements in the array.
    fn array_length(&self, array: ArrayRef) -> Result<usize>;

    /// Number of dimensions of the array.
    fn array_rank(&self, array: ArrayRef) -> Result<usize>;

    /// Pointer to the first element of the array's buffer.
    fn array_data_ptr(&self, array: ArrayRef) -> Result<*mut u8>;

    /// Location of the extent slots in the array header.
    fn array_extents(&self, array: ArrayRef) -> Result<RawExtents>;

    /// Native type of the array's elements.
    fn array_eltype(&self, array: ArrayRef) -> Result<NativeType>;

    // ========================================================================
    // Garbage collector interaction
    // ========================================================================

    /// Push a frame of `slots` empty root slots.
    fn push_root_frame(&self, slots: usize) -> FrameId;

    /// Store `object` in a slot of a pushed frame, making it a GC root.
    fn set_root(&self, frame: FrameId, slot: usize, object: ObjectRef);

    /// Pop a frame. Frames are popped in stack order.
    fn pop_root_frame(&self, frame: FrameId);

    /// Keep `object` alive until a matching [`Runtime::release`].
    fn preserve(&self, object: ObjectRef);

    /// Drop one preservation of `object`.
    fn release(&self, object: ObjectRef);
}

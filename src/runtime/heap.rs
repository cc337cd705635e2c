//! In-process managed heap implementing [`Runtime`].
//!
//! `Heap` behaves like a small garbage-collected runtime: type objects are
//! interned and permanent, dims values and arrays are collectable, and a
//! collection reclaims every object that is neither on the root stack nor
//! preserved. Array headers store each extent next to the axis byte stride,
//! so extent slots are strided in memory the way embedded runtimes lay them
//! out.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ffi::c_void;
use std::fmt;
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};

use super::config::HeapConfig;
use super::traits::{ArrayRef, FrameId, ObjectRef, RawExtents, Runtime};
use crate::container::{checked_size, evict_descriptors};
use crate::element::NativeType;
use crate::error::{Error, Result};

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: Heap = Heap::new(HeapConfig::default());
}

/// Header words per axis: extent, byte stride.
const HEADER_WORDS_PER_AXIS: usize = 2;

/// A single-threaded managed heap.
///
/// Clones share the same heap. `Heap::default()` returns the calling thread's
/// shared heap, which plays the part of "the" runtime of the process.
#[derive(Clone)]
pub struct Heap {
    inner: Rc<HeapInner>,
}

struct HeapInner {
    id: u64,
    config: HeapConfig,
    state: RefCell<HeapState>,
}

/// Counters describing heap activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Collectable objects allocated since the heap was created.
    pub allocations: usize,
    /// Collections run.
    pub collections: usize,
    /// Objects reclaimed by collections.
    pub freed: usize,
    /// Objects currently alive, type objects included.
    pub live_objects: usize,
    /// Element bytes currently alive.
    pub live_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TypeKey {
    Element(NativeType),
    Array(NativeType, usize),
    ShapeTuple(usize),
}

enum Object {
    Type(Box<TypeKey>),
    Dims(Box<DimsObject>),
    Array(Box<ArrayObject>),
}

struct DimsObject {
    rank: usize,
    dims: Box<[usize]>,
}

struct ArrayObject {
    element: NativeType,
    length: usize,
    buffer: Rc<DataBuffer>,
    /// `[extent_0, byte_stride_0, extent_1, byte_stride_1, ...]`
    header: Box<[usize]>,
}

impl ArrayObject {
    fn rank(&self) -> usize {
        self.header.len() / HEADER_WORDS_PER_AXIS
    }
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(16))]
struct Chunk([u8; 16]);

/// Zero-initialized element storage, aligned for every native type.
struct DataBuffer {
    chunks: NonNull<[Chunk]>,
    bytes: usize,
}

impl DataBuffer {
    fn zeroed(bytes: usize) -> Result<Self> {
        if bytes > isize::MAX as usize {
            return Err(Error::Allocation(format!(
                "{} bytes exceed the address space",
                bytes
            )));
        }
        let count = bytes.div_ceil(std::mem::size_of::<Chunk>());
        let mut chunks = Vec::new();
        chunks
            .try_reserve_exact(count)
            .map_err(|err| Error::Allocation(format!("{} bytes: {}", bytes, err)))?;
        chunks.resize(count, Chunk::zeroed());
        let boxed = chunks.into_boxed_slice();
        Ok(Self {
            chunks: NonNull::from(Box::leak(boxed)),
            bytes,
        })
    }

    fn as_ptr(&self) -> *mut u8 {
        self.chunks.cast::<u8>().as_ptr()
    }
}

impl Drop for DataBuffer {
    fn drop(&mut self) {
        // SAFETY: `chunks` came from `Box::leak` in `zeroed` and is freed once.
        unsafe { drop(Box::from_raw(self.chunks.as_ptr())) };
    }
}

#[derive(Default)]
struct HeapState {
    objects: HashMap<usize, Object>,
    types: HashMap<TypeKey, ObjectRef>,
    frames: Vec<Vec<Option<ObjectRef>>>,
    preserved: HashMap<usize, usize>,
    since_collect: usize,
    bytes_since_collect: usize,
    live_bytes: usize,
    allocations: usize,
    collections: usize,
    freed: usize,
}

fn object_ref<T>(boxed: &T) -> ObjectRef {
    let ptr = boxed as *const T as *mut c_void;
    // Box contents are never null.
    match ObjectRef::from_raw(ptr) {
        Some(object) => object,
        None => unreachable!("boxed object at null address"),
    }
}

impl HeapState {
    fn insert(&mut self, object: Object) -> ObjectRef {
        let handle = match &object {
            Object::Type(t) => object_ref(&**t),
            Object::Dims(d) => object_ref(&**d),
            Object::Array(a) => object_ref(&**a),
        };
        self.objects.insert(handle.addr(), object);
        handle
    }

    fn safepoint(&mut self, config: &HeapConfig) {
        self.since_collect += 1;
        if let Some(every) = config.collect_every {
            if self.since_collect >= every {
                self.collect();
            }
        }
    }

    fn collect(&mut self) -> usize {
        let mut roots: HashSet<usize> = self.types.values().map(|t| t.addr()).collect();
        roots.extend(self.preserved.keys().copied());
        roots.extend(self.frames.iter().flatten().flatten().map(|o| o.addr()));

        let before = self.objects.len();
        let mut freed_bytes = 0;
        self.objects.retain(|addr, object| match object {
            Object::Type(_) => true,
            _ if roots.contains(addr) => true,
            Object::Array(array) => {
                if Rc::strong_count(&array.buffer) == 1 {
                    freed_bytes += array.buffer.bytes;
                }
                false
            }
            Object::Dims(_) => false,
        });
        let freed = before - self.objects.len();

        self.live_bytes -= freed_bytes;
        self.since_collect = 0;
        self.bytes_since_collect = 0;
        self.collections += 1;
        self.freed += freed;
        tracing::debug!(freed, freed_bytes, live = self.objects.len(), "heap collection");
        freed
    }

    fn intern(&mut self, key: TypeKey) -> ObjectRef {
        if let Some(existing) = self.types.get(&key) {
            return *existing;
        }
        let handle = self.insert(Object::Type(Box::new(key)));
        self.types.insert(key, handle);
        handle
    }

    fn type_key(&self, object: ObjectRef) -> Result<TypeKey> {
        match self.objects.get(&object.addr()) {
            Some(Object::Type(key)) => Ok(**key),
            Some(_) => Err(Error::DescriptorMismatch(format!(
                "{:?} is not a type object",
                object
            ))),
            None => Err(Error::InvalidHandle(object.addr())),
        }
    }

    fn dims(&self, object: ObjectRef) -> Result<&DimsObject> {
        match self.objects.get(&object.addr()) {
            Some(Object::Dims(dims)) => Ok(dims),
            Some(_) => Err(Error::DescriptorMismatch(format!(
                "{:?} is not a dims value",
                object
            ))),
            None => Err(Error::InvalidHandle(object.addr())),
        }
    }

    fn array(&self, array: ArrayRef) -> Result<&ArrayObject> {
        match self.objects.get(&array.as_object().addr()) {
            Some(Object::Array(object)) => Ok(object),
            _ => Err(Error::InvalidHandle(array.as_object().addr())),
        }
    }

    fn array_type(&self, array_type: ObjectRef) -> Result<(NativeType, usize)> {
        match self.type_key(array_type)? {
            TypeKey::Array(element, rank) => Ok((element, rank)),
            other => Err(Error::DescriptorMismatch(format!(
                "expected an array type, got {:?}",
                other
            ))),
        }
    }

    fn reserve(&mut self, bytes: usize, config: &HeapConfig) -> Result<()> {
        if let Some(threshold) = config.collect_after_bytes {
            if self.bytes_since_collect.saturating_add(bytes) > threshold {
                self.collect();
            }
        }
        let Some(limit) = config.max_live_bytes else {
            return Ok(());
        };
        let fits = |live: usize| live.checked_add(bytes).is_some_and(|total| total <= limit);
        if !fits(self.live_bytes) {
            self.collect();
        }
        if !fits(self.live_bytes) {
            return Err(Error::Allocation(format!(
                "{} bytes requested with {} of {} bytes in use",
                bytes, self.live_bytes, limit
            )));
        }
        Ok(())
    }
}

fn build_header(element: NativeType, dims: &[usize]) -> Box<[usize]> {
    let mut header = Vec::with_capacity(dims.len() * HEADER_WORDS_PER_AXIS);
    let mut stride = element.size();
    for &extent in dims {
        header.push(extent);
        header.push(stride);
        stride = stride.saturating_mul(extent);
    }
    header.into_boxed_slice()
}

impl Drop for HeapInner {
    fn drop(&mut self) {
        evict_descriptors(self.id);
    }
}

impl Heap {
    /// Create a new, independent heap.
    pub fn new(config: HeapConfig) -> Self {
        Self {
            inner: Rc::new(HeapInner {
                id: NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed),
                config,
                state: RefCell::new(HeapState::default()),
            }),
        }
    }

    /// The calling thread's shared heap.
    pub fn current() -> Self {
        CURRENT.with(Heap::clone)
    }

    /// Configuration this heap was created with.
    pub fn config(&self) -> &HeapConfig {
        &self.inner.config
    }

    /// Run a collection now; returns the number of objects reclaimed.
    pub fn collect(&self) -> usize {
        self.inner.state.borrow_mut().collect()
    }

    /// Whether `object` names a live object of this heap.
    pub fn is_live(&self, object: impl Into<ObjectRef>) -> bool {
        let object = object.into();
        self.inner
            .state
            .borrow()
            .objects
            .contains_key(&object.addr())
    }

    /// Number of frames currently on the root stack.
    pub fn root_depth(&self) -> usize {
        self.inner.state.borrow().frames.len()
    }

    /// How many times `object` is currently preserved.
    pub fn preserve_count(&self, object: impl Into<ObjectRef>) -> usize {
        let object = object.into();
        self.inner
            .state
            .borrow()
            .preserved
            .get(&object.addr())
            .copied()
            .unwrap_or(0)
    }

    /// Snapshot of the heap counters.
    pub fn stats(&self) -> HeapStats {
        let state = self.inner.state.borrow();
        HeapStats {
            allocations: state.allocations,
            collections: state.collections,
            freed: state.freed,
            live_objects: state.objects.len(),
            live_bytes: state.live_bytes,
        }
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("id", &self.inner.id)
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl Runtime for Heap {
    fn name() -> &'static str {
        "heap"
    }

    fn instance_id(&self) -> u64 {
        self.inner.id
    }

    fn map_native_type(&self, ty: NativeType) -> Result<ObjectRef> {
        Ok(self.inner.state.borrow_mut().intern(TypeKey::Element(ty)))
    }

    fn apply_array_type(&self, element: ObjectRef, rank: usize) -> Result<ObjectRef> {
        let mut state = self.inner.state.borrow_mut();
        match state.type_key(element)? {
            TypeKey::Element(ty) => Ok(state.intern(TypeKey::Array(ty, rank))),
            other => Err(Error::DescriptorMismatch(format!(
                "expected an element type, got {:?}",
                other
            ))),
        }
    }

    fn shape_tuple_type(&self, rank: usize) -> Result<ObjectRef> {
        Ok(self.inner.state.borrow_mut().intern(TypeKey::ShapeTuple(rank)))
    }

    fn new_dims(&self, tuple_type: ObjectRef, dims: &[usize]) -> Result<ObjectRef> {
        let mut state = self.inner.state.borrow_mut();
        state.safepoint(&self.inner.config);
        let rank = match state.type_key(tuple_type)? {
            TypeKey::ShapeTuple(rank) => rank,
            other => {
                return Err(Error::DescriptorMismatch(format!(
                    "expected a shape tuple type, got {:?}",
                    other
                )))
            }
        };
        if rank != dims.len() {
            return Err(Error::DimensionMismatch {
                expected: rank,
                actual: dims.len(),
            });
        }
        state.allocations += 1;
        Ok(state.insert(Object::Dims(Box::new(DimsObject {
            rank,
            dims: dims.into(),
        }))))
    }

    fn allocate_array(&self, array_type: ObjectRef, dims: ObjectRef) -> Result<ArrayRef> {
        let mut state = self.inner.state.borrow_mut();
        state.safepoint(&self.inner.config);

        let (element, rank) = state.array_type(array_type)?;
        let dims = state.dims(dims)?;
        if dims.rank != rank {
            return Err(Error::DimensionMismatch {
                expected: rank,
                actual: dims.rank,
            });
        }
        let shape = dims.dims.clone();
        let length = checked_size(shape.iter().copied())
            .ok_or_else(|| Error::Allocation(format!("shape {:?} overflows", shape)))?;
        let bytes = length
            .checked_mul(element.size())
            .ok_or_else(|| Error::Allocation(format!("shape {:?} overflows", shape)))?;
        state.reserve(bytes, &self.inner.config)?;

        let object = ArrayObject {
            element,
            length,
            buffer: Rc::new(DataBuffer::zeroed(bytes)?),
            header: build_header(element, &shape),
        };
        state.live_bytes += bytes;
        state.bytes_since_collect = state.bytes_since_collect.saturating_add(bytes);
        state.allocations += 1;
        let handle = state.insert(Object::Array(Box::new(object)));
        tracing::debug!(?shape, %element, bytes, "allocated foreign array");
        Ok(ArrayRef::from_object(handle))
    }

    fn reshape_array(
        &self,
        array_type: ObjectRef,
        array: ArrayRef,
        dims: ObjectRef,
    ) -> Result<ArrayRef> {
        let mut state = self.inner.state.borrow_mut();
        state.safepoint(&self.inner.config);

        let (element, rank) = state.array_type(array_type)?;
        let dims = state.dims(dims)?;
        if dims.rank != rank {
            return Err(Error::DimensionMismatch {
                expected: rank,
                actual: dims.rank,
            });
        }
        let shape = dims.dims.clone();
        let source = state.array(array)?;
        if source.element != element {
            return Err(Error::ElementType {
                expected: element,
                actual: source.element,
            });
        }
        let requested = checked_size(shape.iter().copied());
        if requested != Some(source.length) {
            return Err(Error::SizeMismatch {
                shape: shape.to_vec(),
                current: source.length,
                requested: requested.unwrap_or(usize::MAX),
            });
        }
        let object = ArrayObject {
            element,
            length: source.length,
            buffer: Rc::clone(&source.buffer),
            header: build_header(element, &shape),
        };
        state.allocations += 1;
        let handle = state.insert(Object::Array(Box::new(object)));
        tracing::trace!(?shape, "reshaped foreign array");
        Ok(ArrayRef::from_object(handle))
    }

    fn array_length(&self, array: ArrayRef) -> Result<usize> {
        Ok(self.inner.state.borrow().array(array)?.length)
    }

    fn array_rank(&self, array: ArrayRef) -> Result<usize> {
        Ok(self.inner.state.borrow().array(array)?.rank())
    }

    fn array_data_ptr(&self, array: ArrayRef) -> Result<*mut u8> {
        Ok(self.inner.state.borrow().array(array)?.buffer.as_ptr())
    }

    fn array_extents(&self, array: ArrayRef) -> Result<RawExtents> {
        let state = self.inner.state.borrow();
        let object = state.array(array)?;
        Ok(RawExtents {
            ptr: object.header.as_ptr(),
            len: object.rank(),
            step: HEADER_WORDS_PER_AXIS,
        })
    }

    fn array_eltype(&self, array: ArrayRef) -> Result<NativeType> {
        Ok(self.inner.state.borrow().array(array)?.element)
    }

    fn push_root_frame(&self, slots: usize) -> FrameId {
        let mut state = self.inner.state.borrow_mut();
        state.frames.push(vec![None; slots]);
        let frame = FrameId::new(state.frames.len() - 1);
        tracing::trace!(depth = frame.depth(), slots, "pushed root frame");
        frame
    }

    fn set_root(&self, frame: FrameId, slot: usize, object: ObjectRef) {
        let mut state = self.inner.state.borrow_mut();
        match state
            .frames
            .get_mut(frame.depth())
            .and_then(|slots| slots.get_mut(slot))
        {
            Some(entry) => *entry = Some(object),
            None => tracing::warn!(?frame, slot, "root slot does not exist"),
        }
    }

    fn pop_root_frame(&self, frame: FrameId) {
        let mut state = self.inner.state.borrow_mut();
        let depth = state.frames.len();
        if depth != frame.depth() + 1 {
            // Popping here would unroot frames that are still open.
            tracing::warn!(?frame, depth, "root frame popped out of order; left in place");
            return;
        }
        state.frames.truncate(frame.depth());
        tracing::trace!(depth = frame.depth(), "popped root frame");
    }

    fn preserve(&self, object: ObjectRef) {
        let mut state = self.inner.state.borrow_mut();
        *state.preserved.entry(object.addr()).or_insert(0) += 1;
    }

    fn release(&self, object: ObjectRef) {
        let mut state = self.inner.state.borrow_mut();
        if let Some(count) = state.preserved.get_mut(&object.addr()) {
            *count -= 1;
            if *count == 0 {
                state.preserved.remove(&object.addr());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RootGuard;

    fn alloc(heap: &Heap, element: NativeType, shape: &[usize]) -> Result<ArrayRef> {
        let element = heap.map_native_type(element)?;
        let array_type = heap.apply_array_type(element, shape.len())?;
        let tuple_type = heap.shape_tuple_type(shape.len())?;
        let mut roots = RootGuard::new(heap, 1);
        let dims = heap.new_dims(tuple_type, shape)?;
        roots.set(0, dims);
        heap.allocate_array(array_type, dims)
    }

    #[test]
    fn test_allocate_and_query() {
        let heap = Heap::new(HeapConfig::default());
        let array = alloc(&heap, NativeType::Float64, &[2, 3, 4]).unwrap();

        assert_eq!(heap.array_length(array).unwrap(), 24);
        assert_eq!(heap.array_rank(array).unwrap(), 3);

        let extents = heap.array_extents(array).unwrap();
        assert_eq!(extents.len, 3);
        assert_eq!(extents.step, 2);
        let read: Vec<usize> = (0..extents.len)
            .map(|i| unsafe { *extents.ptr.add(i * extents.step) })
            .collect();
        assert_eq!(read, vec![2, 3, 4]);
        assert_eq!(heap.stats().live_bytes, 24 * 8);
    }

    #[test]
    fn test_types_are_interned() {
        let heap = Heap::new(HeapConfig::default());
        let a = heap.map_native_type(NativeType::Int32).unwrap();
        let b = heap.map_native_type(NativeType::Int32).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            heap.apply_array_type(a, 2).unwrap(),
            heap.apply_array_type(b, 2).unwrap()
        );
        assert!(heap.apply_array_type(heap.shape_tuple_type(2).unwrap(), 2).is_err());
    }

    #[test]
    fn test_unrooted_dims_are_collected_under_stress() {
        let heap = Heap::new(HeapConfig::stress());
        let element = heap.map_native_type(NativeType::Int32).unwrap();
        let array_type = heap.apply_array_type(element, 1).unwrap();
        let tuple_type = heap.shape_tuple_type(1).unwrap();
        let dims = heap.new_dims(tuple_type, &[4]).unwrap();

        // The safepoint at the start of allocate_array reclaims `dims`.
        let err = heap.allocate_array(array_type, dims).unwrap_err();
        assert_eq!(err, Error::InvalidHandle(dims.addr()));
    }

    #[test]
    fn test_rooted_dims_survive_stress() {
        let heap = Heap::new(HeapConfig::stress());
        let array = alloc(&heap, NativeType::Int32, &[4]).unwrap();
        assert_eq!(heap.array_length(array).unwrap(), 4);
        assert_eq!(heap.root_depth(), 0);
    }

    #[test]
    fn test_preserve_keeps_array_alive() {
        let heap = Heap::new(HeapConfig::default());
        let kept = alloc(&heap, NativeType::UInt8, &[8]).unwrap();
        let dropped = alloc(&heap, NativeType::UInt8, &[8]).unwrap();
        heap.preserve(kept.as_object());

        heap.collect();
        assert!(heap.is_live(kept));
        assert!(!heap.is_live(dropped));
        assert_eq!(heap.stats().live_bytes, 8);

        heap.release(kept.as_object());
        assert_eq!(heap.preserve_count(kept), 0);
        heap.collect();
        assert!(!heap.is_live(kept));
        assert_eq!(heap.stats().live_bytes, 0);
    }

    #[test]
    fn test_reshape_shares_buffer() {
        let heap = Heap::new(HeapConfig::default());
        let array = alloc(&heap, NativeType::Int64, &[2, 3]).unwrap();
        let element = heap.map_native_type(NativeType::Int64).unwrap();
        let array_type = heap.apply_array_type(element, 2).unwrap();
        let tuple_type = heap.shape_tuple_type(2).unwrap();
        let dims = heap.new_dims(tuple_type, &[3, 2]).unwrap();

        let reshaped = heap.reshape_array(array_type, array, dims).unwrap();
        assert_ne!(reshaped, array);
        assert_eq!(
            heap.array_data_ptr(reshaped).unwrap(),
            heap.array_data_ptr(array).unwrap()
        );

        let bad = heap.new_dims(tuple_type, &[4, 2]).unwrap();
        assert!(matches!(
            heap.reshape_array(array_type, array, bad),
            Err(Error::SizeMismatch { requested: 8, current: 6, .. })
        ));
    }

    #[test]
    fn test_allocation_limit() {
        let heap = Heap::new(HeapConfig::default().with_max_live_bytes(64));
        let first = alloc(&heap, NativeType::Float64, &[8]).unwrap();
        heap.preserve(first.as_object());

        let err = alloc(&heap, NativeType::Float64, &[1]).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
        assert_eq!(heap.root_depth(), 0);

        heap.release(first.as_object());
        assert!(alloc(&heap, NativeType::Float64, &[8]).is_ok());
    }

    #[test]
    fn test_limit_check_does_not_overflow() {
        let heap = Heap::new(HeapConfig::manual().with_max_live_bytes(64));
        let first = alloc(&heap, NativeType::UInt8, &[8]).unwrap();
        heap.preserve(first.as_object());

        let err = alloc(&heap, NativeType::UInt8, &[usize::MAX]).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
        assert_eq!(heap.stats().live_bytes, 8);
    }

    #[test]
    fn test_byte_pressure_triggers_collection() {
        let heap = Heap::new(HeapConfig::manual().with_collect_after_bytes(4096));
        for _ in 0..32 {
            alloc(&heap, NativeType::UInt8, &[1024]).unwrap();
            assert!(heap.stats().live_bytes <= 4096);
        }
        assert!(heap.stats().collections >= 7);
    }

    #[test]
    fn test_manual_heap_never_collects_on_its_own() {
        let heap = Heap::new(HeapConfig::manual());
        for _ in 0..300 {
            alloc(&heap, NativeType::UInt8, &[16]).unwrap();
        }
        assert_eq!(heap.stats().collections, 0);
        assert_eq!(heap.stats().live_bytes, 300 * 16);
    }

    #[test]
    fn test_empty_array_with_huge_extents() {
        let heap = Heap::new(HeapConfig::default());
        let array = alloc(&heap, NativeType::Float64, &[usize::MAX, 2, 0]).unwrap();
        assert_eq!(heap.array_length(array).unwrap(), 0);

        let err = alloc(&heap, NativeType::Float64, &[usize::MAX, 2]).unwrap_err();
        assert!(matches!(err, Error::Allocation(_)));
    }

    #[test]
    fn test_out_of_order_pop_keeps_inner_roots() {
        let heap = Heap::new(HeapConfig::manual());
        let outer = heap.push_root_frame(1);
        let inner = heap.push_root_frame(1);
        let array = alloc(&heap, NativeType::Int32, &[4]).unwrap();
        heap.set_root(inner, 0, array.as_object());

        heap.pop_root_frame(outer);
        assert_eq!(heap.root_depth(), 2);
        heap.collect();
        assert!(heap.is_live(array));

        heap.pop_root_frame(inner);
        heap.pop_root_frame(outer);
        assert_eq!(heap.root_depth(), 0);
        heap.collect();
        assert!(!heap.is_live(array));
    }
}

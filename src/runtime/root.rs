//! Scoped GC root protection.

use super::traits::{FrameId, ObjectRef, Runtime};

/// A frame of GC roots that lives exactly as long as the guard.
///
/// Creating the guard pushes `slots` empty roots on the runtime's root stack;
/// dropping it pops them, on the success path and on every early `?` return.
/// Objects stored with [`RootGuard::set`] cannot be collected while the guard
/// is alive.
///
/// # Example
///
/// ```rust,ignore
/// let mut roots = RootGuard::new(&runtime, 2);
/// let tuple_type = runtime.shape_tuple_type(2)?;
/// roots.set(0, tuple_type);
/// let dims = runtime.new_dims(tuple_type, &[2, 3])?;
/// roots.set(1, dims);
/// // both stay reachable until `roots` goes out of scope
/// ```
pub struct RootGuard<'r, R: Runtime> {
    runtime: &'r R,
    frame: FrameId,
    slots: usize,
}

impl<'r, R: Runtime> RootGuard<'r, R> {
    /// Push a frame of `slots` roots.
    pub fn new(runtime: &'r R, slots: usize) -> Self {
        let frame = runtime.push_root_frame(slots);
        Self {
            runtime,
            frame,
            slots,
        }
    }

    /// Root `object` in `slot`, replacing whatever the slot held.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not below the frame size.
    pub fn set(&mut self, slot: usize, object: impl Into<ObjectRef>) {
        assert!(
            slot < self.slots,
            "root slot {} out of range for frame of {}",
            slot,
            self.slots
        );
        self.runtime.set_root(self.frame, slot, object.into());
    }

    /// Number of slots in the frame.
    pub fn slots(&self) -> usize {
        self.slots
    }
}

impl<R: Runtime> Drop for RootGuard<'_, R> {
    fn drop(&mut self) {
        self.runtime.pop_root_frame(self.frame);
    }
}

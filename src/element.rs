//! Element types that can live in a foreign array buffer.
//!
//! Each [`Element`] maps to exactly one [`NativeType`] of the foreign type
//! system. The mapping is layout-preserving: the Rust value is stored in the
//! foreign buffer bit for bit, complex numbers included.

use std::fmt;

pub use num_complex::{Complex32, Complex64};

/// Native element types understood by the foreign runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    ComplexF32,
    ComplexF64,
}

impl NativeType {
    /// Size in bytes of one element.
    pub const fn size(self) -> usize {
        match self {
            NativeType::Int8 | NativeType::UInt8 => 1,
            NativeType::Int16 | NativeType::UInt16 => 2,
            NativeType::Int32 | NativeType::UInt32 | NativeType::Float32 => 4,
            NativeType::Int64 | NativeType::UInt64 | NativeType::Float64 => 8,
            NativeType::ComplexF32 => 8,
            NativeType::ComplexF64 => 16,
        }
    }

    /// Name of the type on the foreign side.
    pub const fn name(self) -> &'static str {
        match self {
            NativeType::Int8 => "Int8",
            NativeType::Int16 => "Int16",
            NativeType::Int32 => "Int32",
            NativeType::Int64 => "Int64",
            NativeType::UInt8 => "UInt8",
            NativeType::UInt16 => "UInt16",
            NativeType::UInt32 => "UInt32",
            NativeType::UInt64 => "UInt64",
            NativeType::Float32 => "Float32",
            NativeType::Float64 => "Float64",
            NativeType::ComplexF32 => "ComplexF32",
            NativeType::ComplexF64 => "ComplexF64",
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker trait for values that can be stored in a foreign array.
///
/// `Pod` guarantees that a zero-filled foreign buffer is a valid array of
/// elements and that elements can be copied bytewise across the boundary.
pub trait Element:
    Copy + Clone + Default + PartialEq + fmt::Debug + 'static + bytemuck::Pod
{
    /// The foreign type this element maps to.
    const NATIVE: NativeType;
}

impl Element for i8 {
    const NATIVE: NativeType = NativeType::Int8;
}
impl Element for i16 {
    const NATIVE: NativeType = NativeType::Int16;
}
impl Element for i32 {
    const NATIVE: NativeType = NativeType::Int32;
}
impl Element for i64 {
    const NATIVE: NativeType = NativeType::Int64;
}
impl Element for u8 {
    const NATIVE: NativeType = NativeType::UInt8;
}
impl Element for u16 {
    const NATIVE: NativeType = NativeType::UInt16;
}
impl Element for u32 {
    const NATIVE: NativeType = NativeType::UInt32;
}
impl Element for u64 {
    const NATIVE: NativeType = NativeType::UInt64;
}
impl Element for f32 {
    const NATIVE: NativeType = NativeType::Float32;
}
impl Element for f64 {
    const NATIVE: NativeType = NativeType::Float64;
}
impl Element for Complex32 {
    const NATIVE: NativeType = NativeType::ComplexF32;
}
impl Element for Complex64 {
    const NATIVE: NativeType = NativeType::ComplexF64;
}

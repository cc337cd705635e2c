//! Lift scalar functions to functions over whole arrays.
//!
//! ```rust,ignore
//! use jltensor::{vectorize, JlArray};
//!
//! let hypot = vectorize(|x: f64, y: f64| x.hypot(y));
//! let xs = JlArray::<f64>::from_nested([[3.0], [5.0]])?;   // shape [2, 1]
//! let ys = JlArray::<f64>::from_nested([4.0, 12.0])?;      // shape [2]
//! let out = hypot.apply2(&xs, &ys)?;                       // shape [2, 2]
//! ```

use crate::container::{Container, Dimension, JlArray};
use crate::element::Element;
use crate::error::Result;
use crate::expr::{Map, Zip3With, ZipWith};
use crate::runtime::Runtime;

/// A scalar function lifted to arrays.
///
/// Each `apply*` evaluates the function over every position of the
/// operands' broadcast shape and returns a newly allocated [`JlArray`] in the
/// runtime of the first operand. Operands may mix ranks and container kinds.
#[derive(Debug, Clone, Copy)]
pub struct Vectorizer<F> {
    f: F,
}

/// Lift `f` to operate elementwise over arrays.
pub fn vectorize<F>(f: F) -> Vectorizer<F> {
    Vectorizer { f }
}

impl<F> Vectorizer<F> {
    /// The wrapped scalar function.
    pub fn function(&self) -> &F {
        &self.f
    }

    /// Apply a unary function elementwise.
    pub fn apply1<A, O, DA, R>(&self, a: &Container<A, DA, R>) -> Result<JlArray<O, R>>
    where
        F: Fn(A) -> O,
        A: Element,
        O: Element,
        DA: Dimension,
        R: Runtime,
    {
        let node = Map::new(a, &self.f);
        JlArray::from_expression_with_runtime(&node, a.runtime().clone())
    }

    /// Apply a binary function elementwise under broadcasting.
    pub fn apply2<A, B, O, DA, DB, R>(
        &self,
        a: &Container<A, DA, R>,
        b: &Container<B, DB, R>,
    ) -> Result<JlArray<O, R>>
    where
        F: Fn(A, B) -> O,
        A: Element,
        B: Element,
        O: Element,
        DA: Dimension,
        DB: Dimension,
        R: Runtime,
    {
        let node = ZipWith::new(a, b, &self.f)?;
        JlArray::from_expression_with_runtime(&node, a.runtime().clone())
    }

    /// Apply a ternary function elementwise under broadcasting.
    pub fn apply3<A, B, C, O, DA, DB, DC, R>(
        &self,
        a: &Container<A, DA, R>,
        b: &Container<B, DB, R>,
        c: &Container<C, DC, R>,
    ) -> Result<JlArray<O, R>>
    where
        F: Fn(A, B, C) -> O,
        A: Element,
        B: Element,
        C: Element,
        O: Element,
        DA: Dimension,
        DB: Dimension,
        DC: Dimension,
        R: Runtime,
    {
        let node = Zip3With::new(a, b, c, &self.f)?;
        JlArray::from_expression_with_runtime(&node, a.runtime().clone())
    }
}

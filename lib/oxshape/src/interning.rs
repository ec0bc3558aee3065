use crate::shape::Shape;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// A hash-consing table for shapes.
///
/// Structurally equal shapes are mapped to the same shared handle.
/// The table is not synchronized: use one per worker.
///
/// ```
/// use oxshape::{Shape, ShapeInterner};
/// use std::sync::Arc;
///
/// let mut interner = ShapeInterner::default();
/// let a = interner.intern(Shape::min_count(1));
/// let b = interner.intern(Shape::min_count(1));
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
#[derive(Debug, Default)]
pub struct ShapeInterner {
    shapes: FxHashSet<Arc<Shape>>,
}

impl ShapeInterner {
    /// Returns the shared handle of the shape, registering it if needed.
    pub fn intern(&mut self, shape: Shape) -> Arc<Shape> {
        if let Some(existing) = self.shapes.get(&shape) {
            return Arc::clone(existing);
        }
        let shape = Arc::new(shape);
        self.shapes.insert(Arc::clone(&shape));
        shape
    }

    /// Returns the shared handle of the shape if it has already been interned.
    pub fn get(&self, shape: &Shape) -> Option<Arc<Shape>> {
        self.shapes.get(shape).map(Arc::clone)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
    }
}

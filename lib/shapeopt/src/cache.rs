use crate::optimizer::Optimizer;
use crate::redactor::Redactor;
use oxshape::{Accept, Shape, ShapeInterner};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Memoizes optimization and redaction results.
///
/// Results are interned: equal derived shapes share the same handle across calls.
/// The cache requires exclusive access, use one per worker.
///
/// ```
/// use oxshape::{Accept, Shape, guard};
/// use shapeopt::ShapeCache;
/// use std::sync::Arc;
///
/// let mut cache = ShapeCache::default();
/// let shape = guard::role(["admin"], Shape::min_count(1));
/// let a = cache.redact(&shape, "role", Accept::values(["admin"]));
/// let b = cache.redact(&shape, "role", Accept::values(["admin"]));
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(*a, Shape::min_count(1));
/// ```
#[derive(Debug, Default)]
pub struct ShapeCache {
    interner: ShapeInterner,
    optimized: FxHashMap<Arc<Shape>, Arc<Shape>>,
    redacted: FxHashMap<(Arc<Shape>, String, Accept), Arc<Shape>>,
}

impl ShapeCache {
    /// The shared handle of a shape.
    pub fn intern(&mut self, shape: Shape) -> Arc<Shape> {
        self.interner.intern(shape)
    }

    /// The optimized form of a shape.
    pub fn optimize(&mut self, shape: &Shape) -> Arc<Shape> {
        if let Some(optimized) = self.optimized.get(shape) {
            return Arc::clone(optimized);
        }
        let key = self.interner.intern(shape.clone());
        let optimized = self.interner.intern(Optimizer::optimize(shape.clone()));
        self.optimized.insert(key, Arc::clone(&optimized));
        optimized
    }

    /// The optimized redaction of a shape.
    pub fn redact(
        &mut self,
        shape: &Shape,
        axis: impl Into<String>,
        accept: impl Into<Accept>,
    ) -> Arc<Shape> {
        let key = (self.interner.intern(shape.clone()), axis.into(), accept.into());
        if let Some(redacted) = self.redacted.get(&key) {
            return Arc::clone(redacted);
        }
        let redacted = Redactor::new(key.1.clone(), key.2.clone()).redact(shape);
        let redacted = self.optimize(&redacted);
        self.redacted.insert(key, Arc::clone(&redacted));
        redacted
    }

    pub fn clear(&mut self) {
        self.interner.clear();
        self.optimized.clear();
        self.redacted.clear();
    }
}

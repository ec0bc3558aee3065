use oxshape::{Shape, Step};
use std::fmt;

/// A query over the data described by a shape.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Query {
    /// The entities matching the shape, sorted and paginated.
    Items {
        shape: Shape,
        orders: Vec<Order>,
        offset: usize,
        /// The maximum number of items, `0` for no limit.
        limit: usize,
    },
    /// The distinct values reached by a path, with their frequency.
    Terms { shape: Shape, path: Vec<Step> },
    /// Aggregate statistics of the values reached by a path.
    Stats { shape: Shape, path: Vec<Step> },
}

impl Query {
    /// All the entities matching the shape.
    pub fn items(shape: Shape) -> Self {
        Self::Items {
            shape,
            orders: Vec::new(),
            offset: 0,
            limit: 0,
        }
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        match self {
            Self::Items { shape, .. } | Self::Terms { shape, .. } | Self::Stats { shape, .. } => {
                shape
            }
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items {
                shape,
                orders,
                offset,
                limit,
            } => {
                write!(f, "items({shape}, [")?;
                for (i, order) in orders.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{order}")?;
                }
                write!(f, "], {offset}, {limit})")
            }
            Self::Terms { shape, path } => {
                write!(f, "terms({shape}, \"")?;
                write_path(f, path)?;
                f.write_str("\")")
            }
            Self::Stats { shape, path } => {
                write!(f, "stats({shape}, \"")?;
                write_path(f, path)?;
                f.write_str("\")")
            }
        }
    }
}

/// A sorting criterion: the values reached by a path, in increasing or decreasing order.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Order {
    path: Vec<Step>,
    inverse: bool,
}

impl Order {
    pub fn increasing(path: impl IntoIterator<Item = Step>) -> Self {
        Self {
            path: path.into_iter().collect(),
            inverse: false,
        }
    }

    pub fn decreasing(path: impl IntoIterator<Item = Step>) -> Self {
        Self {
            path: path.into_iter().collect(),
            inverse: true,
        }
    }

    #[inline]
    pub fn path(&self) -> &[Step] {
        &self.path
    }

    #[inline]
    pub fn is_decreasing(&self) -> bool {
        self.inverse
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.inverse { "-" } else { "+" })?;
        write_path(f, &self.path)
    }
}

fn write_path(f: &mut fmt::Formatter<'_>, path: &[Step]) -> fmt::Result {
    for (i, step) in path.iter().enumerate() {
        if i > 0 {
            f.write_str(".")?;
        }
        f.write_str(step.label())?;
    }
    Ok(())
}

//! Guard axes, their well-known values and acceptance predicates.
//!
//! Axes are open: any string may be used as an axis, the constants below name the ones shared
//! by the authorization and view selection layers.

use crate::shape::Shape;
use std::collections::BTreeSet;

pub const ROLE: &str = "role";
pub const TASK: &str = "task";
pub const AREA: &str = "area";
pub const MODE: &str = "mode";
pub const VIEW: &str = "view";

/// Resource creation.
pub const CREATE: &str = "create";
/// Resource retrieval.
pub const RELATE: &str = "relate";
/// Resource update.
pub const UPDATE: &str = "update";
/// Resource deletion.
pub const DELETE: &str = "delete";

/// The resource itself.
pub const TARGET: &str = "target";
/// Digest of container members.
pub const DIGEST: &str = "digest";
/// Detailed description of container members.
pub const DETAIL: &str = "detail";

/// Content returned to the client.
pub const CONVEY: &str = "convey";
/// Constraints restricting resource selection.
pub const FILTER: &str = "filter";

/// The values accepted for an axis during redaction.
///
/// ```
/// use oxshape::Accept;
/// use std::collections::BTreeSet;
///
/// let guard = BTreeSet::from(["digest".to_owned(), "detail".to_owned()]);
/// assert!(Accept::values(["detail"]).accepts(&guard));
/// assert!(!Accept::values(["target"]).accepts(&guard));
/// assert!(Accept::Any.accepts(&guard));
/// assert!(!Accept::from(false).accepts(&guard));
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Accept {
    /// Wildcard: any guard with at least one value is accepted.
    Any,
    /// Guards sharing at least one value with the set are accepted.
    Values(BTreeSet<String>),
}

impl Accept {
    pub fn values<T: Into<String>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Values(values.into_iter().map(Into::into).collect())
    }

    /// Checks if a guard holding the given values is accepted.
    pub fn accepts(&self, guard: &BTreeSet<String>) -> bool {
        match self {
            Self::Any => !guard.is_empty(),
            Self::Values(values) => !values.is_disjoint(guard),
        }
    }
}

impl From<bool> for Accept {
    #[inline]
    fn from(value: bool) -> Self {
        if value {
            Self::Any
        } else {
            Self::Values(BTreeSet::new())
        }
    }
}

impl<T: Into<String>> FromIterator<T> for Accept {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::values(iter)
    }
}

/// `then` applies only for the given roles.
pub fn role<T: Into<String>>(values: impl IntoIterator<Item = T>, then: Shape) -> Shape {
    Shape::guard(ROLE, values, then)
}

/// `then` applies only for the given tasks.
pub fn task<T: Into<String>>(values: impl IntoIterator<Item = T>, then: Shape) -> Shape {
    Shape::guard(TASK, values, then)
}

/// `then` applies only for the given areas.
pub fn area<T: Into<String>>(values: impl IntoIterator<Item = T>, then: Shape) -> Shape {
    Shape::guard(AREA, values, then)
}

/// `then` applies only for the given modes.
pub fn mode<T: Into<String>>(values: impl IntoIterator<Item = T>, then: Shape) -> Shape {
    Shape::guard(MODE, values, then)
}

/// `then` applies only for the given views.
pub fn view<T: Into<String>>(values: impl IntoIterator<Item = T>, then: Shape) -> Shape {
    Shape::guard(VIEW, values, then)
}

/// `then` is only visible when deleting.
pub fn hidden(then: Shape) -> Shape {
    task([DELETE], then)
}

/// `then` is managed by the server: it applies to retrieval and deletion only.
pub fn server(then: Shape) -> Shape {
    task([RELATE, DELETE], then)
}

/// `then` is set by the client at creation: it applies to creation, retrieval and deletion.
pub fn client(then: Shape) -> Shape {
    task([CREATE, RELATE, DELETE], then)
}

/// `then` applies to container members.
pub fn member(then: Shape) -> Shape {
    area([DIGEST, DETAIL], then)
}

/// `then` describes content returned to the client.
pub fn convey(then: Shape) -> Shape {
    mode([CONVEY], then)
}

/// `then` restricts resource selection without being reflected in the returned content.
pub fn filter(then: Shape) -> Shape {
    mode([FILTER], then)
}

//! Abstract datatypes used by shapes to constrain the kind of a value.
//!
//! These complement the concrete literal datatypes (`xsd:string`, `rdf:langString`...) with
//! a small lattice of node kinds:
//!
//! ```text
//!           value
//!         /       \
//!    resource    literal
//!     /    \        |
//!   iri   bnode   xsd:*, rdf:langString...
//! ```

use oxrdf::NamedNodeRef;
use oxrdf::vocab::{rdf, xsd};

/// The namespace of the abstract datatypes.
pub const NAMESPACE: &str = "https://oxigraph.org/shape#";

/// Any value.
pub const VALUE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://oxigraph.org/shape#value");
/// An IRI, a blank node or an entity frame.
pub const RESOURCE: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://oxigraph.org/shape#resource");
/// An IRI.
pub const IRI: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://oxigraph.org/shape#iri");
/// A blank node.
pub const BNODE: NamedNodeRef<'_> = NamedNodeRef::new_unchecked("https://oxigraph.org/shape#bnode");
/// Any literal.
pub const LITERAL: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://oxigraph.org/shape#literal");
/// Placeholder standing for the focus value while outlining.
pub const TARGET: NamedNodeRef<'_> =
    NamedNodeRef::new_unchecked("https://oxigraph.org/shape#target");

/// Checks if values of the `lower` datatype are also values of the `upper` datatype.
///
/// ```
/// use oxrdf::vocab::xsd;
/// use oxshape::vocab::{LITERAL, RESOURCE, IRI, derives};
///
/// assert!(derives(RESOURCE, IRI));
/// assert!(derives(LITERAL, xsd::STRING));
/// assert!(!derives(IRI, RESOURCE));
/// ```
pub fn derives(upper: NamedNodeRef<'_>, lower: NamedNodeRef<'_>) -> bool {
    upper == lower
        || upper == VALUE
        || (upper == RESOURCE && (lower == IRI || lower == BNODE))
        || (upper == LITERAL && is_literal_datatype(lower))
        || (upper == xsd::DECIMAL && is_integer_datatype(lower))
        || (upper == xsd::INTEGER && is_integer_datatype(lower) && lower != xsd::INTEGER)
}

/// Checks if the datatype is one of the literal datatypes, i.e. not one of the node kinds.
pub fn is_literal_datatype(datatype: NamedNodeRef<'_>) -> bool {
    datatype != VALUE && datatype != RESOURCE && datatype != IRI && datatype != BNODE
}

/// Checks if the datatype is a numeric XSD datatype.
pub fn is_numeric_datatype(datatype: NamedNodeRef<'_>) -> bool {
    datatype == xsd::DECIMAL
        || datatype == xsd::FLOAT
        || datatype == xsd::DOUBLE
        || is_integer_datatype(datatype)
}

/// Checks if the datatype is a calendar XSD datatype.
pub fn is_temporal_datatype(datatype: NamedNodeRef<'_>) -> bool {
    datatype == xsd::DATE_TIME
        || datatype == xsd::DATE_TIME_STAMP
        || datatype == xsd::DATE
        || datatype == xsd::TIME
        || datatype == xsd::G_YEAR
        || datatype == xsd::G_YEAR_MONTH
        || datatype == xsd::G_MONTH
        || datatype == xsd::G_MONTH_DAY
        || datatype == xsd::G_DAY
        || datatype == xsd::DURATION
        || datatype == xsd::YEAR_MONTH_DURATION
        || datatype == xsd::DAY_TIME_DURATION
}

fn is_integer_datatype(datatype: NamedNodeRef<'_>) -> bool {
    datatype == xsd::INTEGER
        || datatype == xsd::LONG
        || datatype == xsd::INT
        || datatype == xsd::SHORT
        || datatype == xsd::BYTE
        || datatype == xsd::NON_NEGATIVE_INTEGER
        || datatype == xsd::NON_POSITIVE_INTEGER
        || datatype == xsd::NEGATIVE_INTEGER
        || datatype == xsd::POSITIVE_INTEGER
        || datatype == xsd::UNSIGNED_LONG
        || datatype == xsd::UNSIGNED_INT
        || datatype == xsd::UNSIGNED_SHORT
        || datatype == xsd::UNSIGNED_BYTE
}

/// Checks if the datatype is the one of language-tagged strings.
pub fn is_lang_string(datatype: NamedNodeRef<'_>) -> bool {
    datatype == rdf::LANG_STRING
}

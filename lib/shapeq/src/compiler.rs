use crate::error::QueryError;
use crate::query::{Order, Query};
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term};
use oxshape::{Shape, Step, guard, vocab};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value as Json};
use shapeopt::Optimizer;
use std::borrow::Cow;
use tracing::debug;

const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Compiles a query given either as URL query parameters or as a (possibly URL-encoded) JSON object.
///
/// Paths are resolved against the field envelope of the `base` shape.
/// The compiled filter is conjoined to `base` inside a `filter` mode guard,
/// so it restricts the matching entities without being part of their description.
/// Queries without filters, sorting criteria or pagination compile to the items of `base`.
///
/// ```
/// use oxrdf::{Literal, NamedNode};
/// use oxshape::{Shape, Step, guard};
/// use shapeopt::Optimizer;
/// use shapeq::{Query, compile};
///
/// let name = Step::direct(NamedNode::new("http://schema.org/name")?);
/// let base = Shape::field(name.clone(), Shape::datatype(oxrdf::vocab::xsd::STRING));
///
/// let query = compile("name=Alice&_limit=10", &base)?;
/// assert_eq!(
///     query,
///     Query::Items {
///         shape: Optimizer::optimize(Shape::and([
///             base.clone(),
///             guard::filter(Shape::field(
///                 name,
///                 Shape::any([Literal::new_typed_literal("Alice", oxrdf::vocab::xsd::STRING)])
///             ))
///         ])),
///         orders: Vec::new(),
///         offset: 0,
///         limit: 10
///     }
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn compile(query: &str, base: &Shape) -> Result<Query, QueryError> {
    if query.is_empty() {
        return Ok(Query::items(base.clone()));
    }
    let json = if query.starts_with('{') {
        serde_json::from_str(query)?
    } else if query.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case("%7B")) {
        let decoded = percent_decode_str(query)
            .decode_utf8()
            .map_err(|e| QueryError::malformed(e.to_string()))?;
        serde_json::from_str(&decoded)?
    } else {
        form(query)
    };
    compile_json(&json, base)
}

/// Compiles a query given as a JSON object.
///
/// Reserved keys are `_order`, `_offset`, `_limit`, `_terms` and `_stats`.
/// Other keys starting with `_` and `null` values are ignored.
pub fn compile_json(query: &Json, base: &Shape) -> Result<Query, QueryError> {
    let Json::Object(query) = query else {
        return Err(QueryError::malformed("query is not an object"));
    };

    let filter = filter(query, base)?;
    let terms = reserved(query, "_terms")
        .map(|value| path_value(value, "_terms", base))
        .transpose()?;
    let stats = reserved(query, "_stats")
        .map(|value| path_value(value, "_stats", base))
        .transpose()?;
    if terms.is_some() && stats.is_some() {
        return Err(QueryError::malformed("_terms and _stats are mutually exclusive"));
    }
    let orders = reserved(query, "_order")
        .map(|value| orders(value, base))
        .transpose()?
        .unwrap_or_default();
    let offset = integer(query, "_offset")?;
    let limit = integer(query, "_limit")?;

    if filter.is_unconstrained()
        && terms.is_none()
        && stats.is_none()
        && orders.is_empty()
        && offset == 0
        && limit == 0
    {
        return Ok(Query::items(base.clone()));
    }

    // filtering only: the filter is not part of the result description
    let shape = Optimizer::optimize(Shape::and([base.clone(), guard::filter(filter)]));

    let query = if let Some(path) = terms {
        Query::Terms { shape, path }
    } else if let Some(path) = stats {
        Query::Stats { shape, path }
    } else {
        Query::Items {
            shape,
            orders,
            offset,
            limit,
        }
    };
    debug!(%query, "compiled query");
    Ok(query)
}

/// Converts URL query parameters to the equivalent JSON object.
fn form(query: &str) -> Json {
    let mut fields = Vec::<(String, Vec<String>)>::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if let Some((_, values)) = fields.iter_mut().find(|(k, _)| *k == key) {
            values.push(value.into_owned());
        } else {
            fields.push((key.into_owned(), vec![value.into_owned()]));
        }
    }
    Json::Object(
        fields
            .into_iter()
            .map(|(key, values)| {
                let value = match key.as_str() {
                    "_terms" | "_stats" if values.len() == 1 => Json::String(values[0].clone()),
                    "_offset" | "_limit" if values.len() == 1 => values[0]
                        .parse::<i64>()
                        .map_or_else(|_| strings(&values), Json::from),
                    _ => strings(&values),
                };
                (key, value)
            })
            .collect(),
    )
}

/// The values of a parameter: a string, or an array if the parameter is repeated.
fn strings(values: &[String]) -> Json {
    match values {
        [value] => Json::String(value.clone()),
        values => values.iter().cloned().map(Json::String).collect(),
    }
}

fn reserved<'a>(query: &'a Map<String, Json>, key: &str) -> Option<&'a Json> {
    query.get(key).filter(|value| !value.is_null())
}

// Paths

/// Resolves a dotted path against the field envelope of `shape`.
///
/// Returns the steps of the path and the shape of the values it reaches.
fn path(path: &str, shape: &Shape) -> Result<(Vec<Step>, Shape), QueryError> {
    let mut steps = Vec::new();
    let mut shape = shape.clone();
    for segment in segments(path.trim()) {
        if segment.is_empty() {
            return Err(QueryError::malformed(format!("malformed path '{path}'")));
        }
        let (step, nested) = shape
            .fields()
            .into_iter()
            .find(|(step, _)| step.matches(segment))
            .ok_or_else(|| QueryError::unknown_path(segment))?;
        steps.push(step);
        shape = nested;
    }
    Ok((steps, shape))
}

/// Splits a path on dots, except inside IRIs between angle brackets.
fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_iri = false;
    for (i, c) in path.char_indices() {
        match c {
            '<' => in_iri = true,
            '>' => in_iri = false,
            '.' if !in_iri => {
                segments.push(path[start..i].trim());
                start = i + 1;
            }
            _ => (),
        }
    }
    segments.push(path[start..].trim());
    segments
}

fn path_value(value: &Json, key: &str, base: &Shape) -> Result<Vec<Step>, QueryError> {
    let Json::String(value) = value else {
        return Err(QueryError::malformed(format!("{key} is not a string")));
    };
    Ok(path(value, base)?.0)
}

fn orders(value: &Json, base: &Shape) -> Result<Vec<Order>, QueryError> {
    match value {
        Json::String(criterion) => Ok(vec![order(criterion, base)?]),
        Json::Array(criteria) => criteria
            .iter()
            .map(|criterion| match criterion {
                Json::String(criterion) => order(criterion, base),
                _ => Err(QueryError::malformed("_order criterion is not a string")),
            })
            .collect(),
        _ => Err(QueryError::malformed(
            "_order is neither a string nor an array of strings",
        )),
    }
}

fn order(criterion: &str, base: &Shape) -> Result<Order, QueryError> {
    let (decreasing, path) = match criterion.strip_prefix('-') {
        Some(path) => (true, path),
        None => (false, criterion.strip_prefix('+').unwrap_or(criterion)),
    };
    if path.trim_start().starts_with(['+', '-']) {
        return Err(QueryError::malformed(format!("malformed order criterion '{criterion}'")));
    }
    let path = self::path(path, base)?.0;
    Ok(if decreasing {
        Order::decreasing(path)
    } else {
        Order::increasing(path)
    })
}

fn integer(query: &Map<String, Json>, key: &str) -> Result<usize, QueryError> {
    let name = key.trim_start_matches('_');
    match reserved(query, key) {
        None => Ok(0),
        Some(Json::Number(number)) => {
            if let Some(value) = number.as_u64() {
                usize::try_from(value).map_err(|_| QueryError::illegal(format!("{name} too large")))
            } else if number.as_i64().is_some_and(|value| value < 0) {
                Err(QueryError::illegal(format!("negative {name}")))
            } else {
                Err(QueryError::malformed(format!("{key} is not an integer")))
            }
        }
        Some(_) => Err(QueryError::malformed(format!("{key} is not a number"))),
    }
}

// Filters

fn filter(query: &Map<String, Json>, base: &Shape) -> Result<Shape, QueryError> {
    let mut filters = Vec::new();
    for (key, value) in query {
        if key.starts_with('_') || value.is_null() {
            continue;
        }
        let (operator, path) = Operator::parse(key, base);
        let (steps, shape) = self::path(path, base)?;
        let constraint = operator.constraint(value, &shape)?;
        filters.push(
            steps
                .into_iter()
                .rev()
                .fold(constraint, |nested, step| Shape::field(step, nested)),
        );
    }
    Ok(Shape::and(filters))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Datatype,
    Clazz,
    MinInclusive,
    MaxInclusive,
    MinExclusive,
    MaxExclusive,
    MinLength,
    MaxLength,
    Pattern,
    Like,
    MinCount,
    MaxCount,
    In,
    All,
    Any,
}

/// Key prefixes, longest matches first.
const OPERATORS: [(&str, Operator); 15] = [
    ("^", Operator::Datatype),
    ("@", Operator::Clazz),
    (">=", Operator::MinInclusive),
    ("<=", Operator::MaxInclusive),
    (">", Operator::MinExclusive),
    ("<", Operator::MaxExclusive),
    ("$>", Operator::MinLength),
    ("$<", Operator::MaxLength),
    ("*", Operator::Pattern),
    ("~", Operator::Like),
    ("#>", Operator::MinCount),
    ("#<", Operator::MaxCount),
    ("%", Operator::In),
    ("!", Operator::All),
    ("?", Operator::Any),
];

impl Operator {
    /// Splits a filter key into its operator and its path.
    ///
    /// Keys resolving to a path of `base` or starting with an `<iri>` segment are plain paths,
    /// even if they start with an operator prefix like `<` or `^`.
    fn parse<'a>(key: &'a str, base: &Shape) -> (Self, &'a str) {
        if path(key, base).is_ok() || segments(key.trim()).first().is_some_and(|s| is_iri(s)) {
            return (Self::Any, key);
        }
        OPERATORS
            .iter()
            .find_map(|(prefix, operator)| key.strip_prefix(*prefix).map(|path| (*operator, path)))
            .unwrap_or((Self::Any, key))
    }

    /// The constraint on the values of `shape` expressed by `value`.
    fn constraint(self, value: &Json, shape: &Shape) -> Result<Shape, QueryError> {
        let datatype = value_datatype(shape);
        let datatype = datatype.as_ref().map(NamedNode::as_ref);
        Ok(match self {
            Self::Datatype => Shape::datatype(datatype_iri(string(value, "datatype")?)?),
            Self::Clazz => Shape::clazz(iri(string(value, "class")?)?),
            Self::MinInclusive => Shape::min_inclusive(term(value, datatype)?),
            Self::MaxInclusive => Shape::max_inclusive(term(value, datatype)?),
            Self::MinExclusive => Shape::min_exclusive(term(value, datatype)?),
            Self::MaxExclusive => Shape::max_exclusive(term(value, datatype)?),
            Self::MinLength => Shape::min_length(count(value, "length")?),
            Self::MaxLength => Shape::max_length(count(value, "length")?),
            Self::MinCount => Shape::min_count(count(value, "count")?),
            Self::MaxCount => Shape::max_count(count(value, "count")?),
            Self::Pattern => match string(value, "pattern")? {
                "" => Shape::and([]),
                pattern => Shape::pattern(pattern),
            },
            Self::Like => match string(value, "keywords")? {
                "" => Shape::and([]),
                keywords => Shape::like(keywords),
            },
            Self::In => Shape::in_values(terms(value, datatype)?),
            Self::All => Shape::all(terms(value, datatype)?),
            Self::Any => Shape::any(terms(value, datatype)?),
        })
    }
}

/// Is this path segment a full `<iri>`?
fn is_iri(segment: &str) -> bool {
    segment
        .strip_prefix('<')
        .and_then(|iri| iri.strip_suffix('>'))
        .is_some_and(|iri| !iri.is_empty() && !iri.contains(['<', '>']))
}

// Values

/// The datatype used to decode the values filtering `shape`.
fn value_datatype(shape: &Shape) -> Option<NamedNode> {
    shape
        .declared_datatype()
        .or_else(|| is_classed(shape).then(|| vocab::RESOURCE.into_owned()))
}

fn is_classed(shape: &Shape) -> bool {
    match shape {
        Shape::Clazz(_) => true,
        Shape::And(shapes) => shapes.iter().any(is_classed),
        _ => false,
    }
}

fn string<'a>(value: &'a Json, what: &str) -> Result<&'a str, QueryError> {
    value
        .as_str()
        .ok_or_else(|| QueryError::malformed(format!("{what} value is not a string")))
}

fn count(value: &Json, what: &str) -> Result<usize, QueryError> {
    let count = match value {
        Json::Number(number) if number.as_i64().is_some_and(|value| value < 0) => {
            return Err(QueryError::illegal(format!("negative {what}")));
        }
        Json::Number(number) => number.as_u64().and_then(|value| usize::try_from(value).ok()),
        Json::String(value) => value.trim().parse().ok(),
        _ => None,
    };
    count.ok_or_else(|| QueryError::malformed(format!("{what} is not a non-negative integer")))
}

fn iri(value: &str) -> Result<NamedNode, QueryError> {
    let value = value.trim();
    let value = value
        .strip_prefix('<')
        .and_then(|value| value.strip_suffix('>'))
        .unwrap_or(value);
    NamedNode::new(value).map_err(|e| QueryError::malformed(format!("invalid IRI <{value}>: {e}")))
}

/// Resolves a datatype name: an IRI, a node kind or an XSD datatype local name.
fn datatype_iri(value: &str) -> Result<NamedNode, QueryError> {
    let value = value.trim();
    if value.contains(':') {
        return iri(value);
    }
    let node_kind = [
        vocab::VALUE,
        vocab::RESOURCE,
        vocab::IRI,
        vocab::BNODE,
        vocab::LITERAL,
    ]
    .into_iter()
    .find(|kind| kind.as_str().strip_prefix(vocab::NAMESPACE) == Some(value));
    match node_kind {
        Some(kind) => Ok(kind.into_owned()),
        None => iri(&format!("{XSD}{value}")),
    }
}

fn terms(value: &Json, datatype: Option<NamedNodeRef<'_>>) -> Result<Vec<Term>, QueryError> {
    match value {
        Json::Array(values) => values.iter().map(|value| term(value, datatype)).collect(),
        value => Ok(vec![term(value, datatype)?]),
    }
}

/// Decodes a value according to the datatype of the filtered field.
fn term(value: &Json, datatype: Option<NamedNodeRef<'_>>) -> Result<Term, QueryError> {
    let (lexical, natural): (Cow<'_, str>, _) = match value {
        Json::String(value) => (value.as_str().into(), None),
        Json::Bool(value) => (value.to_string().into(), Some(xsd::BOOLEAN)),
        Json::Number(value) if value.is_f64() => (value.to_string().into(), Some(xsd::DECIMAL)),
        Json::Number(value) => (value.to_string().into(), Some(xsd::INTEGER)),
        Json::Null | Json::Array(_) | Json::Object(_) => {
            return Err(QueryError::malformed(format!("{value} is not a value")));
        }
    };
    Ok(match datatype {
        Some(datatype) if vocab::derives(vocab::RESOURCE, datatype) => iri(&lexical)?.into(),
        Some(datatype)
            if datatype != vocab::VALUE
                && datatype != vocab::LITERAL
                && !vocab::is_lang_string(datatype) =>
        {
            Literal::new_typed_literal(lexical, datatype).into()
        }
        _ => match natural {
            Some(natural) => Literal::new_typed_literal(lexical, natural).into(),
            None => Literal::new_simple_literal(lexical).into(),
        },
    })
}

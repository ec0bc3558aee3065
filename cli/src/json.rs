//! JSON encoding of shapes and data.
//!
//! Shapes are objects keyed by their constraint name (`{"minCount": 1}`,
//! `{"field": "http://schema.org/name", "shape": {...}}`...).
//! Terms follow JSON-LD conventions: `{"@id": "..."}` for IRIs and blank nodes,
//! `{"@value": "...", "@type": "..."}` or `{"@value": "...", "@language": "..."}` for literals,
//! plain strings, numbers and booleans for simple literals, integers, decimals and booleans.
//! In data, objects without `@value` are frames whose keys are field labels or IRIs.

use anyhow::{Context, Result, bail};
use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use oxshape::{Frame, Shape, Step, Value};
use serde_json::{Map, Value as Json, json};

const KEYWORDS: [&str; 23] = [
    "and",
    "or",
    "field",
    "datatype",
    "clazz",
    "minCount",
    "maxCount",
    "minInclusive",
    "maxInclusive",
    "minExclusive",
    "maxExclusive",
    "minLength",
    "maxLength",
    "pattern",
    "like",
    "in",
    "all",
    "any",
    "lang",
    "localized",
    "link",
    "meta",
    "guard",
];

pub fn parse_shape(json: &Json) -> Result<Shape> {
    let Json::Object(object) = json else {
        bail!("A shape must be a JSON object, found {json}");
    };
    let Some((keyword, argument)) = KEYWORDS
        .iter()
        .find_map(|keyword| object.get(*keyword).map(|argument| (*keyword, argument)))
    else {
        bail!("Unknown shape {json}");
    };
    Ok(match keyword {
        "and" => Shape::And(shapes(argument)?),
        "or" => Shape::Or(shapes(argument)?),
        "field" => {
            let iri = parse_iri(argument)?;
            let mut step = if object.get("inverse").and_then(Json::as_bool) == Some(true) {
                Step::inverse(iri)
            } else {
                Step::direct(iri)
            };
            if let Some(label) = object.get("label") {
                step = step.with_label(string(label)?);
            }
            Shape::field(step, nested(object, "shape")?)
        }
        "datatype" => Shape::datatype(parse_iri(argument)?),
        "clazz" => Shape::clazz(parse_iri(argument)?),
        "minCount" => Shape::min_count(count(argument)?),
        "maxCount" => Shape::max_count(count(argument)?),
        "minInclusive" => Shape::min_inclusive(parse_term(argument)?),
        "maxInclusive" => Shape::max_inclusive(parse_term(argument)?),
        "minExclusive" => Shape::min_exclusive(parse_term(argument)?),
        "maxExclusive" => Shape::max_exclusive(parse_term(argument)?),
        "minLength" => Shape::min_length(count(argument)?),
        "maxLength" => Shape::max_length(count(argument)?),
        "pattern" => Shape::pattern(string(argument)?),
        "like" => Shape::like(string(argument)?),
        "in" => Shape::in_values(terms(argument)?),
        "all" => Shape::all(terms(argument)?),
        "any" => Shape::any(terms(argument)?),
        "lang" => Shape::lang(strings(argument)?),
        "localized" => Shape::localized(),
        "link" => Shape::link(parse_iri(argument)?, nested(object, "shape")?),
        "meta" => Shape::meta(
            string(argument)?,
            parse_term(object.get("value").context("Missing meta value")?)?,
        ),
        "guard" => Shape::guard(
            string(argument)?,
            strings(object.get("values").unwrap_or(&Json::Null))?,
            nested(object, "then")?,
        ),
        _ => bail!("Unsupported shape keyword {keyword}"),
    })
}

fn shapes(json: &Json) -> Result<Vec<Shape>> {
    let Json::Array(shapes) = json else {
        bail!("Expected an array of shapes, found {json}");
    };
    shapes.iter().map(parse_shape).collect()
}

/// The nested shape under `key`, unconstrained if missing.
fn nested(object: &Map<String, Json>, key: &str) -> Result<Shape> {
    object
        .get(key)
        .map_or_else(|| Ok(Shape::and([])), parse_shape)
}

fn string(json: &Json) -> Result<&str> {
    json.as_str()
        .with_context(|| format!("Expected a string, found {json}"))
}

fn strings(json: &Json) -> Result<Vec<String>> {
    match json {
        Json::Null => Ok(Vec::new()),
        Json::Array(values) => values
            .iter()
            .map(|value| string(value).map(str::to_owned))
            .collect(),
        value => Ok(vec![string(value)?.to_owned()]),
    }
}

fn count(json: &Json) -> Result<usize> {
    json.as_u64()
        .and_then(|value| usize::try_from(value).ok())
        .with_context(|| format!("Expected a non-negative integer, found {json}"))
}

fn parse_iri(json: &Json) -> Result<NamedNode> {
    let iri = match json {
        Json::Object(object) => string(object.get("@id").context("Missing @id")?)?,
        value => string(value)?,
    };
    NamedNode::new(iri).with_context(|| format!("Invalid IRI <{iri}>"))
}

fn terms(json: &Json) -> Result<Vec<Term>> {
    match json {
        Json::Array(values) => values.iter().map(parse_term).collect(),
        value => Ok(vec![parse_term(value)?]),
    }
}

pub fn parse_term(json: &Json) -> Result<Term> {
    Ok(match json {
        Json::String(value) => Literal::new_simple_literal(value).into(),
        Json::Bool(value) => Literal::from(*value).into(),
        Json::Number(value) if value.is_f64() => {
            Literal::new_typed_literal(value.to_string(), xsd::DECIMAL).into()
        }
        Json::Number(value) => Literal::new_typed_literal(value.to_string(), xsd::INTEGER).into(),
        Json::Object(object) => {
            if let Some(id) = object.get("@id") {
                parse_node(string(id)?)?
            } else {
                let value = string(object.get("@value").context("Missing @value or @id")?)?;
                if let Some(language) = object.get("@language") {
                    Literal::new_language_tagged_literal(value, string(language)?)?.into()
                } else if let Some(datatype) = object.get("@type") {
                    Literal::new_typed_literal(value, parse_iri(datatype)?).into()
                } else {
                    Literal::new_simple_literal(value).into()
                }
            }
        }
        Json::Null | Json::Array(_) => bail!("Expected a term, found {json}"),
    })
}

fn parse_node(id: &str) -> Result<Term> {
    Ok(if let Some(id) = id.strip_prefix("_:") {
        BlankNode::new(id)
            .with_context(|| format!("Invalid blank node identifier {id}"))?
            .into()
    } else {
        NamedNode::new(id)
            .with_context(|| format!("Invalid IRI <{id}>"))?
            .into()
    })
}

/// Decodes data, resolving frame keys against the field envelope of `shape`.
pub fn parse_value(json: &Json, shape: &Shape) -> Result<Value> {
    match json {
        Json::Array(values) => values
            .iter()
            .map(|value| parse_value(value, shape))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Json::Object(object) if !object.contains_key("@value") => {
            let fields = shape.fields();
            let mut frame = Frame::new();
            for (key, value) in object {
                if key == "@id" {
                    frame = frame.with_id(parse_node(string(value)?)?);
                    continue;
                }
                let step = match fields.keys().find(|step| step.matches(key)) {
                    Some(step) => step.clone(),
                    None => parse_step(key)?,
                };
                let nested = fields.get(&step).cloned().unwrap_or_else(|| Shape::and([]));
                frame.insert(step, parse_value(value, &nested)?);
            }
            Ok(frame.into())
        }
        json => Ok(parse_term(json)?.into()),
    }
}

/// A step given by its IRI, optionally between angle brackets and prefixed by `^`.
fn parse_step(key: &str) -> Result<Step> {
    let (inverse, iri) = match key.strip_prefix('^') {
        Some(iri) => (true, iri),
        None => (false, key),
    };
    let iri = iri
        .strip_prefix('<')
        .and_then(|iri| iri.strip_suffix('>'))
        .unwrap_or(iri);
    let iri = NamedNode::new(iri).with_context(|| format!("Unknown field '{key}'"))?;
    Ok(if inverse {
        Step::inverse(iri)
    } else {
        Step::direct(iri)
    })
}

pub fn shape_to_json(shape: &Shape) -> Json {
    match shape {
        Shape::And(shapes) => json!({"and": shapes.iter().map(shape_to_json).collect::<Vec<_>>()}),
        Shape::Or(shapes) => json!({"or": shapes.iter().map(shape_to_json).collect::<Vec<_>>()}),
        Shape::Field { step, shape } => {
            let mut object = Map::new();
            object.insert("field".into(), step.iri().as_str().into());
            if step.is_inverse() {
                object.insert("inverse".into(), true.into());
            }
            let default = if step.is_inverse() {
                Step::inverse(step.iri())
            } else {
                Step::direct(step.iri())
            };
            if step.label() != default.label() {
                object.insert("label".into(), step.label().into());
            }
            object.insert("shape".into(), shape_to_json(shape));
            Json::Object(object)
        }
        Shape::Datatype(datatype) => json!({"datatype": datatype.as_str()}),
        Shape::Clazz(class) => json!({"clazz": class.as_str()}),
        Shape::MinCount(limit) => json!({"minCount": limit}),
        Shape::MaxCount(limit) => json!({"maxCount": limit}),
        Shape::MinInclusive(limit) => json!({"minInclusive": term_to_json(limit)}),
        Shape::MaxInclusive(limit) => json!({"maxInclusive": term_to_json(limit)}),
        Shape::MinExclusive(limit) => json!({"minExclusive": term_to_json(limit)}),
        Shape::MaxExclusive(limit) => json!({"maxExclusive": term_to_json(limit)}),
        Shape::MinLength(limit) => json!({"minLength": limit}),
        Shape::MaxLength(limit) => json!({"maxLength": limit}),
        Shape::Pattern(pattern) => json!({"pattern": pattern}),
        Shape::Like(keywords) => json!({"like": keywords}),
        Shape::In(values) => json!({"in": values.iter().map(term_to_json).collect::<Vec<_>>()}),
        Shape::All(values) => json!({"all": values.iter().map(term_to_json).collect::<Vec<_>>()}),
        Shape::Any(values) => json!({"any": values.iter().map(term_to_json).collect::<Vec<_>>()}),
        Shape::Lang(tags) => json!({"lang": tags}),
        Shape::Localized => json!({"localized": true}),
        Shape::Link { relation, shape } => {
            json!({"link": relation.as_str(), "shape": shape_to_json(shape)})
        }
        Shape::Meta { key, value } => json!({"meta": key, "value": term_to_json(value)}),
        Shape::Guard { axis, values, then } => {
            json!({"guard": axis, "values": values, "then": shape_to_json(then)})
        }
    }
}

fn term_to_json(term: &Term) -> Json {
    match term {
        Term::NamedNode(node) => json!({"@id": node.as_str()}),
        Term::BlankNode(node) => json!({"@id": format!("_:{}", node.as_str())}),
        Term::Literal(literal) => {
            if let Some(language) = literal.language() {
                json!({"@value": literal.value(), "@language": language})
            } else if literal.datatype() == xsd::STRING {
                literal.value().into()
            } else if literal.datatype() == xsd::BOOLEAN
                && matches!(literal.value(), "true" | "false")
            {
                (literal.value() == "true").into()
            } else if let Some(value) = (literal.datatype() == xsd::INTEGER)
                .then(|| literal.value().parse::<i64>().ok())
                .flatten()
            {
                value.into()
            } else {
                json!({"@value": literal.value(), "@type": literal.datatype().as_str()})
            }
        }
        #[allow(unreachable_patterns)]
        _ => Json::Null,
    }
}

use oxrdf::{Graph, NamedNodeRef, Term, Triple};
use oxshape::{Shape, Step, vocab};
use tracing::trace;

/// Materializes the statements described by a shape for some focus values.
///
/// Statements are derived from the fields and links whose nested shape pins down values with
/// [`Shape::All`] or a single-valued [`Shape::Any`]. The [`TARGET`](vocab::TARGET) placeholder
/// stands for the current focus values.
///
/// The shape is a tree so the traversal always ends. The produced graph deduplicates statements.
///
/// ```
/// use oxrdf::{NamedNode, Triple};
/// use oxshape::{Shape, Step};
/// use shapeopt::Outliner;
///
/// let container = NamedNode::new("http://example.com/container")?;
/// let member = NamedNode::new("http://example.com/member")?;
/// let contains = NamedNode::new("http://www.w3.org/ns/ldp#contains")?;
/// let shape = Shape::field(Step::inverse(contains.clone()), Shape::all([container.clone()]));
///
/// let graph = Outliner::new([member.clone().into()]).outline(&shape);
/// assert!(graph.contains(&Triple::new(container, contains, member)));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct Outliner {
    focus: Vec<Term>,
}

impl Outliner {
    pub fn new(focus: impl IntoIterator<Item = Term>) -> Self {
        Self {
            focus: focus.into_iter().collect(),
        }
    }

    pub fn outline(&self, shape: &Shape) -> Graph {
        let mut graph = Graph::new();
        outline_shape(shape, &self.focus, &mut graph);
        trace!(statements = graph.len(), "outlined shape");
        graph
    }
}

fn outline_shape(shape: &Shape, sources: &[Term], graph: &mut Graph) {
    match shape {
        Shape::And(shapes) => {
            for shape in shapes {
                outline_shape(shape, sources, graph);
            }
        }
        Shape::Field { step, shape } => {
            let targets = resolve(pinned_values(shape), sources);
            for source in sources {
                for target in &targets {
                    insert_step(graph, step, source, target);
                }
            }
            outline_shape(shape, &targets, graph);
        }
        Shape::Link { relation, shape } => {
            let targets = resolve(pinned_values(shape), sources);
            for source in sources {
                for target in &targets {
                    insert(graph, source, relation.as_ref(), target);
                }
            }
            outline_shape(shape, &targets, graph);
        }
        // Disjunctions and unresolved guards don't pin down any statement
        Shape::Or(_)
        | Shape::Guard { .. }
        | Shape::Datatype(_)
        | Shape::Clazz(_)
        | Shape::MinCount(_)
        | Shape::MaxCount(_)
        | Shape::MinInclusive(_)
        | Shape::MaxInclusive(_)
        | Shape::MinExclusive(_)
        | Shape::MaxExclusive(_)
        | Shape::MinLength(_)
        | Shape::MaxLength(_)
        | Shape::Pattern(_)
        | Shape::Like(_)
        | Shape::In(_)
        | Shape::All(_)
        | Shape::Any(_)
        | Shape::Lang(_)
        | Shape::Localized
        | Shape::Meta { .. } => (),
    }
}

/// The values a shape requires to be present in its focus.
fn pinned_values(shape: &Shape) -> Vec<&Term> {
    match shape {
        Shape::And(shapes) => shapes.iter().flat_map(pinned_values).collect(),
        Shape::All(values) => values.iter().collect(),
        Shape::Any(values) if values.len() == 1 => values.iter().collect(),
        _ => Vec::new(),
    }
}

fn resolve(values: Vec<&Term>, sources: &[Term]) -> Vec<Term> {
    let mut resolved = Vec::new();
    for value in values {
        if matches!(value, Term::NamedNode(node) if node.as_ref() == vocab::TARGET) {
            resolved.extend(sources.iter().cloned());
        } else {
            resolved.push(value.clone());
        }
    }
    resolved.dedup();
    resolved
}

fn insert_step(graph: &mut Graph, step: &Step, source: &Term, target: &Term) {
    if step.is_inverse() {
        insert(graph, target, step.iri(), source);
    } else {
        insert(graph, source, step.iri(), target);
    }
}

/// Inserts the statement if the subject is an IRI or a blank node.
fn insert(graph: &mut Graph, subject: &Term, predicate: NamedNodeRef<'_>, object: &Term) {
    let triple = match subject {
        Term::NamedNode(subject) => Triple::new(subject.clone(), predicate, object.clone()),
        Term::BlankNode(subject) => Triple::new(subject.clone(), predicate, object.clone()),
        _ => return,
    };
    graph.insert(&triple);
}

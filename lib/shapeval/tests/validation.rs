use oxrdf::vocab::{rdf, xsd};
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use oxshape::{Frame, Shape, Step, Value, guard, vocab};
use shapeopt::{Inferencer, Optimizer};
use shapeval::{Focus, ValidationError, Validator, validate};

fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("http://example.com/{name}"))
}

fn step(name: &str) -> Step {
    Step::direct(iri(name))
}

fn string(value: &str) -> Value {
    Literal::new_simple_literal(value).into()
}

fn conforms(shape: &Shape, value: &Value) -> bool {
    match validate(shape, value) {
        Ok(report) => report.conforms(),
        Err(e) => panic!("validation of {shape} failed: {e}"),
    }
}

fn conforms_empty(shape: &Shape) -> bool {
    match Validator::new(shape).validate_focus(&Focus::new(None)) {
        Ok(report) => report.conforms(),
        Err(e) => panic!("validation of {shape} failed: {e}"),
    }
}

// =============================================================================
// Empty focus
// =============================================================================

#[test]
fn test_value_constraints_hold_on_empty_focus() {
    for shape in [
        Shape::datatype(xsd::STRING),
        Shape::clazz(iri("C")),
        Shape::min_inclusive(Literal::from(1)),
        Shape::max_exclusive(Literal::from(1)),
        Shape::min_length(3),
        Shape::max_length(0),
        Shape::pattern("a+"),
        Shape::like("word"),
        Shape::in_values([Literal::from(1)]),
        Shape::lang(["en"]),
        Shape::localized(),
        Shape::max_count(0),
        Shape::field(step("p"), Shape::required()),
        Shape::and([]),
    ] {
        assert!(conforms_empty(&shape), "{shape} rejects an empty focus");
    }
}

#[test]
fn test_presence_constraints_fail_on_empty_focus() {
    for shape in [
        Shape::min_count(1),
        Shape::all([iri("x")]),
        Shape::any([iri("x")]),
        Shape::or([]),
    ] {
        assert!(!conforms_empty(&shape), "{shape} accepts an empty focus");
    }
}

// =============================================================================
// Value constraints
// =============================================================================

#[test]
fn test_ranges_follow_term_order() {
    assert!(conforms(&Shape::min_exclusive(Literal::from(1)), &string("")));
    assert!(!conforms(&Shape::max_exclusive(Literal::from(10)), &string("")));
    assert!(conforms(
        &Shape::max_exclusive(Literal::from(10)),
        &Literal::from(2.5).into()
    ));
    assert!(!conforms(
        &Shape::min_inclusive(Literal::from(3)),
        &Literal::from(2).into()
    ));
    assert!(conforms(
        &Shape::max_inclusive(Literal::from(3)),
        &Literal::from(3).into()
    ));
}

#[test]
fn test_lengths_use_the_textual_form() {
    assert!(conforms(&Shape::min_length(3), &Literal::from(100).into()));
    assert!(!conforms(&Shape::max_length(2), &Literal::from(100).into()));
    assert!(conforms(&Shape::max_length(3), &string("été")));
}

#[test]
fn test_like() {
    assert!(conforms(
        &Shape::like("ex.org"),
        &Value::from(NamedNode::new_unchecked("http://exampe.org/"))
    ));
    assert!(!conforms(&Shape::like("example"), &string("an exam")));
}

#[test]
fn test_pattern_matches_the_whole_value() {
    let shape = Shape::pattern("[a-z]+");
    assert!(conforms(&shape, &string("abc")));
    assert!(!conforms(&shape, &string("abc1")));
    assert!(!conforms(&Shape::pattern("b"), &string("abc")));
}

#[test]
fn test_datatype() {
    assert!(conforms(&Shape::datatype(xsd::DECIMAL), &Literal::from(1).into()));
    assert!(!conforms(&Shape::datatype(xsd::INTEGER), &Literal::from(1.5).into()));
    assert!(conforms(&Shape::datatype(vocab::RESOURCE), &iri("x").into()));
    assert!(conforms(&Shape::datatype(vocab::RESOURCE), &Frame::new().into()));
    assert!(conforms(
        &Shape::datatype(vocab::RESOURCE),
        &Value::from(Term::from(BlankNode::default()))
    ));
    assert!(!conforms(&Shape::datatype(vocab::IRI), &string("x")));
    assert!(conforms(&Shape::datatype(vocab::LITERAL), &string("x")));
}

#[test]
fn test_clazz() {
    let class = iri("Person");
    let typed = Frame::new().with(Step::direct(rdf::TYPE), class.clone());
    assert!(conforms(&Shape::clazz(class.clone()), &typed.into()));
    assert!(!conforms(&Shape::clazz(class.clone()), &Frame::new().into()));
    assert!(conforms(&Shape::clazz(class.clone()), &iri("alice").into()));
    assert!(!conforms(&Shape::clazz(class), &string("alice")));
}

#[test]
fn test_languages() {
    let en = Value::from(Literal::new_language_tagged_literal_unchecked("hello", "en"));
    let fr = Value::from(Literal::new_language_tagged_literal_unchecked("bonjour", "fr"));
    assert!(conforms(&Shape::lang(["en"]), &en));
    assert!(!conforms(&Shape::lang(["en"]), &fr));
    assert!(conforms(&Shape::lang(Vec::<String>::new()), &fr));
    assert!(!conforms(&Shape::lang(Vec::<String>::new()), &string("hello")));

    assert!(conforms(&Shape::localized(), &Value::Array(vec![en.clone(), fr])));
    assert!(!conforms(&Shape::localized(), &Value::Array(vec![en.clone(), en])));
}

#[test]
fn test_value_sets() {
    let one = Value::from(Literal::from(1));
    let values = Value::Array(vec![one.clone(), Literal::from(2).into()]);
    assert!(conforms(&Shape::in_values([Literal::from(1), Literal::from(2)]), &values));
    assert!(!conforms(&Shape::in_values([Literal::from(1)]), &values));
    assert!(conforms(&Shape::all([Literal::from(1), Literal::from(2)]), &values));
    assert!(!conforms(&Shape::all([Literal::from(3)]), &values));
    assert!(conforms(&Shape::any([Literal::from(3), Literal::from(2)]), &values));
    assert!(!conforms(&Shape::any([Literal::from(3)]), &one));
}

// =============================================================================
// Counts
// =============================================================================

#[test]
fn test_max_count_rejects_explicit_collections() {
    let single = Value::from(Literal::from(1));
    let array = Value::Array(vec![single.clone()]);
    assert!(conforms(&Shape::max_count(1), &single));
    assert!(!conforms(&Shape::max_count(1), &array));
    assert!(!conforms(&Shape::max_count(1), &Value::Array(Vec::new())));
    assert!(conforms(&Shape::max_count(2), &array));
    assert!(!conforms(
        &Shape::max_count(2),
        &Value::Array(vec![single.clone(), single.clone(), single])
    ));
}

#[test]
fn test_max_count_counts_bare_values_as_one() {
    let single = Value::from(Literal::from(1));
    assert!(!conforms(&Shape::max_count(0), &single));
    assert!(!conforms(&Shape::max_count(0), &Value::Array(vec![single])));
    assert!(!conforms(&Shape::max_count(0), &Value::Array(Vec::new())));
    assert!(conforms_empty(&Shape::max_count(0)));
}

#[test]
fn test_min_count() {
    let array = Value::Array(vec![Literal::from(1).into(), Literal::from(2).into()]);
    assert!(conforms(&Shape::min_count(2), &array));
    assert!(!conforms(&Shape::min_count(3), &array));
    assert!(!conforms(&Shape::min_count(1), &Value::Array(Vec::new())));
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_fields() {
    let name = step("name");
    let shape = Shape::field(name.clone(), Shape::and([Shape::required(), Shape::max_length(5)]));

    let alice = Frame::new().with(name.clone(), string("Alice"));
    assert!(conforms(&shape, &alice.into()));

    let long = Frame::new().with(name.clone(), string("Alexandra"));
    let report = validate(&shape, &long.into()).unwrap();
    assert_eq!(report.violation_count(), 1);
    assert_eq!(report.violations()[0].path(), &[name.clone()]);
    assert_eq!(report.violations()[0].shape(), &Shape::max_length(5));
    assert_eq!(report.violations()[0].values(), &[Term::from(Literal::new_simple_literal("Alexandra"))]);

    let report = validate(&shape, &string("Alice")).unwrap();
    assert_eq!(report.violation_count(), 1);
    assert!(report.violations()[0].message().contains("expected entity"));
}

#[test]
fn test_fields_are_matched_by_iri() {
    let shape = Shape::field(step("name"), Shape::required());
    let frame = Frame::new().with(step("name").with_label("nom"), string("Alice"));
    assert!(conforms(&shape, &frame.into()));
}

#[test]
fn test_unexpected_fields() {
    let shape = Shape::field(step("name"), Shape::optional());
    let frame = Frame::new()
        .with(step("name"), string("Alice"))
        .with(step("age"), Literal::from(42))
        .with(Step::direct(rdf::TYPE), iri("Person"));
    let report = validate(&shape, &frame.into()).unwrap();
    assert_eq!(report.violation_count(), 1);
    assert!(report.violations()[0].message().contains("unexpected field 'age'"));

    let nested = Shape::field(step("knows"), Shape::field(step("name"), Shape::optional()));
    let frame = Frame::new().with(
        step("knows"),
        Frame::new().with(Step::inverse(iri("name")), string("x")),
    );
    let report = validate(&nested, &frame.into()).unwrap();
    assert_eq!(report.violation_count(), 1);
    assert_eq!(report.violations()[0].path(), &[step("knows")]);
}

#[test]
fn test_disjunctions() {
    let shape = Shape::or([Shape::datatype(xsd::INTEGER), Shape::max_length(2)]);
    assert!(conforms(&shape, &Literal::from(1000).into()));
    assert!(conforms(&shape, &string("ab")));
    let report = validate(&shape, &string("abc")).unwrap();
    assert_eq!(report.violation_count(), 2);
}

#[test]
fn test_links_and_meta_validate_the_same_focus() {
    let shape = Shape::and([
        Shape::link(iri("rel"), Shape::datatype(vocab::IRI)),
        Shape::meta("hint", Literal::new_simple_literal("x")),
    ]);
    assert!(conforms(&shape, &iri("x").into()));
    assert!(!conforms(&shape, &string("x")));
}

#[test]
fn test_guards_are_rejected() {
    let shape = Shape::field(step("name"), guard::convey(Shape::required()));
    assert!(matches!(
        validate(&shape, &Frame::new().into()),
        Err(ValidationError::Guard { axis }) if axis == guard::MODE
    ));
}

// =============================================================================
// Inference
// =============================================================================

#[test]
fn test_inference_is_monotone() {
    let values = [
        string("x"),
        Literal::from(1).into(),
        Literal::from(true).into(),
        iri("x").into(),
        Value::Array(vec![iri("x").into()]),
        Frame::new().with(step("p"), iri("x")).into(),
        Frame::new().with(Step::inverse(iri("p")), iri("x")).into(),
        Literal::new_language_tagged_literal_unchecked("x", "en").into(),
    ];
    let shapes = [
        Shape::datatype(xsd::BOOLEAN),
        Shape::clazz(iri("C")),
        Shape::in_values([Literal::from(1), Literal::from(2)]),
        Shape::all([iri("x")]),
        Shape::any([iri("x")]),
        Shape::lang(["en"]),
        Shape::and([Shape::localized(), Shape::lang(["en", "fr"])]),
        Shape::field(step("p"), Shape::datatype(vocab::IRI)),
        Shape::field(Step::inverse(iri("p")), Shape::optional()),
        Shape::field(Step::direct(rdf::TYPE), Shape::optional()),
    ];
    for shape in &shapes {
        let expanded = Optimizer::optimize(Inferencer::expand(shape));
        for value in &values {
            if conforms(shape, value) {
                assert!(
                    conforms(&expanded, value),
                    "{value:?} conforms to {shape} but not to {expanded}"
                );
            }
        }
    }
}

#[test]
fn test_inferred_link_constraints_hold_on_resources() {
    let shape = Shape::link(iri("p"), Shape::optional());
    let expanded = Optimizer::optimize(Inferencer::expand(&shape));
    for value in [Value::from(iri("x")), Frame::new().with_id(iri("y")).into()] {
        assert!(conforms(&shape, &value));
        assert!(conforms(&expanded, &value));
    }
    assert!(!conforms(&expanded, &string("x")));
}

use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode};
use oxshape::{Shape, Step, guard};
use serde_json::json;
use shapeopt::Optimizer;
use shapeq::{Order, Query, QueryError, compile, compile_json};

fn step(name: &str) -> Step {
    Step::direct(NamedNode::new_unchecked(format!("http://example.com/{name}")))
}

fn head() -> Step {
    step("head")
}

fn tail() -> Step {
    step("tail")
}

fn base() -> Shape {
    Shape::field(head(), Shape::field(tail(), Shape::and([])))
}

fn filtered(base: &Shape, filter: Shape) -> Shape {
    Optimizer::optimize(Shape::and([base.clone(), guard::filter(filter)]))
}

fn string(value: &str) -> Literal {
    Literal::new_simple_literal(value)
}

fn integer(value: i64) -> Literal {
    Literal::new_typed_literal(value.to_string(), xsd::INTEGER)
}

fn items(query: &str, base: &Shape) -> (Shape, Vec<Order>, usize, usize) {
    match compile(query, base) {
        Ok(Query::Items {
            shape,
            orders,
            offset,
            limit,
        }) => (shape, orders, offset, limit),
        Ok(query) => panic!("{query} is not an items query"),
        Err(e) => panic!("failed to compile {query}: {e}"),
    }
}

fn items_shape(query: &str, base: &Shape) -> Shape {
    items(query, base).0
}

// =============================================================================
// Syntax
// =============================================================================

#[test]
fn test_empty_query() {
    assert_eq!(compile("", &base()).ok(), Some(Query::items(base())));
}

#[test]
fn test_empty_object() {
    assert_eq!(compile("{}", &base()).ok(), Some(Query::items(base())));
    assert_eq!(compile("%7B%7D", &base()).ok(), Some(Query::items(base())));
    assert_eq!(
        compile(r#"{"_offset":0,"_limit":0,"_order":[]}"#, &base()).ok(),
        Some(Query::items(base()))
    );
}

#[test]
fn test_pagination() {
    let (shape, orders, offset, limit) = items(r#"{"_offset":1,"_limit":2}"#, &base());
    assert_eq!(shape, filtered(&base(), Shape::and([])));
    assert!(orders.is_empty());
    assert_eq!((offset, limit), (1, 2));
}

#[test]
fn test_url_encoded_json() {
    assert_eq!(
        compile("%7B%22_offset%22%3A1%7D", &base()).ok(),
        compile(r#"{"_offset":1}"#, &base()).ok()
    );
}

#[test]
fn test_form_values_are_grouped() {
    assert_eq!(
        items_shape("head=x&head.tail=y&head.tail=w+z", &base()),
        filtered(
            &base(),
            Shape::field(
                head(),
                Shape::and([
                    Shape::any([string("x")]),
                    Shape::field(tail(), Shape::any([string("y"), string("w z")])),
                ])
            )
        )
    );
}

#[test]
fn test_form_values_keep_commas() {
    assert_eq!(
        items_shape("head=x,y", &base()),
        filtered(&base(), Shape::field(head(), Shape::any([string("x,y")])))
    );
    assert_eq!(
        items_shape("head=x,y&head=z", &base()),
        filtered(
            &base(),
            Shape::field(head(), Shape::any([string("x,y"), string("z")]))
        )
    );
}

#[test]
fn test_end_to_end() {
    let (shape, orders, offset, limit) = items(
        "head=x&head.tail=y&_order=-head.tail&_offset=1&_limit=2",
        &base(),
    );
    assert_eq!(
        shape,
        filtered(
            &base(),
            Shape::field(
                head(),
                Shape::and([
                    Shape::any([string("x")]),
                    Shape::field(tail(), Shape::any([string("y")])),
                ])
            )
        )
    );
    assert_eq!(orders, [Order::decreasing([head(), tail()])]);
    assert_eq!((offset, limit), (1, 2));
}

#[test]
fn test_malformed_queries() {
    for query in [
        "{",
        "%7B%7D%7D",
        r#"{"_offset":"x"}"#,
        r#"{"_order":1}"#,
        r#"{"_terms":1}"#,
        "_limit=x",
        r#"{"_terms":"head","_stats":"head"}"#,
        "_terms=head&_stats=head.tail",
    ] {
        assert!(
            matches!(
                compile(query, &base()),
                Err(QueryError::Malformed { .. } | QueryError::Json(_))
            ),
            "{query} accepted"
        );
    }
}

#[test]
fn test_negative_pagination_is_illegal() {
    for query in [r#"{"_offset":-1}"#, r#"{"_limit":-1}"#, "_offset=-1"] {
        assert!(
            matches!(compile(query, &base()), Err(QueryError::Illegal { .. })),
            "{query} accepted"
        );
    }
}

// =============================================================================
// Paths
// =============================================================================

#[test]
fn test_paths() {
    for (path, expected) in [
        ("", Vec::new()),
        ("head", vec![head()]),
        ("head.tail", vec![head(), tail()]),
        (" head . tail ", vec![head(), tail()]),
        ("<http://example.com/head>.tail", vec![head(), tail()]),
    ] {
        assert_eq!(
            compile_json(&json!({ "_stats": path }), &base()).ok(),
            Some(Query::Stats {
                shape: filtered(&base(), Shape::and([])),
                path: expected.clone()
            })
        );
        assert_eq!(
            compile_json(&json!({ "_terms": path }), &base()).ok(),
            Some(Query::Terms {
                shape: filtered(&base(), Shape::and([])),
                path: expected
            })
        );
    }
}

#[test]
fn test_inverse_paths() {
    let base = Shape::field(Step::inverse(head().iri().into_owned()), Shape::and([]));
    assert!(compile(r#"{"_terms":"^head"}"#, &base).is_ok());
    assert!(matches!(
        compile(r#"{"_terms":"head"}"#, &base),
        Err(QueryError::UnknownPath { .. })
    ));
}

#[test]
fn test_unknown_paths_are_rejected() {
    for query in [
        r#"{"_terms":"nil"}"#,
        r#"{"_stats":"nil"}"#,
        r#"{"_order":"nil"}"#,
        r#"{">= nil":1}"#,
        r#"{"head.nil":1}"#,
        r#"{"<http://example.com/nil>":1}"#,
    ] {
        assert!(
            matches!(compile(query, &base()), Err(QueryError::UnknownPath { .. })),
            "{query} accepted"
        );
    }
    assert!(matches!(
        compile(r#"{"_terms":"head"}"#, &Shape::and([])),
        Err(QueryError::UnknownPath { step }) if step == "head"
    ));
}

#[test]
fn test_malformed_paths() {
    for query in [
        r#"{"_order":"---"}"#,
        r#"{"_order":"+-head"}"#,
        r#"{"_order":["head","--head"]}"#,
        r#"{"_terms":"head..tail"}"#,
        r#"{"_stats":"head."}"#,
        r#"{"head..tail":1}"#,
    ] {
        assert!(
            matches!(compile(query, &base()), Err(QueryError::Malformed { .. })),
            "{query} accepted"
        );
    }
}

#[test]
fn test_sorting_criteria() {
    for (order, expected) in [
        (json!(""), vec![Order::increasing(Vec::<Step>::new())]),
        (json!("+"), vec![Order::increasing(Vec::<Step>::new())]),
        (json!("-"), vec![Order::decreasing(Vec::<Step>::new())]),
        (json!("head.tail"), vec![Order::increasing([head(), tail()])]),
        (json!("+head.tail"), vec![Order::increasing([head(), tail()])]),
        (json!("-head.tail"), vec![Order::decreasing([head(), tail()])]),
        (json!([]), Vec::new()),
        (
            json!(["+head", "-head.tail"]),
            vec![
                Order::increasing([head()]),
                Order::decreasing([head(), tail()]),
            ],
        ),
    ] {
        match compile_json(&json!({ "_order": order }), &base()) {
            Ok(Query::Items { orders, .. }) => assert_eq!(orders, expected),
            other => panic!("unexpected result {other:?}"),
        }
    }
}

// =============================================================================
// Filters
// =============================================================================

#[test]
fn test_root_filters() {
    let base = base();
    let class = NamedNode::new_unchecked("http://example.com/Class");
    for (query, expected) in [
        (json!({"@": "http://example.com/Class"}), Shape::clazz(class)),
        (json!({"^": "integer"}), Shape::datatype(xsd::INTEGER)),
        (json!({">": 1}), Shape::min_exclusive(integer(1))),
        (json!({"<": 1}), Shape::max_exclusive(integer(1))),
        (json!({">=": 1}), Shape::min_inclusive(integer(1))),
        (json!({"<=": 1}), Shape::max_inclusive(integer(1))),
        (json!({"$>": 123}), Shape::min_length(123)),
        (json!({"$<": 123}), Shape::max_length(123)),
        (json!({"*": "pattern"}), Shape::pattern("pattern")),
        (json!({"~": "words"}), Shape::like("words")),
        (json!({"#>": 1}), Shape::min_count(1)),
        (json!({"#<": 1}), Shape::max_count(1)),
        (json!({"%": []}), Shape::in_values(Vec::<Literal>::new())),
        (json!({"%": "head"}), Shape::in_values([string("head")])),
        (json!({"%": ["head", "tail"]}), Shape::in_values([string("head"), string("tail")])),
        (json!({"!": "head"}), Shape::all([string("head")])),
        (json!({"!": ["head", "tail"]}), Shape::all([string("head"), string("tail")])),
        (json!({"?": []}), Shape::any(Vec::<Literal>::new())),
        (json!({"?": ["head", "tail"]}), Shape::any([string("head"), string("tail")])),
        (json!({"?": true}), Shape::any([Literal::from(true)])),
        (
            json!({"?": 1.5}),
            Shape::any([Literal::new_typed_literal("1.5", xsd::DECIMAL)]),
        ),
    ] {
        match compile_json(&query, &base) {
            Ok(compiled) => assert_eq!(
                compiled.shape(),
                &filtered(&base, expected),
                "unexpected compilation of {query}"
            ),
            Err(e) => panic!("failed to compile {query}: {e}"),
        }
    }
    assert_eq!(
        compile_json(&json!({"*": ""}), &base).ok(),
        Some(Query::items(base.clone()))
    );
}

#[test]
fn test_path_filters() {
    assert_eq!(
        compile(r#"{">= head.tail":1}"#, &base()).ok().map(|q| q.shape().clone()),
        Some(filtered(
            &base(),
            Shape::field(head(), Shape::field(tail(), Shape::min_inclusive(integer(1))))
        ))
    );
    assert_eq!(
        compile(r#"{"head.tail":[1,10]}"#, &base()).ok().map(|q| q.shape().clone()),
        Some(filtered(
            &base(),
            Shape::field(head(), Shape::field(tail(), Shape::any([integer(1), integer(10)])))
        ))
    );
}

#[test]
fn test_iri_filter_keys() {
    let expected = filtered(&base(), Shape::field(head(), Shape::any([string("x")])));
    assert_eq!(
        items_shape(r#"{"<http://example.com/head>":"x"}"#, &base()),
        expected
    );
    assert_eq!(
        items_shape(r#"{"?<http://example.com/head>":"x"}"#, &base()),
        expected
    );
    assert_eq!(
        items_shape(r#"{"<http://example.com/head>.tail":"x"}"#, &base()),
        filtered(
            &base(),
            Shape::field(head(), Shape::field(tail(), Shape::any([string("x")])))
        )
    );
    assert_eq!(
        items_shape(r#"{"<<http://example.com/head>":1}"#, &base()),
        filtered(&base(), Shape::field(head(), Shape::max_exclusive(integer(1))))
    );
    assert!(matches!(
        compile(r#"{"<http://example.com/nil>":"x"}"#, &base()),
        Err(QueryError::UnknownPath { step }) if step == "<http://example.com/nil>"
    ));
}

#[test]
fn test_inverse_filter_keys() {
    let inverse = Step::inverse(head().iri().into_owned());
    let base = Shape::field(inverse.clone(), Shape::and([]));
    assert_eq!(
        items_shape(r#"{"^head":"x"}"#, &base),
        filtered(&base, Shape::field(inverse.clone(), Shape::any([string("x")])))
    );
    assert_eq!(
        items_shape(r#"{"^^head":"integer"}"#, &base),
        filtered(&base, Shape::field(inverse.clone(), Shape::datatype(xsd::INTEGER)))
    );

    // a direct field with the same local name doesn't capture the inverse key
    let base = Shape::and([
        Shape::field(head(), Shape::and([])),
        Shape::field(inverse.clone(), Shape::and([])),
    ]);
    assert_eq!(
        items_shape(r#"{"^head":"x"}"#, &base),
        filtered(&base, Shape::field(inverse, Shape::any([string("x")])))
    );
    assert_eq!(
        items_shape(r#"{"head":"x"}"#, &base),
        filtered(&base, Shape::field(head(), Shape::any([string("x")])))
    );
}

#[test]
fn test_values_follow_declared_datatypes() {
    let value = step("value");
    let base = Shape::field(value.clone(), Shape::datatype(xsd::INT));
    assert_eq!(
        items_shape(r#"{"value":"4"}"#, &base),
        filtered(
            &base,
            Shape::field(value.clone(), Shape::any([Literal::new_typed_literal("4", xsd::INT)]))
        )
    );

    let base = Shape::field(
        value.clone(),
        Shape::clazz(NamedNode::new_unchecked("http://example.com/Class")),
    );
    assert_eq!(
        items_shape("value=http://example.com/x", &base),
        filtered(
            &base,
            Shape::field(value, Shape::any([NamedNode::new_unchecked("http://example.com/x")]))
        )
    );
    assert!(matches!(
        compile("value=x", &base),
        Err(QueryError::Malformed { .. })
    ));
}

#[test]
fn test_null_filters_are_ignored() {
    for query in [r#"{">":null}"#, r#"{"head":null}"#, r#"{"head":null,"_order":null}"#] {
        assert_eq!(
            compile(query, &base()).ok(),
            Some(Query::items(base())),
            "unexpected compilation of {query}"
        );
    }
    assert_eq!(
        items_shape(r#"{"head":null,"_limit":1}"#, &base()),
        filtered(&base(), Shape::and([]))
    );
}

#[test]
fn test_invalid_filter_values() {
    for query in [
        r#"{"$>":"x"}"#,
        r#"{"@":1}"#,
        r#"{"*":1}"#,
        r#"{"?":{}}"#,
        r#"{"@":"not an iri"}"#,
    ] {
        assert!(
            matches!(compile(query, &base()), Err(QueryError::Malformed { .. })),
            "{query} accepted"
        );
    }
    assert!(matches!(
        compile(r##"{"#>":-1}"##, &base()),
        Err(QueryError::Illegal { .. })
    ));
}

//! Tests for selector parsing, serialization and parse errors.

use serde_json::json;
use thicket_select::{
    AnB, AttributeOperator, AttributeTest, Combinator, Engine, EngineConfig, NamespaceConstraint,
    PseudoArgument, PseudoClass, PseudoClassName, PseudoElement, SelectError, Selector,
    SimpleSelectorSequence, TypeSelector, parse,
};

fn single_group(selector: &str) -> Vec<(Combinator, SimpleSelectorSequence)> {
    let mut parsed = parse(selector).unwrap();
    assert_eq!(parsed.groups.len(), 1, "{selector}");
    parsed.groups.remove(0).steps
}

// ========== structure ==========

#[test]
fn test_parse_complex_selector() {
    let steps = single_group("div.a > p#x[title~=foo]:first-child::after");
    assert_eq!(steps.len(), 2);

    let (combinator, div) = &steps[0];
    assert_eq!(*combinator, Combinator::Descendant);
    assert_eq!(
        div.type_selector,
        Some(TypeSelector {
            namespace: None,
            name: Some("div".to_string())
        })
    );
    assert_eq!(div.classes, vec!["a".to_string()]);

    let (combinator, p) = &steps[1];
    assert_eq!(*combinator, Combinator::Child);
    assert_eq!(p.id.as_deref(), Some("x"));
    assert_eq!(
        p.attributes,
        vec![AttributeTest {
            name: "title".to_string(),
            namespace: None,
            value: Some("foo".to_string()),
            operator: AttributeOperator::ContainsWithSpace,
        }]
    );
    assert_eq!(
        p.pseudo_classes,
        vec![PseudoClass {
            name: PseudoClassName::FirstChild,
            argument: PseudoArgument::None,
        }]
    );
    assert_eq!(p.pseudo_elements, vec![PseudoElement::After]);
}

#[test]
fn test_parse_selector_list_keeps_order() {
    let selector = parse("h1, .b,#c").unwrap();
    let firsts: Vec<String> = selector.groups.iter().map(|g| g.to_string()).collect();
    assert_eq!(firsts, vec!["h1", ".b", "#c"]);
}

#[test]
fn test_parse_relative_selector() {
    let steps = single_group("> li + li");
    assert_eq!(steps[0].0, Combinator::Child);
    assert_eq!(steps[1].0, Combinator::AdjacentSibling);
    assert_eq!(single_group("~ p")[0].0, Combinator::GeneralSibling);
}

#[test]
fn test_parse_namespaced_type_selectors() {
    let type_of = |s: &str| single_group(s)[0].1.type_selector.clone().unwrap();

    assert_eq!(
        type_of("svg|rect"),
        TypeSelector {
            namespace: Some(NamespaceConstraint::Prefix("svg".to_string())),
            name: Some("rect".to_string()),
        }
    );
    assert_eq!(
        type_of("*|*"),
        TypeSelector {
            namespace: Some(NamespaceConstraint::Any),
            name: None,
        }
    );
    assert_eq!(
        type_of("|p"),
        TypeSelector {
            namespace: Some(NamespaceConstraint::NoNamespace),
            name: Some("p".to_string()),
        }
    );
    assert_eq!(
        type_of("*"),
        TypeSelector {
            namespace: None,
            name: None,
        }
    );
}

#[test]
fn test_parse_namespaced_attributes() {
    let attribute = |s: &str| single_group(s)[0].1.attributes[0].clone();

    let xlink = attribute("[xlink|href^='#']");
    assert_eq!(
        xlink.namespace,
        Some(NamespaceConstraint::Prefix("xlink".to_string()))
    );
    assert_eq!(xlink.name, "href");
    assert_eq!(xlink.operator, AttributeOperator::BeginsWith);
    assert_eq!(xlink.value.as_deref(), Some("#"));

    assert_eq!(attribute("[*|lang]").namespace, Some(NamespaceConstraint::Any));
    assert_eq!(
        attribute("[|lang]").namespace,
        Some(NamespaceConstraint::NoNamespace)
    );

    // `|=` right after a name is the hyphen operator, not a namespace.
    let hyphen = attribute("[lang|=en]");
    assert_eq!(hyphen.namespace, None);
    assert_eq!(hyphen.operator, AttributeOperator::ContainsWithHyphen);
}

#[test]
fn test_presence_only_attribute() {
    let test = single_group("[disabled]")[0].1.attributes[0].clone();
    assert_eq!(test.value, None);
    assert_eq!(test.operator, AttributeOperator::Exactly);
}

// ========== pseudo-class arguments ==========

fn pseudo(selector: &str) -> PseudoClass {
    single_group(selector)[0].1.pseudo_classes[0].clone()
}

#[test]
fn test_pseudo_class_argument_kinds() {
    assert_eq!(
        pseudo(":nth-child( 2n + 1 )").argument,
        PseudoArgument::Nth(AnB::new(2, 1))
    );
    assert_eq!(pseudo(":eq(3)").argument, PseudoArgument::Nth(AnB::new(0, 3)));
    assert_eq!(pseudo(":lt( 4 )").argument, PseudoArgument::Index(4));
    assert_eq!(
        pseudo(":lang( en )").argument,
        PseudoArgument::Text("en".to_string())
    );
    assert_eq!(
        pseudo(":contains('a, b')").argument,
        PseudoArgument::Text("'a, b'".to_string())
    );
    assert_eq!(pseudo(":dir(rtl)").argument, PseudoArgument::None);
    assert_eq!(pseudo(":dir").argument, PseudoArgument::None);

    let PseudoArgument::Selector(nested) = pseudo(":has(> img.icon, p)").argument else {
        panic!("expected a selector argument");
    };
    assert_eq!(nested.groups.len(), 2);
    assert_eq!(nested.groups[0].steps[0].0, Combinator::Child);
}

#[test]
fn test_malformed_an_b_is_not_an_error() {
    assert_eq!(
        pseudo(":nth-child(garbage!)").argument,
        PseudoArgument::Nth(AnB::new(0, 0))
    );
}

#[test]
fn test_pseudo_class_names_are_case_insensitive() {
    assert_eq!(pseudo(":First-Child").name, PseudoClassName::FirstChild);
    assert_eq!(pseudo(":NTH-LAST-OF-TYPE(2)").name, PseudoClassName::NthLastOfType);
    assert_eq!(
        single_group("p::BEFORE")[0].1.pseudo_elements,
        vec![PseudoElement::Before]
    );
}

#[test]
fn test_duplicate_identical_id_is_allowed() {
    assert_eq!(single_group("#a#a")[0].1.id.as_deref(), Some("a"));
}

// ========== errors ==========

#[test]
fn test_unknown_pseudo_class() {
    assert_eq!(
        parse("a:bogus"),
        Err(SelectError::UnknownPseudoClass("bogus".to_string()))
    );
    assert_eq!(
        parse("a:not(:bogus)"),
        Err(SelectError::UnknownPseudoClass("bogus".to_string()))
    );
}

#[test]
fn test_unknown_pseudo_element() {
    assert_eq!(
        parse("p::marker"),
        Err(SelectError::UnknownPseudoElement("marker".to_string()))
    );
}

#[test]
fn test_missing_values() {
    assert_eq!(
        parse(":lang()"),
        Err(SelectError::MissingValue("lang".to_string()))
    );
    assert_eq!(
        parse(":lang"),
        Err(SelectError::MissingValue("lang".to_string()))
    );
    assert_eq!(
        parse(":nth-child"),
        Err(SelectError::MissingValue("nth-child".to_string()))
    );
    assert_eq!(
        parse(":not"),
        Err(SelectError::MissingValue("not".to_string()))
    );
}

#[test]
fn test_empty_selector_argument_is_syntax_error() {
    for input in [":not()", ":has( )", "p:matches()"] {
        assert!(
            matches!(parse(input), Err(SelectError::Syntax { .. })),
            "{input}"
        );
    }
}

#[test]
fn test_grammar_errors() {
    let cases = [
        "",
        "a >",
        "a > > b",
        "a,,b",
        ",a",
        "a,",
        "#a#b",
        "[a=]",
        "[=a]",
        "[a b]",
        "[a=b c]",
        "a|",
        ":first-child(1)",
        ":lt(x)",
        "::before(x)",
    ];
    for input in cases {
        assert!(
            matches!(parse(input), Err(SelectError::Syntax { .. })),
            "expected a syntax error for {input:?}, got {:?}",
            parse(input)
        );
    }
}

#[test]
fn test_syntax_error_reports_position_and_selector() {
    let Err(SelectError::Syntax {
        selector, position, ..
    }) = parse("ul > > li")
    else {
        panic!("expected a syntax error");
    };
    assert_eq!(selector, "ul > > li");
    assert_eq!(position, 5);
}

#[test]
fn test_nesting_limit() {
    let engine = Engine::with_config(EngineConfig::default().with_max_nesting_depth(2));
    assert!(engine.parse(":not(:has(a))").is_ok());
    assert_eq!(
        engine.parse(":not(:has(:is(a)))"),
        Err(SelectError::NestingTooDeep { limit: 2 })
    );

    let deep = (0..40).fold("a".to_string(), |inner, _| format!(":not({inner})"));
    assert_eq!(parse(&deep), Err(SelectError::NestingTooDeep { limit: 32 }));
}

// ========== serialization ==========

#[test]
fn test_display_is_canonical() {
    let cases = [
        ("div.a>p#x[title~=foo]:FIRST-child::after", "div.a > p#x[title~=\"foo\"]:first-child::after"),
        ("li:nth-child( 2n + 1 )", "li:nth-child(2n+1)"),
        ("li:nth-child(odd)", "li:nth-child(2n+1)"),
        ("li:nth-child(-n+3)", "li:nth-child(-n+3)"),
        ("a  b", "a b"),
        (">li", "> li"),
        ("svg|rect,*|*,|p", "svg|rect, *|*, |p"),
        ("[ lang |= en ]", "[lang|=\"en\"]"),
        (":has(>img)", ":has(> img)"),
    ];
    for (input, expected) in cases {
        assert_eq!(parse(input).unwrap().to_string(), expected, "input: {input}");
    }
}

#[test]
fn test_display_round_trips() {
    let corpus = [
        "html > body div.container p:first-child",
        "ul li:nth-last-of-type(-n+2), ol > li:lt(3)",
        r"#\31 st",
        r".a\.b",
        r#"[data-x='a"b']"#,
        r#"p:contains("x, y")"#,
        ":has(> img), :not(.a .b)",
        "+ p ~ span",
        "p:lang(en)",
        "[xlink|href^='#'][*|lang][|id]",
        "a:not(:has(:matches(b, c)))",
        "input:checkbox:checked",
        "p::first-line",
        "h1 + p, h2 ~ p",
    ];
    for input in corpus {
        let parsed = parse(input).unwrap();
        let text = parsed.to_string();
        let reparsed: Selector = text.parse().unwrap();
        assert_eq!(reparsed, parsed, "{input} -> {text}");
    }
}

#[test]
fn test_serialized_shape() {
    let value = serde_json::to_value(parse("li.done:nth-child(2n+1)").unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "groups": [{
                "steps": [[
                    "Descendant",
                    {
                        "type_selector": { "namespace": null, "name": "li" },
                        "id": null,
                        "classes": ["done"],
                        "attributes": [],
                        "pseudo_classes": [{
                            "name": "nth-child",
                            "argument": { "Nth": { "a": 2, "b": 1 } }
                        }],
                        "pseudo_elements": []
                    }
                ]]
            }]
        })
    );
}

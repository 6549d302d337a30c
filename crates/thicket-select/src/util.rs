//! Attribute and value matching primitives shared by the traverser and the
//! pseudo-class evaluator.

use thicket_dom::{DomTree, NodeId};

use crate::selector::{AnB, AttributeOperator};

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// False if `name` is absent on `node`; true if present and no `value` is
/// required; otherwise compares the value with `operator`.
#[must_use]
pub fn matches_attribute(
    tree: &DomTree,
    node: NodeId,
    name: &str,
    value: Option<&str>,
    operator: AttributeOperator,
) -> bool {
    let Some(actual) = tree.as_element(node).and_then(|e| e.attr(name)) else {
        return false;
    };
    value.is_none_or(|needle| matches_attribute_value(needle, actual, operator))
}

/// Namespaced variant of [`matches_attribute`]: the attribute is looked up
/// as `local_name` in the namespace `namespace_uri`.
#[must_use]
pub fn matches_attribute_ns(
    tree: &DomTree,
    node: NodeId,
    local_name: &str,
    namespace_uri: &str,
    value: Option<&str>,
    operator: AttributeOperator,
) -> bool {
    let Some(actual) = tree.attribute_ns(node, namespace_uri, local_name) else {
        return false;
    };
    value.is_none_or(|needle| matches_attribute_value(needle, actual, operator))
}

/// Compare an attribute value (`haystack`) against a selector value (`needle`).
///
/// Comparison is case-sensitive. A haystack shorter than the needle never
/// matches.
#[must_use]
pub fn matches_attribute_value(needle: &str, haystack: &str, operator: AttributeOperator) -> bool {
    if haystack.len() < needle.len() {
        return false;
    }
    match operator {
        AttributeOperator::Exactly => needle == haystack,
        AttributeOperator::ContainsWithSpace => {
            haystack.split_ascii_whitespace().any(|word| word == needle)
        }
        AttributeOperator::ContainsWithHyphen => haystack.split('-').any(|part| part == needle),
        AttributeOperator::ContainsSubstring => haystack.contains(needle),
        AttributeOperator::BeginsWith => haystack.starts_with(needle),
        AttributeOperator::EndsWith => haystack.ends_with(needle),
    }
}

/// Strip one pair of matching `'` or `"` quotes surrounding `value`.
///
/// `"abc"` → `abc`, `'abc'` → `abc`; `"abc'` and `abc` are returned unchanged.
#[must_use]
pub fn remove_quotes(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// [§ 6.1 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// Parse `even`, `odd`, `n`, a bare integer, or `[+-]?\d*n\s*[+-]?\s*\d*`.
/// Anything else yields `AnB { a: 0, b: 0 }`, which never matches: an invalid
/// rule selects nothing rather than failing the query.
#[must_use]
pub fn parse_an_b(rule: &str) -> AnB {
    let rule = rule.trim().to_ascii_lowercase();
    match rule.as_str() {
        "even" => return AnB::new(2, 0),
        "odd" => return AnB::new(2, 1),
        "n" => return AnB::new(1, 0),
        _ => {}
    }
    if let Ok(b) = rule.parse::<i64>() {
        return AnB::new(0, b);
    }
    parse_an_plus_b(&rule).unwrap_or_default()
}

fn parse_an_plus_b(rule: &str) -> Option<AnB> {
    let (a_part, rest) = rule.split_once('n')?;

    // STEP 1: the coefficient. A missing or sign-only coefficient is 1.
    let a = match a_part {
        "" | "+" => 1,
        "-" => -1,
        digits => {
            let unsigned = digits.strip_prefix(['+', '-']).unwrap_or(digits);
            if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<i64>().ok()?
        }
    };

    // STEP 2: the offset, with optional whitespace around its sign.
    let rest = rest.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, rest[1..].trim_start()),
        Some(b'+') => (false, rest[1..].trim_start()),
        _ => (false, rest),
    };
    if !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let b = if rest.is_empty() {
        0
    } else {
        rest.parse::<i64>().ok()?
    };

    Some(AnB::new(a, if negative { -b } else { b }))
}

/// [RFC 3986 § 3.1](https://www.rfc-editor.org/rfc/rfc3986#section-3.1)
///
/// The scheme of `url`, if it has one: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
/// followed by `:`.
#[must_use]
pub fn url_scheme(url: &str) -> Option<&str> {
    let (scheme, _) = url.trim().split_once(':')?;
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (starts_alpha && rest_valid).then_some(scheme)
}

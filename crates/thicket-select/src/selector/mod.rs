//! The parsed selector structure.
//!
//! Selectors are immutable once parsed and hold no references into any
//! document. `Display` writes selector text that parses back to an equal value.

use core::fmt;

use serde::Serialize;

use crate::pseudo::{PseudoClass, PseudoElement};

/// [§ 4.1 Selector lists](https://www.w3.org/TR/selectors-4/#grouping)
///
/// A comma-separated list of alternatives. A node matches the selector if it
/// matches any group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    /// The alternatives, in source order.
    pub groups: Vec<SelectorGroup>,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// A chain of compound selectors read left to right, each linked to the one
/// before it by a combinator.
///
/// Example: `div.container > ul.nav li` is
/// ```text
/// [(Descendant, div.container), (Child, ul.nav), (Descendant, li)]
/// ```
/// The first combinator links the chain to the scope: it is `Descendant`
/// unless the group starts with an explicit `>`, `+` or `~`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorGroup {
    /// The (combinator, compound) steps, leftmost first.
    pub steps: Vec<(Combinator, SimpleSelectorSequence)>,
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Combinator {
    /// Whitespace: "an element B that is an arbitrary descendant of some ancestor element A."
    Descendant,
    /// `>`: "an element B that is a direct child of element A."
    Child,
    /// `+`: "an element B that immediately follows element A."
    AdjacentSibling,
    /// `~`: "an element B that follows element A (not necessarily immediately)."
    GeneralSibling,
}

impl Combinator {
    /// The combinator's source symbol; whitespace for `Descendant`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => " ",
            Self::Child => ">",
            Self::AdjacentSibling => "+",
            Self::GeneralSibling => "~",
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimpleSelectorSequence {
    /// `ns|tag`, `tag`, `*`; `None` when the compound has no type selector.
    pub type_selector: Option<TypeSelector>,
    /// `#id`
    pub id: Option<String>,
    /// `.class`, in source order.
    pub classes: Vec<String>,
    /// `[attr op value]`
    pub attributes: Vec<AttributeTest>,
    /// `:name` / `:name(value)`
    pub pseudo_classes: Vec<PseudoClass>,
    /// `::name`
    pub pseudo_elements: Vec<PseudoElement>,
}

impl SimpleSelectorSequence {
    /// True when no constraint at all was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
            && self.pseudo_elements.is_empty()
    }
}

/// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
/// [§ 5.3 Namespaces in elemental selectors](https://www.w3.org/TR/selectors-4/#type-nmsp)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSelector {
    /// `None` when no `|` was written, which matches any namespace.
    pub namespace: Option<NamespaceConstraint>,
    /// The local name; `None` for `*`.
    pub name: Option<String>,
}

/// The part before `|` in `ns|name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NamespaceConstraint {
    /// `*|name`: any namespace, including none.
    Any,
    /// `|name`: no namespace.
    NoNamespace,
    /// `prefix|name`: the namespace the prefix resolves to.
    Prefix(String),
}

/// [§ 6.4 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeTest {
    /// The attribute's local name.
    pub name: String,
    /// `None` when no `|` was written.
    pub namespace: Option<NamespaceConstraint>,
    /// Required value; `None` means presence is enough.
    pub value: Option<String>,
    /// How `value` is compared. `Exactly` when there is no value.
    pub operator: AttributeOperator,
}

/// The comparison an attribute test performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeOperator {
    /// `[a=v]`
    Exactly,
    /// `[a~=v]`: one of the whitespace-separated words is `v`.
    ContainsWithSpace,
    /// `[a|=v]`: one of the `-`-separated parts is `v`.
    ContainsWithHyphen,
    /// `[a*=v]`
    ContainsSubstring,
    /// `[a^=v]`
    BeginsWith,
    /// `[a$=v]`
    EndsWith,
}

impl AttributeOperator {
    /// The operator's source symbol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exactly => "=",
            Self::ContainsWithSpace => "~=",
            Self::ContainsWithHyphen => "|=",
            Self::ContainsSubstring => "*=",
            Self::BeginsWith => "^=",
            Self::EndsWith => "$=",
        }
    }
}

/// An `An+B` rule: every `a`th element starting from the `b`th.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AnB {
    /// Group size.
    pub a: i64,
    /// Element within the group.
    pub b: i64,
}

impl AnB {
    /// An `An+B` rule from its two coefficients.
    #[must_use]
    pub const fn new(a: i64, b: i64) -> Self {
        Self { a, b }
    }
}

impl fmt::Display for AnB {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, b) => {
                match a {
                    1 => f.write_str("n")?,
                    -1 => f.write_str("-n")?,
                    a => write!(f, "{a}n")?,
                }
                match b {
                    0 => Ok(()),
                    b if b > 0 => write!(f, "+{b}"),
                    b => write!(f, "{b}"),
                }
            }
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{group}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (combinator, sequence)) in self.steps.iter().enumerate() {
            match (i, combinator) {
                (0, Combinator::Descendant) => {}
                (0, explicit) => write!(f, "{} ", explicit.as_str())?,
                (_, Combinator::Descendant) => f.write_str(" ")?,
                (_, explicit) => write!(f, " {} ", explicit.as_str())?,
            }
            write!(f, "{sequence}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SimpleSelectorSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(type_selector) = &self.type_selector {
            write_namespace(f, type_selector.namespace.as_ref())?;
            match &type_selector.name {
                Some(name) => write_ident(f, name)?,
                None => f.write_str("*")?,
            }
        }
        if let Some(id) = &self.id {
            f.write_str("#")?;
            write_name(f, id)?;
        }
        for class in &self.classes {
            f.write_str(".")?;
            write_ident(f, class)?;
        }
        for attribute in &self.attributes {
            write!(f, "{attribute}")?;
        }
        for pseudo_class in &self.pseudo_classes {
            write!(f, "{pseudo_class}")?;
        }
        for pseudo_element in &self.pseudo_elements {
            write!(f, "::{pseudo_element}")?;
        }
        Ok(())
    }
}

impl fmt::Display for AttributeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_namespace(f, self.namespace.as_ref())?;
        write_ident(f, &self.name)?;
        if let Some(value) = &self.value {
            write!(f, "{}", self.operator.as_str())?;
            write_string(f, value)?;
        }
        f.write_str("]")
    }
}

fn write_namespace(f: &mut fmt::Formatter<'_>, namespace: Option<&NamespaceConstraint>) -> fmt::Result {
    match namespace {
        None => Ok(()),
        Some(NamespaceConstraint::Any) => f.write_str("*|"),
        Some(NamespaceConstraint::NoNamespace) => f.write_str("|"),
        Some(NamespaceConstraint::Prefix(prefix)) => {
            write_ident(f, prefix)?;
            f.write_str("|")
        }
    }
}

/// [§ 2.1 Serializing an identifier](https://drafts.csswg.org/cssom/#serialize-an-identifier)
///
/// Escapes a leading digit (or a digit after a leading `-`) as a code point.
pub(crate) fn write_ident(f: &mut fmt::Formatter<'_>, ident: &str) -> fmt::Result {
    for (i, c) in ident.chars().enumerate() {
        let leading_digit = c.is_ascii_digit() && (i == 0 || (i == 1 && ident.starts_with('-')));
        if leading_digit {
            write!(f, "\\{:x} ", u32::from(c))?;
        } else {
            write_name_char(f, c)?;
        }
    }
    Ok(())
}

/// Like [`write_ident`] but digits may lead, as in `#1st`.
fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    name.chars().try_for_each(|c| write_name_char(f, c))
}

fn write_name_char(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
        write!(f, "{c}")
    } else if c.is_ascii_control() {
        write!(f, "\\{:x} ", u32::from(c))
    } else {
        write!(f, "\\{c}")
    }
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in value.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"")
}

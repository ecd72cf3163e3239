//! Condition codec
//!
//! Maps the content of an IDS `value` element (a `simpleValue`, or an
//! `xs:restriction` holding enumerations or a pattern) onto a
//! `(Condition, ValueExpr)` pair and back. Both directions work on
//! [`ValueElement`], which the decoder fills from XML and the encoder
//! writes out, so the mapping itself never touches XML text.
//!
//! Pattern shapes, with `L` the literal written as-is:
//!
//! | condition    | pattern   |
//! |--------------|-----------|
//! | `StartsWith` | `L.*`     |
//! | `Contains`   | `.*L.*`   |
//! | `EndsWith`   | `.*L$`    |
//!
//! Patterns are classified by shape only. A pattern of any other shape
//! decodes to `(Equals, "")`.

use crate::model::{Cardinality, Condition, ValueExpr};

const WILDCARD: &str = ".*";
const END_ANCHOR: char = '$';

/// Display labels older editor builds stored in place of the attribute value
const LEGACY_CARDINALITY_LABELS: [(&str, Cardinality); 3] = [
    ("Обязательно", Cardinality::Required),
    ("Опционально", Cardinality::Optional),
    ("Запрещено", Cardinality::Prohibited),
];

/// Shape of a `value` element as found in XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueElement {
    /// No `value` element, or one with no recognized content
    Absent,
    /// `<simpleValue>text</simpleValue>`
    Simple(String),
    /// `<xs:restriction>` with `xs:enumeration` entries, in order
    Enumeration(Vec<String>),
    /// `<xs:restriction>` with an `xs:pattern`
    Pattern(String),
}

/// Decode a `value` element into a condition and its value
pub fn decode(element: ValueElement) -> (Condition, ValueExpr) {
    match element {
        ValueElement::Simple(text) => (Condition::Equals, ValueExpr::Literal(text)),
        ValueElement::Enumeration(items) => (Condition::OneOf, ValueExpr::Enumeration(items)),
        ValueElement::Pattern(pattern) => match classify_pattern(&pattern) {
            Some((condition, literal)) => (condition, ValueExpr::Literal(literal)),
            None => {
                tracing::debug!(%pattern, "unrecognized pattern shape, falling back to equals");
                (Condition::Equals, ValueExpr::default())
            }
        },
        ValueElement::Absent => (Condition::Equals, ValueExpr::default()),
    }
}

/// Encode a condition and its value as `value` element content
pub fn encode(condition: Condition, value: &ValueExpr) -> ValueElement {
    let literal = match value {
        ValueExpr::Enumeration(items) => return ValueElement::Enumeration(items.clone()),
        ValueExpr::Literal(text) => text,
    };

    match condition {
        Condition::StartsWith => ValueElement::Pattern(format!("{}{}", literal, WILDCARD)),
        Condition::Contains => ValueElement::Pattern(format!("{}{}{}", WILDCARD, literal, WILDCARD)),
        Condition::EndsWith => {
            ValueElement::Pattern(format!("{}{}{}", WILDCARD, literal, END_ANCHOR))
        }
        Condition::Equals | Condition::OneOf => ValueElement::Simple(literal.clone()),
    }
}

/// Classify a pattern by shape; `None` for anything this tool does not emit
pub fn classify_pattern(pattern: &str) -> Option<(Condition, String)> {
    let (condition, body) = if let Some(body) = pattern
        .strip_prefix(WILDCARD)
        .and_then(|rest| rest.strip_suffix(END_ANCHOR))
    {
        (Condition::EndsWith, body)
    } else if let Some(body) = pattern
        .strip_prefix(WILDCARD)
        .and_then(|rest| rest.strip_suffix(WILDCARD))
    {
        (Condition::Contains, body)
    } else if let Some(body) = pattern.strip_suffix(WILDCARD) {
        (Condition::StartsWith, body)
    } else {
        return None;
    };

    Some((condition, body.to_string()))
}

/// Map a `cardinality` attribute value, accepting display labels too
pub fn decode_cardinality(value: &str) -> Option<Cardinality> {
    let value = value.trim();
    Cardinality::ALL
        .into_iter()
        .find(|c| c.as_str().eq_ignore_ascii_case(value))
        .or_else(|| {
            LEGACY_CARDINALITY_LABELS
                .iter()
                .find(|(label, _)| *label == value)
                .map(|(_, c)| *c)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(condition: Condition, literal: &str) -> String {
        match encode(condition, &ValueExpr::literal(literal)) {
            ValueElement::Pattern(p) => p,
            other => panic!("expected pattern, got {:?}", other),
        }
    }

    #[test]
    fn test_starts_with() {
        assert_eq!(pattern(Condition::StartsWith, "AB "), "AB .*");
        assert_eq!(
            decode(ValueElement::Pattern("AB .*".into())),
            (Condition::StartsWith, ValueExpr::literal("AB "))
        );
    }

    #[test]
    fn test_contains() {
        assert_eq!(pattern(Condition::Contains, "AB "), ".*AB .*");
        assert_eq!(
            decode(ValueElement::Pattern(".*AB .*".into())),
            (Condition::Contains, ValueExpr::literal("AB "))
        );
    }

    #[test]
    fn test_ends_with() {
        assert_eq!(pattern(Condition::EndsWith, "X"), ".*X$");
        assert_eq!(
            decode(ValueElement::Pattern(".*X$".into())),
            (Condition::EndsWith, ValueExpr::literal("X"))
        );
    }

    #[test]
    fn test_one_of_keeps_order() {
        let value = ValueExpr::enumeration(["A", "B", "C"]);
        let element = encode(Condition::OneOf, &value);
        assert_eq!(
            element,
            ValueElement::Enumeration(vec!["A".into(), "B".into(), "C".into()])
        );
        assert_eq!(decode(element), (Condition::OneOf, value));
    }

    #[test]
    fn test_equals_empty() {
        let element = encode(Condition::Equals, &ValueExpr::literal(""));
        assert_eq!(element, ValueElement::Simple(String::new()));
        assert_eq!(decode(element), (Condition::Equals, ValueExpr::literal("")));
    }

    #[test]
    fn test_absent_value() {
        assert_eq!(
            decode(ValueElement::Absent),
            (Condition::Equals, ValueExpr::literal(""))
        );
    }

    #[test]
    fn test_unsupported_pattern_falls_back() {
        for p in ["^[0-9]+$", "[A-Z]{2}", "a|b", "AB", "^EXT", ""] {
            assert_eq!(
                decode(ValueElement::Pattern(p.into())),
                (Condition::Equals, ValueExpr::literal("")),
                "pattern {p}"
            );
        }
    }

    #[test]
    fn test_empty_literals_round_trip() {
        for condition in [Condition::StartsWith, Condition::Contains, Condition::EndsWith] {
            let element = encode(condition, &ValueExpr::literal(""));
            assert_eq!(decode(element), (condition, ValueExpr::literal("")));
        }
    }

    #[test]
    fn test_literals_are_written_verbatim() {
        assert_eq!(pattern(Condition::StartsWith, "1.5"), "1.5.*");
        assert_eq!(pattern(Condition::Contains, "(draft)"), ".*(draft).*");
        assert_eq!(pattern(Condition::EndsWith, "1.5"), ".*1.5$");
    }

    #[test]
    fn test_regex_characters_in_literals_decode() {
        let cases = [
            ("1.5.*", Condition::StartsWith, "1.5"),
            (".*1.5.*", Condition::Contains, "1.5"),
            (".*1.5$", Condition::EndsWith, "1.5"),
            (".*(draft)$", Condition::EndsWith, "(draft)"),
            (r"a\d.*", Condition::StartsWith, r"a\d"),
        ];
        for (p, condition, literal) in cases {
            assert_eq!(
                decode(ValueElement::Pattern(p.into())),
                (condition, ValueExpr::literal(literal)),
                "pattern {p}"
            );
        }
    }

    #[test]
    fn test_regex_characters_round_trip() {
        let literals = ["1.5", "a*b", "x$", "(draft)", r"C:\dir", "a|b", "[1]"];
        for condition in [Condition::StartsWith, Condition::Contains, Condition::EndsWith] {
            for literal in literals {
                let element = encode(condition, &ValueExpr::literal(literal));
                assert_eq!(
                    decode(element),
                    (condition, ValueExpr::literal(literal)),
                    "{condition} {literal}"
                );
            }
        }
    }

    #[test]
    fn test_cardinality_synonyms() {
        assert_eq!(decode_cardinality("required"), Some(Cardinality::Required));
        assert_eq!(decode_cardinality("Required"), Some(Cardinality::Required));
        assert_eq!(decode_cardinality("Обязательно"), Some(Cardinality::Required));
        assert_eq!(decode_cardinality("Опционально"), Some(Cardinality::Optional));
        assert_eq!(decode_cardinality("PROHIBITED"), Some(Cardinality::Prohibited));
        assert_eq!(decode_cardinality("Запрещено"), Some(Cardinality::Prohibited));
        assert_eq!(decode_cardinality("sometimes"), None);
    }
}

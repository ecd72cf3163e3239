//! IDS XML decoder
//!
//! Only malformed XML is an error. Missing elements and attributes fall
//! back to model defaults, and constructs the editor does not model are
//! skipped (and logged at debug level).

use crate::condition::{self, ValueElement};
use crate::model::{
    Cardinality, DataType, Document, EntityRule, Info, PropertyRule, RuleSet, Specification,
    DEFAULT_IFC_VERSION,
};
use roxmltree::Node;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Malformed XML: {0}")]
    MalformedXml(#[from] roxmltree::Error),
    #[error("Failed to read file: {0}")]
    ReadFile(#[from] std::io::Error),
}

/// Parse IDS XML text into a [`Document`]
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let xml = roxmltree::Document::parse(source)?;
    let root = xml.root_element();

    if root.tag_name().name() != "ids" {
        tracing::debug!(root = root.tag_name().name(), "unexpected root element");
    }

    let info = child(root, "info").map(decode_info).unwrap_or_default();

    let specifications: Vec<Specification> = root
        .descendants()
        .filter(|n| is_element(n, "specification"))
        .enumerate()
        .map(|(index, node)| decode_specification(node, index))
        .collect();

    tracing::debug!(count = specifications.len(), "decoded specifications");

    Ok(Document {
        info,
        specifications,
    })
}

/// Read and parse an IDS file
pub fn parse_file(path: &Path) -> Result<Document, ParseError> {
    let source = fs::read_to_string(path)?;
    parse(&source)
}

fn decode_info(node: Node) -> Info {
    let defaults = Info::default();
    let field = |name: &str| child(node, name).map(text_content);
    let non_blank = |name: &str| field(name).filter(|v| !v.trim().is_empty());

    let date = non_blank("date").unwrap_or(defaults.date);
    if chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").is_err() {
        tracing::debug!(%date, "info date is not an ISO calendar date, kept as-is");
    }

    Info {
        title: field("title").unwrap_or(defaults.title),
        copyright: field("copyright").unwrap_or_default(),
        version: non_blank("version").unwrap_or(defaults.version),
        author: field("author").unwrap_or_default(),
        date,
        description: field("description").unwrap_or_default(),
        purpose: field("purpose").unwrap_or_default(),
        milestone: field("milestone").unwrap_or_default(),
    }
}

fn decode_specification(node: Node, index: usize) -> Specification {
    let name = node
        .attribute("name")
        .map(str::to_string)
        .unwrap_or_else(|| format!("Specification {}", index + 1));

    tracing::trace!(%name, index, "decoding specification");

    let mut spec = Specification::new(name);
    spec.ifc_version = node
        .attribute("ifcVersion")
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_IFC_VERSION)
        .to_string();

    if let Some(applicability) = child(node, "applicability") {
        spec.applicability = decode_applicability(applicability);
    }
    if let Some(requirements) = child(node, "requirements") {
        spec.requirements = decode_requirements(requirements);
    }

    spec
}

fn decode_applicability(node: Node) -> RuleSet {
    let mut rules = RuleSet::new();

    for facet in node.children().filter(Node::is_element) {
        match facet.tag_name().name() {
            "entity" => match simple_value(child(facet, "name")) {
                Some(value) => rules.push(EntityRule::new(value)),
                None => tracing::debug!("entity without a simple name value skipped"),
            },
            other => tracing::debug!(facet = other, "unsupported applicability facet skipped"),
        }
    }

    rules
}

fn decode_requirements(node: Node) -> RuleSet {
    let mut rules = RuleSet::new();

    for facet in node.children().filter(Node::is_element) {
        match facet.tag_name().name() {
            "property" => rules.push(decode_property(facet)),
            other => tracing::debug!(facet = other, "unsupported requirement facet skipped"),
        }
    }

    rules
}

fn decode_property(node: Node) -> PropertyRule {
    let cardinality = match node.attribute("cardinality") {
        Some(value) => condition::decode_cardinality(value).unwrap_or_else(|| {
            tracing::debug!(cardinality = value, "unknown cardinality, using optional");
            Cardinality::default()
        }),
        None => Cardinality::default(),
    };

    let data_type = node
        .attribute("dataType")
        .filter(|v| !v.is_empty())
        .map(DataType::from_attr)
        .unwrap_or_default();

    let property_set = simple_value(child(node, "propertySet")).unwrap_or_default();
    let base_name = simple_value(child(node, "baseName")).unwrap_or_default();
    let (condition, value) = condition::decode(value_element(child(node, "value")));

    PropertyRule::new(property_set, base_name)
        .with_data_type(data_type)
        .with_cardinality(cardinality)
        .with_decoded_value(condition, value)
}

/// Read the shape of a `value` element
fn value_element(node: Option<Node>) -> ValueElement {
    let Some(node) = node else {
        return ValueElement::Absent;
    };

    if let Some(simple) = child(node, "simpleValue") {
        return ValueElement::Simple(text_content(simple));
    }

    if let Some(restriction) = child(node, "restriction") {
        let facets: Vec<Node> = restriction.children().filter(Node::is_element).collect();

        let enumerations: Vec<String> = facets
            .iter()
            .filter(|n| is_element(n, "enumeration"))
            .filter_map(|n| n.attribute("value"))
            .map(str::to_string)
            .collect();
        if !enumerations.is_empty() {
            return ValueElement::Enumeration(enumerations);
        }

        if let Some(pattern) = facets
            .iter()
            .find(|n| is_element(n, "pattern"))
            .and_then(|n| n.attribute("value"))
        {
            return ValueElement::Pattern(pattern.to_string());
        }

        // An empty restriction is how an empty "one of" list is written
        if facets.is_empty() {
            return ValueElement::Enumeration(Vec::new());
        }
    }

    tracing::debug!("value element has no recognized content");
    ValueElement::Absent
}

fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is_element(n, name))
}

/// Concatenated text of the direct text children, untrimmed
fn text_content(node: Node) -> String {
    node.children()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

fn simple_value(node: Option<Node>) -> Option<String> {
    node.and_then(|n| child(n, "simpleValue")).map(text_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Condition, Rule, ValueExpr};

    fn wrap(specifications: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<ids xmlns="http://standards.buildingsmart.org/IDS" xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <info><title>T</title></info>
    <specifications>{}</specifications>
</ids>"#,
            specifications
        )
    }

    fn first_property(doc: &Document) -> &PropertyRule {
        match doc.specifications[0].requirements.get(0) {
            Some(Rule::Property(rule)) => rule,
            other => panic!("expected property rule, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse("<ids><info></ids>").unwrap_err();
        assert!(matches!(err, ParseError::MalformedXml(_)));
        assert!(err.to_string().starts_with("Malformed XML: "));
        assert!(err.to_string().len() > "Malformed XML: ".len());
    }

    #[test]
    fn test_invalid_entity_is_malformed() {
        let result = parse("<ids><info><title>&bogus;</title></info></ids>");
        assert!(matches!(result, Err(ParseError::MalformedXml(_))));
    }

    #[test]
    fn test_empty_info_defaults() {
        let doc = parse("<ids><info/><specifications/></ids>").unwrap();
        assert_eq!(doc.info.version, "IFC4");
        assert_eq!(doc.info.title, "Untitled");
        assert!(chrono::NaiveDate::parse_from_str(&doc.info.date, "%Y-%m-%d").is_ok());
        assert!(doc.specifications.is_empty());
    }

    #[test]
    fn test_missing_info() {
        let doc = parse("<ids/>").unwrap();
        assert_eq!(doc.info.title, "Untitled");
        assert_eq!(doc.info.version, "IFC4");
    }

    #[test]
    fn test_blank_version_defaults() {
        let doc = parse("<ids><info><version>  </version><date></date></info></ids>").unwrap();
        assert_eq!(doc.info.version, "IFC4");
        assert!(!doc.info.date.is_empty());
    }

    #[test]
    fn test_info_fields() {
        let doc = parse(
            "<ids><info><title>Check</title><author>a@b.c</author><date>2024-02-29</date>\
             <milestone>Design</milestone></info></ids>",
        )
        .unwrap();
        assert_eq!(doc.info.title, "Check");
        assert_eq!(doc.info.author, "a@b.c");
        assert_eq!(doc.info.date, "2024-02-29");
        assert_eq!(doc.info.milestone, "Design");
        assert_eq!(doc.info.purpose, "");
    }

    #[test]
    fn test_specification_defaults() {
        let doc = parse(&wrap("<specification/><specification name=\"Doors\"/>")).unwrap();
        assert_eq!(doc.specifications.len(), 2);
        assert_eq!(doc.specifications[0].name, "Specification 1");
        assert_eq!(doc.specifications[0].ifc_version, "IFC4");
        assert!(doc.specifications[0].applicability.is_empty());
        assert!(doc.specifications[0].requirements.is_empty());
        assert_eq!(doc.specifications[1].name, "Doors");
    }

    #[test]
    fn test_unsupported_applicability_skipped() {
        let doc = parse(&wrap(
            r#"<specification name="S">
                <applicability>
                    <attribute><name><simpleValue>Name</simpleValue></name></attribute>
                    <entity><name><simpleValue>IfcSlab</simpleValue></name></entity>
                    <classification/>
                    <entity/>
                </applicability>
            </specification>"#,
        ))
        .unwrap();
        let rules = &doc.specifications[0].applicability;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.get(0), Some(&Rule::Entity(EntityRule::new("IfcSlab"))));
    }

    #[test]
    fn test_property_defaults() {
        let doc = parse(&wrap(
            "<specification><requirements><property/></requirements></specification>",
        ))
        .unwrap();
        let rule = first_property(&doc);
        assert_eq!(rule.property_set, "");
        assert_eq!(rule.field, "");
        assert_eq!(rule.data_type, DataType::Text);
        assert_eq!(rule.cardinality, Cardinality::Optional);
        assert_eq!(rule.condition(), Condition::Equals);
        assert_eq!(rule.value(), &ValueExpr::literal(""));
    }

    #[test]
    fn test_enumeration_order() {
        let doc = parse(&wrap(
            r#"<specification><requirements>
                <property cardinality="required" dataType="IFCLABEL">
                    <propertySet><simpleValue>Pset_WallCommon</simpleValue></propertySet>
                    <baseName><simpleValue>Status</simpleValue></baseName>
                    <value><xs:restriction base="xs:string">
                        <xs:enumeration value="NEW"/>
                        <xs:enumeration value="EXISTING"/>
                        <xs:enumeration value="DEMOLISH"/>
                    </xs:restriction></value>
                </property>
            </requirements></specification>"#,
        ))
        .unwrap();
        let rule = first_property(&doc);
        assert_eq!(rule.cardinality, Cardinality::Required);
        assert_eq!(rule.data_type, DataType::Other("IFCLABEL".into()));
        assert_eq!(rule.condition(), Condition::OneOf);
        assert_eq!(
            rule.value(),
            &ValueExpr::enumeration(["NEW", "EXISTING", "DEMOLISH"])
        );
    }

    #[test]
    fn test_unknown_restriction_facet_falls_back() {
        let doc = parse(&wrap(
            r#"<specification><requirements><property>
                <value><xs:restriction base="xs:string"><xs:minLength value="3"/></xs:restriction></value>
            </property></requirements></specification>"#,
        ))
        .unwrap();
        let rule = first_property(&doc);
        assert_eq!(rule.condition(), Condition::Equals);
        assert_eq!(rule.value(), &ValueExpr::literal(""));
    }

    #[test]
    fn test_simple_value_entities_and_whitespace() {
        let doc = parse(&wrap(
            "<specification><requirements><property><value>\
             <simpleValue> O&apos;Brien &amp; Co. &lt;test&gt; </simpleValue>\
             </value></property></requirements></specification>",
        ))
        .unwrap();
        assert_eq!(
            first_property(&doc).value(),
            &ValueExpr::literal(" O'Brien & Co. <test> ")
        );
    }

    #[test]
    fn test_unknown_cardinality_is_optional() {
        let doc = parse(&wrap(
            r#"<specification><requirements><property cardinality="often"/></requirements></specification>"#,
        ))
        .unwrap();
        assert_eq!(first_property(&doc).cardinality, Cardinality::Optional);
    }

    #[test]
    fn test_parse_file_missing() {
        let result = parse_file(Path::new("/nonexistent/file.ids"));
        assert!(matches!(result, Err(ParseError::ReadFile(_))));
    }
}

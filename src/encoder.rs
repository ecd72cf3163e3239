//! IDS XML encoder

use crate::condition::{self, ValueElement};
use crate::config::EditorConfig;
use crate::model::{Document, EntityRule, Info, PropertyRule, Rule, Specification};
use crate::writer::XmlWriter;

pub const IDS_NAMESPACE: &str = "http://standards.buildingsmart.org/IDS";
pub const XS_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Generate IDS XML text with the default layout
pub fn generate(document: &Document) -> String {
    Encoder::default().encode(document)
}

/// IDS document encoder.
///
/// Output depends only on the document and the configuration.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EditorConfig,
}

impl Encoder {
    pub fn with_config(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn encode(&self, document: &Document) -> String {
        let mut w = XmlWriter::new(&self.config);

        w.declaration("1.0", "UTF-8", true);
        w.open(
            "ids",
            &[
                ("xsi:noNamespaceSchemaLocation", self.config.schema_location.as_str()),
                ("xmlns", IDS_NAMESPACE),
                ("xmlns:xs", XS_NAMESPACE),
                ("xmlns:xsi", XSI_NAMESPACE),
            ],
        );

        write_info(&mut w, &document.info);

        w.open("specifications", &[]);
        for spec in &document.specifications {
            write_specification(&mut w, spec);
        }
        w.close("specifications");

        w.close("ids");
        w.finish()
    }
}

fn write_info(w: &mut XmlWriter, info: &Info) {
    w.open("info", &[]);
    w.text_element("title", &info.title);
    w.text_element("copyright", &info.copyright);
    w.text_element("version", &info.version);
    w.text_element("author", &info.author);
    w.text_element("date", &info.date);
    w.text_element("description", &info.description);
    w.text_element("purpose", &info.purpose);
    w.text_element("milestone", &info.milestone);
    w.close("info");
}

fn write_specification(w: &mut XmlWriter, spec: &Specification) {
    tracing::trace!(name = %spec.name, "encoding specification");

    w.open(
        "specification",
        &[("name", spec.name.as_str()), ("ifcVersion", spec.ifc_version.as_str())],
    );

    w.open("applicability", &[("minOccurs", "0"), ("maxOccurs", "unbounded")]);
    for rule in &spec.applicability {
        match rule {
            Rule::Entity(entity) => write_entity(w, entity),
            Rule::Property(_) => {
                tracing::debug!(spec = %spec.name, "property rule in applicability not encoded")
            }
        }
    }
    w.close("applicability");

    w.open("requirements", &[]);
    for rule in &spec.requirements {
        match rule {
            Rule::Property(property) => write_property(w, property),
            Rule::Entity(_) => {
                tracing::debug!(spec = %spec.name, "entity rule in requirements not encoded")
            }
        }
    }
    w.close("requirements");

    w.close("specification");
}

fn write_entity(w: &mut XmlWriter, entity: &EntityRule) {
    w.open("entity", &[]);
    w.open(EntityRule::FIELD, &[]);
    w.text_element("simpleValue", &entity.value);
    w.close(EntityRule::FIELD);
    w.close("entity");
}

fn write_property(w: &mut XmlWriter, property: &PropertyRule) {
    w.open(
        "property",
        &[
            ("cardinality", property.cardinality.as_str()),
            ("dataType", property.data_type.as_str()),
        ],
    );

    w.open("propertySet", &[]);
    w.text_element("simpleValue", &property.property_set);
    w.close("propertySet");

    w.open("baseName", &[]);
    w.text_element("simpleValue", &property.field);
    w.close("baseName");

    w.open("value", &[]);
    write_value(w, condition::encode(property.condition(), property.value()));
    w.close("value");

    w.close("property");
}

fn write_value(w: &mut XmlWriter, element: ValueElement) {
    match element {
        ValueElement::Simple(text) => w.text_element("simpleValue", &text),
        ValueElement::Enumeration(items) => {
            w.open("xs:restriction", &[("base", "xs:string")]);
            for item in &items {
                w.empty_element("xs:enumeration", &[("value", item.as_str())]);
            }
            w.close("xs:restriction");
        }
        ValueElement::Pattern(pattern) => {
            w.open("xs:restriction", &[("base", "xs:string")]);
            w.empty_element("xs:pattern", &[("value", pattern.as_str())]);
            w.close("xs:restriction");
        }
        // Never produced by the codec's encode direction
        ValueElement::Absent => {}
    }
}

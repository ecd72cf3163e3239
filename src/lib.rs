//! # ids-editor
//!
//! Codec and editing session for IDS (Information Delivery Specification)
//! documents: building-model checking rules written as applicability /
//! requirements pairs in XML.
//!
//! The codec has two entry points, [`parse`] and [`generate`]. Documents
//! produced by [`generate`] decode back to the same rules, including the
//! `startsWith` / `contains` / `endsWith` / `in` conditions that are stored
//! as XML Schema restrictions.
//!
//! ## Example
//!
//! ```
//! use ids_editor::{generate, parse, Condition, Rule};
//!
//! let source = r#"<ids xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!   <info><title>Walls</title></info>
//!   <specifications>
//!     <specification name="External walls">
//!       <applicability><entity><name><simpleValue>IfcWall</simpleValue></name></entity></applicability>
//!       <requirements>
//!         <property cardinality="required" dataType="IFCBOOLEAN">
//!           <propertySet><simpleValue>Pset_WallCommon</simpleValue></propertySet>
//!           <baseName><simpleValue>IsExternal</simpleValue></baseName>
//!           <value><xs:restriction base="xs:string"><xs:pattern value="EXT.*"/></xs:restriction></value>
//!         </property>
//!       </requirements>
//!     </specification>
//!   </specifications>
//! </ids>"#;
//!
//! let doc = parse(source).unwrap();
//! let Some(Rule::Property(rule)) = doc.specifications[0].requirements.get(0) else {
//!     panic!("expected a property rule");
//! };
//! assert_eq!(rule.condition(), Condition::StartsWith);
//!
//! let xml = generate(&doc);
//! assert!(xml.contains(r#"<xs:pattern value="EXT.*"/>"#));
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Summarize a file
//! ids-editor show rules.ids
//!
//! # Normalize files in place
//! ids-editor fmt --write "checks/*.ids"
//!
//! # Start a new document
//! ids-editor new --title "Fire safety" -o fire.ids
//! ```

pub mod condition;
mod config;
mod decoder;
mod encoder;
pub mod model;
mod session;
mod writer;

pub use config::{ConfigError, EditorConfig, IndentStyle};
pub use decoder::{parse, parse_file, ParseError};
pub use encoder::{generate, Encoder, IDS_NAMESPACE, XSI_NAMESPACE, XS_NAMESPACE};
pub use model::{
    Cardinality, Condition, DataType, Document, EntityRule, Info, ModelError, PropertyRule, Rule,
    RuleSet, SpecId, Specification, ValueExpr,
};
pub use session::{EditorSession, Section, SessionError};

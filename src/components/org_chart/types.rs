use std::borrow::Cow;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::theme::Theme;

/// One person record as supplied by the caller.
///
/// Every key other than `children` lands in `fields`. Identity is the
/// `Arc` itself: two records with equal fields are still different nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrgNode {
	/// Every key except `children`.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
	/// Ordered direct reports. Absent, null and empty all mean a leaf.
	#[serde(
		default,
		deserialize_with = "null_as_leaf",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub children: Vec<Arc<OrgNode>>,
}

fn null_as_leaf<'de, D>(deserializer: D) -> Result<Vec<Arc<OrgNode>>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(Option::<Vec<Arc<OrgNode>>>::deserialize(deserializer)?.unwrap_or_default())
}

impl OrgNode {
	/// Parses a root record from JSON text.
	pub fn from_json(json: &str) -> Result<Arc<Self>, ChartError> {
		let value: Value = serde_json::from_str(json)?;
		Self::from_value(value)
	}

	/// Converts a JSON value into a root record. The value must be an object.
	pub fn from_value(value: Value) -> Result<Arc<Self>, ChartError> {
		if !value.is_object() {
			return Err(ChartError::InvalidData {
				message: format!("expected an object at the root, found {}", kind(&value)),
			});
		}
		if let Some(children) = value.get("children").and_then(Value::as_array) {
			if let Some(bad) = children.iter().find(|c| !c.is_object()) {
				return Err(ChartError::InvalidData {
					message: format!("children entries must be objects, found {}", kind(bad)),
				});
			}
		}
		Ok(Arc::new(serde_json::from_value(value)?))
	}

	/// Field value rendered as text. Missing and null fields read as empty.
	pub fn field(&self, name: &str) -> Cow<'_, str> {
		match self.fields.get(name) {
			Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
			Some(Value::Null) | None => Cow::Borrowed(""),
			Some(Value::Number(n)) => Cow::Owned(n.to_string()),
			Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
			Some(other) => Cow::Owned(other.to_string()),
		}
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Which record fields feed the card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
	/// Card title; also the default search field.
	pub title: String,
	/// Card subtitle.
	pub subtitle: String,
	/// Photo URL.
	pub photo: String,
	/// Optional stable key field. When set, nodes are indexed by it.
	pub id: Option<String>,
}

impl Default for FieldMapping {
	fn default() -> Self {
		Self {
			title: "name".into(),
			subtitle: "role".into(),
			photo: "photo".into(),
			id: None,
		}
	}
}

/// Everything a chart instance is configured with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
	/// Geometry and styling.
	pub theme: Theme,
	/// Which record fields the cards read.
	pub fields: FieldMapping,
	/// Shows the search box.
	pub searchable: bool,
}

impl Default for ChartConfig {
	fn default() -> Self {
		Self {
			theme: Theme::default(),
			fields: FieldMapping::default(),
			searchable: true,
		}
	}
}

impl ChartConfig {
	/// Parses a (possibly partial) configuration; absent keys keep their defaults.
	pub fn from_json(json: &str) -> Result<Self, ChartError> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Errors raised while loading chart data or configuration.
#[derive(Debug, Error)]
pub enum ChartError {
	/// The text was not valid JSON or did not match the expected shape.
	#[error("chart JSON failed: {0}")]
	Json(#[from] serde_json::Error),
	/// The JSON was well formed but not a tree of records.
	#[error("invalid chart data: {message}")]
	InvalidData { message: String },
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn parses_nested_records() {
		let root = OrgNode::from_value(json!({
			"name": "Sarah Johnson",
			"role": "CEO",
			"children": [{ "name": "Michael Chen", "role": "CTO" }]
		}))
		.unwrap();
		assert_eq!(root.field("name"), "Sarah Johnson");
		assert_eq!(root.children.len(), 1);
		assert!(root.children[0].children.is_empty());
		assert!(!root.fields.contains_key("children"));
	}

	#[test]
	fn missing_fields_read_as_empty() {
		let root = OrgNode::from_value(json!({ "name": "A", "level": 3, "photo": null })).unwrap();
		assert_eq!(root.field("role"), "");
		assert_eq!(root.field("photo"), "");
		assert_eq!(root.field("level"), "3");
	}

	#[test]
	fn null_children_mean_a_leaf() {
		let root = OrgNode::from_json(
			r#"{ "name": "A", "children": [{ "name": "B", "children": null }] }"#,
		)
		.unwrap();
		assert_eq!(root.children.len(), 1);
		assert!(root.children[0].children.is_empty());
		assert!(!root.children[0].fields.contains_key("children"));

		let leaf = OrgNode::from_json(r#"{ "name": "A", "children": null }"#).unwrap();
		assert!(leaf.children.is_empty());
		assert_eq!(leaf.field("name"), "A");
	}

	#[test]
	fn rejects_non_object_roots() {
		let err = OrgNode::from_value(json!([1, 2])).unwrap_err();
		assert!(matches!(err, ChartError::InvalidData { .. }));
		let err = OrgNode::from_value(json!({ "children": ["x"] })).unwrap_err();
		assert!(matches!(err, ChartError::InvalidData { .. }));
		assert!(matches!(OrgNode::from_json("{"), Err(ChartError::Json(_))));
	}

	#[test]
	fn partial_config_keeps_defaults() {
		let config =
			ChartConfig::from_json(r#"{ "fields": { "title": "label" }, "searchable": false }"#)
				.unwrap();
		assert_eq!(config.fields.title, "label");
		assert_eq!(config.fields.subtitle, "role");
		assert!(!config.searchable);
		assert_eq!(config.theme, Theme::default());
	}
}

//! Element identifier extraction.
//!
//! The Integrate API has answered creation requests in more than one shape. Each known shape is an
//! [`ExtractionRule`]; [`ELEMENT_ID_RULES`] lists them in the order they are tried and the first
//! non-empty string wins.

// self
use crate::_prelude::*;

/// A named, pure lookup of an identifier inside a parsed response body.
#[derive(Clone, Copy)]
pub struct ExtractionRule {
	/// Label used in logs.
	pub label: &'static str,
	/// JSON pointer to the candidate field.
	pub pointer: &'static str,
}
impl ExtractionRule {
	/// Applies the rule to `body`, yielding a non-empty string identifier.
	pub fn apply<'a>(&self, body: &'a Value) -> Option<&'a str> {
		body.pointer(self.pointer).and_then(Value::as_str).filter(|id| !id.is_empty())
	}
}
impl Debug for ExtractionRule {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ExtractionRule({} at {})", self.label, self.pointer)
	}
}

/// Known identifier locations, in priority order.
pub const ELEMENT_ID_RULES: &[ExtractionRule] = &[
	ExtractionRule { label: "data.id", pointer: "/data/id" },
	ExtractionRule { label: "data.attributes.urn", pointer: "/data/attributes/urn" },
	ExtractionRule { label: "urn", pointer: "/urn" },
];

/// Returns the first identifier matched by `rules`, with the label of the rule that matched.
pub fn first_match<'a>(
	rules: &[ExtractionRule],
	body: &'a Value,
) -> Option<(&'static str, &'a str)> {
	rules.iter().find_map(|rule| rule.apply(body).map(|id| (rule.label, id)))
}

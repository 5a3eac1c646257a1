//! JSON:API envelope for creating a Forma element from an inline GLB.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Provider tag for elements owned by a third-party integration.
pub const PROVIDER_EXTERNAL: &str = "external";
/// Element category for massing volumes.
pub const CATEGORY_MASS: &str = "mass";

/// Top-level creation request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElementEnvelope {
	/// Resource object.
	pub data: ElementData,
}
impl ElementEnvelope {
	/// Wraps `glb` as an external `mass` element named `name`, placed with an identity transform.
	pub fn mass(name: impl Into<String>, glb: &[u8]) -> Self {
		Self {
			data: ElementData {
				kind: "elements",
				attributes: ElementAttributes {
					provider: PROVIDER_EXTERNAL,
					name: name.into(),
					category: CATEGORY_MASS,
					representation: Representation {
						kind: "volumeMesh",
						format: "glb",
						data: STANDARD.encode(glb),
					},
					transform: Transform::IDENTITY,
				},
			},
		}
	}
}

/// Resource object carrying the element attributes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElementData {
	/// JSON:API resource type.
	#[serde(rename = "type")]
	pub kind: &'static str,
	/// Element attributes.
	pub attributes: ElementAttributes,
}

/// Attributes of a new element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ElementAttributes {
	/// Owning provider tag.
	pub provider: &'static str,
	/// Display name.
	pub name: String,
	/// Geometry category.
	pub category: &'static str,
	/// Inline geometry.
	pub representation: Representation,
	/// Placement in project space.
	pub transform: Transform,
}

/// Inline geometry payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Representation {
	/// Representation kind.
	#[serde(rename = "type")]
	pub kind: &'static str,
	/// Binary format of `data`.
	pub format: &'static str,
	/// Base64-encoded (standard alphabet, padded) model bytes.
	pub data: String,
}

/// Translation, rotation, and scale applied to the element.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transform {
	/// Offset from the project origin.
	pub translation: Vector3,
	/// Orientation quaternion.
	pub rotation: Quaternion,
	/// Per-axis scale.
	pub scale: Vector3,
}
impl Transform {
	/// No offset, no rotation, unit scale.
	pub const IDENTITY: Self = Self {
		translation: Vector3 { x: 0., y: 0., z: 0. },
		rotation: Quaternion { x: 0., y: 0., z: 0., w: 1. },
		scale: Vector3 { x: 1., y: 1., z: 1. },
	};
}

/// Three-component vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vector3 {
	/// X component.
	pub x: f64,
	/// Y component.
	pub y: f64,
	/// Z component.
	pub z: f64,
}

/// Rotation quaternion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quaternion {
	/// X component.
	pub x: f64,
	/// Y component.
	pub y: f64,
	/// Z component.
	pub z: f64,
	/// Scalar component.
	pub w: f64,
}

//! URL and label composition for uploads.

// crates.io
use time::macros::format_description;
// self
use crate::{_prelude::*, error::ConfigError};

/// Element creation route for `project_id` under the Integrate API root.
///
/// The project identifier becomes a single percent-encoded path segment, so `/`, `?`, and `#`
/// inside it cannot steer the bearer-authenticated request to another route.
pub fn elements_endpoint(integrate: &Url, project_id: &str) -> Result<Url, ConfigError> {
	let mut endpoint = integrate.clone();

	endpoint
		.path_segments_mut()
		.map_err(|_| ConfigError::UnsupportedUrl { key: "FORMA_INTEGRATE_URL" })?
		.pop_if_empty()
		.extend(["projects", project_id, "elements"]);

	Ok(endpoint)
}

/// Forma deep link that opens `project_id` with `element_urn` selected.
///
/// Both identifiers are embedded verbatim so callers can match them against the response fields.
pub fn element_link(link: &Url, project_id: &str, element_urn: &str) -> String {
	format!("{}/{project_id}?selectedElement={element_urn}", link.as_str().trim_end_matches('/'))
}

/// Display name used when the caller does not supply one.
pub fn default_name(today: Date) -> String {
	let stamp = today
		.format(format_description!("[year]-[month]-[day]"))
		.unwrap_or_else(|_| today.to_string());

	format!("KL Massing – {stamp}")
}

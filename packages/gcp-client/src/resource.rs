//! Hierarchical resource names (`projects/p/locations/l/lakes/x`).

use crate::error::{GcpError, Result};
use std::fmt;

/// A resource name made of alternating collection / id segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceName {
    segments: Vec<(String, String)>,
}

fn check_id(collection: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(GcpError::Config(format!("{} id must not be empty", collection)));
    }
    if id.contains('/') {
        return Err(GcpError::Config(format!(
            "{} id must not contain '/': {}",
            collection, id
        )));
    }
    Ok(())
}

impl ResourceName {
    /// `projects/{project}`
    pub fn project(project: &str) -> Result<Self> {
        check_id("projects", project)?;
        Ok(Self {
            segments: vec![("projects".to_string(), project.to_string())],
        })
    }

    /// Append `locations/{location}`.
    pub fn location(self, location: &str) -> Result<Self> {
        self.child("locations", location)
    }

    /// Append `{collection}/{id}`.
    pub fn child(mut self, collection: &str, id: &str) -> Result<Self> {
        check_id(collection, id)?;
        self.segments.push((collection.to_string(), id.to_string()));
        Ok(self)
    }

    /// Parse a full name such as `projects/p/secrets/s/versions/3`.
    pub fn parse(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.split('/').collect();
        if parts.len() < 2 || parts.len() % 2 != 0 {
            return Err(GcpError::Config(format!("Malformed resource name: {}", name)));
        }

        let mut segments = Vec::with_capacity(parts.len() / 2);
        for pair in parts.chunks(2) {
            let (collection, id) = (pair[0], pair[1]);
            if collection.is_empty() {
                return Err(GcpError::Config(format!("Malformed resource name: {}", name)));
            }
            check_id(collection, id)?;
            segments.push((collection.to_string(), id.to_string()));
        }
        Ok(Self { segments })
    }

    /// Id of the last segment.
    pub fn id(&self) -> &str {
        self.segments
            .last()
            .map(|(_, id)| id.as_str())
            .unwrap_or_default()
    }

    /// Collection of the last segment.
    pub fn collection(&self) -> &str {
        self.segments
            .last()
            .map(|(collection, _)| collection.as_str())
            .unwrap_or_default()
    }

    /// Id stored under `collection`, if present.
    pub fn get(&self, collection: &str) -> Option<&str> {
        self.segments
            .iter()
            .find(|(c, _)| c == collection)
            .map(|(_, id)| id.as_str())
    }

    /// Name with the last segment removed.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (collection, id)) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}/{}", collection, id)?;
        }
        Ok(())
    }
}

/// Last `/`-separated segment of a name, or the whole name.
pub fn short_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Percent-encode one path segment (Cloud Storage object and folder names).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Comma-separated `updateMask` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    paths: Vec<String>,
}

impl FieldMask {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str) -> Self {
        self.push(path);
        self
    }

    pub fn push(&mut self, path: &str) {
        if !self.paths.iter().any(|p| p == path) {
            self.paths.push(path.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl fmt::Display for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.paths.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_location_scoped_name() {
        let name = ResourceName::project("my-project")
            .and_then(|n| n.location("us-central1"))
            .and_then(|n| n.child("connections", "conn-1"))
            .unwrap();
        assert_eq!(
            name.to_string(),
            "projects/my-project/locations/us-central1/connections/conn-1"
        );
        assert_eq!(name.id(), "conn-1");
        assert_eq!(name.collection(), "connections");
        assert_eq!(name.get("locations"), Some("us-central1"));
        assert_eq!(
            name.parent().unwrap().to_string(),
            "projects/my-project/locations/us-central1"
        );
    }

    #[test]
    fn test_rejects_bad_ids() {
        assert!(ResourceName::project("").is_err());
        let err = ResourceName::project("p")
            .and_then(|n| n.child("secrets", "a/b"))
            .unwrap_err();
        assert!(err.to_string().contains("must not contain '/'"));
    }

    #[test]
    fn test_parse() {
        let name = ResourceName::parse("projects/p/secrets/s/versions/3").unwrap();
        assert_eq!(name.id(), "3");
        assert_eq!(name.get("secrets"), Some("s"));
        assert_eq!(name.to_string(), "projects/p/secrets/s/versions/3");

        assert!(ResourceName::parse("projects/p/secrets").is_err());
        assert!(ResourceName::parse("projects//secrets/s").is_err());
        assert!(ResourceName::parse("").is_err());
    }

    #[test]
    fn test_project_has_no_parent() {
        assert!(ResourceName::project("p").unwrap().parent().is_none());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("projects/p/locations/l/lakes/lake-1"), "lake-1");
        assert_eq!(short_name("plain"), "plain");
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode_segment("reports/2024/"), "reports%2F2024%2F");
    }

    #[test]
    fn test_field_mask_dedupes() {
        let mut mask = FieldMask::new().with("description");
        mask.push("friendly_name");
        mask.push("description");
        assert_eq!(mask.to_string(), "description,friendly_name");
        assert!(FieldMask::new().is_empty());
    }
}

//! Read-only lookup table of the Redmine API paths, built from the bundled
//! OpenAPI document.

use crate::error::Error;
use serde_yaml::{Mapping, Value};

const BUNDLED: &str = include_str!("../openapi/redmine_openapi.yml");

/// Path templates (e.g. `/issues.json`) mapped to their OpenAPI path items,
/// in document order.
#[derive(Debug, Clone)]
pub struct PathSpecs {
    paths: Mapping,
}

impl PathSpecs {
    /// Load the document shipped with the crate.
    pub fn bundled() -> Result<Self, Error> {
        Self::from_yaml(BUNDLED)
    }

    /// Load the `paths` section of an OpenAPI document.
    pub fn from_yaml(document: &str) -> Result<Self, Error> {
        let mut root: Value = serde_yaml::from_str(document)?;
        let paths = match root.get_mut("paths").map(std::mem::take) {
            Some(Value::Mapping(paths)) => paths,
            Some(Value::Null) | None => Mapping::new(),
            Some(_) => {
                return Err(Error::Other {
                    kind: "InvalidOpenApi".into(),
                    message: "`paths` must be a mapping".into(),
                });
            }
        };
        Ok(Self { paths })
    }

    /// All path templates, in document order.
    pub fn templates(&self) -> Vec<&str> {
        self.paths.keys().filter_map(Value::as_str).collect()
    }

    /// The specification of each known template. Unknown templates are
    /// skipped.
    pub fn info<S: AsRef<str>>(&self, templates: &[S]) -> Mapping {
        let mut info = Mapping::new();
        for template in templates {
            let template = template.as_ref();
            if let Some(spec) = self.paths.get(template) {
                info.insert(Value::from(template), spec.clone());
            }
        }
        info
    }
}

use log::debug;
use serde_json::Value;
use std::path::Path;

use crate::error::{read_non_empty, Result, TfimportError};
use crate::types::{IndexKey, InstanceRecord, ResourceMode, ResourceRecord};

/// An in-memory Terraform state document, reduced to its resource list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateDocument {
    pub resources: Vec<ResourceRecord>,
}

impl StateDocument {
    /// Loads and parses a state file
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_non_empty(path)?;
        debug!("Parsing state file: {:?}", path);
        Self::parse(&content, path)
    }

    /// Parses state JSON. `origin` is only used to name the source in errors.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let state: Value = serde_json::from_str(content).map_err(|e| TfimportError::Json {
            path: origin.to_owned(),
            message: e.to_string(),
        })?;

        let resources = state
            .get("resources")
            .and_then(Value::as_array)
            .ok_or_else(|| TfimportError::MissingKey {
                path: origin.to_owned(),
                key: "resources",
            })?;

        let resources: Vec<ResourceRecord> = resources.iter().map(parse_resource).collect();
        debug!("Loaded {} resources from {:?}", resources.len(), origin);

        Ok(Self { resources })
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

fn parse_resource(resource: &Value) -> ResourceRecord {
    let instances = resource
        .get("instances")
        .and_then(Value::as_array)
        .map(|instances| instances.iter().map(parse_instance).collect())
        .unwrap_or_default();

    ResourceRecord {
        resource_type: str_field(resource, "type").to_string(),
        name: str_field(resource, "name").to_string(),
        module_path: str_field(resource, "module").to_string(),
        mode: ResourceMode::from_state(resource.get("mode")),
        instances,
    }
}

fn parse_instance(instance: &Value) -> InstanceRecord {
    let index_key = match instance.get("index_key") {
        Some(Value::String(s)) => Some(IndexKey::Str(s.clone())),
        Some(Value::Number(n)) => n.as_i64().map(IndexKey::Int),
        _ => None,
    };

    InstanceRecord {
        index_key,
        attributes: instance
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default(),
    }
}

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Whether a resource is managed by Terraform or only read through a data source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceMode {
    Managed,
    Data,
    /// Any other `mode` value, kept as its JSON text
    Other(String),
}

impl ResourceMode {
    /// Parses the `mode` field of a state resource. Only a missing field
    /// defaults to managed.
    pub fn from_state(mode: Option<&Value>) -> Self {
        match mode {
            None => ResourceMode::Managed,
            Some(Value::String(s)) if s == "managed" => ResourceMode::Managed,
            Some(Value::String(s)) if s == "data" => ResourceMode::Data,
            Some(Value::String(s)) => ResourceMode::Other(s.clone()),
            Some(other) => ResourceMode::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceMode::Managed => write!(f, "managed"),
            ResourceMode::Data => write!(f, "data"),
            ResourceMode::Other(mode) => write!(f, "{}", mode),
        }
    }
}

/// The `count` / `for_each` key of a resource instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKey {
    Str(String),
    Int(i64),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Str(s) => write!(f, "{}", s),
            IndexKey::Int(i) => write!(f, "{}", i),
        }
    }
}

/// How an instance address is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressStyle {
    /// `module.x.aws_type["key"]`: the index key replaces the resource name
    #[default]
    TypeIndexed,
    /// `module.x.aws_type.name["key"]` or `...name[0]`, as Terraform itself prints addresses
    Canonical,
}

/// A single instance of a resource as stored in state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstanceRecord {
    pub index_key: Option<IndexKey>,
    pub attributes: Map<String, Value>,
}

impl InstanceRecord {
    /// Returns a scalar attribute rendered as text, or `None` when the
    /// attribute is absent, null, an empty string, or not a scalar.
    pub fn scalar(&self, name: &str) -> Option<String> {
        match self.attributes.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Returns the string elements of a list attribute. Non-string elements are skipped.
    pub fn string_list(&self, name: &str) -> Vec<String> {
        self.attributes
            .get(name)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A Terraform resource block as stored in state, with all of its instances
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    /// The type of the resource (e.g., "aws_instance")
    pub resource_type: String,
    /// The resource label within its module
    pub name: String,
    /// Dotted module namespace (e.g., "module.network"), empty for the root module
    pub module_path: String,
    pub mode: ResourceMode,
    pub instances: Vec<InstanceRecord>,
}

impl ResourceRecord {
    /// Returns `type.name`, the string patterns are matched against
    pub fn type_name(&self) -> String {
        format!("{}.{}", self.resource_type, self.name)
    }

    /// Returns `module.path.type.name`, or `type.name` in the root module
    pub fn qualified_name(&self) -> String {
        if self.module_path.is_empty() {
            self.type_name()
        } else {
            format!("{}.{}", self.module_path, self.type_name())
        }
    }

    /// Returns the address of one instance of this resource
    pub fn instance_address(&self, index_key: Option<&IndexKey>, style: AddressStyle) -> String {
        let base = match (style, index_key) {
            (AddressStyle::TypeIndexed, Some(key)) => {
                format!("{}.{}[\"{}\"]", self.module_path, self.resource_type, key)
            }
            (AddressStyle::TypeIndexed, None) | (AddressStyle::Canonical, None) => {
                format!("{}.{}", self.module_path, self.type_name())
            }
            (AddressStyle::Canonical, Some(IndexKey::Str(key))) => {
                format!("{}.{}[\"{}\"]", self.module_path, self.type_name(), key)
            }
            (AddressStyle::Canonical, Some(IndexKey::Int(idx))) => {
                format!("{}.{}[{}]", self.module_path, self.type_name(), idx)
            }
        };
        base.trim_matches('.').to_string()
    }
}

/// One resource instance to import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub address: String,
    pub import_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(module_path: &str) -> ResourceRecord {
        ResourceRecord {
            resource_type: "aws_instance".to_string(),
            name: "web".to_string(),
            module_path: module_path.to_string(),
            mode: ResourceMode::Managed,
            instances: Vec::new(),
        }
    }

    #[test]
    fn test_instance_address_root_module() {
        let r = resource("");
        assert_eq!(
            r.instance_address(None, AddressStyle::TypeIndexed),
            "aws_instance.web"
        );
        assert_eq!(
            r.instance_address(None, AddressStyle::Canonical),
            "aws_instance.web"
        );
    }

    #[test]
    fn test_instance_address_with_module_and_key() {
        let r = resource("module.network");
        let key = IndexKey::Str("a".to_string());
        assert_eq!(
            r.instance_address(None, AddressStyle::TypeIndexed),
            "module.network.aws_instance.web"
        );
        assert_eq!(
            r.instance_address(Some(&key), AddressStyle::TypeIndexed),
            "module.network.aws_instance[\"a\"]"
        );
        assert_eq!(
            r.instance_address(Some(&key), AddressStyle::Canonical),
            "module.network.aws_instance.web[\"a\"]"
        );
    }

    #[test]
    fn test_instance_address_integer_key() {
        let r = resource("");
        let key = IndexKey::Int(0);
        assert_eq!(
            r.instance_address(Some(&key), AddressStyle::TypeIndexed),
            "aws_instance[\"0\"]"
        );
        assert_eq!(
            r.instance_address(Some(&key), AddressStyle::Canonical),
            "aws_instance.web[0]"
        );
    }

    #[test]
    fn test_scalar_attribute_rendering() {
        let instance = InstanceRecord {
            index_key: None,
            attributes: json!({
                "id": "i-123",
                "from_port": 80,
                "self": false,
                "empty": "",
                "nested": {"a": 1},
            })
            .as_object()
            .unwrap()
            .clone(),
        };

        assert_eq!(instance.scalar("id").as_deref(), Some("i-123"));
        assert_eq!(instance.scalar("from_port").as_deref(), Some("80"));
        assert_eq!(instance.scalar("self").as_deref(), Some("false"));
        assert_eq!(instance.scalar("empty"), None);
        assert_eq!(instance.scalar("nested"), None);
        assert_eq!(instance.scalar("missing"), None);
    }

    #[test]
    fn test_mode_defaults_to_managed_only_when_absent() {
        assert_eq!(ResourceMode::from_state(None), ResourceMode::Managed);
        assert_eq!(
            ResourceMode::from_state(Some(&json!("managed"))),
            ResourceMode::Managed
        );
        assert_eq!(
            ResourceMode::from_state(Some(&json!("data"))),
            ResourceMode::Data
        );
        assert_eq!(
            ResourceMode::from_state(Some(&json!("ephemeral"))),
            ResourceMode::Other("ephemeral".to_string())
        );
        assert_eq!(
            ResourceMode::from_state(Some(&Value::Null)),
            ResourceMode::Other("null".to_string())
        );
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(resource("").qualified_name(), "aws_instance.web");
        assert_eq!(
            resource("module.app").qualified_name(),
            "module.app.aws_instance.web"
        );
    }
}

use log::debug;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::{read_non_empty, Result, TfimportError};
use crate::resolver::Diagnostic;
use crate::state::StateDocument;

/// A resource touched by a plan, identified the way state identifies it
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct PlannedResource {
    module_path: String,
    resource_type: String,
    name: String,
}

/// The resources of an extracted plan (`terraform show -json <plan>`)
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    resources: BTreeSet<PlannedResource>,
}

impl PlannedResource {
    fn qualified_name(&self) -> String {
        if self.module_path.is_empty() {
            format!("{}.{}", self.resource_type, self.name)
        } else {
            format!("{}.{}.{}", self.module_path, self.resource_type, self.name)
        }
    }
}

impl PlanFilter {
    /// Loads an already-extracted plan JSON file
    pub fn load(path: &Path, actions: &[String]) -> Result<Self> {
        let content = read_non_empty(path)?;
        Self::parse(&content, path, actions)
    }

    /// Collects the resources in `resource_changes`. With a non-empty
    /// `actions` list only changes carrying one of those actions count.
    pub fn parse(content: &str, origin: &Path, actions: &[String]) -> Result<Self> {
        let plan: Value = serde_json::from_str(content).map_err(|e| TfimportError::Json {
            path: origin.to_owned(),
            message: e.to_string(),
        })?;

        let changes = plan
            .get("resource_changes")
            .and_then(Value::as_array)
            .ok_or_else(|| TfimportError::MissingKey {
                path: origin.to_owned(),
                key: "resource_changes",
            })?;

        let mut resources = BTreeSet::new();
        for change in changes {
            let change_actions: Vec<&str> = change
                .pointer("/change/actions")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();

            if !actions.is_empty() && !change_actions.iter().any(|a| actions.iter().any(|x| x == a))
            {
                continue;
            }

            let field = |key: &str| {
                change
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string()
            };
            let planned = PlannedResource {
                module_path: field("module_address"),
                resource_type: field("type"),
                name: field("name"),
            };
            if planned.resource_type.is_empty() || planned.name.is_empty() {
                continue;
            }
            resources.insert(planned);
        }

        debug!("Plan {:?} touches {} resources", origin, resources.len());
        Ok(Self { resources })
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Drops every state resource the plan does not touch, then reports
    /// plan resources that the state does not contain
    pub fn restrict(&self, state: &mut StateDocument) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        let mut found = HashSet::new();
        state.resources.retain(|resource| {
            let key = PlannedResource {
                module_path: resource.module_path.clone(),
                resource_type: resource.resource_type.clone(),
                name: resource.name.clone(),
            };
            let keep = self.resources.contains(&key);
            if keep {
                found.insert(key);
            } else {
                let diagnostic = Diagnostic::NotInPlan {
                    resource: resource.qualified_name(),
                };
                diagnostic.log();
                diagnostics.push(diagnostic);
            }
            keep
        });

        for planned in self.resources.iter().filter(|p| !found.contains(*p)) {
            let diagnostic = Diagnostic::MissingFromState {
                resource: planned.qualified_name(),
            };
            diagnostic.log();
            diagnostics.push(diagnostic);
        }
        diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PLAN: &str = r#"{
        "format_version": "1.2",
        "resource_changes": [
            {
                "address": "aws_instance.web",
                "mode": "managed",
                "type": "aws_instance",
                "name": "web",
                "change": {"actions": ["create"]}
            },
            {
                "address": "module.network.aws_subnet.private[\"a\"]",
                "module_address": "module.network",
                "mode": "managed",
                "type": "aws_subnet",
                "name": "private",
                "index": "a",
                "change": {"actions": ["no-op"]}
            }
        ]
    }"#;

    fn state() -> StateDocument {
        let value = json!({"resources": [
            {"type": "aws_instance", "name": "web", "instances": []},
            {"module": "module.network", "type": "aws_subnet", "name": "private", "instances": []},
            {"type": "aws_s3_bucket", "name": "logs", "instances": []}
        ]});
        StateDocument::parse(&value.to_string(), Path::new("test.tfstate")).unwrap()
    }

    #[test]
    fn test_restrict_to_planned_resources() {
        let filter = PlanFilter::parse(PLAN, Path::new("plan.json"), &[]).unwrap();
        assert_eq!(filter.len(), 2);

        let mut doc = state();
        let diagnostics = filter.restrict(&mut doc);

        let names: Vec<_> = doc.resources.iter().map(|r| r.type_name()).collect();
        assert_eq!(names, vec!["aws_instance.web", "aws_subnet.private"]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::NotInPlan {
                resource: "aws_s3_bucket.logs".to_string()
            }]
        );
    }

    #[test]
    fn test_action_filter() {
        let actions = vec!["create".to_string()];
        let filter = PlanFilter::parse(PLAN, Path::new("plan.json"), &actions).unwrap();

        let mut doc = state();
        filter.restrict(&mut doc);
        assert_eq!(doc.resources.len(), 1);
        assert_eq!(doc.resources[0].type_name(), "aws_instance.web");
    }

    #[test]
    fn test_missing_resource_changes_is_fatal() {
        let err = PlanFilter::parse(r#"{"format_version": "1.2"}"#, Path::new("plan.json"), &[])
            .unwrap_err();
        assert!(matches!(
            err,
            TfimportError::MissingKey {
                key: "resource_changes",
                ..
            }
        ));
    }

    #[test]
    fn test_labels_are_module_qualified() {
        let plan = r#"{"resource_changes": [
            {"type": "aws_instance", "name": "web", "change": {"actions": ["create"]}},
            {"module_address": "module.db", "type": "aws_rds_cluster", "name": "main",
             "change": {"actions": ["create"]}}
        ]}"#;
        let filter = PlanFilter::parse(plan, Path::new("plan.json"), &[]).unwrap();

        let value = json!({"resources": [
            {"type": "aws_instance", "name": "web", "instances": []},
            {"module": "module.app", "type": "aws_instance", "name": "web", "instances": []}
        ]});
        let mut doc = StateDocument::parse(&value.to_string(), Path::new("test.tfstate")).unwrap();
        let diagnostics = filter.restrict(&mut doc);

        assert_eq!(doc.resources.len(), 1);
        assert_eq!(doc.resources[0].module_path, "");
        assert_eq!(
            diagnostics,
            vec![
                Diagnostic::NotInPlan {
                    resource: "module.app.aws_instance.web".to_string()
                },
                Diagnostic::MissingFromState {
                    resource: "module.db.aws_rds_cluster.main".to_string()
                },
            ]
        );
        assert!(diagnostics[1].is_warning());
    }
}

use log::{debug, info, warn};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use crate::patterns::PatternSet;
use crate::state::StateDocument;
use crate::types::{AddressStyle, ImportRecord, InstanceRecord, ResourceMode};

/// Resource types that are never imported on their own
pub const DEFAULT_EXCLUDED_TYPES: &[&str] = &["aws_autoscaling_attachment"];

const IAM_ROLE_POLICY_ATTACHMENT: &str = "aws_iam_role_policy_attachment";
const SECURITY_GROUP_RULE: &str = "aws_security_group_rule";

/// How `aws_security_group_rule` instances turn into import ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityGroupRulePolicy {
    /// One id per instance; a source security group wins over CIDR blocks
    #[default]
    Single,
    /// One id for the source security group (if any) plus one per CIDR block
    PerCidr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub excluded_types: BTreeSet<String>,
    pub sg_rule_policy: SecurityGroupRulePolicy,
    pub address_style: AddressStyle,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            excluded_types: DEFAULT_EXCLUDED_TYPES
                .iter()
                .map(|t| t.to_string())
                .collect(),
            sg_rule_policy: SecurityGroupRulePolicy::default(),
            address_style: AddressStyle::default(),
        }
    }
}

impl ResolverConfig {
    /// Adds resource types to the denylist
    pub fn exclude<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_types.extend(types.into_iter().map(Into::into));
        self
    }
}

/// Why a resource or instance was left out of the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    DataSource { resource: String },
    UnsupportedMode { resource: String, mode: String },
    ExcludedType { resource: String },
    NoMatch { resource: String },
    MissingId { address: String, reason: String },
    DuplicateAddress { address: String },
    /// Two different resources rendered to the same address; the second one is dropped
    AddressCollision {
        address: String,
        kept: String,
        dropped: String,
    },
    NotInPlan { resource: String },
    /// A plan resource that has no counterpart in state
    MissingFromState { resource: String },
}

impl Diagnostic {
    /// Whether the user should see this without raising the log level
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Diagnostic::AddressCollision { .. } | Diagnostic::MissingFromState { .. }
        )
    }

    pub(crate) fn log(&self) {
        if self.is_warning() {
            warn!("{}", self);
        } else {
            info!("{}", self);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DataSource { resource } => {
                write!(f, "Skipping data resource: {}", resource)
            }
            Diagnostic::UnsupportedMode { resource, mode } => {
                write!(f, "Skipping resource {} with mode `{}`", resource, mode)
            }
            Diagnostic::ExcludedType { resource } => {
                write!(f, "Skipping excluded resource type: {}", resource)
            }
            Diagnostic::NoMatch { resource } => {
                write!(f, "Resource {} does not match any pattern", resource)
            }
            Diagnostic::MissingId { address, reason } => {
                write!(f, "No import ID for {}: {}", address, reason)
            }
            Diagnostic::DuplicateAddress { address } => {
                write!(f, "Skipping duplicate address: {}", address)
            }
            Diagnostic::AddressCollision {
                address,
                kept,
                dropped,
            } => write!(
                f,
                "Address {} is used by both {} and {}; skipping {} (try --address-style canonical)",
                address, kept, dropped, dropped
            ),
            Diagnostic::NotInPlan { resource } => {
                write!(f, "Resource {} is not part of the plan", resource)
            }
            Diagnostic::MissingFromState { resource } => {
                write!(f, "Resource {} is in the plan but not in the state file", resource)
            }
        }
    }
}

/// The outcome of a resolve run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub records: Vec<ImportRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    fn skip(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }
}

pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Computes the import records for every matching managed resource instance.
    ///
    /// Resources are walked in state order and instances in instance order, so
    /// the output order mirrors the input. Nothing here fails: a resource or
    /// instance that cannot be imported is skipped and recorded as a [`Diagnostic`].
    pub fn resolve(&self, state: &StateDocument, patterns: &PatternSet) -> Resolution {
        let mut resolution = Resolution::default();
        // address -> qualified name of the resource that first produced it
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut seen_records: HashSet<(String, String)> = HashSet::new();

        for resource in &state.resources {
            let label = resource.qualified_name();

            match &resource.mode {
                ResourceMode::Managed => {}
                ResourceMode::Data => {
                    resolution.skip(Diagnostic::DataSource { resource: label });
                    continue;
                }
                ResourceMode::Other(mode) => {
                    resolution.skip(Diagnostic::UnsupportedMode {
                        resource: label,
                        mode: mode.clone(),
                    });
                    continue;
                }
            }
            if self.config.excluded_types.contains(&resource.resource_type) {
                resolution.skip(Diagnostic::ExcludedType { resource: label });
                continue;
            }
            match patterns.matching(resource) {
                Some(pattern) => debug!("Matched resource {} with pattern {}", label, pattern),
                None => {
                    resolution.skip(Diagnostic::NoMatch { resource: label });
                    continue;
                }
            }

            for instance in &resource.instances {
                let address = resource
                    .instance_address(instance.index_key.as_ref(), self.config.address_style);

                let ids = match self.import_ids(&resource.resource_type, instance) {
                    Ok(ids) => ids,
                    Err(reason) => {
                        resolution.skip(Diagnostic::MissingId { address, reason });
                        continue;
                    }
                };

                for import_id in ids {
                    let owner = owners
                        .entry(address.clone())
                        .or_insert_with(|| label.clone());
                    if *owner != label {
                        resolution.skip(Diagnostic::AddressCollision {
                            address: address.clone(),
                            kept: owner.clone(),
                            dropped: label.clone(),
                        });
                        continue;
                    }

                    let per_cidr = self.config.sg_rule_policy == SecurityGroupRulePolicy::PerCidr
                        && resource.resource_type == SECURITY_GROUP_RULE;
                    let key = if per_cidr {
                        (address.clone(), import_id.clone())
                    } else {
                        (address.clone(), String::new())
                    };
                    if !seen_records.insert(key) {
                        resolution.skip(Diagnostic::DuplicateAddress {
                            address: address.clone(),
                        });
                        continue;
                    }

                    debug!("Adding resource: {} with ID: {}", address, import_id);
                    resolution.records.push(ImportRecord {
                        address: address.clone(),
                        import_id,
                    });
                }
            }
        }

        resolution
    }

    /// Derives the import id(s) of one instance, or the reason there is none
    fn import_ids(
        &self,
        resource_type: &str,
        instance: &InstanceRecord,
    ) -> std::result::Result<Vec<String>, String> {
        match resource_type {
            IAM_ROLE_POLICY_ATTACHMENT => {
                let role = required(instance, "role")?;
                let policy_arn = required(instance, "policy_arn")?;
                Ok(vec![format!("{}/{}", role, policy_arn)])
            }
            SECURITY_GROUP_RULE => security_group_rule_ids(instance, self.config.sg_rule_policy),
            _ => Ok(vec![required(instance, "id")?]),
        }
    }
}

fn required(instance: &InstanceRecord, attribute: &str) -> std::result::Result<String, String> {
    instance
        .scalar(attribute)
        .ok_or_else(|| format!("missing attribute `{}`", attribute))
}

fn security_group_rule_ids(
    instance: &InstanceRecord,
    policy: SecurityGroupRulePolicy,
) -> std::result::Result<Vec<String>, String> {
    let prefix = [
        "security_group_id",
        "type",
        "protocol",
        "from_port",
        "to_port",
    ]
    .iter()
    .map(|attribute| required(instance, attribute))
    .collect::<std::result::Result<Vec<_>, _>>()?
    .join("_");

    let source = instance.scalar("source_security_group_id");
    let cidr_blocks = instance.string_list("cidr_blocks");

    match policy {
        SecurityGroupRulePolicy::Single => match source {
            Some(source) => Ok(vec![format!("{}_self_{}", prefix, source)]),
            None if cidr_blocks.is_empty() => Ok(vec![format!("{}__", prefix)]),
            None => Ok(vec![format!("{}_{}", prefix, cidr_blocks.join("_"))]),
        },
        SecurityGroupRulePolicy::PerCidr => {
            let ids: Vec<String> = source
                .map(|source| format!("{}_self_{}", prefix, source))
                .into_iter()
                .chain(cidr_blocks.iter().map(|cidr| format!("{}_{}", prefix, cidr)))
                .collect();
            if ids.is_empty() {
                return Err("no source security group or CIDR blocks".to_string());
            }
            Ok(ids)
        }
    }
}

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::render::OutputFormat;
use crate::resolver::{ResolverConfig, SecurityGroupRulePolicy};
use crate::types::AddressStyle;

#[derive(Parser, Debug)]
#[command(
    name = "tfimport",
    author,
    version,
    about = "Generate Terraform import blocks or commands from a state file",
    long_about = None
)]
pub struct Cli {
    /// Path to the Terraform state file (JSON)
    #[arg(long)]
    pub state_file: PathBuf,

    /// File listing module/resource patterns, one per line
    #[arg(long, visible_alias = "modules-file")]
    pub patterns_file: PathBuf,

    /// Write the output here instead of stdout
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Output syntax
    #[arg(long, value_enum, default_value_t = OutputFormat::Blocks)]
    pub format: OutputFormat,

    /// Resource type that is never imported (repeatable)
    #[arg(long = "exclude-type", value_name = "TYPE")]
    pub exclude_types: Vec<String>,

    /// Do not start from the built-in excluded types
    #[arg(long)]
    pub no_default_excludes: bool,

    /// How aws_security_group_rule import ids are built
    #[arg(long, value_enum, default_value_t = SgRulePolicyArg::Single)]
    pub sg_rule_policy: SgRulePolicyArg,

    /// How instance addresses are written
    #[arg(long, value_enum, default_value_t = AddressStyleArg::TypeIndexed)]
    pub address_style: AddressStyleArg,

    /// Only consider resources present in this plan JSON (`terraform show -json`)
    #[arg(long)]
    pub plan_json: Option<PathBuf>,

    /// Only consider plan changes with this action (repeatable)
    #[arg(long = "plan-action", value_name = "ACTION", requires = "plan_json")]
    pub plan_actions: Vec<String>,

    /// Run `terraform import` for each resource instead of writing output
    #[arg(long)]
    pub execute: bool,

    /// Directory to run terraform in
    #[arg(long, default_value = ".")]
    pub working_dir: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SgRulePolicyArg {
    /// One id per rule, source security group preferred over CIDR blocks
    Single,
    /// One id per CIDR block (plus one for the source security group)
    PerCidr,
}

impl std::fmt::Display for SgRulePolicyArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SgRulePolicyArg::Single => write!(f, "single"),
            SgRulePolicyArg::PerCidr => write!(f, "per-cidr"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AddressStyleArg {
    /// module.x.aws_type["key"]
    TypeIndexed,
    /// module.x.aws_type.name["key"]
    Canonical,
}

impl std::fmt::Display for AddressStyleArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressStyleArg::TypeIndexed => write!(f, "type-indexed"),
            AddressStyleArg::Canonical => write!(f, "canonical"),
        }
    }
}

impl Cli {
    /// Builds the resolver configuration from the flags
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut config = ResolverConfig::default();
        if self.no_default_excludes {
            config.excluded_types.clear();
        }
        config.sg_rule_policy = match self.sg_rule_policy {
            SgRulePolicyArg::Single => SecurityGroupRulePolicy::Single,
            SgRulePolicyArg::PerCidr => SecurityGroupRulePolicy::PerCidr,
        };
        config.address_style = match self.address_style {
            AddressStyleArg::TypeIndexed => AddressStyle::TypeIndexed,
            AddressStyleArg::Canonical => AddressStyle::Canonical,
        };
        config.exclude(self.exclude_types.iter().cloned())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

pub mod cli;
pub mod display;
pub mod error;
pub mod executor;
pub mod patterns;
pub mod plan;
pub mod render;
pub mod resolver;
pub mod state;
pub mod types;

pub use error::{Result, TfimportError};
pub use patterns::PatternSet;
pub use resolver::{Diagnostic, Resolution, Resolver, ResolverConfig, SecurityGroupRulePolicy};
pub use state::StateDocument;
pub use types::{AddressStyle, ImportRecord};

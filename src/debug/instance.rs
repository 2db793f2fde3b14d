//! Resource state handed to lifecycle hooks by the orchestration engine

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one resource instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceInfo {
    /// Resource type, e.g. `aws_instance`
    pub resource_type: String,
    /// Resource name within its module
    pub id: String,
    /// Module path below the root module; empty for root resources
    #[serde(default)]
    pub module_path: Vec<String>,
}

impl InstanceInfo {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            module_path: Vec::new(),
        }
    }

    pub fn with_module_path(mut self, path: Vec<String>) -> Self {
        self.module_path = path;
        self
    }

    /// Address a person would type: `module.net.module.vpc.aws_vpc.main`.
    pub fn human_id(&self) -> String {
        let mut out = String::new();
        for module in &self.module_path {
            out.push_str("module.");
            out.push_str(module);
            out.push('.');
        }
        out.push_str(&self.resource_type);
        out.push('.');
        out.push_str(&self.id);
        out
    }
}

/// Last known state of a resource instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    /// Provider-assigned id; empty until the resource exists
    pub id: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub tainted: bool,
}

impl InstanceState {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_empty() {
            return f.write_str("<not created>");
        }
        write!(f, "ID = {}", self.id)?;
        for (key, value) in &self.attributes {
            write!(f, "\n{key} = {value}")?;
        }
        if self.tainted {
            f.write_str("\nTainted = true")?;
        }
        Ok(())
    }
}

/// Planned change to a resource instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDiff {
    pub attributes: BTreeMap<String, AttrDiff>,
    #[serde(default)]
    pub destroy: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrDiff {
    pub old: String,
    pub new: String,
    #[serde(default)]
    pub new_computed: bool,
    #[serde(default)]
    pub requires_new: bool,
}

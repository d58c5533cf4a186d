//! Logical file roles

use super::definition::DefinitionRole;

/// Distribution templates shipped read-only and copied on install
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistTemplate {
    /// Template for the container definitions file
    ContainerDefinitions,
    /// Template for the parameters file
    Parameters,
    /// Template for the plugin configuration file
    PluginConfig,
}

impl DistTemplate {
    /// All templates, in the order they are installed
    pub const ALL: [DistTemplate; 3] = [
        DistTemplate::ContainerDefinitions,
        DistTemplate::Parameters,
        DistTemplate::PluginConfig,
    ];

    /// Runtime role the template is installed as
    pub fn installs_as(self) -> FileRole {
        match self {
            Self::ContainerDefinitions => FileRole::ContainerDefinitions,
            Self::Parameters => FileRole::Parameters,
            Self::PluginConfig => FileRole::PluginConfig,
        }
    }
}

/// Files and directories the path resolver can locate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// Container definitions (runtime area)
    ContainerDefinitions,
    /// Parameters (runtime area)
    Parameters,
    /// Plugin configuration (runtime area)
    PluginConfig,
    /// Directory receiving proxy manifests (runtime area)
    ProxyDir,
    /// Read-only template (distribution area)
    DistributionTemplate(DistTemplate),
}

impl FileRole {
    /// Definition role, for roles that hold definitions
    pub fn definition_role(self) -> Option<DefinitionRole> {
        match self {
            Self::ContainerDefinitions => Some(DefinitionRole::Container),
            Self::Parameters => Some(DefinitionRole::Parameters),
            _ => None,
        }
    }

    /// Whether the role lives in the read-only distribution area
    pub fn is_distribution(self) -> bool {
        matches!(self, Self::DistributionTemplate(_))
    }
}

impl From<DefinitionRole> for FileRole {
    fn from(role: DefinitionRole) -> Self {
        match role {
            DefinitionRole::Container => Self::ContainerDefinitions,
            DefinitionRole::Parameters => Self::Parameters,
        }
    }
}

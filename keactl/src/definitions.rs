use std::fs;
use std::path::{Path, PathBuf};

use kea_protocol::{DefinitionRegistry, OptionDefinition, OptionType, SingleOptionData, Universe};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(default)]
    definition: Vec<OptionDefinition>,
}

/// Errors returned when loading option definition files.
#[derive(Debug, Error)]
pub enum DefinitionLoadError {
    #[error("failed to read definitions file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse definitions file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("definition '{name}' (code {code}) in {path} has no option space")]
    MissingSpace { path: String, name: String, code: u16 },
}

/// Load option definitions from a TOML file of `[[definition]]` tables.
pub fn load_definitions(path: &Path) -> Result<Vec<OptionDefinition>, DefinitionLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| DefinitionLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_definitions(&raw, path.display().to_string())
}

/// Built-in definitions of the standard DHCPv4 and DHCPv6 options.
pub fn standard_definitions() -> Vec<OptionDefinition> {
    let embedded = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/definitions/standard.toml"
    ));
    match parse_definitions(embedded, "embedded definitions".to_string()) {
        Ok(definitions) if !definitions.is_empty() => definitions,
        Ok(_) => {
            tracing::warn!("embedded option definitions are empty, using fallback list");
            fallback_definitions()
        }
        Err(err) => {
            tracing::warn!(error = %err, "using fallback option definitions");
            fallback_definitions()
        }
    }
}

/// Registry of the standard definitions overlaid with those read from
/// `extra_files`, later files replacing earlier entries.
pub fn build_registry(extra_files: &[PathBuf]) -> Result<DefinitionRegistry, DefinitionLoadError> {
    let mut registry = DefinitionRegistry::with_definitions(standard_definitions());
    for path in extra_files {
        let definitions = load_definitions(path)?;
        tracing::debug!(
            path = %path.display(),
            count = definitions.len(),
            "loaded option definitions"
        );
        for definition in definitions {
            if let Some(previous) = registry.insert(definition) {
                tracing::debug!(
                    space = %previous.space,
                    code = previous.code,
                    "replaced option definition"
                );
            }
        }
    }
    Ok(registry)
}

/// Fill in what Kea infers for an `option-data` item: a missing space is
/// the top-level space of `universe`, and an item giving only a name takes
/// the code of the defined option of that name.
pub fn complete_option_data(
    data: &mut SingleOptionData,
    universe: Universe,
    registry: &DefinitionRegistry,
) {
    if data.space.is_empty() {
        data.space = universe.top_level_space().to_string();
    }
    if data.code == 0 && !data.name.is_empty() {
        if let Some(code) = registry.code_of(&data.space, &data.name) {
            data.code = code;
        }
    }
}

fn parse_definitions(raw: &str, path: String) -> Result<Vec<OptionDefinition>, DefinitionLoadError> {
    let parsed: DefinitionFile = toml::from_str(raw).map_err(|source| DefinitionLoadError::Parse {
        path: path.clone(),
        source,
    })?;

    if let Some(definition) = parsed.definition.iter().find(|d| d.space.is_empty()) {
        return Err(DefinitionLoadError::MissingSpace {
            path,
            name: definition.name.clone(),
            code: definition.code,
        });
    }
    Ok(parsed.definition)
}

fn fallback_definitions() -> Vec<OptionDefinition> {
    vec![
        definition(3, "routers", "dhcp4", OptionType::Ipv4Address, true),
        definition(6, "domain-name-servers", "dhcp4", OptionType::Ipv4Address, true),
        definition(12, "host-name", "dhcp4", OptionType::String, false),
        definition(15, "domain-name", "dhcp4", OptionType::Fqdn, false),
        definition(51, "dhcp-lease-time", "dhcp4", OptionType::Uint32, false),
        definition(23, "dns-servers", "dhcp6", OptionType::Ipv6Address, true),
        definition(24, "domain-search", "dhcp6", OptionType::Fqdn, true),
    ]
}

fn definition(
    code: u16,
    name: &str,
    space: &str,
    option_type: OptionType,
    array: bool,
) -> OptionDefinition {
    OptionDefinition {
        code,
        name: name.to_string(),
        space: space.to_string(),
        option_type,
        record_types: Vec::new(),
        array,
        encapsulate: String::new(),
    }
}

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::field::OptionType;
use super::{DaemonId, DhcpOption};

/// Definition of an option format, in the shape of a Kea `option-def` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OptionDefinition {
    pub code: u16,
    pub name: String,
    /// Empty means the top-level space of the daemon declaring it.
    #[serde(default)]
    pub space: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    #[serde(
        default,
        with = "record_types",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub record_types: Vec<OptionType>,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub encapsulate: String,
}

impl OptionDefinition {
    /// Type of the field at `index` in option data following this definition,
    /// or `None` when the definition declares no field at that position.
    ///
    /// Arrays repeat their element type; record arrays repeat the last
    /// record type.
    pub fn field_type(&self, index: usize) -> Option<OptionType> {
        match self.option_type {
            OptionType::Empty => None,
            OptionType::Record => self.record_types.get(index).copied().or_else(|| {
                if self.array {
                    self.record_types.last().copied()
                } else {
                    None
                }
            }),
            single if self.array || index == 0 => Some(single),
            _ => None,
        }
    }
}

/// Capability to find the definition of an option.
///
/// `daemon` selects the daemon whose custom definitions are consulted in
/// addition to the standard ones; `None` consults standard definitions only.
pub trait OptionDefinitionLookup {
    fn find(&self, daemon: Option<DaemonId>, option: &dyn DhcpOption) -> Option<&OptionDefinition>;

    fn definition_exists(&self, daemon: Option<DaemonId>, option: &dyn DhcpOption) -> bool {
        self.find(daemon, option).is_some()
    }
}

type DefinitionKey = (String, u16);

/// In-memory definitions: a global set plus per-daemon custom definitions,
/// which take precedence for their daemon.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    global: HashMap<DefinitionKey, OptionDefinition>,
    daemons: HashMap<DaemonId, HashMap<DefinitionKey, OptionDefinition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(definitions: impl IntoIterator<Item = OptionDefinition>) -> Self {
        let mut registry = Self::new();
        for definition in definitions {
            registry.insert(definition);
        }
        registry
    }

    /// Add a global definition, replacing one with the same space and code.
    pub fn insert(&mut self, definition: OptionDefinition) -> Option<OptionDefinition> {
        self.global.insert(key_of(&definition), definition)
    }

    /// Add a definition visible only to lookups for `daemon`.
    pub fn insert_for_daemon(
        &mut self,
        daemon: DaemonId,
        definition: OptionDefinition,
    ) -> Option<OptionDefinition> {
        self.daemons
            .entry(daemon)
            .or_default()
            .insert(key_of(&definition), definition)
    }

    /// Global definition for an option space and code.
    pub fn get(&self, space: &str, code: u16) -> Option<&OptionDefinition> {
        self.global.get(&(space.to_string(), code))
    }

    /// Code of the global definition named `name` in `space`.
    pub fn code_of(&self, space: &str, name: &str) -> Option<u16> {
        self.global
            .values()
            .find(|definition| definition.space == space && definition.name == name)
            .map(|definition| definition.code)
    }

    /// Number of global definitions.
    pub fn len(&self) -> usize {
        self.global.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }
}

impl OptionDefinitionLookup for DefinitionRegistry {
    fn find(&self, daemon: Option<DaemonId>, option: &dyn DhcpOption) -> Option<&OptionDefinition> {
        let key = (option.space().to_string(), option.code());
        daemon
            .and_then(|id| self.daemons.get(&id))
            .and_then(|definitions| definitions.get(&key))
            .or_else(|| self.global.get(&key))
    }
}

fn key_of(definition: &OptionDefinition) -> DefinitionKey {
    (definition.space.clone(), definition.code)
}

/// Kea spells `record-types` as one comma-separated string.
mod record_types {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::option::field::OptionType;

    pub(super) fn serialize<S>(types: &[OptionType], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let joined = types
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        serializer.serialize_str(&joined)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<OptionType>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| name.parse().map_err(de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{DefinitionRegistry, OptionDefinition, OptionDefinitionLookup};
    use crate::option::{DhcpOptionData, OptionType, Universe};

    fn definition(code: u16, space: &str, option_type: OptionType) -> OptionDefinition {
        OptionDefinition {
            code,
            name: format!("option-{code}"),
            space: space.to_string(),
            option_type,
            record_types: Vec::new(),
            array: false,
            encapsulate: String::new(),
        }
    }

    #[test]
    fn scalar_definitions_have_one_field() {
        let def = definition(26, "dhcp4", OptionType::Uint16);
        assert_eq!(def.field_type(0), Some(OptionType::Uint16));
        assert_eq!(def.field_type(1), None);
    }

    #[test]
    fn arrays_repeat_their_type() {
        let mut def = definition(6, "dhcp4", OptionType::Ipv4Address);
        def.array = true;
        assert_eq!(def.field_type(5), Some(OptionType::Ipv4Address));
    }

    #[test]
    fn records_follow_record_types() {
        let mut def = definition(212, "dhcp4", OptionType::Record);
        def.record_types = vec![
            OptionType::Uint8,
            OptionType::Uint8,
            OptionType::Ipv6Address,
            OptionType::Ipv4Address,
        ];
        assert_eq!(def.field_type(2), Some(OptionType::Ipv6Address));
        assert_eq!(def.field_type(4), None);

        def.array = true;
        assert_eq!(def.field_type(7), Some(OptionType::Ipv4Address));
    }

    #[test]
    fn empty_definitions_have_no_fields() {
        let def = definition(43, "dhcp4", OptionType::Empty);
        assert_eq!(def.field_type(0), None);
    }

    #[test]
    fn parses_kea_option_def() {
        let def: OptionDefinition = serde_json::from_str(
            r#"{"code": 222, "name": "foo", "space": "dhcp4", "type": "record",
                "record-types": "uint8, ipv4-address", "array": false}"#,
        )
        .expect("parse");
        assert_eq!(
            def.record_types,
            vec![OptionType::Uint8, OptionType::Ipv4Address]
        );
        assert_eq!(
            serde_json::to_value(&def).expect("serialize")["record-types"],
            "uint8, ipv4-address"
        );

        let err = serde_json::from_str::<OptionDefinition>(
            r#"{"code": 1, "name": "x", "type": "record", "record-types": "uint8, int64"}"#,
        )
        .expect_err("unknown record type");
        assert!(err.to_string().contains("int64"));
    }

    #[test]
    fn daemon_definitions_take_precedence() {
        let mut registry =
            DefinitionRegistry::with_definitions([definition(100, "dhcp4", OptionType::String)]);
        registry.insert_for_daemon(7, definition(100, "dhcp4", OptionType::Uint8));
        registry.insert_for_daemon(7, definition(101, "dhcp4", OptionType::Uint8));

        let option = DhcpOptionData::new(100, Universe::V4);
        let found = registry.find(Some(7), &option).expect("daemon definition");
        assert_eq!(found.option_type, OptionType::Uint8);
        let found = registry.find(None, &option).expect("global definition");
        assert_eq!(found.option_type, OptionType::String);
        let found = registry.find(Some(8), &option).expect("global fallback");
        assert_eq!(found.option_type, OptionType::String);

        let custom = DhcpOptionData::new(101, Universe::V4);
        assert!(registry.definition_exists(Some(7), &custom));
        assert!(!registry.definition_exists(None, &custom));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.code_of("dhcp4", "option-100"), Some(100));
        assert_eq!(registry.code_of("dhcp6", "option-100"), None);
    }
}

//! DHCP option model and conversion to and from Kea `option-data`.
//!
//! Two representations of an option exist:
//!
//! - [`SingleOptionData`] is an item of Kea's `option-data` list. Its payload
//!   is a single string, either comma separated values (`csv-format: true`)
//!   or a run of hexadecimal digits.
//! - [`DhcpOptionData`] holds the option as a list of typed fields. Any type
//!   implementing [`DhcpOption`] (a database model, for example) can be used
//!   in its place.
//!
//! [`create_single_option_data`] and [`create_dhcp_option`] convert between
//! the two. Which payload format is used depends on whether an
//! [`OptionDefinition`] is known for the option: known options are rendered
//! as CSV, unknown ones as hex.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod codec;
mod definition;
mod field;

pub use codec::{create_dhcp_option, create_single_option_data};
pub use definition::{DefinitionRegistry, OptionDefinition, OptionDefinitionLookup};
pub use field::{encode_field, infer_field, parse_field, split_csv, DhcpOptionField, OptionType};

/// Top-level DHCPv4 option space.
pub const DHCP4_OPTION_SPACE: &str = "dhcp4";
/// Top-level DHCPv6 option space.
pub const DHCP6_OPTION_SPACE: &str = "dhcp6";

/// Identifier of the daemon whose configuration provides the context of a
/// definition lookup (its custom `option-def` entries).
pub type DaemonId = i64;

/// Errors raised while converting an option. They affect only the option
/// being converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionError {
    /// The field type has no field representation.
    #[error("unsupported option field type {field_type}")]
    UnsupportedFieldType { field_type: OptionType },
    /// The value cannot be represented as the field type.
    #[error("invalid {field_type} option field value '{value}': {reason}")]
    InvalidField {
        field_type: OptionType,
        value: String,
        reason: String,
    },
}

impl OptionError {
    pub(crate) fn invalid(
        field_type: OptionType,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field_type,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// IP protocol family an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Universe {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl Universe {
    /// Name of the top-level option space of this universe.
    pub fn top_level_space(self) -> &'static str {
        match self {
            Self::V4 => DHCP4_OPTION_SPACE,
            Self::V6 => DHCP6_OPTION_SPACE,
        }
    }
}

impl Display for Universe {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4 => write!(f, "IPv4"),
            Self::V6 => write!(f, "IPv6"),
        }
    }
}

/// Capabilities of a DHCP option in the field-typed model.
pub trait DhcpOption {
    /// Whether the server sends the option even when not requested.
    fn always_send(&self) -> bool;
    fn code(&self) -> u16;
    /// Option space encapsulated by this option.
    fn encapsulate(&self) -> &str;
    fn fields(&self) -> &[DhcpOptionField];
    fn name(&self) -> &str;
    fn space(&self) -> &str;
    fn universe(&self) -> Universe;
}

/// An item of Kea's `option-data` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SingleOptionData {
    #[serde(default, skip_serializing_if = "is_false")]
    pub always_send: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: u16,
    /// Kea treats a missing `csv-format` as `true`.
    #[serde(default = "default_csv_format")]
    pub csv_format: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub space: String,
}

impl Default for SingleOptionData {
    fn default() -> Self {
        Self {
            always_send: false,
            code: 0,
            csv_format: default_csv_format(),
            data: String::new(),
            name: String::new(),
            space: String::new(),
        }
    }
}

fn default_csv_format() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn is_zero(value: &u16) -> bool {
    *value == 0
}

/// A DHCP option described by typed fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DhcpOptionData {
    #[serde(default)]
    pub always_send: bool,
    pub code: u16,
    #[serde(default)]
    pub encapsulate: String,
    #[serde(default)]
    pub fields: Vec<DhcpOptionField>,
    #[serde(default)]
    pub name: String,
    pub space: String,
    pub universe: Universe,
}

impl DhcpOptionData {
    /// Create an option without fields in the top-level space of `universe`.
    pub fn new(code: u16, universe: Universe) -> Self {
        Self {
            always_send: false,
            code,
            encapsulate: String::new(),
            fields: Vec::new(),
            name: String::new(),
            space: universe.top_level_space().to_string(),
            universe,
        }
    }

    pub fn with_field(mut self, field: DhcpOptionField) -> Self {
        self.fields.push(field);
        self
    }
}

impl DhcpOption for DhcpOptionData {
    fn always_send(&self) -> bool {
        self.always_send
    }

    fn code(&self) -> u16 {
        self.code
    }

    fn encapsulate(&self) -> &str {
        &self.encapsulate
    }

    fn fields(&self) -> &[DhcpOptionField] {
        &self.fields
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn space(&self) -> &str {
        &self.space
    }

    fn universe(&self) -> Universe {
        self.universe
    }
}

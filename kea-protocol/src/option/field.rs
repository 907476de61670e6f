use std::fmt::{self, Display, Formatter};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OptionError;

const MAX_FQDN_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// Kea option data types, as used in option definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionType {
    Empty,
    Binary,
    Boolean,
    Int8,
    Int16,
    Int32,
    Uint8,
    Uint16,
    Uint32,
    Ipv4Address,
    Ipv6Address,
    Ipv6Prefix,
    Psid,
    Record,
    String,
    Tuple,
    Fqdn,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Binary => "binary",
            Self::Boolean => "boolean",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Ipv4Address => "ipv4-address",
            Self::Ipv6Address => "ipv6-address",
            Self::Ipv6Prefix => "ipv6-prefix",
            Self::Psid => "psid",
            Self::Record => "record",
            Self::String => "string",
            Self::Tuple => "tuple",
            Self::Fqdn => "fqdn",
        }
    }
}

impl Display for OptionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.trim() {
            "empty" => Self::Empty,
            "binary" => Self::Binary,
            "boolean" => Self::Boolean,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "ipv4-address" => Self::Ipv4Address,
            "ipv6-address" => Self::Ipv6Address,
            "ipv6-prefix" => Self::Ipv6Prefix,
            "psid" => Self::Psid,
            "record" => Self::Record,
            "string" => Self::String,
            "tuple" => Self::Tuple,
            "fqdn" => Self::Fqdn,
            other => return Err(format!("unknown option data type '{other}'")),
        };
        Ok(parsed)
    }
}

/// One typed field of a DHCP option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum DhcpOptionField {
    /// Raw bytes as hexadecimal digits, optionally separated by colons or spaces.
    HexBytes(String),
    String(String),
    Bool(bool),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Ipv4Address(Ipv4Addr),
    Ipv6Address(Ipv6Addr),
    Ipv6Prefix { prefix: Ipv6Addr, length: u8 },
    /// Port set identifier (RFC 7597) with its length in bits.
    Psid { psid: u16, length: u8 },
    Fqdn(String),
}

impl DhcpOptionField {
    pub fn field_type(&self) -> OptionType {
        match self {
            Self::HexBytes(_) => OptionType::Binary,
            Self::String(_) => OptionType::String,
            Self::Bool(_) => OptionType::Boolean,
            Self::Uint8(_) => OptionType::Uint8,
            Self::Uint16(_) => OptionType::Uint16,
            Self::Uint32(_) => OptionType::Uint32,
            Self::Ipv4Address(_) => OptionType::Ipv4Address,
            Self::Ipv6Address(_) => OptionType::Ipv6Address,
            Self::Ipv6Prefix { .. } => OptionType::Ipv6Prefix,
            Self::Psid { .. } => OptionType::Psid,
            Self::Fqdn(_) => OptionType::Fqdn,
        }
    }
}

/// Render a field as a CSV token (`csv` true) or as hexadecimal digits.
///
/// Hex bytes are rendered as hex in both cases. Hex output is lowercase.
pub fn encode_field(field: &DhcpOptionField, csv: bool) -> Result<String, OptionError> {
    let encoded = match field {
        DhcpOptionField::HexBytes(value) => normalize_hex(value)?,
        DhcpOptionField::String(value) if csv => quote_csv(value),
        DhcpOptionField::String(value) => hex::encode(value.as_bytes()),
        DhcpOptionField::Bool(value) if csv => value.to_string(),
        DhcpOptionField::Bool(value) => format!("{:02x}", u8::from(*value)),
        DhcpOptionField::Uint8(value) if csv => value.to_string(),
        DhcpOptionField::Uint8(value) => format!("{value:02x}"),
        DhcpOptionField::Uint16(value) if csv => value.to_string(),
        DhcpOptionField::Uint16(value) => format!("{value:04x}"),
        DhcpOptionField::Uint32(value) if csv => value.to_string(),
        DhcpOptionField::Uint32(value) => format!("{value:08x}"),
        DhcpOptionField::Ipv4Address(addr) if csv => addr.to_string(),
        DhcpOptionField::Ipv4Address(addr) => hex::encode(addr.octets()),
        DhcpOptionField::Ipv6Address(addr) if csv => addr.to_string(),
        DhcpOptionField::Ipv6Address(addr) => hex::encode(addr.octets()),
        DhcpOptionField::Ipv6Prefix { prefix, length } => {
            check_prefix_length(*prefix, *length)?;
            if csv {
                format!("{prefix}/{length}")
            } else {
                format!("{}{length:02x}", hex::encode(prefix.octets()))
            }
        }
        DhcpOptionField::Psid { psid, length } => {
            check_psid(*psid, *length)?;
            if csv {
                format!("{psid}/{length}")
            } else {
                // PSID length first, then the PSID left-aligned in 16 bits.
                let aligned = if *length == 0 {
                    0
                } else {
                    *psid << (16 - u32::from(*length))
                };
                format!("{length:02x}{aligned:04x}")
            }
        }
        DhcpOptionField::Fqdn(name) => {
            let labels = fqdn_labels(name)?;
            if csv {
                name.trim().to_string()
            } else {
                let mut out = String::new();
                for label in labels {
                    out.push_str(&format!("{:02x}", label.len()));
                    out.push_str(&hex::encode(label.as_bytes()));
                }
                out.push_str("00");
                out
            }
        }
    };
    Ok(encoded)
}

/// Parse a CSV token as a field of the given definition type.
pub fn parse_field(field_type: OptionType, token: &str) -> Result<DhcpOptionField, OptionError> {
    let token = token.trim();
    let field = match field_type {
        OptionType::Binary => DhcpOptionField::HexBytes(normalize_hex(token)?),
        OptionType::String => DhcpOptionField::String(unquote_csv(token)),
        OptionType::Boolean => match token.to_ascii_lowercase().as_str() {
            "true" | "1" => DhcpOptionField::Bool(true),
            "false" | "0" => DhcpOptionField::Bool(false),
            _ => {
                return Err(OptionError::invalid(
                    field_type,
                    token,
                    "expected true, false, 1 or 0",
                ))
            }
        },
        OptionType::Uint8 => DhcpOptionField::Uint8(parse_number(field_type, token)?),
        OptionType::Uint16 => DhcpOptionField::Uint16(parse_number(field_type, token)?),
        OptionType::Uint32 => DhcpOptionField::Uint32(parse_number(field_type, token)?),
        OptionType::Ipv4Address => DhcpOptionField::Ipv4Address(
            token
                .parse()
                .map_err(|err| OptionError::invalid(field_type, token, format!("{err}")))?,
        ),
        OptionType::Ipv6Address => DhcpOptionField::Ipv6Address(
            token
                .parse()
                .map_err(|err| OptionError::invalid(field_type, token, format!("{err}")))?,
        ),
        OptionType::Ipv6Prefix => {
            let (prefix, length) = split_slash(field_type, token)?;
            let prefix: Ipv6Addr = prefix
                .parse()
                .map_err(|err| OptionError::invalid(field_type, token, format!("{err}")))?;
            let length: u8 = parse_number(field_type, length)?;
            check_prefix_length(prefix, length)?;
            DhcpOptionField::Ipv6Prefix { prefix, length }
        }
        OptionType::Psid => {
            let (psid, length) = split_slash(field_type, token)?;
            let psid: u16 = parse_number(field_type, psid)?;
            let length: u8 = parse_number(field_type, length)?;
            check_psid(psid, length)?;
            DhcpOptionField::Psid { psid, length }
        }
        OptionType::Fqdn => {
            fqdn_labels(token)?;
            DhcpOptionField::Fqdn(token.to_string())
        }
        OptionType::Empty
        | OptionType::Record
        | OptionType::Int8
        | OptionType::Int16
        | OptionType::Int32
        | OptionType::Tuple => return Err(OptionError::UnsupportedFieldType { field_type }),
    };
    Ok(field)
}

/// Guess the type of a CSV token when no definition is known.
///
/// Never fails: anything that is not a number, boolean, address or prefix
/// becomes a string field.
pub fn infer_field(token: &str) -> DhcpOptionField {
    let token = token.trim();
    if let Ok(value) = token.parse::<u32>() {
        return DhcpOptionField::Uint32(value);
    }
    match token.to_ascii_lowercase().as_str() {
        "true" => return DhcpOptionField::Bool(true),
        "false" => return DhcpOptionField::Bool(false),
        _ => {}
    }
    if let Ok(addr) = token.parse::<Ipv4Addr>() {
        return DhcpOptionField::Ipv4Address(addr);
    }
    if let Ok(addr) = token.parse::<Ipv6Addr>() {
        return DhcpOptionField::Ipv6Address(addr);
    }
    if let Some((prefix, length)) = token.split_once('/') {
        if let (Ok(prefix), Ok(length)) = (prefix.parse::<Ipv6Addr>(), length.parse::<u8>()) {
            if length <= 128 {
                return DhcpOptionField::Ipv6Prefix { prefix, length };
            }
        }
    }
    DhcpOptionField::String(unquote_csv(token))
}

/// Split option data on commas.
///
/// A token whose text starts with a double quote is quoted: commas inside it
/// do not split and a doubled quote stands for a literal one. A quote
/// anywhere else is an ordinary character. Data with an unterminated quoted
/// token is split on every comma. Tokens are trimmed; quotes are kept so
/// that string fields can be unquoted by the field parser.
pub fn split_csv(data: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = data.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                current.push(c);
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if current.trim().is_empty() => {
                quoted = true;
                current.push(c);
            }
            ',' if !quoted => {
                tokens.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if quoted {
        return data.split(',').map(|token| token.trim().to_string()).collect();
    }
    tokens.push(current.trim().to_string());
    tokens
}

fn quote_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn unquote_csv(token: &str) -> String {
    match token
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => token.to_string(),
    }
}

/// Strip separators from a hex string, validate it and lowercase it.
fn normalize_hex(value: &str) -> Result<String, OptionError> {
    let digits: String = value
        .chars()
        .filter(|c| *c != ':' && !c.is_whitespace())
        .collect();
    let bytes = hex::decode(&digits)
        .map_err(|err| OptionError::invalid(OptionType::Binary, value, format!("{err}")))?;
    Ok(hex::encode(bytes))
}

fn parse_number<T>(field_type: OptionType, token: &str) -> Result<T, OptionError>
where
    T: FromStr,
    T::Err: Display,
{
    token
        .trim()
        .parse()
        .map_err(|err| OptionError::invalid(field_type, token, format!("{err}")))
}

fn split_slash(field_type: OptionType, token: &str) -> Result<(&str, &str), OptionError> {
    token
        .split_once('/')
        .map(|(left, right)| (left.trim(), right.trim()))
        .ok_or_else(|| OptionError::invalid(field_type, token, "expected <value>/<length>"))
}

fn check_prefix_length(prefix: Ipv6Addr, length: u8) -> Result<(), OptionError> {
    if length > 128 {
        return Err(OptionError::invalid(
            OptionType::Ipv6Prefix,
            format!("{prefix}/{length}"),
            "prefix length exceeds 128",
        ));
    }
    Ok(())
}

fn check_psid(psid: u16, length: u8) -> Result<(), OptionError> {
    let value = format!("{psid}/{length}");
    if length > 16 {
        return Err(OptionError::invalid(
            OptionType::Psid,
            value,
            "psid length exceeds 16",
        ));
    }
    if u32::from(psid) >= 1u32 << length {
        return Err(OptionError::invalid(
            OptionType::Psid,
            value,
            format!("psid does not fit in {length} bits"),
        ));
    }
    Ok(())
}

fn fqdn_labels(name: &str) -> Result<Vec<&str>, OptionError> {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(OptionError::invalid(
            OptionType::Fqdn,
            name,
            "domain name is empty",
        ));
    }
    if trimmed.len() > MAX_FQDN_LENGTH {
        return Err(OptionError::invalid(
            OptionType::Fqdn,
            name,
            "domain name is too long",
        ));
    }
    let labels: Vec<&str> = trimmed.split('.').collect();
    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
            return Err(OptionError::invalid(
                OptionType::Fqdn,
                name,
                format!("label '{label}' must be 1 to {MAX_LABEL_LENGTH} characters long"),
            ));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(OptionError::invalid(
                OptionType::Fqdn,
                name,
                format!("label '{label}' contains invalid characters"),
            ));
        }
    }
    Ok(labels)
}

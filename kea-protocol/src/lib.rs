//! Kea control-channel protocol and DHCP option codec.
//!
//! The crate covers the two pieces of talking to a fleet of Kea daemons that
//! are independent of any transport:
//!
//! - [`command`] and [`response`] build control commands, decode the reply
//!   array returned by the control agent, tag every element with the daemon
//!   that produced it and optionally fingerprint its arguments.
//! - [`status`] turns a response result code into a descriptive error.
//! - [`option`] converts DHCP options between the field-typed model and the
//!   `option-data` records found in Kea configurations.
//!
//! Everything here is synchronous and free of shared state, so independent
//! exchanges can be processed concurrently without coordination.

pub mod command;
pub mod fingerprint;
pub mod option;
pub mod response;
pub mod status;

pub use command::{Command, CommandError, SerializableCommand};
pub use fingerprint::{fnv128a, fnv128a_hex};
pub use option::{
    create_dhcp_option, create_single_option_data, encode_field, DaemonId, DefinitionRegistry,
    DhcpOption, DhcpOptionData, DhcpOptionField, OptionDefinition, OptionDefinitionLookup,
    OptionError, OptionType, SingleOptionData, Universe,
};
pub use response::{
    marshal_response_list, unmarshal_response_list, ControlResponse, ExaminableResponse,
    HashedResponse, Response, ResponseHeader, ResponseParseError,
};
pub use status::{check_response, ResponseStatus, ResponseStatusError};

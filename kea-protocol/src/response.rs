//! Decoding of control agent replies.
//!
//! The control agent answers a command with a JSON array holding one element
//! per daemon listed in the command's `service`. The wire format carries no
//! daemon identifier, so elements are matched to daemons by position: element
//! `i` belongs to the `i`-th daemon of the (sorted) command daemon list. This
//! relies on the agent preserving request order.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::command::SerializableCommand;
use crate::fingerprint::fnv128a_hex;
use crate::status::ResponseStatus;

/// Errors that can occur while decoding a reply.
#[derive(Debug, Error)]
pub enum ResponseParseError {
    /// Reply was not valid JSON or did not match the response records.
    #[error("failed to parse responses from Kea: {payload}: {source}")]
    Decode {
        payload: String,
        #[source]
        source: serde_json::Error,
    },
    /// Reply could not be re-read to fingerprint the arguments.
    #[error("failed to compute hashes for Kea responses: {payload}: {source}")]
    Hash {
        payload: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Fields common to every response element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    #[serde(default)]
    pub result: i64,
    #[serde(default)]
    pub text: String,
    /// Daemon that produced the response. Set by correlation, never read
    /// from or written to the wire.
    #[serde(skip)]
    pub daemon: String,
}

/// A response from a single Kea daemon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(flatten)]
    pub header: ResponseHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Map<String, Value>>,
}

/// A response from a single Kea daemon with a fingerprint of its arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HashedResponse {
    #[serde(flatten)]
    pub header: ResponseHeader,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Map<String, Value>>,
    /// FNV-1a/128 of the raw `arguments` bytes; `None` when the daemon sent
    /// no arguments.
    #[serde(skip)]
    pub arguments_hash: Option<String>,
}

/// Read access to the parts of a response needed to judge its outcome.
pub trait ExaminableResponse {
    fn result(&self) -> i64;
    fn text(&self) -> &str;
    fn daemon(&self) -> &str;
    fn arguments(&self) -> Option<&Map<String, Value>>;

    fn status(&self) -> ResponseStatus {
        ResponseStatus::from_code(self.result())
    }
}

/// A record a reply array element can be decoded into and correlated with
/// its daemon.
///
/// Implementations opt into argument fingerprinting by setting
/// [`ControlResponse::HASHES_ARGUMENTS`].
pub trait ControlResponse: DeserializeOwned {
    const HASHES_ARGUMENTS: bool = false;

    fn set_daemon(&mut self, daemon: &str);

    fn set_arguments_hash(&mut self, _hash: String) {}
}

impl ExaminableResponse for Response {
    fn result(&self) -> i64 {
        self.header.result
    }

    fn text(&self) -> &str {
        &self.header.text
    }

    fn daemon(&self) -> &str {
        &self.header.daemon
    }

    fn arguments(&self) -> Option<&Map<String, Value>> {
        self.arguments.as_ref()
    }
}

impl ControlResponse for Response {
    fn set_daemon(&mut self, daemon: &str) {
        self.header.daemon = daemon.to_string();
    }
}

impl ExaminableResponse for HashedResponse {
    fn result(&self) -> i64 {
        self.header.result
    }

    fn text(&self) -> &str {
        &self.header.text
    }

    fn daemon(&self) -> &str {
        &self.header.daemon
    }

    fn arguments(&self) -> Option<&Map<String, Value>> {
        self.arguments.as_ref()
    }
}

impl ControlResponse for HashedResponse {
    const HASHES_ARGUMENTS: bool = true;

    fn set_daemon(&mut self, daemon: &str) {
        self.header.daemon = daemon.to_string();
    }

    fn set_arguments_hash(&mut self, hash: String) {
        self.arguments_hash = Some(hash);
    }
}

/// Second-pass view of a reply element keeping `arguments` undecoded.
#[derive(Deserialize)]
struct RawArguments<'a> {
    #[serde(borrow, default)]
    arguments: Option<&'a RawValue>,
}

/// Decode a reply received for `request` into response records.
///
/// Elements are tagged with daemon names by position. When the record type
/// hashes arguments, each element's raw `arguments` bytes are fingerprinted.
/// A reply shorter than the daemon list leaves the extra daemons unmatched;
/// elements beyond the daemon list stay untagged.
pub fn unmarshal_response_list<R, C>(
    request: &C,
    response: &[u8],
) -> Result<Vec<R>, ResponseParseError>
where
    R: ControlResponse,
    C: SerializableCommand + ?Sized,
{
    let mut parsed: Vec<R> =
        serde_json::from_slice(response).map_err(|source| ResponseParseError::Decode {
            payload: String::from_utf8_lossy(response).into_owned(),
            source,
        })?;

    for (entry, daemon) in parsed.iter_mut().zip(request.daemons()) {
        entry.set_daemon(daemon);
    }

    if R::HASHES_ARGUMENTS && !parsed.is_empty() {
        let raw: Vec<RawArguments<'_>> =
            serde_json::from_slice(response).map_err(|source| ResponseParseError::Hash {
                payload: String::from_utf8_lossy(response).into_owned(),
                source,
            })?;
        for (entry, raw) in parsed.iter_mut().zip(&raw) {
            if let Some(arguments) = raw.arguments {
                entry.set_arguments_hash(fnv128a_hex(arguments.get().as_bytes()));
            }
        }
    }

    Ok(parsed)
}

/// Encode decoded responses back to the reply format.
///
/// Computed fields (daemon, arguments hash) are not part of the output.
pub fn marshal_response_list<R: Serialize>(parsed: &[R]) -> Result<String, serde_json::Error> {
    serde_json::to_string(parsed)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::{
        marshal_response_list, unmarshal_response_list, ControlResponse, ExaminableResponse,
        HashedResponse, Response, ResponseParseError,
    };
    use crate::command::Command;
    use crate::fingerprint::fnv128a_hex;

    #[test]
    fn tags_responses_by_position() {
        let cmd = Command::without_arguments("config-get", &["dhcp6", "dhcp4"]).expect("build");
        let reply = br#"[
            {"result":0,"text":"v6 first?","arguments":{"a":1}},
            {"result":1,"text":"second"}
        ]"#;
        let parsed: Vec<Response> = unmarshal_response_list(&cmd, reply).expect("parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].daemon(), "dhcp4");
        assert_eq!(parsed[1].daemon(), "dhcp6");
        let expected = json!({"a": 1});
        assert_eq!(parsed[0].arguments(), expected.as_object());
        assert!(parsed[1].arguments().is_none());
    }

    #[test]
    fn tolerates_reply_shorter_than_daemon_list() {
        let cmd = Command::without_arguments("config-get", &["dhcp4", "dhcp6"]).expect("build");
        let parsed: Vec<HashedResponse> =
            unmarshal_response_list(&cmd, br#"[{"result":0,"arguments":{}}]"#).expect("parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].daemon(), "dhcp4");
        assert_eq!(parsed[0].arguments_hash, Some(fnv128a_hex(b"{}")));
    }

    #[test]
    fn leaves_extra_elements_untagged() {
        let cmd = Command::without_arguments("config-get", &["dhcp4"]).expect("build");
        let parsed: Vec<Response> =
            unmarshal_response_list(&cmd, br#"[{"result":0},{"result":0}]"#).expect("parse");
        assert_eq!(parsed[0].daemon(), "dhcp4");
        assert_eq!(parsed[1].daemon(), "");
    }

    #[test]
    fn hashes_raw_argument_bytes() {
        let cmd = Command::without_arguments("config-get", &["dhcp4", "dhcp6"]).expect("build");
        let reply = br#"[{"result":0,"arguments":{"b": 2,  "a":1}},{"result":0,"arguments":null}]"#;
        let parsed: Vec<HashedResponse> = unmarshal_response_list(&cmd, reply).expect("parse");
        assert_eq!(
            parsed[0].arguments_hash.as_deref(),
            Some(fnv128a_hex(br#"{"b": 2,  "a":1}"#).as_str())
        );
        assert_eq!(parsed[1].arguments_hash, None);
    }

    #[test]
    fn hash_differs_for_reformatted_arguments() {
        let cmd = Command::without_arguments("config-get", &["dhcp4"]).expect("build");
        let compact: Vec<HashedResponse> =
            unmarshal_response_list(&cmd, br#"[{"result":0,"arguments":{"a":1}}]"#)
                .expect("parse");
        let spaced: Vec<HashedResponse> =
            unmarshal_response_list(&cmd, br#"[{"result":0,"arguments":{"a": 1}}]"#)
                .expect("parse");
        assert_eq!(compact[0].arguments, spaced[0].arguments);
        assert_ne!(compact[0].arguments_hash, spaced[0].arguments_hash);
    }

    #[test]
    fn plain_responses_are_not_hashed() {
        #[derive(Deserialize)]
        struct Probe {
            result: i64,
            #[serde(skip)]
            hash: Option<String>,
        }

        impl ControlResponse for Probe {
            fn set_daemon(&mut self, _daemon: &str) {}

            fn set_arguments_hash(&mut self, hash: String) {
                self.hash = Some(hash);
            }
        }

        let cmd = Command::without_arguments("config-get", &["dhcp4"]).expect("build");
        let parsed: Vec<Probe> =
            unmarshal_response_list(&cmd, br#"[{"result":3,"arguments":{"a":1}}]"#)
                .expect("parse");
        assert_eq!(parsed[0].result, 3);
        assert_eq!(parsed[0].hash, None);
    }

    #[test]
    fn reports_malformed_reply() {
        let cmd = Command::without_arguments("config-get", &["dhcp4"]).expect("build");
        let err = unmarshal_response_list::<Response, _>(&cmd, b"{\"result\":0}")
            .expect_err("object is not an array");
        match err {
            ResponseParseError::Decode { payload, .. } => assert_eq!(payload, "{\"result\":0}"),
            other => panic!("unexpected error variant: {other}"),
        }

        let err = unmarshal_response_list::<Response, _>(&cmd, br#"[{"arguments":[1]}]"#)
            .expect_err("arguments must be a map");
        assert!(matches!(err, ResponseParseError::Decode { .. }));
    }

    #[test]
    fn marshal_skips_computed_fields() {
        let cmd = Command::without_arguments("config-get", &["dhcp4"]).expect("build");
        let parsed: Vec<HashedResponse> =
            unmarshal_response_list(&cmd, br#"[{"result":0,"text":"ok","arguments":{"a":1}}]"#)
                .expect("parse");
        assert_eq!(
            marshal_response_list(&parsed).expect("marshal"),
            r#"[{"result":0,"text":"ok","arguments":{"a":1}}]"#
        );
    }
}

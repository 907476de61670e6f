//! Decode every `option-data` entry of a Kea DHCP server configuration.
//!
//! The configuration's own `option-def` entries are consulted alongside the
//! supplied definitions, so custom options decode with their declared types.
//! A failing option is reported in its row and does not stop the scan.

use std::fs;
use std::path::Path;

use kea_protocol::{
    create_dhcp_option, DefinitionRegistry, DhcpOptionData, OptionDefinition, SingleOptionData,
    Universe,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::definitions::complete_option_data;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read Kea configuration {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse Kea configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("configuration has neither a Dhcp4 nor a Dhcp6 section")]
    NoDhcpServer,
    #[error("configuration has both Dhcp4 and Dhcp6 sections; scan them separately")]
    MultipleDhcpServers,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(rename = "Dhcp4")]
    dhcp4: Option<ServerConfig>,
    #[serde(rename = "Dhcp6")]
    dhcp6: Option<ServerConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ServerConfig {
    #[serde(default)]
    option_def: Vec<OptionDefinition>,
    #[serde(default)]
    option_data: Vec<SingleOptionData>,
    #[serde(default)]
    client_classes: Vec<ClientClass>,
    #[serde(default)]
    shared_networks: Vec<SharedNetwork>,
    #[serde(default, rename = "subnet4", alias = "subnet6")]
    subnets: Vec<Subnet>,
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ClientClass {
    #[serde(default)]
    name: String,
    #[serde(default)]
    option_def: Vec<OptionDefinition>,
    #[serde(default)]
    option_data: Vec<SingleOptionData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SharedNetwork {
    #[serde(default)]
    name: String,
    #[serde(default)]
    option_data: Vec<SingleOptionData>,
    #[serde(default, rename = "subnet4", alias = "subnet6")]
    subnets: Vec<Subnet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Subnet {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    subnet: String,
    #[serde(default)]
    option_data: Vec<SingleOptionData>,
    #[serde(default)]
    pools: Vec<Pool>,
    #[serde(default)]
    pd_pools: Vec<PdPool>,
    #[serde(default)]
    reservations: Vec<Reservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Pool {
    #[serde(default)]
    pool: String,
    #[serde(default)]
    option_data: Vec<SingleOptionData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PdPool {
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    prefix_len: u8,
    #[serde(default)]
    option_data: Vec<SingleOptionData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Reservation {
    hw_address: Option<String>,
    duid: Option<String>,
    client_id: Option<String>,
    ip_address: Option<String>,
    hostname: Option<String>,
    #[serde(default)]
    option_data: Vec<SingleOptionData>,
}

impl Reservation {
    fn identifier(&self) -> &str {
        [
            &self.hw_address,
            &self.duid,
            &self.client_id,
            &self.ip_address,
            &self.hostname,
        ]
        .into_iter()
        .find_map(|value| value.as_deref())
        .unwrap_or("?")
    }
}

/// One decoded `option-data` entry and where it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScannedOption {
    pub scope: String,
    pub data: SingleOptionData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<DhcpOptionData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of scanning one DHCP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub universe: Universe,
    pub custom_definitions: usize,
    pub options: Vec<ScannedOption>,
}

impl ScanReport {
    pub fn failures(&self) -> usize {
        self.options.iter().filter(|row| row.error.is_some()).count()
    }
}

/// A parsed Kea DHCPv4 or DHCPv6 server configuration.
#[derive(Debug)]
pub struct KeaDhcpConfig {
    universe: Universe,
    server: ServerConfig,
}

impl KeaDhcpConfig {
    pub fn from_json(input: &str) -> Result<Self, ScanError> {
        let file: ConfigFile = serde_json::from_str(input)?;
        match (file.dhcp4, file.dhcp6) {
            (Some(server), None) => Ok(Self {
                universe: Universe::V4,
                server,
            }),
            (None, Some(server)) => Ok(Self {
                universe: Universe::V6,
                server,
            }),
            (Some(_), Some(_)) => Err(ScanError::MultipleDhcpServers),
            (None, None) => Err(ScanError::NoDhcpServer),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let raw = fs::read_to_string(path).map_err(|source| ScanError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn universe(&self) -> Universe {
        self.universe
    }

    /// Custom definitions declared by the configuration, globally and in
    /// client classes. Definitions without a space belong to the top-level
    /// space of the server.
    pub fn option_definitions(&self) -> Vec<OptionDefinition> {
        let top_level = self.universe.top_level_space();
        self.server
            .option_def
            .iter()
            .chain(self.server.client_classes.iter().flat_map(|c| &c.option_def))
            .cloned()
            .map(|mut definition| {
                if definition.space.is_empty() {
                    definition.space = top_level.to_string();
                }
                definition
            })
            .collect()
    }

    /// Decode all option data in the configuration.
    pub fn scan(&self, base: &DefinitionRegistry) -> ScanReport {
        let custom = self.option_definitions();
        let custom_definitions = custom.len();
        let mut registry = base.clone();
        for definition in custom {
            registry.insert(definition);
        }

        let mut scanner = Scanner {
            universe: self.universe,
            registry: &registry,
            rows: Vec::new(),
        };
        let server = &self.server;

        scanner.decode("global", &server.option_data);
        for class in &server.client_classes {
            scanner.decode(&format!("client-class {}", class.name), &class.option_data);
        }
        for reservation in &server.reservations {
            scanner.decode(
                &format!("reservation {}", reservation.identifier()),
                &reservation.option_data,
            );
        }
        for network in &server.shared_networks {
            let scope = format!("shared-network {}", network.name);
            scanner.decode(&scope, &network.option_data);
            for subnet in &network.subnets {
                scanner.subnet(&scope, subnet);
            }
        }
        for subnet in &server.subnets {
            scanner.subnet("", subnet);
        }

        tracing::debug!(
            universe = %self.universe,
            options = scanner.rows.len(),
            "scanned option data"
        );
        ScanReport {
            universe: self.universe,
            custom_definitions,
            options: scanner.rows,
        }
    }
}

struct Scanner<'a> {
    universe: Universe,
    registry: &'a DefinitionRegistry,
    rows: Vec<ScannedOption>,
}

impl Scanner<'_> {
    fn subnet(&mut self, parent: &str, subnet: &Subnet) {
        let name = match subnet.id {
            Some(id) => format!("subnet {id} ({})", subnet.subnet),
            None => format!("subnet {}", subnet.subnet),
        };
        let scope = if parent.is_empty() {
            name
        } else {
            format!("{parent} / {name}")
        };

        self.decode(&scope, &subnet.option_data);
        for pool in &subnet.pools {
            self.decode(&format!("{scope} / pool {}", pool.pool), &pool.option_data);
        }
        for pool in &subnet.pd_pools {
            self.decode(
                &format!("{scope} / pd-pool {}/{}", pool.prefix, pool.prefix_len),
                &pool.option_data,
            );
        }
        for reservation in &subnet.reservations {
            self.decode(
                &format!("{scope} / reservation {}", reservation.identifier()),
                &reservation.option_data,
            );
        }
    }

    fn decode(&mut self, scope: &str, entries: &[SingleOptionData]) {
        for entry in entries {
            let mut data = entry.clone();
            complete_option_data(&mut data, self.universe, self.registry);

            let (option, error) = match create_dhcp_option(&data, self.universe, self.registry) {
                Ok(option) => (Some(option), None),
                Err(err) => {
                    tracing::debug!(scope, code = data.code, error = %err, "option data rejected");
                    (None, Some(err.to_string()))
                }
            };
            self.rows.push(ScannedOption {
                scope: scope.to_string(),
                data,
                option,
                error,
            });
        }
    }
}

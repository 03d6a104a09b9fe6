//! Simulator configuration.
//!
//! Loaded from an optional TOML file; every field has a default so a file only
//! needs to name what it changes. Unknown keys are rejected. Command-line flags
//! override file values. Read and write latencies belong to the device and are
//! given on the command line with the timing file.
//!
//! ```toml
//! [controller]
//! requesters = 8
//! banks_per_rank = 8
//! ranks = 1
//! address_mapping = 0
//! interleave = 2
//!
//! [driver]
//! outstanding_window = 20
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::{Error, Result};
use crate::dram::mapping::AddressMapping;

const DEFAULT_REQUESTERS: usize = 8;
const DEFAULT_BANKS_PER_RANK: usize = 8;
const DEFAULT_RANKS: usize = 1;
const DEFAULT_INTERLEAVE: usize = 2;

const DEFAULT_OUTSTANDING_WINDOW: u64 = 20;
const DEFAULT_CORE_PERIOD_NS: f64 = 1.0;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub driver: DriverConfig,
}

impl Config {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Checks the cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.controller.validate()?;
        if self.driver.outstanding_window == 0 {
            return Err(Error::InvalidConfig(
                "driver.outstanding_window must be at least 1".into(),
            ));
        }
        if !(self.driver.core_period_ns >= 0.0) {
            return Err(Error::InvalidConfig(
                "driver.core_period_ns must be non-negative".into(),
            ));
        }
        if let Some(id) = self.driver.analysis_requester {
            if id >= self.controller.requesters {
                return Err(Error::InvalidConfig(format!(
                    "driver.analysis_requester {} is not below controller.requesters {}",
                    id, self.controller.requesters
                )));
            }
        }
        Ok(())
    }

    /// Requester whose trace decides when the simulation ends.
    pub fn analysis_requester(&self) -> usize {
        self.driver
            .analysis_requester
            .unwrap_or(self.controller.requesters.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerConfig {
    #[serde(default = "default_requesters")]
    pub requesters: usize,

    #[serde(default = "default_banks_per_rank")]
    pub banks_per_rank: usize,

    #[serde(default = "default_ranks")]
    pub ranks: usize,

    #[serde(default)]
    pub address_mapping: AddressMapping,

    /// Column accesses per request (2 on a 32-bit data bus).
    #[serde(default = "default_interleave")]
    pub interleave: usize,
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.requesters == 0 || self.banks_per_rank == 0 || self.ranks == 0 {
            return Err(Error::InvalidConfig(
                "requesters, banks_per_rank and ranks must all be at least 1".into(),
            ));
        }
        if self.interleave == 0 {
            return Err(Error::InvalidConfig(
                "controller.interleave must be at least 1".into(),
            ));
        }
        if self.requesters > self.ranks * self.banks_per_rank {
            return Err(Error::TooManyRequesters {
                requesters: self.requesters,
                ranks: self.ranks,
                banks_per_rank: self.banks_per_rank,
            });
        }
        Ok(())
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            requesters: default_requesters(),
            banks_per_rank: default_banks_per_rank(),
            ranks: default_ranks(),
            address_mapping: AddressMapping::default(),
            interleave: default_interleave(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Outstanding column accesses an out-of-order requester may exceed by one.
    #[serde(default = "default_outstanding_window")]
    pub outstanding_window: u64,

    /// Core clock period used to scale trace gaps.
    #[serde(default = "default_core_period_ns")]
    pub core_period_ns: f64,

    /// Defaults to the last requester.
    #[serde(default)]
    pub analysis_requester: Option<usize>,

    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            outstanding_window: default_outstanding_window(),
            core_period_ns: default_core_period_ns(),
            analysis_requester: None,
            max_ticks: None,
        }
    }
}

fn default_requesters() -> usize {
    DEFAULT_REQUESTERS
}

fn default_banks_per_rank() -> usize {
    DEFAULT_BANKS_PER_RANK
}

fn default_ranks() -> usize {
    DEFAULT_RANKS
}

fn default_interleave() -> usize {
    DEFAULT_INTERLEAVE
}

fn default_outstanding_window() -> u64 {
    DEFAULT_OUTSTANDING_WINDOW
}

fn default_core_period_ns() -> f64 {
    DEFAULT_CORE_PERIOD_NS
}

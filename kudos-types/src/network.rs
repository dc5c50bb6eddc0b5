//! Ethereum networks the Kudos contract is deployed on.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A network the sync tool can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// A local development chain (ganache / testrpc).
    Localhost,
    /// The Rinkeby test network.
    Rinkeby,
    /// Ethereum mainnet.
    Mainnet,
}

impl Network {
    /// All supported networks.
    pub const ALL: [Network; 3] = [Network::Localhost, Network::Rinkeby, Network::Mainnet];

    /// Returns the lowercase name used on the command line and in config.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Localhost => "localhost",
            Network::Rinkeby => "rinkeby",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "localhost" => Ok(Network::Localhost),
            "rinkeby" => Ok(Network::Rinkeby),
            "mainnet" => Ok(Network::Mainnet),
            _ => Err(Error::UnknownNetwork(s.to_string())),
        }
    }
}

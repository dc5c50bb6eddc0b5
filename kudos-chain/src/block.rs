//! Symbolic and concrete block identifiers.

use crate::error::ChainError;
use kudos_types::BlockNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A block identifier as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// The genesis block.
    Earliest,
    /// The current head.
    Latest,
    /// A concrete height.
    Number(BlockNumber),
}

impl BlockTag {
    /// Resolves the tag to a height given the current head.
    pub fn resolve(&self, head: BlockNumber) -> BlockNumber {
        match self {
            BlockTag::Earliest => 0,
            BlockTag::Latest => head,
            BlockTag::Number(n) => *n,
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Earliest => f.write_str("earliest"),
            BlockTag::Latest => f.write_str("latest"),
            BlockTag::Number(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for BlockTag {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "earliest" => Ok(BlockTag::Earliest),
            "latest" => Ok(BlockTag::Latest),
            other => other.parse::<BlockNumber>().map(BlockTag::Number).map_err(|_| {
                ChainError::Config(format!(
                    "block must be a number, \"earliest\" or \"latest\", got {s:?}"
                ))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_symbolic_tags() {
        assert_eq!("earliest".parse::<BlockTag>().unwrap(), BlockTag::Earliest);
        assert_eq!("latest".parse::<BlockTag>().unwrap(), BlockTag::Latest);
        assert_eq!("1200".parse::<BlockTag>().unwrap(), BlockTag::Number(1200));
        assert!("pending".parse::<BlockTag>().is_err());
    }

    #[test]
    fn resolve_against_head() {
        assert_eq!(BlockTag::Earliest.resolve(500), 0);
        assert_eq!(BlockTag::Latest.resolve(500), 500);
        assert_eq!(BlockTag::Number(42).resolve(500), 42);
    }
}

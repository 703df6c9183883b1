//! Operation Registry
//!
//! The fixed set of retrieval verbs the cacher passes through.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A cacheable retrieval operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Find,
    FindOne,
    FindAll,
    FindAndCountAll,
    All,
    Min,
    Max,
    Sum,
    Count,
}

impl Operation {
    /// Every registered operation.
    pub const ALL: [Operation; 9] = [
        Operation::Find,
        Operation::FindOne,
        Operation::FindAll,
        Operation::FindAndCountAll,
        Operation::All,
        Operation::Min,
        Operation::Max,
        Operation::Sum,
        Operation::Count,
    ];

    /// Name used on the data source and in cache keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Find => "find",
            Operation::FindOne => "findOne",
            Operation::FindAll => "findAll",
            Operation::FindAndCountAll => "findAndCountAll",
            Operation::All => "all",
            Operation::Min => "min",
            Operation::Max => "max",
            Operation::Sum => "sum",
            Operation::Count => "count",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name that is not a registered operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperationName(pub String);

impl FromStr for Operation {
    type Err = UnknownOperationName;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| UnknownOperationName(name.to_string()))
    }
}

//! Request DTOs for the query cacher API

use serde::Deserialize;
use serde_json::Value;

use crate::key::Arg;

/// Positional arguments for `POST /query/...` and `POST /invalidate/...`.
///
/// The body is a bare JSON array, e.g. `[{"where": {"id": 7}}]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct ArgsRequest {
    pub args: Vec<Value>,
}

impl ArgsRequest {
    pub fn into_args(self) -> Vec<Arg> {
        self.args.into_iter().map(Arg::from).collect()
    }
}

//! The EC2 flavor of the query protocol.
//!
//! Lists are always `Name.N`, parameter names come from `queryName`, then a
//! capitalized `locationName`, then the member name. Responses carry the output
//! members directly under the response element with `requestId` beside them.

use shapewire_model::ShapeSet;

use crate::AdapterOptions;
use crate::query::{QueryAdapter, QueryDialect};

/// Adapter for the `ec2` protocol.
pub type Ec2QueryAdapter<'a> = QueryAdapter<'a>;

/// An EC2 query adapter over `set`.
#[must_use]
pub fn adapter(set: &ShapeSet, options: AdapterOptions) -> Ec2QueryAdapter<'_> {
    QueryAdapter::with_dialect(set, options, QueryDialect::Ec2)
}

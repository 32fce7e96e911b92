//! Network layer: buffered HTTP fetching and the data sources that units poll.

mod fetch;
mod response;
mod source;

pub use fetch::{build_client, fetch};
pub use response::Response;
pub use source::{DataSource, FetchError, HttpDataSource, Snapshot};

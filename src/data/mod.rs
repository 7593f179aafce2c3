/// Raw data acquisition and table persistence

pub mod acquisition;
pub mod reference;
pub mod table;

pub use acquisition::{fetch_or_build, Acquisition, AcquireError, Bundled, FetchConfig, FetchError, RemoteCsv, TableSource};
pub use reference::{BreastCancerReference, ReferenceDataset, ReferenceError};
pub use table::{read_labels, read_table, write_labels, write_table, TableError};

//! PersistenceService (save/delete) and ReadService (fetch/list/count/get).

mod persistence;
mod reader;
pub use persistence::{PersistenceService, SaveOptions};
pub use reader::{count_response, Filters, ReadService};

pub mod crm;
pub mod csv;
pub mod error;
pub mod table;

pub use crm::{contact_records, ContactRecord, CrmClient, UpsertOutcome, UpsertStatus};
pub use self::csv::{write_table, write_table_file};
pub use error::{Result, SinkError};
pub use table::{shape_batch, BatchTable};

//! Invoice computations: input coercion, derived totals, and logo ingestion.

pub mod input;
pub mod logo;
pub mod totals;

pub use input::{format_amount, format_money, parse_number};
pub use logo::{InMemoryUpload, LogoIngestor, LogoUpload, encode_data_uri};
pub use totals::Totals;

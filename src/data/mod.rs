pub mod market;
pub mod quote;
pub mod store;
pub mod ticker;

pub use market::Market;
pub use quote::{Frequency, QuoteSample, parse_alpha_vantage_csv, parse_stooq_csv};
pub use store::{TickerStore, dump_quotes};
pub use ticker::{TickerRecord, parse_base64_csv};

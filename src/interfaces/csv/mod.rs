pub mod config_reader;
pub mod transaction_reader;

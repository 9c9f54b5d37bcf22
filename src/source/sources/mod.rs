/// Local CSV file source.
pub mod file_csv;
/// Remote CSV export source.
pub mod http_csv;

/// CSV export of hourly season results.
pub mod export;

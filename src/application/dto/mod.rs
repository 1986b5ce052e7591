//! Data Transfer Objects

mod listing_options;

pub use listing_options::ListingOptions;

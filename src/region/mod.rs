mod read;
mod table;

pub use table::RegionTable;

pub mod address;
pub mod constants;
pub mod conversions;
pub mod memory;
pub mod test_util;

pub use address::Address;

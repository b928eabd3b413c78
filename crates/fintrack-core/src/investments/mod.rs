pub mod lump_sum;
pub mod options;
pub mod sip;

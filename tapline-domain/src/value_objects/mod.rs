mod region;
mod tick_timestamp;

pub use region::RegionDescriptor;
pub use tick_timestamp::TickTimestamp;

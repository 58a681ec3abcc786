pub type Tick = u64;
pub type BufferVersion = u64;
pub type PointIndex = u32;

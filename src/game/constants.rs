pub const DEFAULT_GRID_SIZE: u16 = 20;
pub const TICK_MS: u64 = 200;
pub const FOOD_REWARD: u32 = 10;
pub const MAX_PLACEMENT_ATTEMPTS: usize = 64;
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
pub const SCORE_QUEUE_CAPACITY: usize = 256;

pub const COLOR_POOL: [&str; 8] = [
  "#ff6b6b",
  "#ffd166",
  "#06d6a0",
  "#4dabf7",
  "#f06595",
  "#845ef7",
  "#20c997",
  "#fcc419",
];

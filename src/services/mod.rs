pub mod alias;
pub mod attach_merge;
pub mod attach_planner;
pub mod prefix_matcher;
pub mod reference_cache; // Parsed reference cache with LRU and TTL

pub use alias::*;
pub use attach_merge::*;
pub use attach_planner::*;
pub use prefix_matcher::*;
pub use reference_cache::*;

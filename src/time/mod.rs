mod ticker;

pub use ticker::KeyingTicker;

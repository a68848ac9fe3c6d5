mod bid_lock;

pub use bid_lock::BidLock;

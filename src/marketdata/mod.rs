//! C5: derives top-of-book snapshots from book mutations and fans them
//! out to subscribed sessions; prints tickers on every trade.

mod publisher;

pub use publisher::Publisher;

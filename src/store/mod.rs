/// concrete implementation for key/value store operations.
/// use cases:
/// * in-memory spot-cache for storing user/communication sessions
/// * in-memory spot-cache for storing semi-static configuration settings
/// * backend for the memoized lookup service in the memo module
/// * local stand-in for a hosted redis during development and testing
///
/// The supervisor fronts a small pool of store workers and routes each key to
/// its worker by hash, so a single busy key never blocks the whole keyspace.
/// Think of it as a Level 1 application cache similar to CPUs: level 1 is
/// closest to the app and the fastest; level 2 would be a hosted redis and
/// level 3 a SQL or Mongo hosted database.
///
pub mod supervisor;
pub mod worker;

pub use supervisor::Supervisor;

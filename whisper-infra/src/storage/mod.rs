pub mod local;

pub use local::LocalPostStorage;

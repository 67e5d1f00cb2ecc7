pub mod dispatcher;


pub use dispatcher::{DispatchRequest, Dispatcher};

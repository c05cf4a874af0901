pub mod completion;
pub mod connect;
pub mod session;

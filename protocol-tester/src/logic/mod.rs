pub mod policy;
pub mod reports;
pub mod tester;

pub use policy::PlayStrategy;
pub use tester::*;

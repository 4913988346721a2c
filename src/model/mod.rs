pub mod resolver;
pub mod store;
pub mod trend;

pub use resolver::{resolve, Resolved};
pub use store::ModelStore;
pub use trend::{TrainingSeries, TrendModel};

pub mod category;
pub mod normalizer;
pub mod similarity;

pub use category::category_of;
pub use normalizer::{is_generic_name, keywords, normalize};
pub use similarity::find_similar;

mod add_equal;
mod less_than_equal;

pub use add_equal::AddEqual;
pub use less_than_equal::LessThanEqual;

mod variable;

pub use variable::*;

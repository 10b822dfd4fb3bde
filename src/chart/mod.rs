pub mod builder;
pub mod color;
pub mod figure;
pub mod spec;

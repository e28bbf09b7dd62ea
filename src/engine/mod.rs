pub mod filters;
pub mod suggest;

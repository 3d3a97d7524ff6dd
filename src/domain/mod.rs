pub mod label;
pub mod localize;
pub mod model;
pub mod narration;

pub mod developer;
pub mod match_result;
pub mod project;
pub mod technology;

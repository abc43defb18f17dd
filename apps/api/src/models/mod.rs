pub mod interview;
pub mod profile;
pub mod resume;
pub mod roadmap;

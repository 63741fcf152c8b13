pub mod analysis;
pub mod scripts;

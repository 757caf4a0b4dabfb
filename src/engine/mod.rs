pub mod badges;
pub mod level;
pub mod scoring;

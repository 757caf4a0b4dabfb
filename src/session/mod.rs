pub mod level_session;
pub mod result;

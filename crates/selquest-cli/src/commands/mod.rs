pub mod assess;
pub mod check_in;
pub mod common;
pub mod compare;
pub mod init;
pub mod journal;
pub mod mindfulness;
pub mod profile_complete;
pub mod progress;
pub mod validate;

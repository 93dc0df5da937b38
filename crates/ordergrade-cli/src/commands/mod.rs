pub mod grade;
pub mod init;
pub mod policies;
pub mod validate;

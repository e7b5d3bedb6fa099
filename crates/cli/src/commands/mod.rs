pub mod fetch;
pub mod init;
pub mod status;
pub mod toc;
pub mod validate;

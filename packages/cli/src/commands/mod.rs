pub mod apply;
pub mod demo;
pub mod init;
pub mod show;

pub use apply::{apply, ApplyArgs};
pub use demo::demo;
pub use init::{init, InitArgs};
pub use show::{outline, render, stats, Output, ShowArgs};

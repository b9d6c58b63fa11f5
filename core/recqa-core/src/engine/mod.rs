pub mod file;
pub mod run;

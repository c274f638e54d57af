pub mod db;

#[cfg(feature = "cli")]
pub mod cli;

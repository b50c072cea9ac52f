#![no_std]

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

#[cfg(any(test, feature = "std"))]
#[cfg_attr(test, macro_use)]
extern crate std;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

pub mod config;
pub mod drivers;
pub mod graphics;
pub mod hal;
pub mod logger;
pub mod osd;
pub mod sys;
pub mod types;

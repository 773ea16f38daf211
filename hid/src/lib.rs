#![doc = include_str!("../README.md")]
#![no_std]
#![warn(unused_crate_dependencies)]

pub mod usage;

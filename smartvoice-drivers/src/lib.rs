//! Hardware driver implementations
//!
//! This crate provides the controller for DFPlayer-class serial MP3
//! modules, built on the traits in smartvoice-hal and the wire format in
//! smartvoice-protocol.

#![no_std]
#![deny(unsafe_code)]

pub mod player;

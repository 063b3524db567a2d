#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for lts
//!
//! This crate handles all HTTP operations: archive downloads with manual
//! redirect handling, release manifest fetching and published checksums.

mod checksum;
mod client;
mod download;
mod manifest;

pub use checksum::{fetch_published_digest, parse_checksum_listing, CHECKSUM_SUFFIX};
pub use client::{NetClient, NetConfig};
pub use download::download;
pub use manifest::{fetch_json, fetch_release_tags, release_tags};


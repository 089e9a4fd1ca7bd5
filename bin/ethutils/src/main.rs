#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/metachris/ethutils-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

use clap::Parser;

mod cli;
mod commands;
mod display;
mod flags;

fn main() {
    // Enable backtraces unless a RUST_BACKTRACE value has already been explicitly provided.
    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: no other threads have been started yet.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    if let Err(err) = cli::Cli::parse().run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

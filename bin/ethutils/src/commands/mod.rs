//! Contains the ethutils subcommands.

mod blocks;
pub(crate) use blocks::BlocksCommand;

mod locate;
pub(crate) use locate::LocateCommand;

//! Styling for clap help output.

use clap::builder::styling::{AnsiColor, Effects, Styles};

/// Returns the styles used by every `ethutils` command.
pub const fn cli_styles() -> Styles {
    Styles::styled()
        .usage(AnsiColor::BrightBlue.on_default().effects(Effects::BOLD))
        .header(AnsiColor::BrightBlue.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::BrightCyan.on_default())
        .placeholder(AnsiColor::Cyan.on_default())
        .error(AnsiColor::BrightRed.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::BrightGreen.on_default())
        .invalid(AnsiColor::BrightYellow.on_default())
}

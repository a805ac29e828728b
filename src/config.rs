use crate::cli::{Args, ColorChoice};

/// What the driver does with each submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    Tokens,
    Ast,
}

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: bool,
    pub mode: Mode,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        let mode = if args.tokens {
            Mode::Tokens
        } else if args.ast {
            Mode::Ast
        } else {
            Mode::Run
        };

        AppConfig {
            color_enabled,
            verbose: args.verbose,
            mode,
        }
    }
}

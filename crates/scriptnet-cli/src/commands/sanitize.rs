//! `scriptnet sanitize` -- run the outbound sanitization pipeline offline.
//!
//! No chat connection is available, so every user mention falls back to
//! the `@user` placeholder.
//!
//! ```text
//! scriptnet sanitize "hey @everyone check <@123456>"
//! ```

use clap::Args;

use scriptnet_core::{NoDirectory, Sanitizer};

/// Arguments for the `scriptnet sanitize` subcommand.
#[derive(Args)]
pub struct SanitizeArgs {
    /// Text to sanitize.
    pub text: String,

    /// Show zero-width spaces as `<ZWSP>`.
    #[arg(long)]
    pub show_invisible: bool,
}

pub fn run(args: SanitizeArgs) {
    println!("{}", render(&args));
}

fn render(args: &SanitizeArgs) -> String {
    let out = Sanitizer::new().sanitize(&args.text, &NoDirectory);
    if args.show_invisible {
        out.replace('\u{200B}', "<ZWSP>")
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mentions_fall_back_to_placeholder() {
        let args = SanitizeArgs {
            text: "hey @everyone check <@123456>".into(),
            show_invisible: true,
        };
        assert_eq!(render(&args), "hey @<ZWSP>everyone check @<ZWSP>user");
    }
}

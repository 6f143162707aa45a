//! CLI argument parsing with clap.

use clap::Parser;

/// Generate an image, rehost it on `ImgBB`, and optionally share it on X.
#[derive(Parser, Debug)]
#[command(name = "imgrelay", version, about)]
pub struct Cli {
    /// Open the X share intent for the hosted image after a successful run.
    #[arg(long)]
    pub share: bool,

    /// Print the share link instead of launching a browser.
    #[arg(long, requires = "share")]
    pub no_browser: bool,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

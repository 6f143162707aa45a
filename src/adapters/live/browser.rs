//! Link openers: the system browser, or plain stdout.

use std::process::{Command, Stdio};

use reqwest::Url;

use crate::error::RelayError;
use crate::ports::LinkOpener;

/// Opens links with the platform's default URL handler.
pub struct SystemBrowser;

impl LinkOpener for SystemBrowser {
    fn open(&self, url: &Url) -> Result<(), RelayError> {
        let (program, args) = opener_command();
        tracing::debug!(program, %url, "Launching browser");
        let status = Command::new(program)
            .args(args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| RelayError::Browser(format!("failed to run {program}: {e}")))?;
        if status.success() {
            Ok(())
        } else {
            Err(RelayError::Browser(format!("{program} exited with {status}")))
        }
    }
}

fn opener_command() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("rundll32", &["url.dll,FileProtocolHandler"])
    } else {
        ("xdg-open", &[])
    }
}

/// Prints links to stdout for the user to follow.
pub struct PrintLink;

impl LinkOpener for PrintLink {
    fn open(&self, url: &Url) -> Result<(), RelayError> {
        println!("Share: {url}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_link_never_fails() {
        let url = Url::parse("https://twitter.com/intent/tweet?text=%23AI16Z").unwrap();
        assert!(PrintLink.open(&url).is_ok());
    }

    #[test]
    fn opener_command_is_known() {
        let (program, _) = opener_command();
        assert!(["open", "rundll32", "xdg-open"].contains(&program));
    }
}

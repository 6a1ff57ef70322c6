//! Terminal host
//!
//! [`ConsoleHost`] is the [`TaskHost`] used by the command-line runner. It
//! resolves source paths against the workspace root and prints colored
//! status lines.

use std::io::Write;
use std::path::{Path, PathBuf};

use colored::*;

use closure_task_protocol::TaskHost;

#[derive(Debug, Clone)]
pub struct ConsoleHost {
    root: PathBuf,
    verbose: bool,
}

impl ConsoleHost {
    pub fn new(root: impl Into<PathBuf>, verbose: bool) -> Self {
        Self {
            root: root.into(),
            verbose,
        }
    }
}

impl TaskHost for ConsoleHost {
    fn file_exists(&self, path: &Path) -> bool {
        self.root.join(path).exists()
    }

    fn log_header(&self, message: &str) {
        println!();
        println!("{}", message.underline());
    }

    fn log_ok(&self, message: &str) {
        println!("{} {}", ">>".green(), message);
    }

    fn log_warn(&self, message: &str) {
        println!("{} {}", ">>".yellow(), message.trim_end());
    }

    fn fail_warn(&self, message: &str) {
        eprintln!("{} {}", "Warning:".red().bold(), message.trim_end());
    }

    fn verbose_write(&self, text: &str) {
        if !self.verbose {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{}", text.dimmed());
    }
}

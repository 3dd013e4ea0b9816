//! Isolated working directory and environment for settings tests.
//!
//! Settings load `boot-config.toml` from the working directory and read
//! `BOOT_CONFIG_*` variables, so each test runs inside a [`figment::Jail`]
//! seeded with exactly the files and variables it declares.

use std::fmt;

use anyhow::{Result, anyhow};

/// Files and environment variables to place in a jail before running a test.
///
/// # Examples
///
/// ```
/// use boot_config_test_helpers::jail::JailSetup;
///
/// let text = JailSetup::new()
///     .file("boot-config.toml", "pretty = true\n")
///     .env("BOOT_CONFIG_PRETTY", "false")
///     .run(|| std::fs::read_to_string("boot-config.toml"))?;
/// assert_eq!(text, "pretty = true\n");
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct JailSetup<'a> {
    files: Vec<(&'a str, &'a str)>,
    env: Vec<(&'a str, &'a str)>,
}

impl<'a> JailSetup<'a> {
    /// An empty jail: no files, no extra variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, relative to the jail's working directory.
    #[must_use]
    pub fn file(mut self, name: &'a str, contents: &'a str) -> Self {
        self.files.push((name, contents));
        self
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn env(mut self, key: &'a str, value: &'a str) -> Self {
        self.env.push((key, value));
        self
    }

    /// Seeds a fresh jail and runs `test` inside it.
    ///
    /// The working directory and environment are restored afterwards, even
    /// when `test` fails.
    ///
    /// # Errors
    ///
    /// Returns an error when a file cannot be written or `test` fails.
    pub fn run<T, E, F>(&self, test: F) -> Result<T>
    where
        F: FnOnce() -> std::result::Result<T, E>,
        E: fmt::Display,
    {
        let mut output = None;
        figment::Jail::try_with(|jail| {
            for &(name, contents) in &self.files {
                jail.create_file(name, contents)?;
            }
            for &(key, value) in &self.env {
                jail.set_env(key, value);
            }
            output = Some(test().map_err(|err| figment::Error::from(err.to_string()))?);
            Ok(())
        })
        .map_err(|err| anyhow!("settings jail: {err}"))?;
        output.ok_or_else(|| anyhow!("settings jail produced no value"))
    }
}

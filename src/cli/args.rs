//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap and turns the parsed
//! flags into typed [`Settings`] and [`ConfigSelector`] values.

use crate::error::ConfigurationError;
use crate::settings::{ConfigSelector, DigestAlgorithm, Settings, SettingsBuilder, SettingsFile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Resolve CI release tags and unpack their packages per platform
#[derive(Parser, Debug)]
#[command(
    name = "ci-release-unpack",
    version,
    about = "Resolve CI release tags and unpack their packages per platform",
    long_about = "Looks up release tags on the CI server, downloads the artifact bundle of the tagged build \
and sorts its packages into <system>/<arch>/ directories with a checksum manifest each.

Usage:
  ci-release-unpack list-configs
  ci-release-unpack list-tags --config Release
  ci-release-unpack unpack --tag v4.2.0 --config-id bt42 --output ./release

Exit code 0 = every bucket directory was written."
)]
pub struct Args {
    /// CI server root URL
    #[arg(long, global = true, env = "CI_RELEASE_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// CI project whose build configurations are listed
    #[arg(long, global = true, env = "CI_RELEASE_PROJECT", value_name = "ID")]
    pub project: Option<String>,

    /// TOML settings file; flags and environment variables take precedence
    #[arg(long, global = true, env = "CI_RELEASE_SETTINGS", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Number of build detail documents fetched at once
    #[arg(long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Print progress details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Configuration name or id; exactly one is required.
#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct SelectorArgs {
    /// Build configuration name
    #[arg(long, value_name = "NAME")]
    pub config: Option<String>,

    /// Build configuration id
    #[arg(long, value_name = "ID")]
    pub config_id: Option<String>,
}

impl SelectorArgs {
    /// Typed selector
    pub fn selector(&self) -> Result<ConfigSelector, ConfigurationError> {
        ConfigSelector::from_parts(self.config.clone(), self.config_id.clone())
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the build configurations of the project
    ListConfigs {
        /// Print JSON instead of "<id> <name>" lines
        #[arg(long)]
        json: bool,
    },

    /// List the tags of a build configuration with their artifact URLs
    ListTags {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Print JSON instead of "<tag> <url>" lines
        #[arg(long)]
        json: bool,
    },

    /// Download a tagged build and unpack its packages per platform
    Unpack {
        /// Release tag to unpack
        #[arg(short, long, value_name = "TAG")]
        tag: String,

        #[command(flatten)]
        selector: SelectorArgs,

        /// Directory the <system>/<arch>/ tree is created in
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output: PathBuf,

        /// Skip re-signing packages
        #[arg(long)]
        no_sign: bool,

        /// GPG identity used to re-sign packages
        #[arg(long, env = "CI_RELEASE_SIGNING_IDENTITY", value_name = "IDENTITY")]
        signing_identity: Option<String>,

        /// Manifest digest: md5 or sha256
        #[arg(long, value_name = "ALGORITHM")]
        digest: Option<DigestAlgorithm>,

        /// Print a JSON report
        #[arg(long)]
        json: bool,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Build the settings for this invocation.
    ///
    /// Values come from the settings file first, then from flags and
    /// environment variables.
    pub fn to_settings(&self) -> Result<Settings, ConfigurationError> {
        let mut builder = match &self.settings {
            Some(path) => SettingsBuilder::from_file(SettingsFile::load(path)?),
            None => SettingsBuilder::new(),
        };

        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(project) = &self.project {
            builder = builder.project_id(project);
        }
        if let Some(concurrency) = self.concurrency {
            builder = builder.concurrency(concurrency);
        }

        if let Command::Unpack {
            no_sign,
            signing_identity,
            digest,
            ..
        } = &self.command
        {
            if *no_sign {
                builder = builder.sign_packages(false);
            }
            if let Some(identity) = signing_identity {
                builder = builder.signing_identity(identity);
            }
            if let Some(digest) = digest {
                builder = builder.digest(*digest);
            }
        }

        builder.build()
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Wrap an existing output manager
    pub fn new(output: super::OutputManager) -> Self {
        Self { output }
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) {
        self.output.warn(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        self.output.indent(message)
    }
}

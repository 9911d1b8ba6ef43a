use clap::Parser;
use std::num::NonZeroU64;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::io::HttpOptions;

#[derive(Parser, Debug)]
#[command(name = "httpio")]
#[command(version)]
#[command(about = "Read byte ranges of remote files using HTTP Range requests", long_about = None)]
#[command(after_help = "Examples:\n  \
  httpio https://example.com/disk.img -o 512 -n 64      print 64 bytes at offset 512\n  \
  httpio https://example.com/log.txt -o -4096 -l        print the lines of the last 4 KiB\n  \
  httpio -H 'Authorization: Bearer t' https://example.com/a.bin > a.bin")]
pub struct Cli {
    /// HTTP URL or local file path
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Start offset in bytes (negative counts from the end)
    #[arg(short = 'o', long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i64,

    /// Number of bytes to read (default: up to the end)
    #[arg(short = 'n', long, value_name = "BYTES")]
    pub length: Option<u64>,

    /// Cache block size in bytes, 0 disables caching
    #[arg(short = 'b', long, value_name = "BYTES", default_value_t = 64 * 1024)]
    pub block_size: u64,

    /// Extra request header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Basic auth credentials
    #[arg(short = 'u', long, value_name = "USER[:PASSWORD]")]
    pub user: Option<String>,

    /// Request timeout in seconds
    #[arg(short = 't', long, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Print the range as text lines (invalid UTF-8 is replaced)
    #[arg(short = 'l', long)]
    pub lines: bool,

    /// Quiet mode (no transfer summary)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.source.starts_with("http://") || self.source.starts_with("https://")
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn block_size(&self) -> Option<NonZeroU64> {
        NonZeroU64::new(self.block_size)
    }

    /// Request options built from `-H`, `-u` and `-t`.
    pub fn http_options(&self) -> Result<HttpOptions> {
        let mut options = HttpOptions::default().timeout(match self.timeout {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        });

        for header in &self.headers {
            let (name, value) = header.split_once(':').ok_or_else(|| {
                Error::Configuration(format!("header {header:?} is not in NAME: VALUE form"))
            })?;
            options = options.header(name.trim(), value.trim());
        }

        if let Some(user) = &self.user {
            options = match user.split_once(':') {
                Some((name, password)) => options.basic_auth(name, Some(password.to_string())),
                None => options.basic_auth(user.as_str(), None),
            };
        }

        Ok(options)
    }
}

//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::types::{Ca, KeyType};

/// Command line of the `cabinet` binary
#[derive(Parser)]
#[command(name = "cabinet")]
#[command(about = "Certificate Authority lifecycle management", version)]
pub struct Cli {
    /// Configuration file (default: <config dir>/cabinet/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Compact JSON output, including errors
    #[arg(long, global = true)]
    pub json: bool,

    /// Operation to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Lifecycle operations
#[derive(Clone, Subcommand)]
pub enum Commands {
    /// List all CAs with their metadata
    List,

    /// Print the certificate and public key of a CA
    Get {
        /// CA name
        name: String,
    },

    /// Print metadata extracted from a CA certificate
    Info {
        /// CA name
        name: String,
    },

    /// Create a new self-signed root CA
    Create {
        /// CA name
        name: String,
        /// Subject and key settings
        #[command(flatten)]
        spec: CreateArgs,
    },

    /// Import an externally issued CA certificate and private key
    Import {
        /// CA name
        name: String,
        /// PEM certificate file
        #[arg(long)]
        crt: PathBuf,
        /// PEM PKCS#8 private key file
        #[arg(long)]
        key: PathBuf,
        /// Max lease TTL of the new CA (e.g. 8760h)
        #[arg(long)]
        ttl: Option<String>,
    },

    /// Delete a CA and everything issued under it
    Delete {
        /// CA name
        name: String,
    },

    /// Check that the secrets backend is reachable
    Health,
}

/// Subject and key settings for `create`
#[derive(Clone, Debug, Default, Args)]
pub struct CreateArgs {
    /// Subject common name (default: the CA name)
    #[arg(long)]
    pub common_name: Option<String>,
    /// Key algorithm (default: backend choice)
    #[arg(long, value_enum)]
    pub key_type: Option<KeyTypeArg>,
    /// Key size; required with --key-type
    #[arg(long)]
    pub key_bits: Option<u32>,
    /// Validity of the root certificate (e.g. 87600h)
    #[arg(long)]
    pub ttl: Option<String>,
    /// Subject organization
    #[arg(long)]
    pub organization: Option<String>,
    /// Subject organizational unit
    #[arg(long)]
    pub organization_unit: Option<String>,
    /// Subject country
    #[arg(long)]
    pub country: Option<String>,
    /// Subject state or province
    #[arg(long)]
    pub province: Option<String>,
    /// Subject locality
    #[arg(long)]
    pub locality: Option<String>,
}

/// `--key-type` values
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyTypeArg {
    /// RSA
    Rsa,
    /// ECDSA
    Ecdsa,
}

impl From<KeyTypeArg> for KeyType {
    fn from(arg: KeyTypeArg) -> Self {
        match arg {
            KeyTypeArg::Rsa => Self::Rsa,
            KeyTypeArg::Ecdsa => Self::Ecdsa,
        }
    }
}

impl CreateArgs {
    /// Creation spec for the CA called `name`
    #[must_use]
    pub fn into_spec(self, name: &str) -> Ca {
        Ca {
            ca_name: name.to_string(),
            common_name: self.common_name.unwrap_or_else(|| name.to_string()),
            key_type: self.key_type.map(KeyType::from),
            key_bits: self.key_bits.unwrap_or(0),
            organization: self.organization.unwrap_or_default(),
            organization_unit: self.organization_unit.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            province: self.province.unwrap_or_default(),
            locality: self.locality.unwrap_or_default(),
            ttl: self.ttl,
            ..Ca::default()
        }
    }
}

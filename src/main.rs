//! Certiffix CLI application.
//!
//! Generates self-signed CA root certificates and development certificates
//! signed by them. Any value not given on the command line is asked for
//! interactively.

use certiffix::cert::ca::create_root_ca;
use certiffix::cert::entity::create_end_entity_cert;
use certiffix::cert::request::{Subject, DEFAULT_VALIDITY_DAYS};
use certiffix::error::Result;
use certiffix::resolve::{resolve, Mode, Provided, StdioPrompter};
use certiffix::storage::entry::Store;
use certiffix::storage::layout::{TrustStore, TrustStoreConfig};
use certiffix::toolkit::openssl::{OpenSsl, DEFAULT_PROGRAM};
use certiffix::toolkit::ProcessRunner;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "certiffix")]
#[command(about = "Generate development certificates using self-signed CA root certificates")]
#[command(version)]
struct Cli {
    /// Without a value, generate a CA root certificate. With a value, sign
    /// with that CA root (path to a .ca.pem file, or a CA name); an empty
    /// value asks which CA root to use
    #[arg(long, num_args = 0..=1, value_name = "CA")]
    ca: Option<Option<String>>,

    /// Country code
    #[arg(long, visible_alias = "c")]
    country: Option<String>,

    /// State or province
    #[arg(long, visible_aliases = ["st", "province"])]
    state: Option<String>,

    /// County or locality
    #[arg(long, visible_aliases = ["l", "locality"])]
    county: Option<String>,

    /// Organization
    #[arg(long, visible_aliases = ["o", "org"])]
    organization: Option<String>,

    /// Organizational unit
    #[arg(long, visible_alias = "ou")]
    unit: Option<String>,

    /// Email address
    #[arg(long)]
    email: Option<String>,

    /// Domain name. A "*." prefix issues a wildcard certificate
    #[arg(long = "common-name", visible_aliases = ["commonName", "cn", "common", "domain"])]
    common_name: Option<String>,

    /// Number of days the certificate is valid
    #[arg(long, default_value_t = DEFAULT_VALIDITY_DAYS)]
    days: u32,

    /// IP address for the certificate's alternative names (repeatable)
    #[arg(long, value_name = "ADDR", default_value = "127.0.0.1")]
    ip: Vec<IpAddr>,

    /// Also cover every direct subdomain of the common name
    #[arg(long, visible_alias = "wild")]
    wildcard: bool,

    /// List available CA root certificates and exit
    #[arg(long)]
    list: bool,

    /// Trust store directory (default: ~/.config/certiffix)
    #[arg(long, env = "CERTIFFIX_HOME", value_name = "DIR")]
    store: Option<PathBuf>,

    /// openssl binary to invoke
    #[arg(long, env = "CERTIFFIX_OPENSSL", default_value = DEFAULT_PROGRAM)]
    openssl: String,

    /// Log every external command
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn mode(&self) -> Mode {
        match self.ca {
            Some(None) => Mode::CaRoot,
            _ => Mode::Leaf,
        }
    }

    fn provided(&self) -> Provided {
        Provided {
            subject: Subject {
                country: self.country.clone(),
                state: self.state.clone(),
                county: self.county.clone(),
                organization: self.organization.clone(),
                unit: self.unit.clone(),
                email: self.email.clone(),
                common_name: self.common_name.clone(),
            },
            wildcard: self.wildcard,
            ip: self.ip.clone(),
            days: self.days,
            ca: self.ca.clone().flatten().filter(|ca| !ca.is_empty()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let base_dir = match &cli.store {
        Some(dir) => dir.clone(),
        None => TrustStoreConfig::default_base_dir()?,
    };
    let store = TrustStore::open(TrustStoreConfig::new(base_dir));

    if cli.list {
        return list_ca_roots(&store);
    }

    let mode = cli.mode();
    let request = {
        let mut prompter = StdioPrompter::stdio();
        resolve(mode, cli.provided(), &store, &mut prompter)?
    };
    let openssl = OpenSsl::with_program(&cli.openssl, ProcessRunner);

    match mode {
        Mode::CaRoot => {
            let entry = create_root_ca(&store, &openssl, &request).await?;

            println!(
                "✓ CA Root Certificate private key written to: {}",
                entry.private_key.display()
            );
            println!(
                "✓ CA Root Certificate public key written to: {}",
                entry.public_cert.display()
            );
            println!(
                "! You will need to add this CA Root Certificate to your trusted browser or system certificate authorities: {}",
                entry.public_cert.display()
            );
        }
        Mode::Leaf => {
            let entry = create_end_entity_cert(&store, &openssl, &request).await?;

            println!(
                "✓ Certificate private key written to: {}",
                entry.private_key.display()
            );
            println!(
                "✓ Certificate public key written to: {}",
                entry.public_cert.display()
            );
            println!("  Names: {}", request.dns.join(", "));
            println!("  Valid for: {} days", request.days);
        }
    }

    Ok(())
}

fn list_ca_roots(store: &TrustStore) -> Result<()> {
    let entries = store.list_available(Store::CaRoot)?;

    if entries.is_empty() {
        println!(
            "No CA root certificates found in {}.",
            store.config().ca_dir().display()
        );
        return Ok(());
    }

    println!("CA root certificates:");
    println!("{:<24} {:<8} {:<20} Certificate", "Name", "Key", "Issued");
    println!("{}", "-".repeat(90));

    for entry in entries {
        let issued = entry
            .issued_at()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let key = if entry.has_private_key() { "yes" } else { "missing" };

        println!(
            "{:<24} {:<8} {:<20} {}",
            entry.identifier,
            key,
            issued,
            entry.public_cert.display()
        );
    }

    Ok(())
}

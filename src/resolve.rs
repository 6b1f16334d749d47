//! Configuration resolution.
//!
//! Command line values arrive partially filled. The resolver asks a
//! [`Prompter`] for whatever is still missing (subject fields, wildcard
//! support, the signing CA) and produces a validated [`CertificateRequest`].

use crate::cert::request::{is_wildcard, CertificateRequest, Subject, DEFAULT_VALIDITY_DAYS};
use crate::error::{CertiffixError, Result};
use crate::storage::entry::Store;
use crate::storage::layout::TrustStore;
use std::io::{self, BufRead, Write};
use std::net::IpAddr;

/// Which workflow a request is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generate a self-signed CA root.
    CaRoot,
    /// Issue a CA-signed leaf certificate.
    Leaf,
}

/// Interactive source of missing values.
pub trait Prompter {
    /// Ask for a line of text. An empty answer is allowed.
    fn text(&mut self, label: &str) -> Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, label: &str, default: bool) -> Result<bool>;

    /// Ask the user to pick one of `choices`, returning its index.
    fn select(&mut self, label: &str, choices: &[String]) -> Result<usize>;
}

/// A [`Prompter`] reading answers from a reader and writing questions to a writer.
pub struct StdioPrompter<R, W> {
    input: R,
    output: W,
}

impl StdioPrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdioPrompter<R, W> {
    /// Prompt using the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CertiffixError::Prompt(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before all values were provided",
            )));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for StdioPrompter<R, W> {
    fn text(&mut self, label: &str) -> Result<String> {
        self.ask(&format!("{}: ", label))
    }

    fn confirm(&mut self, label: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.ask(&format!("{} ({}): ", label, hint))?;
            match answer.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer yes or no.")?,
            }
        }
    }

    fn select(&mut self, label: &str, choices: &[String]) -> Result<usize> {
        writeln!(self.output, "{}", label)?;
        for (index, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {}", index + 1, choice)?;
        }
        loop {
            let answer = self.ask(&format!("Choice [1-{}]: ", choices.len()))?;
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "Please enter a number between 1 and {}.", choices.len())?,
            }
        }
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provided {
    /// Subject fields given so far.
    pub subject: Subject,
    /// Whether `--wildcard` was given.
    pub wildcard: bool,
    /// IP addresses for the SAN extension.
    pub ip: Vec<IpAddr>,
    /// Validity period in days.
    pub days: u32,
    /// A CA path or name (leaf mode only).
    pub ca: Option<String>,
}

impl Default for Provided {
    fn default() -> Self {
        Self {
            subject: Subject::default(),
            wildcard: false,
            ip: Vec::new(),
            days: DEFAULT_VALIDITY_DAYS,
            ca: None,
        }
    }
}

/// Fill in missing values and build the request for `mode`.
///
/// In leaf mode without a CA, the CA store is offered for selection first;
/// an empty store fails with [`CertiffixError::NoCaAvailable`].
pub fn resolve<P: Prompter>(
    mode: Mode,
    provided: Provided,
    store: &TrustStore,
    prompter: &mut P,
) -> Result<CertificateRequest> {
    let ca = match mode {
        Mode::CaRoot => None,
        Mode::Leaf => Some(match &provided.ca {
            Some(reference) => store.resolve_ca(reference),
            None => select_ca(store, prompter)?,
        }),
    };

    let mut subject = provided.subject;
    let questions: [(&str, &mut Option<String>); 7] = [
        ("Country", &mut subject.country),
        ("State or Province", &mut subject.state),
        ("County or Locality", &mut subject.county),
        ("Organization", &mut subject.organization),
        ("Unit", &mut subject.unit),
        ("Email", &mut subject.email),
        ("Common Name (domain name)", &mut subject.common_name),
    ];
    for (label, slot) in questions {
        if slot.is_none() {
            *slot = Some(prompter.text(label)?);
        }
    }

    let common_name = subject.common_name.as_deref().unwrap_or_default();
    let wildcard = match mode {
        Mode::CaRoot => false,
        Mode::Leaf if provided.wildcard || is_wildcard(common_name) => true,
        Mode::Leaf => prompter.confirm("Support Wildcard Domain?", false)?,
    };

    let mut request = CertificateRequest::new(subject, wildcard)?
        .with_ips(provided.ip)
        .with_days(provided.days);
    if let Some(ca) = ca {
        request = request.with_ca(ca);
    }
    request.validate()?;

    Ok(request)
}

fn select_ca<P: Prompter>(store: &TrustStore, prompter: &mut P) -> Result<std::path::PathBuf> {
    let mut available = store.list_available(Store::CaRoot)?;
    if available.is_empty() {
        return Err(CertiffixError::NoCaAvailable(store.config().ca_dir()));
    }

    let choices: Vec<String> = available
        .iter()
        .map(|entry| {
            entry
                .public_cert
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.identifier.clone())
        })
        .collect();

    let index = prompter.select("Choose a CA Root Certificate for signing", &choices)?;
    if index >= available.len() {
        return Err(CertiffixError::InvalidInput(format!(
            "CA choice {} is out of range",
            index + 1
        )));
    }
    Ok(available.swap_remove(index).public_cert)
}

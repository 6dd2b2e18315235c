//! # Trust Bundle
//!
//! Loads the CA certificates that replace the built-in root store when a
//! certificate location is configured.
//!
//! A single file that yields no certificate is a configuration mistake and
//! fails. A directory that yields none is tolerated: the client falls back to
//! the built-in roots and a warning is logged.

use std::fs;
use std::path::Path;

use reqwest::Certificate;
use walkdir::WalkDir;
use x509_parser::pem::Pem;

use crate::constants::CERT_LOAD_ERROR_HEADER;
use crate::error::{BuilderError, CertificateError};
use crate::logging::Logger;

const PEM_CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Parsed CA certificates, built once per client builder
#[derive(Debug, Clone)]
pub struct TrustBundle {
    certificates: Vec<Certificate>,
}

impl TrustBundle {
    /// Load every certificate found at `location`
    ///
    /// Returns `Ok(None)` when `location` is a directory without a single
    /// usable certificate.
    pub fn load(location: &Path, logger: &dyn Logger) -> Result<Option<Self>, BuilderError> {
        let metadata = fs::metadata(location).map_err(|e| load_failure(location, e, logger))?;

        let certificates = if metadata.is_dir() {
            certificates_in_dir(location, logger)?
        } else {
            let data = fs::read(location).map_err(|e| load_failure(location, e, logger))?;
            parse_pem_certificates(&data)
        };

        if certificates.is_empty() {
            if metadata.is_dir() {
                logger.warning("No certificates found or failed to load, attempting without");
                return Ok(None);
            }
            let cause = CertificateError::InvalidCertificate;
            logger.error(&format!("{CERT_LOAD_ERROR_HEADER}: {cause}"));
            return Err(BuilderError::FailedToLoadCertificates {
                location: location.to_path_buf(),
                source: cause,
            });
        }

        logger.debug(&format!(
            "Loaded {} certificate(s) from {}",
            certificates.len(),
            location.display()
        ));
        Ok(Some(Self { certificates }))
    }

    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }
}

/// Certificates from every regular file directly inside `dir`
///
/// Unreadable entries are skipped with a debug line. Only a failure to list
/// `dir` itself is fatal.
fn certificates_in_dir(dir: &Path, logger: &dyn Logger) -> Result<Vec<Certificate>, BuilderError> {
    let mut certificates = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            // walkdir reports a failure to open the root itself at depth 0
            Err(e) if e.depth() == 0 => {
                return Err(load_failure(dir, std::io::Error::from(e), logger));
            }
            Err(e) => {
                logger.debug(&format!("{CERT_LOAD_ERROR_HEADER}: {e}"));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match fs::read(path) {
            Ok(data) => {
                let found = parse_pem_certificates(&data);
                if found.is_empty() {
                    logger.debug(&format!("No certificates in {}, skipping", path.display()));
                }
                certificates.extend(found);
            }
            Err(e) => logger.debug(&describe_io(path, &e)),
        }
    }

    Ok(certificates)
}

/// Every valid X.509 certificate in a concatenation of PEM blocks
///
/// Blocks with another label or an unparseable body are skipped. Parsing
/// stops at the first malformed PEM framing.
fn parse_pem_certificates(data: &[u8]) -> Vec<Certificate> {
    let mut certificates = Vec::new();

    for pem in Pem::iter_from_buffer(data) {
        let Ok(pem) = pem else {
            break;
        };
        if pem.label != PEM_CERTIFICATE_LABEL || pem.parse_x509().is_err() {
            continue;
        }
        if let Ok(certificate) = Certificate::from_der(&pem.contents) {
            certificates.push(certificate);
        }
    }

    certificates
}

fn describe_io(path: &Path, e: &std::io::Error) -> String {
    format!(
        "{CERT_LOAD_ERROR_HEADER}: {}: {e} ({})",
        path.display(),
        e.kind()
    )
}

fn load_failure(location: &Path, e: std::io::Error, logger: &dyn Logger) -> BuilderError {
    logger.debug(&describe_io(location, &e));
    BuilderError::FailedToLoadCertificates {
        location: location.to_path_buf(),
        source: CertificateError::Io(e),
    }
}

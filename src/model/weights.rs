//! Persisted classifier weights with optional checksum verification.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

use candle_nn::VarMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use super::errors::WeightsError;

/// A safetensors weights file, optionally pinned to a SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightsArtefact {
    /// Location of the weights on disk.
    pub path: PathBuf,
    /// Expected SHA-256 checksum as hexadecimal; case and surrounding
    /// whitespace are ignored.
    #[serde(default)]
    pub sha256: Option<String>,
}

impl WeightsArtefact {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sha256: None,
        }
    }

    #[must_use]
    pub fn with_sha256(mut self, digest: impl Into<String>) -> Self {
        self.sha256 = Some(digest.into());
        self
    }

    /// Check the file against the recorded digest, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`WeightsError::ChecksumMismatch`] when the digest differs and
    /// [`WeightsError::Io`] when the file cannot be read.
    pub fn verify(&self) -> Result<(), WeightsError> {
        let Some(expected) = self.sha256.as_deref().map(normalise_hex) else {
            warn!(path = %self.path.display(), "loading weights without a checksum");
            return Ok(());
        };
        let actual = compute_sha256(&self.path)?;
        if actual == expected {
            Ok(())
        } else {
            Err(WeightsError::ChecksumMismatch {
                path: self.path.clone(),
                expected,
                actual,
            })
        }
    }

    /// Verify the file, then overwrite every variable already registered in
    /// `var_map` with its stored value.
    ///
    /// Build the classifier over `var_map` first so the variables exist.
    ///
    /// # Errors
    ///
    /// Returns the verification errors of [`WeightsArtefact::verify`] and
    /// [`WeightsError::Load`] when the file is missing a variable or holds a
    /// tensor of the wrong shape.
    pub fn load_into(&self, var_map: &mut VarMap) -> Result<(), WeightsError> {
        self.verify()?;
        var_map.load(&self.path).map_err(|source| WeightsError::Load {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "loaded classifier weights");
        Ok(())
    }
}

/// Write every variable of `var_map` to `path` in safetensors format and
/// return an artefact pinned to the written file's digest.
///
/// # Errors
///
/// Returns [`WeightsError::Save`] when serialisation fails and
/// [`WeightsError::Io`] when the written file cannot be hashed.
pub fn save_weights(var_map: &VarMap, path: &Path) -> Result<WeightsArtefact, WeightsError> {
    var_map.save(path).map_err(|source| WeightsError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    let digest = compute_sha256(path)?;
    info!(path = %path.display(), sha256 = %digest, "saved classifier weights");
    Ok(WeightsArtefact::new(path).with_sha256(digest))
}

/// Computes the SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns I/O errors from opening or reading the file.
pub fn compute_sha256(path: &Path) -> Result<String, WeightsError> {
    let io_err = |source| WeightsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8192];
    loop {
        let read = reader.read(&mut buffer).map_err(io_err)?;
        let Some(chunk) = buffer.get(..read) else {
            return Err(io_err(std::io::Error::other(
                "read reported bytes beyond buffer length",
            )));
        };
        if chunk.is_empty() {
            break;
        }
        hasher.update(chunk);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[must_use]
pub fn normalise_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    fn normalise_hex_lowercases_and_trims() {
        assert_eq!(normalise_hex(" ABCDEF "), "abcdef");
    }

    #[rstest]
    fn digest_of_known_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        file.write_all(b"abc").unwrap_or_else(|e| panic!("{e}"));
        let digest = compute_sha256(file.path()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[rstest]
    fn verify_rejects_mismatched_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        file.write_all(b"abc").unwrap_or_else(|e| panic!("{e}"));
        let artefact = WeightsArtefact::new(file.path()).with_sha256("00");
        assert!(matches!(
            artefact.verify(),
            Err(WeightsError::ChecksumMismatch { .. })
        ));
    }

    #[rstest]
    fn verify_accepts_uppercase_digest() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|e| panic!("{e}"));
        file.write_all(b"abc").unwrap_or_else(|e| panic!("{e}"));
        let artefact = WeightsArtefact::new(file.path())
            .with_sha256(" BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD\n");
        assert!(artefact.verify().is_ok());
    }

    #[rstest]
    fn missing_file_is_an_io_error() {
        let artefact = WeightsArtefact::new("/nonexistent/weights.safetensors").with_sha256("00");
        assert!(matches!(artefact.verify(), Err(WeightsError::Io { .. })));
    }
}

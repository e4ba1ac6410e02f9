//! Post-download preprocessing.
//!
//! Directives are plain strings on disk (`encoding-utf8`) and a tagged
//! [`Directive`] in memory. Parsing happens once, when a manifest/lock file is
//! read or a CLI flag is accepted.

use crate::error::DimError;
use encoding_rs::{Encoding, EUC_JP, SHIFT_JIS, UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const ENCODING_PREFIX: &str = "encoding-";

/// Legacy encodings tried, in order, when a file is neither BOM-tagged nor UTF-8.
/// windows-1252 maps every byte, so it always terminates the search.
const FALLBACK_ENCODINGS: &[&Encoding] = &[SHIFT_JIS, EUC_JP, WINDOWS_1252];

/// A preprocess instruction attached to a manifest or lock entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Directive {
    /// Re-encode the text file to `target` (stored uppercased).
    Encoding { target: String },
    /// Unrecognized directive; kept verbatim and skipped when applied.
    Other(String),
}

impl Directive {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix(ENCODING_PREFIX) {
            Some(target) if !target.is_empty() => Directive::Encoding {
                target: target.to_uppercase(),
            },
            _ => Directive::Other(raw.to_string()),
        }
    }

    pub fn parse_all<I, S>(raw: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter().map(|s| Directive::parse(s.as_ref())).collect()
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Encoding { target } => write!(f, "{}{}", ENCODING_PREFIX, target),
            Directive::Other(raw) => f.write_str(raw),
        }
    }
}

impl From<String> for Directive {
    fn from(raw: String) -> Self {
        Directive::parse(&raw)
    }
}

impl From<Directive> for String {
    fn from(directive: Directive) -> Self {
        directive.to_string()
    }
}

/// Applies a single directive to a downloaded artifact.
pub trait Preprocessor: Send + Sync {
    fn apply(&self, path: &Path, directive: &Directive) -> Result<(), DimError>;
}

/// Apply every directive in order; the first failure stops the chain.
pub fn run_all(
    preprocessor: &dyn Preprocessor,
    path: &Path,
    directives: &[Directive],
) -> Result<(), DimError> {
    for directive in directives {
        preprocessor.apply(path, directive)?;
    }
    Ok(())
}

/// Text re-encoding preprocessor for `encoding-<TARGET>` directives.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingPreprocessor;

impl EncodingPreprocessor {
    pub fn new() -> Self {
        Self
    }
}

impl Preprocessor for EncodingPreprocessor {
    fn apply(&self, path: &Path, directive: &Directive) -> Result<(), DimError> {
        match directive {
            Directive::Encoding { target } => {
                let encoding = resolve_target(target).ok_or_else(|| DimError::PreprocessFailed {
                    path: path.to_path_buf(),
                    directive: directive.to_string(),
                    reason: format!("unknown encoding '{}'", target),
                })?;
                reencode_file(path, encoding).map_err(|reason| DimError::PreprocessFailed {
                    path: path.to_path_buf(),
                    directive: directive.to_string(),
                    reason,
                })?;
                info!(path = %path.display(), encoding = encoding.name(), "Converted encoding");
                Ok(())
            }
            Directive::Other(raw) => {
                debug!(directive = %raw, "Ignoring unrecognized preprocess directive");
                Ok(())
            }
        }
    }
}

fn resolve_target(target: &str) -> Option<&'static Encoding> {
    Encoding::for_label(target.as_bytes())
        .or_else(|| Encoding::for_label(target.replace('_', "-").as_bytes()))
}

/// Decode with BOM sniffing, then strict UTF-8, then the legacy fallbacks.
pub fn decode_text(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text, encoding);
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (Cow::Borrowed(text), UTF_8);
    }
    for encoding in FALLBACK_ENCODINGS {
        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if !had_errors {
            return (text, *encoding);
        }
    }
    (String::from_utf8_lossy(bytes), UTF_8)
}

fn reencode_file(path: &Path, target: &'static Encoding) -> Result<(), String> {
    if target.output_encoding() != target {
        return Err(format!("encoding to {} is not supported", target.name()));
    }
    let bytes = fs::read(path).map_err(|e| format!("read failed: {}", e))?;
    let (text, source) = decode_text(&bytes);
    debug!(path = %path.display(), from = source.name(), to = target.name(), "Re-encoding file");

    let (encoded, _, unmappable) = target.encode(&text);
    if unmappable {
        return Err(format!(
            "text contains characters that cannot be represented in {}",
            target.name()
        ));
    }

    let temp_path = path.with_extension("enc.tmp");
    fs::write(&temp_path, &encoded).map_err(|e| format!("write failed: {}", e))?;
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        format!("rename failed: {}", e)
    })
}

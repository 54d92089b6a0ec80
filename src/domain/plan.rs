//! Uploaded site plan documents

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identifier of a plan, unique within its site
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    /// Create an identifier, panicking if it is empty
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        assert!(!id.trim().is_empty(), "plan identifier must not be empty");
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a plan's bytes are to be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    /// Any format the image decoder understands
    #[default]
    Raster,
    /// First page of a PDF document
    Pdf,
}

impl PlanKind {
    /// Decide the kind from the declared file name
    ///
    /// Only the lower-cased `.pdf` suffix selects `Pdf`; the content is not
    /// inspected.
    pub fn from_file_name(name: &str) -> Self {
        if name.to_lowercase().ends_with(".pdf") {
            PlanKind::Pdf
        } else {
            PlanKind::Raster
        }
    }

    /// Guess the kind from magic bytes
    ///
    /// Used for diagnostics only. The declared kind always decides how a
    /// plan is decoded.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF-") {
            return Some(PlanKind::Pdf);
        }
        image::guess_format(bytes).ok().map(|_| PlanKind::Raster)
    }

    pub fn name(self) -> &'static str {
        match self {
            PlanKind::Raster => "raster",
            PlanKind::Pdf => "pdf",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One plan document with its content already fetched
///
/// Read-only once created. The bytes are shared so sources can be cloned
/// cheaply into render tasks.
#[derive(Clone, PartialEq)]
pub struct PlanSource {
    pub id: PlanId,
    pub kind: PlanKind,
    pub bytes: Arc<[u8]>,
}

impl PlanSource {
    pub fn new(id: PlanId, kind: PlanKind, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            id,
            kind,
            bytes: bytes.into(),
        }
    }

    /// Create a source whose kind comes from the declared file name
    pub fn from_file_name(id: PlanId, file_name: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::new(id, PlanKind::from_file_name(file_name), bytes)
    }
}

impl fmt::Debug for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanSource")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("len", &self.bytes.len())
            .finish()
    }
}

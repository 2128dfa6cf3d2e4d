//! Cross-product enumeration and output naming.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::models::view::{Audience, Length};
use crate::render::OutputFormat;

/// One file to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub role: String,
    pub length: Length,
    pub scheme: String,
    pub audience: Audience,
    pub format: OutputFormat,
}

/// Emissions sharing a key share one derived view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub role: String,
    pub length: Length,
    pub audience: Audience,
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.role, self.length, self.audience)
    }
}

impl Emission {
    pub fn view_key(&self) -> ViewKey {
        ViewKey {
            role: self.role.clone(),
            length: self.length,
            audience: self.audience,
        }
    }

    /// `<root>/<audience>/<role>/<length>/<scheme>/<base>_<role>_<length>_<scheme>.<ext>`
    pub fn output_path(&self, root: &Path, base: &str) -> PathBuf {
        let length = self.length.dir_name();
        root.join(self.audience.as_str())
            .join(&self.role)
            .join(length)
            .join(&self.scheme)
            .join(format!(
                "{base}_{}_{length}_{}.{}",
                self.role,
                self.scheme,
                self.format.ext()
            ))
    }
}

impl fmt::Display for Emission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "role={} length={} scheme={} audience={} format={}",
            self.role, self.length, self.scheme, self.audience, self.format
        )
    }
}

/// Enumerates every (role, length, scheme, audience, format) tuple. The
/// scheme varies slowest, then role, length, audience and format.
pub fn plan(
    roles: &[String],
    lengths: &[Length],
    schemes: &[String],
    audiences: &[Audience],
    formats: &[OutputFormat],
) -> Vec<Emission> {
    let mut emissions =
        Vec::with_capacity(roles.len() * lengths.len() * schemes.len() * audiences.len() * formats.len());
    for scheme in schemes {
        for role in roles {
            for &length in lengths {
                for &audience in audiences {
                    for &format in formats {
                        emissions.push(Emission {
                            role: role.clone(),
                            length,
                            scheme: scheme.clone(),
                            audience,
                            format,
                        });
                    }
                }
            }
        }
    }
    emissions
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

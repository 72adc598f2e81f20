use serde::Deserialize;

use crate::error::{Error, ErrorKind, Result};

/// The fields of a target's `package.json` that identify it.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PackageJson {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl PackageJson {
    /// Parses manifest text, ignoring a leading byte-order mark.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        serde_json::from_str(input).map_err(|err| {
            Error::new(
                ErrorKind::BadInstallation,
                format!("failed to parse package.json: {err}"),
            )
        })
    }
}

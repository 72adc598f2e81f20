mod error;
mod package_json;
mod targets;

pub use error::{Error, ErrorKind, Result};
pub use package_json::PackageJson;
pub use targets::{
    rel_path, TargetIdentity, TargetManifest, BACKUP_SUFFIX, LIB_DIR_NAME, PACKAGE_JSON_NAME,
    SCRIPT_EXTENSION, TARGET_PACKAGE_NAME, TARGET_VERSION,
};

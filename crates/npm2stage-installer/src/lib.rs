mod backups;
mod events;
mod fs_utils;
mod install;
mod layout;
mod leftovers;
mod npm_query;
mod preflight;
mod status;
mod types;
mod uninstall;
mod version_gate;

pub use backups::{backup_all, restore_all};
pub use events::{NullSink, ProgressEvent, ProgressSink, RecordingSink};
pub use fs_utils::{copy_file_exclusive, graft, prune, remove_files};
pub use install::{install, install_with_runner};
pub use layout::{default_source_dir, NpmLayout, SourceLayout, SOURCE_ENV_VAR};
pub use leftovers::expect_no_leftovers;
pub use npm_query::{npm_program, resolve_target_with_runner, run_command_stdout};
pub use status::{
    inspect_installation, status, status_with_runner, InstallationHealth, InstallationState,
    PresenceSet, StatusReport,
};
pub use types::{PatchProfile, TargetLocation};
pub use uninstall::{uninstall, uninstall_with_runner};
pub use version_gate::{check_version, check_version_with_runner};

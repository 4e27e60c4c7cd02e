//! Timestamp selection modes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Which file timestamp assigns a file to a bucket.
///
/// The physical field behind [`TimestampMode::Changed`] differs by platform:
///
/// | platform             | `Changed` reads                |
/// |----------------------|--------------------------------|
/// | Windows              | creation time                  |
/// | macOS, iOS, *BSD     | birth time (`st_birthtime`)    |
/// | Linux, other Unix    | status-change time (`st_ctime`)|
///
/// No creation time is synthesized where the platform does not report
/// one.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimestampMode {
    /// Last modification time.
    #[default]
    #[strum(to_string = "modified", serialize = "mtime")]
    Modified,
    /// Creation time or status-change time, depending on platform.
    #[strum(to_string = "changed", serialize = "ctime")]
    Changed,
    /// Last access time.
    #[strum(to_string = "accessed", serialize = "atime")]
    Accessed,
}

impl TimestampMode {
    /// Whether `Changed` reports a true creation time on this platform.
    pub const CHANGED_IS_CREATION: bool = cfg!(any(
        windows,
        target_vendor = "apple",
        target_os = "freebsd",
        target_os = "netbsd",
        target_os = "openbsd"
    ));

    /// Title-case name used in report titles, e.g. "Modification Time".
    pub fn label(self) -> &'static str {
        match self {
            TimestampMode::Modified => "Modification Time",
            TimestampMode::Changed if Self::CHANGED_IS_CREATION => "Creation Time",
            TimestampMode::Changed => "Change Time",
            TimestampMode::Accessed => "Access Time",
        }
    }

    /// One-line description of the field this mode reads on this platform.
    pub fn description(self) -> &'static str {
        match self {
            TimestampMode::Modified => "Group by modification time (default)",
            TimestampMode::Changed if Self::CHANGED_IS_CREATION => "Group by creation time",
            TimestampMode::Changed => {
                "Group by status-change time (ctime); creation time is not available on this platform"
            }
            TimestampMode::Accessed => "Group by access time",
        }
    }
}

//! Process exit codes.

use std::fmt;
use tts_savegame::SavegameError;

/// Exit code reported by the `tts-mod` binary.
///
/// # Examples
///
/// ```
/// use tts_cli::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert!(!ExitCode::ERROR.is_success());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Successful execution (exit code 0).
    pub const SUCCESS: Self = Self(0);

    /// I/O failure or other unexpected error (exit code 1).
    pub const ERROR: Self = Self(1);

    /// The savegame, the unpacked tree or the configuration is invalid
    /// (exit code 2).
    pub const INVALID_INPUT: Self = Self(2);

    /// Returns the exit code as an integer.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Checks if the exit code represents success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Picks the exit code for a failed command.
    ///
    /// Errors the user can fix by correcting their input map to
    /// [`INVALID_INPUT`](Self::INVALID_INPUT), everything else to
    /// [`ERROR`](Self::ERROR).
    #[must_use]
    pub fn for_error(error: &anyhow::Error) -> Self {
        let recoverable = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<SavegameError>())
            .is_some_and(SavegameError::is_recoverable);
        if recoverable {
            Self::INVALID_INPUT
        } else {
            Self::ERROR
        }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Process exit codes of the `rumdown` binary.

/// Every input converted
pub const SUCCESS: i32 = 0;

/// At least one input failed to convert
pub const CONVERSION_FAILED: i32 = 1;

/// Bad arguments, unreadable files or configuration problems
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    use super::*;

    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    pub fn conversion_failed() -> ! {
        std::process::exit(CONVERSION_FAILED);
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}

//! Lifecycle of a single crawl run
use std::fmt;

/// Why a crawl stopped
///
/// Every reason is a normal end state; none of them is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// A discovered link could not be queued because the frontier was full
    BufferFull,

    /// The server answered 429; the crawl stops out of politeness
    TooManyRequests,

    /// Nothing happened for a whole idle window; the normal end of a crawl
    Idle,

    /// The global deadline passed
    Deadline,

    /// Every worker stopped, or nobody is reading results any more
    Drained,
}

impl TerminationReason {
    /// Returns true if the crawl ended before the site was exhausted
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::BufferFull | Self::TooManyRequests | Self::Deadline)
    }

    /// Short, stable name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BufferFull => "buffer_full",
            Self::TooManyRequests => "too_many_requests",
            Self::Idle => "idle",
            Self::Deadline => "deadline",
            Self::Drained => "drained",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::BufferFull => "no space left on buffer",
            Self::TooManyRequests => "too many requests",
            Self::Idle => "no activity within the idle timeout",
            Self::Deadline => "deadline exceeded",
            Self::Drained => "all workers stopped",
        };
        f.write_str(message)
    }
}

/// State of the coordinator's event loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrawlState {
    #[default]
    Running,
    Terminated(TerminationReason),
}

impl CrawlState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// The recorded reason, once terminated
    pub fn reason(&self) -> Option<TerminationReason> {
        match self {
            Self::Running => None,
            Self::Terminated(reason) => Some(*reason),
        }
    }

    /// Moves to `Terminated`, keeping the first reason recorded
    ///
    /// Returns true if this call performed the transition.
    pub fn terminate(&mut self, reason: TerminationReason) -> bool {
        match self {
            Self::Running => {
                *self = Self::Terminated(reason);
                true
            }
            Self::Terminated(_) => false,
        }
    }
}

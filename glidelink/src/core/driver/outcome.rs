/// Result of a driver operation.
///
/// Operations a driver does not implement report [`Outcome::Unsupported`]. Callers treat it the
/// same way as [`Outcome::Rejected`], the distinction is kept for diagnostics and for the few
/// places where a missing hook is not a failure (see [`Driver::open`](super::Driver::open)).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Outcome {
    /// Operation was accepted or attempted. For parsing: the line was recognised.
    Accepted,
    /// Driver declined the operation or did not recognise the line.
    Rejected,
    /// Driver does not implement the operation.
    #[default]
    Unsupported,
}

impl Outcome {
    /// Returns `true` for [`Outcome::Accepted`].
    #[inline(always)]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }

    /// Returns `true` for [`Outcome::Rejected`].
    #[inline(always)]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected)
    }

    /// Returns `true` unless operation is [`Outcome::Unsupported`].
    #[inline(always)]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Outcome::Unsupported)
    }
}

impl From<bool> for Outcome {
    fn from(value: bool) -> Self {
        if value {
            Outcome::Accepted
        } else {
            Outcome::Rejected
        }
    }
}

/// Result of handing a message to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Success,
    /// The payload could not be encoded, or the message itself is malformed.
    Invalid,
    /// Transport failure, client timeout or a non-200 answer. Not distinguished.
    Timeout,
    /// The recipient is not owned by this minion.
    Rejected,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Success => "success",
            DeliveryStatus::Invalid => "invalid",
            DeliveryStatus::Timeout => "timeout",
            DeliveryStatus::Rejected => "rejected",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryStatus::Success)
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the owner of a username was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// The user lives in our own store. Authoritative.
    Local,
    /// Taken from the most recent message to the same recipient. May be stale.
    Cached,
    /// Answered by the master.
    Master,
    /// Nobody could say. Carries how the master lookup failed.
    Unresolved(DeliveryStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Empty when unresolved.
    pub identifier: String,
    pub confidence: Confidence,
}

impl Resolution {
    pub fn found(identifier: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            identifier: identifier.into(),
            confidence,
        }
    }

    pub fn unresolved(status: DeliveryStatus) -> Self {
        Self {
            identifier: String::new(),
            confidence: Confidence::Unresolved(status),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.confidence, Confidence::Unresolved(_))
    }
}

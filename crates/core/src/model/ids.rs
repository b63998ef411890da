use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable, 1-based serial number of a question in the bank.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serial(u32);

impl Serial {
    /// Creates a new `Serial`
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the underlying u32 value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// 1-based number of a fixed question set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetNumber(u32);

impl SetNumber {
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// 1-based number of a randomized test.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestNumber(u32);

impl TestNumber {
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// A unit of progress: either a fixed set or a pinned random test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitId {
    Set(SetNumber),
    Test(TestNumber),
}

impl UnitId {
    #[must_use]
    pub fn set(value: u32) -> Self {
        Self::Set(SetNumber::new(value))
    }

    #[must_use]
    pub fn test(value: u32) -> Self {
        Self::Test(TestNumber::new(value))
    }

    /// Human-facing title, e.g. `Set 3` or `Test 1`.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            UnitId::Set(n) => format!("Set {n}"),
            UnitId::Test(n) => format!("Test {n}"),
        }
    }

    #[must_use]
    pub fn is_test(&self) -> bool {
        matches!(self, UnitId::Test(_))
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Serial({})", self.0)
    }
}

impl fmt::Debug for SetNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetNumber({})", self.0)
    }
}

impl fmt::Debug for TestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestNumber({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for SetNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TestNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitId::Set(n) => write!(f, "set-{n}"),
            UnitId::Test(n) => write!(f, "test-{n}"),
        }
    }
}

// ─── FromStr Implementations ───────────────────────────────────────────────────

/// Error type for parsing an identifier from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

fn parse_u32(s: &str, kind: &'static str) -> Result<u32, ParseIdError> {
    s.trim().parse::<u32>().map_err(|_| ParseIdError { kind })
}

impl FromStr for Serial {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_u32(s, "Serial").map(Serial::new)
    }
}

impl FromStr for SetNumber {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_u32(s, "SetNumber").map(SetNumber::new)
    }
}

impl FromStr for TestNumber {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_u32(s, "TestNumber").map(TestNumber::new)
    }
}

/// Accepts the `Display` form (`set-3`, `test-1`).
impl FromStr for UnitId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if let Some(rest) = s.strip_prefix("set-") {
            return parse_u32(rest, "UnitId").map(UnitId::set);
        }
        if let Some(rest) = s.strip_prefix("test-") {
            return parse_u32(rest, "UnitId").map(UnitId::test);
        }
        Err(ParseIdError { kind: "UnitId" })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

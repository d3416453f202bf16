//! Message types
//!
//! Every message reports a [`MessageKind`]. Kinds form a tree rooted at
//! [`ANY`]; a consumer that declares a kind receives messages of that kind
//! and of every kind below it.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::fmt;

/// A node in the message kind hierarchy
#[derive(Debug, PartialEq, Eq)]
pub struct MessageKind {
    name: &'static str,
    parent: Option<&'static MessageKind>,
}

impl MessageKind {
    /// Declare a kind below `parent`
    pub const fn new(name: &'static str, parent: &'static MessageKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static MessageKind> {
        self.parent
    }

    /// True if `self` is `other` or one of its descendants
    pub fn is_a(&self, other: &MessageKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent;
        }
        false
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Root of the kind hierarchy
pub static ANY: MessageKind = MessageKind {
    name: "any",
    parent: None,
};

/// Host lifecycle messages
pub static SYSTEM: MessageKind = MessageKind::new("system", &ANY);

/// Named queries carrying a JSON payload
pub static QUERY: MessageKind = MessageKind::new("query", &ANY);

/// A typed payload published on a queue
pub trait Message: Send + Sync + fmt::Debug {
    fn kind(&self) -> &'static MessageKind;

    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn Message + 'a {
    /// Downcast to a concrete message type
    pub fn downcast_ref<T: Message + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Host lifecycle status carried by a [`SystemMessage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemStatus {
    Started,
    ShuttingDown,
}

impl SystemStatus {
    pub fn code(&self) -> u32 {
        match self {
            Self::Started => 0,
            Self::ShuttingDown => 1,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Started),
            1 => Some(Self::ShuttingDown),
            _ => None,
        }
    }
}

impl fmt::Display for SystemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::ShuttingDown => write!(f, "shutting down"),
        }
    }
}

/// Host lifecycle message
#[derive(Debug, Clone)]
pub struct SystemMessage {
    status: SystemStatus,
    text: Option<String>,
    timestamp: DateTime<Utc>,
}

impl SystemMessage {
    pub fn new(status: SystemStatus) -> Self {
        Self {
            status,
            text: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_text(status: SystemStatus, text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::new(status)
        }
    }

    pub fn started() -> Self {
        Self::new(SystemStatus::Started)
    }

    pub fn shutting_down() -> Self {
        Self::new(SystemStatus::ShuttingDown)
    }

    pub fn status(&self) -> SystemStatus {
        self.status
    }

    pub fn status_code(&self) -> u32 {
        self.status.code()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Message for SystemMessage {
    fn kind(&self) -> &'static MessageKind {
        &SYSTEM
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A named query with arbitrary JSON data
#[derive(Debug, Clone, PartialEq)]
pub struct QueryMessage {
    name: String,
    data: serde_json::Value,
}

impl QueryMessage {
    pub fn new(name: &str, data: serde_json::Value) -> Self {
        Self {
            name: name.to_string(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }
}

impl Message for QueryMessage {
    fn kind(&self) -> &'static MessageKind {
        &QUERY
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//! Records and record types.
//!
//! A [`Record`] is the unit of persistence in the document store. Every record
//! carries a [`RecordType`] discriminator from a closed set; the wire name of
//! the type doubles as the bucket directory name in the synchronized tree.
//!
//! ## Nesting
//!
//! Some record types live inside records of another type (requests inside
//! request groups, routes inside mock servers). [`RecordType::nests_under`] is
//! the single source of truth for those pairings:
//!
//! ```text
//! RequestGroup ◄── Request, GrpcRequest, WebSocketRequest
//! WebSocketRequest ◄── WebSocketPayload
//! UnitTestSuite ◄── UnitTest
//! ProtoDirectory ◄── ProtoFile
//! MockServer ◄── MockRoute
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{EnumIter, EnumString, IntoEnumIterator};

/// Discriminator for every record kind the synchronized tree knows about.
///
/// The set is closed: adding a type means adding a variant here and a line in
/// [`RecordType::nests_under`], and the compiler points at everything else.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumString,
    EnumIter,
)]
pub enum RecordType {
    Workspace,
    Environment,
    RequestGroup,
    Request,
    GrpcRequest,
    WebSocketRequest,
    WebSocketPayload,
    ApiSpec,
    ProtoFile,
    ProtoDirectory,
    UnitTestSuite,
    UnitTest,
    MockServer,
    MockRoute,
}

impl RecordType {
    /// Parse a wire name (exact match, case-sensitive).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Wire name, also used as the bucket directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Workspace => "Workspace",
            RecordType::Environment => "Environment",
            RecordType::RequestGroup => "RequestGroup",
            RecordType::Request => "Request",
            RecordType::GrpcRequest => "GrpcRequest",
            RecordType::WebSocketRequest => "WebSocketRequest",
            RecordType::WebSocketPayload => "WebSocketPayload",
            RecordType::ApiSpec => "ApiSpec",
            RecordType::ProtoFile => "ProtoFile",
            RecordType::ProtoDirectory => "ProtoDirectory",
            RecordType::UnitTestSuite => "UnitTestSuite",
            RecordType::UnitTest => "UnitTest",
            RecordType::MockServer => "MockServer",
            RecordType::MockRoute => "MockRoute",
        }
    }

    /// All record types, in declaration order.
    pub fn all() -> impl Iterator<Item = RecordType> {
        Self::iter()
    }

    /// The record type this type is nested one level under, if any.
    pub fn nests_under(&self) -> Option<RecordType> {
        match self {
            RecordType::Request | RecordType::GrpcRequest | RecordType::WebSocketRequest => {
                Some(RecordType::RequestGroup)
            }
            RecordType::WebSocketPayload => Some(RecordType::WebSocketRequest),
            RecordType::UnitTest => Some(RecordType::UnitTestSuite),
            RecordType::ProtoFile => Some(RecordType::ProtoDirectory),
            RecordType::MockRoute => Some(RecordType::MockServer),
            RecordType::Workspace
            | RecordType::Environment
            | RecordType::RequestGroup
            | RecordType::ApiSpec
            | RecordType::ProtoDirectory
            | RecordType::UnitTestSuite
            | RecordType::MockServer => None,
        }
    }

    /// This type followed by every type it nests under, innermost first.
    ///
    /// A descendant query for records of this type has to pass through all of
    /// these, otherwise nested records are never reached.
    pub fn with_nesting_ancestors(&self) -> Vec<RecordType> {
        let mut chain = vec![*self];
        let mut current = *self;
        while let Some(parent) = current.nests_under() {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Check if this is the workspace type.
    pub fn is_workspace(&self) -> bool {
        matches!(self, RecordType::Workspace)
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted document.
///
/// Only identity, ownership, privacy and timestamps are interpreted here.
/// Everything else rides along in `fields` and must survive a round trip
/// untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Opaque, stable, unique id.
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Owning record. For workspaces this is the owning project, which is
    /// not part of the synchronized tree.
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    /// Private records are invisible to synchronization.
    #[serde(rename = "isPrivate", default)]
    pub is_private: bool,
    /// Last modification, unix milliseconds.
    #[serde(default)]
    pub modified: u64,
    /// Creation, unix milliseconds.
    #[serde(default)]
    pub created: u64,
    /// Type-specific fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Create a record with no parent, no extra fields, and zero timestamps.
    pub fn new(record_type: RecordType, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            record_type,
            parent_id: None,
            is_private: false,
            modified: 0,
            created: 0,
            fields: Map::new(),
        }
    }

    /// Set the parent id.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Mark the record private.
    pub fn private(mut self) -> Self {
        self.is_private = true;
        self
    }

    /// Set the modification timestamp.
    pub fn with_modified(mut self, modified: u64) -> Self {
        self.modified = modified;
        self
    }

    /// Set a field by its wire name (see [`Record::set_field`]).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_field(key, value.into());
        self
    }

    /// Set a field by its wire name.
    ///
    /// Known keys (`parentId`, `isPrivate`, `modified`, `created`) update the
    /// typed attribute; a value of the wrong shape resets it to its default.
    /// `_id` and `type` are identity and are never touched. Anything else
    /// lands in `fields`.
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match key.as_str() {
            "_id" | "type" => {}
            "parentId" => self.parent_id = value.as_str().map(String::from),
            "isPrivate" => self.is_private = value.as_bool().unwrap_or(false),
            "modified" => self.modified = value.as_u64().unwrap_or(0),
            "created" => self.created = value.as_u64().unwrap_or(0),
            _ => {
                self.fields.insert(key, value);
            }
        }
    }

    /// Get a type-specific field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn is_workspace(&self) -> bool {
        self.record_type.is_workspace()
    }
}

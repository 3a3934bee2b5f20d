//! Core data model: [`CodeSymbol`], [`CodeFile`], [`CodeProject`],
//! [`IndexingJob`], and the auxiliary [`Chunk`] entity used only by hybrid
//! search.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed set of symbol kinds a conforming extractor may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    Package,
    Module,
    Namespace,
    Class,
    Struct,
    Interface,
    Trait,
    Enum,
    EnumMember,
    TypeAlias,
    Function,
    Method,
    Constructor,
    Property,
    Field,
    Variable,
    Constant,
}

impl SymbolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolType::Package => "package",
            SymbolType::Module => "module",
            SymbolType::Namespace => "namespace",
            SymbolType::Class => "class",
            SymbolType::Struct => "struct",
            SymbolType::Interface => "interface",
            SymbolType::Trait => "trait",
            SymbolType::Enum => "enum",
            SymbolType::EnumMember => "enum_member",
            SymbolType::TypeAlias => "type_alias",
            SymbolType::Function => "function",
            SymbolType::Method => "method",
            SymbolType::Constructor => "constructor",
            SymbolType::Property => "property",
            SymbolType::Field => "field",
            SymbolType::Variable => "variable",
            SymbolType::Constant => "constant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeSymbol {
    pub id: String,
    pub project_id: String,
    pub file_path: String,
    pub language: String,
    pub symbol_type: SymbolType,
    pub name: String,
    pub name_path: String,
    pub start_line: u32,
    pub end_line: u32,
    pub start_byte: u32,
    pub end_byte: u32,
    pub signature: Option<String>,
    pub doc_string: Option<String>,
    pub source_code: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub parent_id: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CodeSymbol {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        project_id: impl Into<String>,
        file_path: impl Into<String>,
        language: impl Into<String>,
        symbol_type: SymbolType,
        name: impl Into<String>,
        name_path: impl Into<String>,
        start_line: u32,
        end_line: u32,
        start_byte: u32,
        end_byte: u32,
    ) -> Self {
        let now = now_ts();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            file_path: file_path.into(),
            language: language.into(),
            symbol_type,
            name: name.into(),
            name_path: name_path.into(),
            start_line,
            end_line,
            start_byte,
            end_byte,
            signature: None,
            doc_string: None,
            source_code: None,
            embedding: None,
            parent_id: None,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexingStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl IndexingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexingStatus::Pending => "pending",
            IndexingStatus::InProgress => "in_progress",
            IndexingStatus::Completed => "completed",
            IndexingStatus::Failed => "failed",
            IndexingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IndexingStatus::Completed | IndexingStatus::Failed | IndexingStatus::Cancelled
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeProject {
    pub project_id: String,
    pub name: String,
    pub root_path: String,
    pub language_stats: HashMap<String, u64>,
    pub last_indexed_at: Option<i64>,
    pub indexing_status: IndexingStatus,
    pub embedding_dimension: Option<usize>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CodeProject {
    pub fn new(project_id: impl Into<String>, name: impl Into<String>, root_path: impl Into<String>) -> Self {
        let now = now_ts();
        Self {
            project_id: project_id.into(),
            name: name.into(),
            root_path: root_path.into(),
            language_stats: HashMap::new(),
            last_indexed_at: None,
            indexing_status: IndexingStatus::Pending,
            embedding_dimension: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeFile {
    pub project_id: String,
    pub file_path: String,
    pub language: String,
    pub file_hash: String,
    pub symbols_count: u32,
    pub indexed_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub project_id: String,
    pub file_path: String,
    pub chunk_index: u32,
    pub language: String,
    pub symbol_type: Option<SymbolType>,
    pub text: String,
    pub embedding: Option<Vec<f32>>,
}

impl Chunk {
    pub fn new(
        project_id: impl Into<String>,
        file_path: impl Into<String>,
        chunk_index: u32,
        language: impl Into<String>,
        symbol_type: Option<SymbolType>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            file_path: file_path.into(),
            chunk_index,
            language: language.into(),
            symbol_type,
            text: text.into(),
            embedding: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingJob {
    pub id: String,
    pub project_id: String,
    pub project_path: String,
    pub status: IndexingStatus,
    pub progress: f32,
    pub files_total: u32,
    pub files_indexed: u32,
    pub symbols_found: u32,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub error: Option<String>,
    pub file_errors: Vec<(String, String)>,
}

impl IndexingJob {
    pub fn new(project_id: impl Into<String>, project_path: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            project_id: project_id.into(),
            project_path: project_path.into(),
            status: IndexingStatus::Pending,
            progress: 0.0,
            files_total: 0,
            files_indexed: 0,
            symbols_found: 0,
            started_at: now_ts(),
            completed_at: None,
            error: None,
            file_errors: Vec::new(),
        }
    }
}
</content>

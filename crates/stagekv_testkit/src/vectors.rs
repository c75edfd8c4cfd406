//! Encoding vectors for StageKV's on-disk formats.
//!
//! Any tool that reads or writes a store root has to agree with these
//! vectors byte for byte.

use serde::{Deserialize, Serialize};

/// A key and the entry file name it maps to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// The key.
    pub key: String,
    /// Expected file name.
    pub file_name: String,
    /// Whether the key can be recovered from the file name.
    pub reversible: bool,
}

/// A value (as JSON text) and its exact document bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Input JSON, in any formatting.
    pub input: String,
    /// Expected document contents.
    pub document: String,
}

/// Key encoding vectors.
pub fn key_vectors() -> Vec<KeyVector> {
    let long_key = "x".repeat(200);
    vec![
        KeyVector {
            id: "key_simple".into(),
            description: "ASCII key".into(),
            key: "key".into(),
            file_name: "a2V5.json".into(),
            reversible: true,
        },
        KeyVector {
            id: "key_empty".into(),
            description: "Empty key".into(),
            key: String::new(),
            file_name: ".json".into(),
            reversible: true,
        },
        KeyVector {
            id: "key_slash_substitution".into(),
            description: "Base64 '/' is written as '_'".into(),
            key: "???".into(),
            file_name: "Pz8_.json".into(),
            reversible: true,
        },
        KeyVector {
            id: "key_weird".into(),
            description: "Path separators and query characters".into(),
            key: "___weird:/\\?&=___".into(),
            file_name: "X19fd2VpcmQ6L1w_Jj1fX18=.json".into(),
            reversible: true,
        },
        KeyVector {
            id: "key_path_like".into(),
            description: "Key that looks like a path".into(),
            key: "user/42".into(),
            file_name: "dXNlci80Mg==.json".into(),
            reversible: true,
        },
        KeyVector {
            id: "key_non_ascii".into(),
            description: "Multi-byte UTF-8".into(),
            key: "clé".into(),
            file_name: "Y2zDqQ==.json".into(),
            reversible: true,
        },
        KeyVector {
            id: "key_digest".into(),
            description: "Long key shortened with a SHA-256 digest".into(),
            file_name: format!(
                "{}-aa20c23e3201834050679e1d88941b9a6fed0557c9a705cb2c315e2e63fd486d.json",
                &"eHh4".repeat(40)
            ),
            key: long_key,
            reversible: false,
        },
    ]
}

/// Document encoding vectors.
pub fn document_vectors() -> Vec<DocumentVector> {
    vec![
        DocumentVector {
            id: "doc_null".into(),
            description: "Top-level null".into(),
            input: "null".into(),
            document: "null".into(),
        },
        DocumentVector {
            id: "doc_value_wrapper".into(),
            description: "Single-field object".into(),
            input: r#"{ "value": "hello world!" }"#.into(),
            document: r#"{"value":"hello world!"}"#.into(),
        },
        DocumentVector {
            id: "doc_sorted_fields".into(),
            description: "Object fields are written in sorted order".into(),
            input: r#"{"b": 2, "a": 1}"#.into(),
            document: r#"{"a":1,"b":2}"#.into(),
        },
        DocumentVector {
            id: "doc_mixed_array".into(),
            description: "Array of every scalar kind".into(),
            input: r#"[true, null, -7, 1.5, "s"]"#.into(),
            document: r#"[true,null,-7,1.5,"s"]"#.into(),
        },
    ]
}

/// Generate all vectors as JSON for use by other tools.
pub fn all_vectors_json() -> String {
    let vectors = AllVectors {
        keys: key_vectors(),
        documents: document_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllVectors {
    keys: Vec<KeyVector>,
    documents: Vec<DocumentVector>,
}

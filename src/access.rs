// Copyright 2023 Remi Bernotavicius

/// Proof that the caller typed the editor key. Every operation that changes the plan, the pantry
/// or the shopping list takes one of these.
#[derive(Debug, PartialEq, Eq)]
pub struct EditorCapability {
    _private: (),
}

#[derive(Debug, PartialEq, Eq)]
pub enum Capability {
    Editor(EditorCapability),
    Reader,
}

impl Capability {
    /// Grants editing only when a key is configured and `input` matches it exactly.
    pub fn authorize(configured_key: Option<&str>, input: &str) -> Self {
        match configured_key {
            Some(key) if !key.is_empty() && key == input => {
                Self::Editor(EditorCapability { _private: () })
            }
            _ => Self::Reader,
        }
    }

    pub fn editor(&self) -> Option<&EditorCapability> {
        match self {
            Self::Editor(editor) => Some(editor),
            Self::Reader => None,
        }
    }

    pub fn is_editor(&self) -> bool {
        self.editor().is_some()
    }
}

#[cfg(test)]
pub fn test_editor() -> EditorCapability {
    EditorCapability { _private: () }
}

#[test]
fn authorize() {
    assert!(Capability::authorize(Some("hunter2"), "hunter2").is_editor());
    assert_eq!(
        Capability::authorize(Some("hunter2"), "hunter3"),
        Capability::Reader
    );
    assert_eq!(Capability::authorize(Some("hunter2"), ""), Capability::Reader);
    assert_eq!(Capability::authorize(None, ""), Capability::Reader);
    assert_eq!(Capability::authorize(Some(""), ""), Capability::Reader);
}

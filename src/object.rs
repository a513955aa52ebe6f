use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    String,
}

/// Heap-resident values. Every instance lives in a [`crate::memory::Heap`].
#[derive(Debug)]
pub enum Object {
    String(ObjString),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::String(_) => ObjectKind::String,
        }
    }

    /// Bytes owned by the object, header included.
    pub fn size(&self) -> usize {
        match self {
            Object::String(s) => std::mem::size_of::<Object>() + s.len(),
        }
    }

    pub fn as_string(&self) -> Option<&ObjString> {
        match self {
            Object::String(s) => Some(s),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::String(a), Object::String(b)) => a == b,
        }
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::String(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug)]
pub struct ObjString {
    chars: Box<str>,
}

impl ObjString {
    pub fn new(chars: &str) -> Self {
        Self {
            chars: chars.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.chars
    }
}

// Content equality: distinct allocations with the same bytes are equal.
impl PartialEq for ObjString {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.chars.as_bytes() == other.chars.as_bytes()
    }
}

impl Display for ObjString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_compare_by_content() {
        let a = ObjString::new("lox");
        let b = ObjString::new("lox");
        assert!(!std::ptr::eq(&a, &b));
        assert_eq!(a, b);
        assert_ne!(ObjString::new("lox"), ObjString::new("loxx"));
        assert_ne!(ObjString::new("abc"), ObjString::new("abd"));
    }

    #[test]
    fn size_counts_characters() {
        let obj = Object::String(ObjString::new("four"));
        assert_eq!(obj.kind(), ObjectKind::String);
        assert_eq!(obj.size(), std::mem::size_of::<Object>() + 4);
    }
}

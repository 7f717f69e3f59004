//! Document paths for mismatch diagnostics.
//!
//! A path is accumulated while the matcher descends into the schema and is
//! only ever used to render error messages; it is not part of any persisted
//! format.
use std::fmt;

/// One step into a JSON document: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location inside a JSON document, rendered as `a.b[2].c`.
///
/// Cloned on each descent rather than threaded mutably so sibling branches
/// never see each other's segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValuePath(Vec<Segment>);

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend with an object key.
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.to_string()));
        Self(segments)
    }

    /// Extend with an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

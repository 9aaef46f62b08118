/*!
 * Path Context / Cycle Detector
 * Parent-chain stack built during traversal
 *
 * Each frame records the identity of the value being serialized and its
 * position in the parent. Before recursing into a child, composite
 * serializers ask [`SerialContext::reference_path`] whether the child is
 * already on the stack; a hit means a cycle, and the caller emits a
 * `{"$ref":"<path>"}` marker instead of recursing.
 *
 * Frames must be popped on every exit path, including error returns, so
 * pushing goes through a guard whose `Drop` pops (see
 * [`JsonWriter::enter`](crate::ser::JsonWriter::enter)).
 */

use crate::core::errors::{SerResult, SerializeError};
use crate::core::limits::DEFAULT_MAX_DEPTH;
use crate::core::types::{InlineString, Label};
use crate::graph::{node_ident, node_type_id, Node};
use std::any::TypeId;

/// Position of a frame inside its parent, owned so frames outlive the
/// borrow they were created from
#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameLabel {
    Root,
    Field(InlineString),
    Index(usize),
}

impl From<Label<'_>> for FrameLabel {
    fn from(label: Label<'_>) -> Self {
        match label {
            Label::None => FrameLabel::Root,
            Label::Field(name) => FrameLabel::Field(InlineString::from(name)),
            Label::Index(i) => FrameLabel::Index(i),
        }
    }
}

struct Frame {
    ident: usize,
    type_id: TypeId,
    label: FrameLabel,
}

/// Transient traversal state for one serialization call
pub struct SerialContext {
    frames: Vec<Frame>,
    max_depth: usize,
    detect: bool,
}

impl SerialContext {
    pub fn new(detect: bool) -> Self {
        Self::with_max_depth(detect, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(detect: bool, max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
            detect,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// Whether identity bookkeeping is active (`DISABLE_CYCLE_DETECTION`
    /// clears it)
    #[inline]
    pub fn detecting(&self) -> bool {
        self.detect
    }

    pub fn set_detecting(&mut self, detect: bool) {
        self.detect = detect;
    }

    /// Push a frame for `node`. The depth ceiling applies even with
    /// detection disabled - deeply nested acyclic input is bounded
    /// independently of the cycle detector.
    pub(crate) fn push(&mut self, node: &dyn Node, label: Label<'_>) -> SerResult<()> {
        if self.frames.len() >= self.max_depth {
            return Err(SerializeError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.frames.push(Frame {
            ident: node_ident(node),
            type_id: node_type_id(node),
            label: label.into(),
        });
        Ok(())
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Textual path to the ancestor frame matching `node`, or `None` when
    /// the node is not currently being serialized.
    ///
    /// Identity is reference equality: the node's data address paired with
    /// its runtime type.
    pub fn reference_path(&self, node: &dyn Node) -> Option<String> {
        if !self.detect {
            return None;
        }
        let ident = node_ident(node);
        let type_id = node_type_id(node);
        let at = self
            .frames
            .iter()
            .position(|f| f.ident == ident && f.type_id == type_id)?;
        Some(self.path_to(at))
    }

    /// `$` for the root, then `.name` / `[index]` per frame
    fn path_to(&self, at: usize) -> String {
        let mut path = String::from("$");
        for frame in &self.frames[..=at] {
            match &frame.label {
                FrameLabel::Root => {}
                FrameLabel::Field(name) => {
                    path.push('.');
                    path.push_str(name);
                }
                FrameLabel::Index(i) => {
                    path.push('[');
                    let mut fmt = itoa::Buffer::new();
                    path.push_str(fmt.format(*i));
                    path.push(']');
                }
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_depth() {
        let mut ctx = SerialContext::new(true);
        let a = 1i64;
        assert_eq!(ctx.depth(), 0);
        ctx.push(&a, Label::None).unwrap();
        ctx.push(&a, Label::Index(0)).unwrap();
        assert_eq!(ctx.depth(), 2);
        ctx.pop();
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn test_depth_ceiling() {
        let mut ctx = SerialContext::with_max_depth(true, 3);
        let a = 1i64;
        ctx.push(&a, Label::None).unwrap();
        ctx.push(&a, Label::Index(0)).unwrap();
        ctx.push(&a, Label::Index(1)).unwrap();
        let err = ctx.push(&a, Label::Index(2)).unwrap_err();
        assert!(matches!(err, SerializeError::DepthExceeded { limit: 3 }));
    }

    #[test]
    fn test_reference_path_construction() {
        let root = String::from("root");
        let child = vec![1i64];
        let mut ctx = SerialContext::new(true);
        ctx.push(&root, Label::None).unwrap();
        ctx.push(&child, Label::Field("items")).unwrap();

        assert_eq!(ctx.reference_path(&root).unwrap(), "$");
        assert_eq!(ctx.reference_path(&child).unwrap(), "$.items");

        let stranger = String::from("elsewhere");
        assert!(ctx.reference_path(&stranger).is_none());
    }

    #[test]
    fn test_index_labels_in_path() {
        let root = String::from("root");
        let child = String::from("child");
        let mut ctx = SerialContext::new(true);
        ctx.push(&root, Label::None).unwrap();
        ctx.push(&child, Label::Index(3)).unwrap();
        assert_eq!(ctx.reference_path(&child).unwrap(), "$[3]");
    }

    #[test]
    fn test_detection_disabled() {
        let root = String::from("root");
        let mut ctx = SerialContext::new(false);
        ctx.push(&root, Label::None).unwrap();
        assert!(ctx.reference_path(&root).is_none());
    }

    #[test]
    fn test_same_value_different_types_not_confused() {
        // a struct and its first field share an address but never a type
        struct Outer {
            first: i64,
        }
        crate::json_record!(Outer { first });

        let outer = Outer { first: 5 };
        let mut ctx = SerialContext::new(true);
        ctx.push(&outer, Label::None).unwrap();
        assert!(ctx.reference_path(&outer.first).is_none());
    }
}

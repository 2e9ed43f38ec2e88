use std::collections::HashMap;
use std::fmt;

use crate::handler::HandleFn;

/// One `/`-delimited segment of a registered path.
///
/// A node exclusively owns its children; nodes are created while routes are
/// registered and never removed. A node is routable only once a handler is bound.
pub struct PathSegmentNode {
    segment: String,
    route: String,
    handler: Option<HandleFn>,
    children: HashMap<String, PathSegmentNode>,
}

impl PathSegmentNode {
    pub(crate) fn new(segment: impl Into<String>) -> Self {
        Self { segment: segment.into(), route: String::new(), handler: None, children: HashMap::new() }
    }

    /// The segment text, `"/"` for a method root.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// The full pattern registered on this node, empty when no route ends here.
    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn handler(&self) -> Option<&HandleFn> {
        self.handler.as_ref()
    }

    pub fn child(&self, segment: &str) -> Option<&PathSegmentNode> {
        self.children.get(segment)
    }

    pub fn children_len(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn child_or_insert(&mut self, segment: &str) -> &mut PathSegmentNode {
        self.children.entry(segment.to_string()).or_insert_with(|| PathSegmentNode::new(segment))
    }

    /// Binds `handler` and `route`, returning the handler it replaced.
    pub(crate) fn bind(&mut self, route: &str, handler: HandleFn) -> Option<HandleFn> {
        self.route = route.to_string();
        self.handler.replace(handler)
    }
}

impl fmt::Debug for PathSegmentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathSegmentNode")
            .field("segment", &self.segment)
            .field("route", &self.route)
            .field("has_handler", &self.handler.is_some())
            .field("children", &self.children)
            .finish()
    }
}

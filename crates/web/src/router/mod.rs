//! Static path routing, one tree per HTTP method.
//!
//! Every registered path is split on `/` and stored as a chain of
//! [`PathSegmentNode`]s under its method's root. Lookup walks the same chain and only
//! succeeds on a node with a bound handler, so a registered `/a/b/c` matches neither
//! `/a/b` nor `/a/b/c/d`.
//!
//! Only static segments are supported: no parameters, wildcards or regexes.

mod node;

pub use node::PathSegmentNode;

use std::collections::HashMap;

use http::Method;
use tracing::warn;

use crate::error::RouteError;
use crate::handler::HandleFn;

const ROOT: &str = "/";

/// The per-method route forest.
///
/// A tree is built completely before serving starts and is only read afterwards.
#[derive(Debug, Default)]
pub struct PathTree {
    trees: HashMap<Method, PathSegmentNode>,
}

impl PathTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` and `path`.
    ///
    /// # Panics
    ///
    /// Panics when `path` is malformed, see [`PathTree::try_add_route`].
    pub fn add_route(&mut self, method: Method, path: &str, handler: HandleFn) {
        if let Err(e) = self.try_add_route(method, path, handler) {
            panic!("{e}");
        }
    }

    /// Registers `handler` for `method` and `path`, rejecting malformed paths.
    ///
    /// A path must be non-empty, start with `/`, not end with `/` (except `/` itself)
    /// and contain no empty segment. A rejected path leaves the tree untouched.
    /// Registering the same path twice replaces the earlier handler.
    pub fn try_add_route(&mut self, method: Method, path: &str, handler: HandleFn) -> Result<(), RouteError> {
        validate_path(path)?;

        let root = self.trees.entry(method.clone()).or_insert_with(|| PathSegmentNode::new(ROOT));
        let node = if path == ROOT {
            root
        } else {
            path[1..].split('/').fold(root, |node, segment| node.child_or_insert(segment))
        };

        if node.bind(path, handler).is_some() {
            warn!(%method, path, "route registered twice, the later handler wins");
        }
        Ok(())
    }

    /// Resolves `method` and `path` to the node holding its handler.
    ///
    /// Returns `None` for an unknown method, a path that was never registered, or a
    /// node that only exists as an intermediate segment.
    pub fn find_route(&self, method: &Method, path: &str) -> Option<&PathSegmentNode> {
        let root = self.trees.get(method)?;

        let node = if path == ROOT {
            root
        } else {
            path.strip_prefix('/')?.split('/').try_fold(root, |node, segment| node.child(segment))?
        };

        node.handler().map(|_| node)
    }

    /// Returns the root node registered for `method`, if any.
    pub fn root(&self, method: &Method) -> Option<&PathSegmentNode> {
        self.trees.get(method)
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

fn validate_path(path: &str) -> Result<(), RouteError> {
    if path.is_empty() {
        return Err(RouteError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(RouteError::MissingLeadingSlash(path.to_string()));
    }
    if path == ROOT {
        return Ok(());
    }
    if path.ends_with('/') {
        return Err(RouteError::TrailingSlash(path.to_string()));
    }
    if path.contains("//") {
        return Err(RouteError::EmptySegment(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use std::sync::Arc;

    fn noop() -> HandleFn {
        handler_fn(|_ctx| {})
    }

    fn same(found: Option<&PathSegmentNode>, expected: &HandleFn) -> bool {
        found.and_then(PathSegmentNode::handler).is_some_and(|handler| Arc::ptr_eq(handler, expected))
    }

    #[test]
    fn builds_nested_segments() {
        let mut tree = PathTree::new();
        tree.add_route(Method::GET, "/", noop());
        tree.add_route(Method::GET, "/user", noop());
        tree.add_route(Method::GET, "/user/home", noop());
        tree.add_route(Method::GET, "/order/detail", noop());
        tree.add_route(Method::POST, "/order/create", noop());
        tree.add_route(Method::POST, "/login", noop());

        let get_root = tree.root(&Method::GET).unwrap();
        assert_eq!(get_root.segment(), "/");
        assert!(get_root.handler().is_some());
        assert_eq!(get_root.children_len(), 2);

        let user = get_root.child("user").unwrap();
        assert!(user.handler().is_some());
        assert_eq!(user.route(), "/user");
        assert_eq!(user.child("home").unwrap().route(), "/user/home");

        let order = get_root.child("order").unwrap();
        assert!(order.handler().is_none());
        assert_eq!(order.route(), "");
        assert!(order.child("detail").unwrap().handler().is_some());

        let post_root = tree.root(&Method::POST).unwrap();
        assert!(post_root.handler().is_none());
        assert_eq!(post_root.children_len(), 2);
        assert!(tree.root(&Method::DELETE).is_none());
    }

    #[test]
    fn resolves_exact_paths_only() {
        let mut tree = PathTree::new();
        let user = noop();
        let home = noop();
        let detail = noop();
        tree.add_route(Method::GET, "/user", user.clone());
        tree.add_route(Method::GET, "/user/home", home.clone());
        tree.add_route(Method::GET, "/order/detail", detail.clone());

        assert!(same(tree.find_route(&Method::GET, "/user"), &user));
        assert!(same(tree.find_route(&Method::GET, "/user/home"), &home));
        assert!(same(tree.find_route(&Method::GET, "/order/detail"), &detail));
        assert!(!same(tree.find_route(&Method::GET, "/user"), &home));

        assert_eq!(tree.find_route(&Method::GET, "/order/detail").unwrap().route(), "/order/detail");
        assert!(tree.find_route(&Method::POST, "/user").is_none());
        assert!(tree.find_route(&Method::GET, "/user/detail").is_none());
        assert!(tree.find_route(&Method::GET, "/order").is_none());
    }

    #[test]
    fn no_prefix_or_overshoot_match() {
        let mut tree = PathTree::new();
        tree.add_route(Method::GET, "/a/b/c", noop());

        assert!(tree.find_route(&Method::GET, "/a/b/c").is_some());
        assert!(tree.find_route(&Method::GET, "/a/b").is_none());
        assert!(tree.find_route(&Method::GET, "/a/b/c/d").is_none());
        assert!(tree.find_route(&Method::GET, "/a/b/c/").is_none());
        assert!(tree.find_route(&Method::GET, "/a//b/c").is_none());
        assert!(tree.find_route(&Method::GET, "a/b/c").is_none());
        assert!(tree.find_route(&Method::GET, "").is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut tree = PathTree::new();
        let first = noop();
        let second = noop();
        tree.add_route(Method::GET, "/user", first.clone());
        tree.add_route(Method::GET, "/user", second.clone());

        let found = tree.find_route(&Method::GET, "/user");
        assert!(same(found, &second));
        assert!(!same(found, &first));
    }

    #[test]
    fn root_without_handler_is_not_found() {
        let mut tree = PathTree::new();
        tree.add_route(Method::GET, "/a", noop());

        assert!(tree.root(&Method::GET).is_some());
        assert!(tree.find_route(&Method::GET, "/").is_none());
    }

    #[test]
    fn route_pattern_lives_on_terminal_node() {
        let mut tree = PathTree::new();
        tree.add_route(Method::GET, "/a", noop());
        tree.add_route(Method::GET, "/b/c", noop());

        assert_eq!(tree.root(&Method::GET).unwrap().route(), "");
        assert_eq!(tree.find_route(&Method::GET, "/a").unwrap().route(), "/a");
        assert_eq!(tree.find_route(&Method::GET, "/b/c").unwrap().route(), "/b/c");

        tree.add_route(Method::GET, "/", noop());
        assert_eq!(tree.find_route(&Method::GET, "/").unwrap().route(), "/");
        assert_eq!(tree.find_route(&Method::GET, "/a").unwrap().route(), "/a");
    }

    #[test]
    fn malformed_paths_leave_tree_untouched() {
        let mut tree = PathTree::new();

        assert_eq!(tree.try_add_route(Method::GET, "", noop()), Err(RouteError::EmptyPath));
        assert_eq!(
            tree.try_add_route(Method::GET, "no-leading-slash", noop()),
            Err(RouteError::MissingLeadingSlash("no-leading-slash".to_string()))
        );
        assert_eq!(
            tree.try_add_route(Method::GET, "/trailing/", noop()),
            Err(RouteError::TrailingSlash("/trailing/".to_string()))
        );
        assert_eq!(tree.try_add_route(Method::GET, "/a//b", noop()), Err(RouteError::EmptySegment("/a//b".to_string())));
        assert!(tree.is_empty());

        tree.add_route(Method::GET, "/a", noop());
        assert!(tree.try_add_route(Method::GET, "/a//b", noop()).is_err());
        assert_eq!(tree.root(&Method::GET).unwrap().child("a").unwrap().children_len(), 0);
    }

    #[test]
    #[should_panic(expected = "route path must not be empty")]
    fn empty_path_panics() {
        PathTree::new().add_route(Method::GET, "", noop());
    }

    #[test]
    #[should_panic(expected = "must start with '/'")]
    fn missing_leading_slash_panics() {
        PathTree::new().add_route(Method::GET, "no-leading-slash", noop());
    }

    #[test]
    #[should_panic(expected = "must not end with '/'")]
    fn trailing_slash_panics() {
        PathTree::new().add_route(Method::GET, "/trailing/", noop());
    }

    #[test]
    #[should_panic(expected = "empty segment")]
    fn empty_segment_panics() {
        PathTree::new().add_route(Method::GET, "/a//b", noop());
    }
}

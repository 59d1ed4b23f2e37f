use std::collections::HashMap;

use crate::permission::Permission;

/// One node of a principal's permission tree.
///
/// `dot` is the permission granted on the node itself; `star` is the
/// fallback permission for any path segment not present in `children`.
/// A segment present in `children` is resolved by recursing into that
/// child and returning its answer verbatim, even `Revoked` — see
/// [`AccessNode::walk`].
#[derive(Debug, Clone, Default)]
pub struct AccessNode {
    pub dot: Permission,
    pub star: Permission,
    pub children: HashMap<String, AccessNode>,
}

impl AccessNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `segments` against this node per the tree-walk rule: an
    /// empty path yields `dot` (falling back to `star` only if `dot` is
    /// `Revoked`); a matched child's answer is authoritative and is never
    /// overridden by this node's `star`, even when it is `Revoked`.
    pub fn walk(&self, segments: &[String]) -> Permission {
        match segments.split_first() {
            None => {
                if self.dot != Permission::Revoked {
                    self.dot
                } else {
                    self.star
                }
            }
            Some((head, rest)) => match self.children.get(head) {
                Some(child) => child.walk(rest),
                None => self.star,
            },
        }
    }
}

/// One principal's full permission tree plus the groups it belongs to
/// (populated from the `"?"` key in the serialized access map).
#[derive(Debug, Clone, Default)]
pub struct AccessTree {
    pub root: AccessNode,
    pub groups: Vec<String>,
}

impl AccessTree {
    pub fn walk(&self, segments: &[String]) -> Permission {
        self.root.walk(segments)
    }
}

/// `principal name -> AccessTree`, for every principal named in the access
/// map (users, groups, and the distinguished `"*"` default).
pub type AccessForest = HashMap<String, AccessTree>;

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(dot: Permission, star: Permission) -> AccessNode {
        AccessNode {
            dot,
            star,
            children: HashMap::new(),
        }
    }

    fn segs(path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    #[test]
    fn empty_path_returns_dot_else_star() {
        let node = leaf(Permission::Read, Permission::Write);
        assert_eq!(node.walk(&[]), Permission::Read);

        let node = leaf(Permission::Revoked, Permission::Write);
        assert_eq!(node.walk(&[]), Permission::Write);
    }

    #[test]
    fn matched_child_revoked_is_authoritative() {
        // {"frogo": {".": Read, "*": Revoked, "com": {"*": Write}}}
        let mut com = AccessNode::new();
        com.star = Permission::Write;

        let mut frogo = AccessNode::new();
        frogo.dot = Permission::Read;
        frogo.star = Permission::Revoked;
        frogo.children.insert("com".to_string(), com);

        assert_eq!(frogo.walk(&segs("workroom.c")), Permission::Revoked);
        assert_eq!(frogo.walk(&segs("com/anything")), Permission::Write);
    }

    #[test]
    fn unmatched_segment_falls_back_to_star() {
        let mut node = AccessNode::new();
        node.star = Permission::Read;
        assert_eq!(node.walk(&segs("no/such/child")), Permission::Read);
    }
}

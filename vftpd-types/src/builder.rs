use thiserror::Error;

use vftpd_objparser::Value;

use crate::permission::Permission;
use crate::tree::{AccessForest, AccessNode, AccessTree};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeBuildError {
    #[error("'{0}' is not a valid permission value")]
    UnknownPermission(i64),
    #[error("unexpected shape at '{path}'")]
    BadShape { path: String },
}

/// Build an [`AccessForest`] from the `Value::Map` found under the
/// access map's top-level `access_map` key: `principal -> subtree`.
pub fn build_forest(access_map: &Value) -> Result<AccessForest, TreeBuildError> {
    let map = access_map.as_map().ok_or_else(|| TreeBuildError::BadShape {
        path: "access_map".to_string(),
    })?;

    let mut forest = AccessForest::new();
    for (principal, subtree) in map {
        let tree = build_tree(subtree, principal)?;
        forest.insert(principal.clone(), tree);
    }
    Ok(forest)
}

fn build_tree(value: &Value, principal: &str) -> Result<AccessTree, TreeBuildError> {
    let mut groups = Vec::new();
    let root = build_node(value, principal, &mut groups)?;
    Ok(AccessTree { root, groups })
}

fn build_node(
    value: &Value,
    path: &str,
    groups: &mut Vec<String>,
) -> Result<AccessNode, TreeBuildError> {
    let map = value.as_map().ok_or_else(|| TreeBuildError::BadShape {
        path: path.to_string(),
    })?;

    let mut node = AccessNode::new();
    for (key, val) in map {
        match key.as_str() {
            "." => {
                node.dot = value_to_permission(val, path)?;
            }
            "*" => match val {
                Value::Map(_) => {
                    let child_path = format!("{path}/*");
                    let child = build_node(val, &child_path, groups)?;
                    node.children.insert("*".to_string(), child);
                }
                Value::Int(_) => {
                    node.star = value_to_permission(val, path)?;
                }
                _ => {
                    return Err(TreeBuildError::BadShape {
                        path: format!("{path}/*"),
                    })
                }
            },
            "?" => {
                let array = match val {
                    Value::Array(items) => items,
                    _ => {
                        return Err(TreeBuildError::BadShape {
                            path: format!("{path}/?"),
                        })
                    }
                };
                for item in array {
                    match item.as_str() {
                        Some(s) => groups.push(s.to_string()),
                        None => {
                            return Err(TreeBuildError::BadShape {
                                path: format!("{path}/?"),
                            })
                        }
                    }
                }
            }
            other => {
                let child_path = format!("{path}/{other}");
                match val {
                    Value::Map(_) => {
                        let child = build_node(val, &child_path, groups)?;
                        node.children.insert(other.to_string(), child);
                    }
                    Value::Int(_) => {
                        let mut child = AccessNode::new();
                        child.dot = value_to_permission(val, &child_path)?;
                        child.star = Permission::Revoked;
                        node.children.insert(other.to_string(), child);
                    }
                    _ => return Err(TreeBuildError::BadShape { path: child_path }),
                }
            }
        }
    }
    Ok(node)
}

fn value_to_permission(value: &Value, path: &str) -> Result<Permission, TreeBuildError> {
    let raw = value.as_int().ok_or_else(|| TreeBuildError::BadShape {
        path: path.to_string(),
    })?;
    Permission::try_from(raw).map_err(TreeBuildError::UnknownPermission)
}

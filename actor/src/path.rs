// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! # Actor path
//!
//! The `path` module provides the `ActorPath` type. The `ActorPath` type is a node in the
//! naming tree of an actor system.
//!

use crate::Error;

use std::{
    collections::HashMap,
    fmt::{Debug, Display, Formatter},
    hash::{Hash, Hasher},
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
};

/// Scheme used when rendering paths.
const SCHEME: &str = "rook";

/// Hierarchical actor path providing unique addressing for actors within the actor system.
///
/// `ActorPath` is a node in a tree rooted at the actor system. Each node carries a
/// process-unique `uid`, a `name` unique among its live siblings, and links to its parent
/// and children. Cloning a path is cheap and every clone designates the same node.
///
/// # Structure
///
/// The tree mirrors the supervision hierarchy. For a system called `app`, an actor
/// `worker` spawned by the top-level actor `manager` renders as
/// `rook://app/user/manager/worker`.
///
/// # Lifecycle
///
/// A node is created by [`ActorPath::add`] when an actor is spawned and detached from its
/// parent by [`ActorPath::dispose`] when the actor terminates. A detached node stays
/// usable, so references held elsewhere keep rendering and comparing correctly, but its
/// name becomes free for a new sibling.
///
/// # Equality
///
/// Two paths are equal when they designate the same node, compared by `uid`. A new actor
/// reusing the name of a terminated one gets a different path.
///
/// # Thread Safety
///
/// `ActorPath` is `Send + Sync`. The child table is guarded by a mutex, so spawning
/// siblings concurrently never lets two of them take the same name.
///
/// # Examples
///
/// ```ignore
/// use actor::ActorPath;
///
/// let root = ActorPath::new_root("app", "uid-0");
/// let user = root.add("user", "uid-1")?;
/// let worker = user.add("worker", "uid-2")?;
///
/// assert_eq!(worker.to_string(), "rook://app/user/worker");
/// assert!(user.is_parent_of(&worker));
/// assert!(user.add("worker", "uid-3").is_err());
/// ```
///
#[derive(Clone)]
pub struct ActorPath(Arc<PathNode>);

struct PathNode {
    uid: String,
    name: String,
    parent: Option<ActorPath>,
    children: Mutex<HashMap<String, Weak<PathNode>>>,
}

impl PathNode {
    fn children(&self) -> MutexGuard<'_, HashMap<String, Weak<PathNode>>> {
        self.children.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActorPath {
    /// Creates the root node of a naming tree.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the actor system.
    /// * `uid` - A process-unique identifier for the node.
    ///
    pub fn new_root(name: &str, uid: impl Into<String>) -> Self {
        ActorPath(Arc::new(PathNode {
            uid: uid.into(),
            name: name.to_owned(),
            parent: None,
            children: Mutex::new(HashMap::new()),
        }))
    }

    /// Adds a child node named `name` under this node.
    ///
    /// Names only have to be unique among live siblings: a name whose previous owner was
    /// disposed, or whose node has been dropped, can be taken again.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the child, unique among its live siblings.
    /// * `uid` - A process-unique identifier for the new node.
    ///
    /// # Returns
    ///
    /// Returns the new child path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Exists` if a live sibling already uses `name`.
    ///
    pub fn add(&self, name: &str, uid: impl Into<String>) -> Result<ActorPath, Error> {
        let mut children = self.0.children();
        if children.get(name).and_then(Weak::upgrade).is_some() {
            return Err(Error::Exists(format!("{}/{}", self, name)));
        }
        let child = ActorPath(Arc::new(PathNode {
            uid: uid.into(),
            name: name.to_owned(),
            parent: Some(self.clone()),
            children: Mutex::new(HashMap::new()),
        }));
        children.insert(name.to_owned(), Arc::downgrade(&child.0));
        Ok(child)
    }

    /// Detaches this node from its parent, freeing its name.
    ///
    /// Disposing twice, or disposing the root, does nothing.
    pub fn dispose(&self) {
        let Some(parent) = &self.0.parent else {
            return;
        };
        let mut siblings = parent.0.children();
        let owned = siblings
            .get(&self.0.name)
            .is_some_and(|node| std::ptr::eq(node.as_ptr(), Arc::as_ptr(&self.0)));
        if owned {
            siblings.remove(&self.0.name);
        }
    }

    /// The process-unique identifier of this node.
    pub fn uid(&self) -> &str {
        &self.0.uid
    }

    /// The name of this node. For the root, the actor system name.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The parent node, `None` for the root.
    pub fn parent(&self) -> Option<ActorPath> {
        self.0.parent.clone()
    }

    /// The root node of the tree this node belongs to.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let root = ActorPath::new_root("app", "0");
    /// let worker = root.add("user", "1")?.add("worker", "2")?;
    /// assert_eq!(worker.root(), root);
    /// ```
    ///
    pub fn root(&self) -> ActorPath {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Returns the live child named `name`, if any.
    pub fn get(&self, name: &str) -> Option<ActorPath> {
        self.0.children().get(name).and_then(Weak::upgrade).map(ActorPath)
    }

    /// Names of the live children of this node, sorted.
    pub fn children(&self) -> Vec<String> {
        let children = self.0.children();
        let mut names: Vec<String> = children
            .iter()
            .filter(|(_, node)| node.strong_count() > 0)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Depth of this node: 0 for the root, 1 for `/user` and `/system`.
    pub fn level(&self) -> usize {
        let mut level = 0;
        let mut node = self.parent();
        while let Some(parent) = node {
            level += 1;
            node = parent.parent();
        }
        level
    }

    /// True for the root of the tree.
    pub fn is_root(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Determines if this node is a strict ancestor of another node.
    ///
    /// # Arguments
    ///
    /// * `other` - The candidate descendant.
    ///
    /// # Returns
    ///
    /// Returns `true` if `self` appears on the parent chain of `other`. A node is never its
    /// own ancestor.
    ///
    pub fn is_ancestor_of(&self, other: &ActorPath) -> bool {
        let mut node = other.parent();
        while let Some(parent) = node {
            if parent == *self {
                return true;
            }
            node = parent.parent();
        }
        false
    }

    /// Determines if this node is a strict descendant of another node.
    pub fn is_descendant_of(&self, other: &ActorPath) -> bool {
        other.is_ancestor_of(self)
    }

    /// Determines if this node is the direct parent of another node.
    pub fn is_parent_of(&self, other: &ActorPath) -> bool {
        other.0.parent.as_ref() == Some(self)
    }

    /// Determines if this node is a direct child of another node.
    pub fn is_child_of(&self, other: &ActorPath) -> bool {
        other.is_parent_of(self)
    }
}

impl PartialEq for ActorPath {
    fn eq(&self, other: &Self) -> bool {
        self.0.uid == other.0.uid
    }
}

impl Eq for ActorPath {}

impl Hash for ActorPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.uid.hash(state);
    }
}

/// Renders the node as `rook://<system>/<segment>/...`.
impl Display for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0.parent {
            Some(parent) => write!(f, "{}/{}", parent, self.0.name),
            None => write!(f, "{}://{}", SCHEME, self.0.name),
        }
    }
}

impl Debug for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self, self.0.uid)
    }
}

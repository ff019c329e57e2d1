//! Directory tree built from a flat path list
//!
//! The tree is derived data: rebuilt for every render and never cached.

use std::cmp::Ordering;

/// One node in the directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub is_directory: bool,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(name: impl Into<String>, is_directory: bool) -> Self {
        Self {
            name: name.into(),
            is_directory,
            children: Vec::new(),
        }
    }

    /// Create an empty root directory node
    pub fn root() -> Self {
        Self::new("root", true)
    }

    fn child_mut(&mut self, name: &str, is_directory: bool) -> &mut TreeNode {
        let pos = self
            .children
            .iter()
            .position(|c| c.name == name && c.is_directory == is_directory);
        match pos {
            Some(i) => &mut self.children[i],
            None => {
                self.children.push(TreeNode::new(name, is_directory));
                let last = self.children.len() - 1;
                &mut self.children[last]
            }
        }
    }

    /// Insert a '/'-separated path. The last segment is a file unless
    /// `is_directory` is set.
    pub fn insert(&mut self, path: &str, is_directory: bool) {
        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        let mut current = self;
        for (i, part) in parts.iter().enumerate() {
            let is_last = i + 1 == parts.len();
            current = current.child_mut(part, !is_last || is_directory);
        }
    }
}

/// Build a tree from file paths plus explicitly empty directories
pub fn generate_tree(files: &[String], empty_dirs: &[String]) -> TreeNode {
    let mut root = TreeNode::root();
    for file in files {
        root.insert(file, false);
    }
    for dir in empty_dirs {
        root.insert(dir, true);
    }
    root
}

fn compare_nodes(a: &TreeNode, b: &TreeNode) -> Ordering {
    match (a.is_directory, b.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    }
}

fn render_node(node: &TreeNode, depth: usize, out: &mut String) {
    let mut children: Vec<&TreeNode> = node.children.iter().collect();
    children.sort_by(|a, b| compare_nodes(a, b));

    for child in children {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&child.name);
        if child.is_directory {
            out.push('/');
        }
        out.push('\n');
        if child.is_directory {
            render_node(child, depth + 1, out);
        }
    }
}

/// Render a tree as two-space indented lines, directories suffixed with '/'
pub fn tree_to_string(root: &TreeNode) -> String {
    let mut out = String::new();
    render_node(root, 0, &mut out);
    out
}

/// Build and render in one step
pub fn generate_tree_string(files: &[String], empty_dirs: &[String]) -> String {
    tree_to_string(&generate_tree(files, empty_dirs))
        .trim_end()
        .to_string()
}

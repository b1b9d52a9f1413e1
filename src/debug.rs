use std::{collections::VecDeque, fmt, fmt::Write as _};

use crate::{node::NodeId, AvlTree};

impl AvlTree {
    /// Writes the tree to `w` as a Graphviz digraph named `name`.
    ///
    /// Nodes are labelled `key:height`; missing children are drawn as points.
    pub fn dotgraph<W>(&self, name: &str, mut w: W) -> fmt::Result
    where
        W: fmt::Write,
    {
        let root = match self.root() {
            Some(r) => r,
            None => return writeln!(w, "digraph \"graph-{name}\" {{}}"),
        };

        enum Item {
            Node(NodeId),
            Missing(u32),
        }

        let mut queue = VecDeque::new();
        queue.push_back(Item::Node(root));

        writeln!(w, "digraph \"graph-{name}\" {{")?;

        let mut links = String::new();
        let mut missing = 0;

        while let Some(item) = queue.pop_front() {
            let node = match item {
                Item::Node(n) => n,
                Item::Missing(id) => {
                    writeln!(w, "\"graph{name}-missing{id}\" [shape=point];")?;
                    continue;
                }
            };

            let key = self.node(node).key();
            let height = self.node(node).height();
            writeln!(w, "\"graph{name}-{key}\" [label=\"{key}:{height}\"];")?;

            for child in [self.node(node).left(), self.node(node).right()] {
                match child {
                    Some(child) => {
                        let child_key = self.node(child).key();

                        queue.push_back(Item::Node(child));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-{child_key}\";"
                        )?;
                    }
                    None => {
                        queue.push_back(Item::Missing(missing));
                        writeln!(
                            links,
                            "\"graph{name}-{key}\" -> \"graph{name}-missing{missing}\";"
                        )?;
                        missing += 1;
                    }
                }
            }
        }

        w.write_str(&links)?;

        w.write_str("}\n")
    }
}

//! ASCII directory tree rendering.

use std::collections::BTreeMap;

#[derive(Default)]
struct Node {
    children: BTreeMap<String, Node>,
}

/// Render `/`-separated relative paths as a box-drawing tree.
///
/// Children are sorted at every level. The last sibling uses `└── ` and
/// its subtree drops the `│` continuation bar.
pub fn render(paths: &[String]) -> String {
    let mut root = Node::default();
    for path in paths {
        let mut current = &mut root;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.entry(segment.to_string()).or_default();
        }
    }

    let mut out = String::new();
    render_node(&root, "", &mut out);
    out
}

fn render_node(node: &Node, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (i, (name, child)) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(name);
        out.push('\n');

        if !child.children.is_empty() {
            let extension = if is_last { "    " } else { "│   " };
            render_node(child, &format!("{prefix}{extension}"), out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn renders_nested_tree() {
        let tree = render(&paths(&["src/main.rs", "Cargo.toml", "src/cli/args.rs", "README.md"]));
        let expected = "\
├── Cargo.toml
├── README.md
└── src
    ├── cli
    │   └── args.rs
    └── main.rs
";
        assert_eq!(tree, expected);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn single_file() {
        assert_eq!(render(&paths(&["a.txt"])), "└── a.txt\n");
    }

    /// Strip connectors and indentation to recover the bare names.
    fn names_in(tree: &str) -> Vec<String> {
        tree.lines()
            .map(|line| {
                let idx = line
                    .find("── ")
                    .expect("every line has a connector");
                line[idx + "── ".len()..].to_string()
            })
            .collect()
    }

    proptest! {
        #[test]
        fn rendered_names_match_path_segments(
            raw in proptest::collection::vec(
                proptest::collection::vec("[a-z]{1,4}", 1..4),
                0..12,
            )
        ) {
            let input: Vec<String> = raw.iter().map(|segs| segs.join("/")).collect();
            let tree = render(&input);

            // Every node appears once per distinct path prefix.
            let mut expected = std::collections::BTreeSet::new();
            for segs in &raw {
                for depth in 1..=segs.len() {
                    expected.insert(segs[..depth].join("/"));
                }
            }
            prop_assert_eq!(tree.lines().count(), expected.len());

            let mut got: Vec<String> = names_in(&tree);
            got.sort();
            let mut want: Vec<String> = expected
                .iter()
                .map(|p| p.rsplit('/').next().unwrap().to_string())
                .collect();
            want.sort();
            prop_assert_eq!(got, want);
        }
    }
}

// ABOUTME: DOT-format AST renderer and best-effort PNG generation via the
// external `dot` binary, grounded in main.cpp's generateDotFile/printAST

use crate::tree::Tree;
use std::path::Path;
use std::process::Command;

/// Renders `tree` as `digraph Tree { ... }` DOT source, one `node<N>` per
/// tree node with its label and value as an HTML-like two-line record.
pub fn render(tree: &Tree) -> String {
    let mut out = String::from("digraph Tree {\n");
    let mut next_id = 0;
    write_node(tree, None, &mut next_id, &mut out);
    out.push_str("}\n");
    out
}

fn write_node(node: &Tree, parent: Option<usize>, next_id: &mut usize, out: &mut String) {
    let current = *next_id;
    *next_id += 1;

    let label = escape_html(&node.label);
    let value = node.value.as_deref().unwrap_or("");
    let fill = if value.is_empty() { "#DDDDDD" } else { "#EEEEEE" };
    let label_text = if label.is_empty() { "&nbsp;" } else { &label };
    let value_escaped = escape_html(value);
    let value_text = if value_escaped.is_empty() {
        "&nbsp;"
    } else {
        &value_escaped
    };

    out.push_str(&format!(
        "    node{} [label=<<font color=\"darkorange\">{}</font><br/><font color=\"darkred\">{}</font>>, style=filled, fillcolor=\"{}\"];\n",
        current, label_text, value_text, fill
    ));

    if let Some(parent) = parent {
        out.push_str(&format!("    node{} -> node{};\n", parent, current));
    }

    for child in &node.children {
        write_node(child, Some(current), next_id, out);
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('>', "&gt;")
}

/// Renders `tree` to `dot_path` and, if the `dot` binary is on `PATH`,
/// shells out to produce a PNG at `png_path` alongside it. Absence of `dot`
/// is reported to stderr as a warning, not a failure: the DOT text and
/// textual tree dump are still produced.
pub fn write_visualization(tree: &Tree, dot_path: &Path, png_path: &Path) -> std::io::Result<()> {
    std::fs::write(dot_path, render(tree))?;

    match Command::new("dot")
        .args(["-Tpng", "-Gdpi=150"])
        .arg(dot_path)
        .arg("-o")
        .arg(png_path)
        .output()
    {
        Ok(output) if output.status.success() => {}
        Ok(output) => eprintln!(
            "Warning: dot exited with a non-zero status: {}",
            String::from_utf8_lossy(&output.stderr)
        ),
        Err(_) => eprintln!(
            "Warning: 'dot' binary not found on PATH; skipping PNG render (DOT file still written to {})",
            dot_path.display()
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_digraph_with_parent_edges() {
        let tree = Tree::node(
            "gamma",
            vec![Tree::leaf("identifier", "Print"), Tree::leaf("integer", "5")],
        );
        let dot = render(&tree);
        assert!(dot.starts_with("digraph Tree {\n"));
        assert!(dot.contains("node0 -> node1;"));
        assert!(dot.contains("node0 -> node2;"));
        assert!(dot.contains("Print"));
    }

    #[test]
    fn escapes_ampersand_and_angle_bracket() {
        assert_eq!(escape_html("a&b>c"), "a&amp;b&gt;c");
    }
}

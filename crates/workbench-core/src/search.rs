use std::collections::VecDeque;

use crate::mindmap::GraphEditor;
use crate::model::{GraphNode, NodeId};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub node_id: NodeId,
    pub text: String,
    pub score: f64,
    pub depth: usize,
}

/// Search node labels, walking every tree of the forest breadth-first from
/// its root. Results are ordered by score, ties broken by tree order.
pub fn search_nodes(editor: &GraphEditor, query: &str, max_results: usize) -> Vec<SearchHit> {
    let query_lower = query.trim().to_lowercase();
    let terms: Vec<&str> = query_lower.split_whitespace().collect();

    if terms.is_empty() {
        return Vec::new();
    }

    let mut results: Vec<SearchHit> = Vec::new();
    let mut queue: VecDeque<(&GraphNode, usize)> = editor.roots().map(|r| (r, 0)).collect();

    while let Some((node, depth)) = queue.pop_front() {
        if let Some(hit) = score_node(node, &query_lower, &terms, depth) {
            results.push(hit);
        }

        for child in editor.children_of(node.id) {
            queue.push_back((child, depth + 1));
        }
    }

    // Stable sort keeps breadth-first order among equal scores.
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(max_results);
    debug!(query = %query, results = results.len(), "search complete");
    results
}

fn score_node(
    node: &GraphNode,
    query_lower: &str,
    terms: &[&str],
    depth: usize,
) -> Option<SearchHit> {
    let score = score_text(&node.text, query_lower, terms);
    (score > 0.0).then(|| SearchHit {
        node_id: node.id,
        text: node.text.clone(),
        score,
        depth,
    })
}

fn score_text(text: &str, query_lower: &str, terms: &[&str]) -> f64 {
    let text_lower = text.to_lowercase();

    if text_lower.contains(query_lower) {
        return 1.0;
    }

    let matched = terms.iter().filter(|t| text_lower.contains(**t)).count();

    match matched {
        n if n == terms.len() => 0.6,
        0 => 0.0,
        n => 0.3 * (n as f64 / terms.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(editor: &mut GraphEditor, parent: Option<NodeId>, text: &str) -> NodeId {
        let id = match parent {
            Some(p) => editor.add_child_node(p).unwrap(),
            None => editor.add_root_node(None).unwrap(),
        };
        editor.set_node_text(id, text);
        id
    }

    #[test]
    fn test_exact_match_scores_highest() {
        let mut editor = GraphEditor::new();
        labelled(&mut editor, None, "Quarterly planning");

        let results = search_nodes(&editor, "QUARTERLY planning", 10);
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_term_match() {
        let mut editor = GraphEditor::new();
        labelled(&mut editor, None, "garden and kitchen");

        let results = search_nodes(&editor, "garden garage", 10);
        assert_eq!(results.len(), 1);
        assert!(results[0].score > 0.0);
        assert!(results[0].score < 0.6);
    }

    #[test]
    fn test_blank_query_finds_nothing() {
        let mut editor = GraphEditor::new();
        labelled(&mut editor, None, "anything");
        assert!(search_nodes(&editor, "   ", 10).is_empty());
    }

    #[test]
    fn test_no_match() {
        let mut editor = GraphEditor::new();
        labelled(&mut editor, None, "travel");
        assert!(search_nodes(&editor, "budget", 10).is_empty());
    }

    #[test]
    fn test_searches_every_tree_with_depth() {
        let mut editor = GraphEditor::new();
        let a = labelled(&mut editor, None, "Work");
        let a1 = labelled(&mut editor, Some(a), "Hiring plan");
        let b = labelled(&mut editor, None, "Home");
        let b1 = labelled(&mut editor, Some(b), "Garden");
        let b2 = labelled(&mut editor, Some(b1), "Vegetable plan");

        let results = search_nodes(&editor, "plan", 10);
        let ids: Vec<NodeId> = results.iter().map(|r| r.node_id).collect();
        assert_eq!(ids, vec![a1, b2]);
        assert_eq!(results[0].depth, 1);
        assert_eq!(results[1].depth, 2);
    }

    #[test]
    fn test_results_limited_and_sorted() {
        let mut editor = GraphEditor::new();
        let root = labelled(&mut editor, None, "items");
        for i in 0..12 {
            labelled(&mut editor, Some(root), &format!("item number {i}"));
        }

        let results = search_nodes(&editor, "item number", 5);
        assert_eq!(results.len(), 5);
        for i in 1..results.len() {
            assert!(results[i - 1].score >= results[i].score);
        }
    }
}

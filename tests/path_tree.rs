//! Trees built from path-keyed web nodes.

use i3df::prelude::*;
use i3df::sector::parent_path;
use i3df::util::LinkError;

fn node(path: &str, size: f32) -> WebNode {
    WebNode::new(path, BBox3f::new(Vec3::ZERO, Vec3::splat(size)))
}

#[test]
fn test_web_node_hierarchy() {
    let nodes = vec![
        node("0/", 8.0),
        node("0/0/", 4.0),
        node("0/1/", 4.0),
        node("0/0/0/", 2.0),
        node("0/0/1/", 2.0),
        node("0/1/0/", 2.0),
    ];
    let mut builder = PathTreeBuilder::new();
    builder.extend(nodes).expect("Failed to link nodes");
    let tree = builder.finish().expect("Failed to build tree");

    assert_eq!(tree.len(), 6);
    assert_eq!(tree.max_depth(), 2);
    let paths: Vec<&str> = tree.iter().map(|s| s.path.as_str()).collect();
    assert_eq!(paths, vec!["0/", "0/0/", "0/0/0/", "0/0/1/", "0/1/", "0/1/0/"]);

    for sector in &tree {
        match parent_path(&sector.path) {
            None => assert!(sector.is_root()),
            Some(parent) => {
                let parent = tree.find_by_path(parent).expect("parent present");
                assert_eq!(sector.parent_id, Some(parent.id));
                assert_eq!(sector.depth, parent.depth + 1);
                assert!(parent.bbox.contains_box(&sector.bbox));
            }
        }
    }
}

#[test]
fn test_orphan_node() {
    let mut builder = PathTreeBuilder::new();
    builder.push(node("0/", 1.0)).expect("root");
    let err = builder.push(node("0/4/2/", 1.0)).unwrap_err();
    assert!(matches!(err, Error::Link(LinkError::UnknownParentPath { .. })));
}

#[test]
fn test_empty_builder() {
    let err = PathTreeBuilder::new().finish().unwrap_err();
    assert!(matches!(err, Error::Link(LinkError::Empty)));
}

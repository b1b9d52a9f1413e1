use arena_avl::AvlTree;

fn print(tree: &AvlTree) {
    println!("{:?}", tree.iter().collect::<Vec<_>>());
}

fn main() {
    let mut tree = AvlTree::new();

    for key in [2, 0, 3, 4, 5, 1, 6] {
        tree.add(key);
        tree.assert_invariants();
        print(&tree);
    }

    assert!(!tree.add(4));
    println!("depth of 6: {}", tree.contains(6));

    let copy = tree.clone();

    let zero = tree.pop_first().unwrap();
    assert_eq!(zero, 0);
    tree.assert_invariants();
    assert!(tree.delete(3));
    tree.assert_invariants();
    print(&tree);
    print(&copy);

    let mut dot = String::new();
    tree.dotgraph("demo", &mut dot).unwrap();
    println!("{dot}");

    for height in 0..8 {
        println!(
            "min nodes for height {height}: {}",
            AvlTree::min_nodes_for_height(height)
        );
    }
}

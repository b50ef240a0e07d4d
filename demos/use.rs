use avlbst::AvlTreeMap;
use tracing_subscriber::EnvFilter;

// Run with `RUST_LOG=avlbst=trace` to watch the rotations.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut map = AvlTreeMap::new();
    for (key, name) in [(5, "five"), (3, "three"), (8, "eight"), (1, "one"), (4, "four")] {
        map.insert(key, name);
    }
    map.insert(7, "seven");
    map.insert(9, "nine");
    map.insert(9, "NINE");
    assert_eq!(map.get(&9), Some(&"NINE"));

    map.remove(&3);
    map.remove(&5);
    assert!(map.get(&5).is_none());
    assert!(map.is_height_balanced());

    for (k, v) in &map {
        println!("{k} => {v}");
    }
    println!("len = {}, height = {}", map.len(), map.height());

    match map.try_get(&42) {
        Ok(v) => println!("42 => {v}"),
        Err(err) => println!("42: {err}"),
    }
}

use std::io::Write;

use rowmatch::cache::MatchCache;
use rowmatch::matcher::Matcher;
use rowmatch::query::Query;
use rowmatch::source::{DataSource, RowStream};

fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
    data.iter()
        .map(|r| r.iter().map(|f| f.to_string()).collect())
        .collect()
}

#[test]
fn repeated_lookups_hit_the_cache() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "id,name,value\n1,Alice,10\n").unwrap();
    file.flush().unwrap();
    let cache = MatchCache::new();
    let matcher = Matcher::new(&cache);
    let query = Query::new().with("id", 1).with("name", "Alice");
    let first = matcher.lookup(&query, DataSource::File(file.path())).unwrap();
    let second = matcher.lookup(&query, DataSource::File(file.path())).unwrap();
    assert_eq!(first, "10");
    assert_eq!(first, second);
    assert_eq!(cache.len(), 1);
}

#[test]
fn key_order_shares_one_entry() {
    let cache = MatchCache::new();
    let matcher = Matcher::new(&cache);
    let data = "id,name,value\n1,Alice,10\n";
    let a = Query::new().with("id", 1).with("name", "Alice");
    let b = Query::new().with("name", "Alice").with("id", "1");
    matcher.lookup(&a, DataSource::Text(data)).unwrap();
    matcher.lookup(&b, DataSource::Text(data)).unwrap();
    assert_eq!(cache.len(), 1);
}

#[test]
fn misses_are_cached_too() {
    let cache = MatchCache::new();
    let matcher = Matcher::new(&cache);
    let data = "id,value\n1,10\n";
    assert_eq!(matcher.lookup(&Query::new().with("id", 5), DataSource::Text(data)).unwrap(), "-1");
    assert_eq!(cache.len(), 1);
}

#[test]
fn clearing_does_not_change_results() {
    let cache = MatchCache::new();
    let matcher = Matcher::new(&cache);
    let data = "id,name,value\n1,Alice,10\n2,Bob,15\n";
    let queries = [
        Query::new().with("id", 1).with("name", "Alice"),
        Query::new().with("id", 2).with("name", "Bob"),
        Query::new().with("id", 3).with("name", "Carol"),
    ];
    let warm: Vec<String> = queries
        .iter()
        .map(|q| matcher.lookup(q, DataSource::Text(data)).unwrap())
        .collect();
    let cached: Vec<String> = queries
        .iter()
        .map(|q| matcher.lookup(q, DataSource::Text(data)).unwrap())
        .collect();
    cache.clear().unwrap();
    let cold: Vec<String> = queries
        .iter()
        .map(|q| matcher.lookup(q, DataSource::Text(data)).unwrap())
        .collect();
    assert_eq!(warm, vec!["10", "15", "-1"]);
    assert_eq!(warm, cached);
    assert_eq!(warm, cold);
}

#[test]
fn rewritten_file_is_not_served_stale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "id,value\n1,10\n").unwrap();
    let cache = MatchCache::new();
    let matcher = Matcher::new(&cache);
    let query = Query::new().with("id", 1);
    assert_eq!(matcher.lookup(&query, DataSource::File(path.as_path())).unwrap(), "10");
    // a different size gives the file a new identity even within one mtime tick
    std::fs::write(&path, "id,value\n1,12345\n").unwrap();
    assert_eq!(matcher.lookup(&query, DataSource::File(path.as_path())).unwrap(), "12345");
    assert_eq!(cache.len(), 2);
}

#[test]
fn distinct_texts_do_not_share_entries() {
    let cache = MatchCache::new();
    let matcher = Matcher::new(&cache);
    let query = Query::new().with("id", 1);
    assert_eq!(matcher.lookup(&query, DataSource::Text("id,value\n1,10\n")).unwrap(), "10");
    assert_eq!(matcher.lookup(&query, DataSource::Text("id,value\n1,20\n")).unwrap(), "20");
}

#[test]
fn streams_bypass_the_cache() {
    let cache = MatchCache::new();
    let matcher = Matcher::new(&cache);
    let data = rows(&[&["id", "value"], &["1", "10"]]);
    let query = Query::new().with("id", 1);
    let stream = RowStream::new(data.clone());
    assert_eq!(matcher.lookup(&query, DataSource::Stream(stream)).unwrap(), "10");
    assert!(cache.is_empty());
    let stream = RowStream::new(rows(&[&["id", "value"], &["1", "11"]]));
    assert_eq!(matcher.lookup(&query, DataSource::Stream(stream)).unwrap(), "11");
}

#[test]
fn capacity_bounds_the_cache() {
    let cache = MatchCache::with_capacity(3);
    let matcher = Matcher::new(&cache);
    let data = "id,value\n1,a\n2,b\n3,c\n4,d\n5,e\n";
    for id in 1..=5 {
        matcher.lookup(&Query::new().with("id", id), DataSource::Text(data)).unwrap();
    }
    assert_eq!(cache.len(), 3);
}

#[test]
fn lookups_from_many_threads_agree() {
    let cache = MatchCache::new();
    let data = "id,value\n1,10\n2,20\n3,30\n";
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let matcher = Matcher::new(&cache);
                for id in 1..=3 {
                    let got = matcher.lookup(&Query::new().with("id", id), DataSource::Text(data)).unwrap();
                    assert_eq!(got, (id * 10).to_string());
                }
            });
        }
    });
    assert_eq!(cache.len(), 3);
}

//! Cross-module integration tests: the end-to-end scenarios and testable
//! properties that exercise the Indexer, Storage, Search, and Mutator
//! together rather than one module in isolation.

use codescope::config::Config;
use codescope::embedder::{Embedder, HashEmbedder};
use codescope::indexer::Indexer;
use codescope::jobs::JobManager;
use codescope::mutator::{Mutator, SymbolLocator};
use codescope::parser_pool::CancellationToken;
use codescope::search::{SearchSurface, SymbolFilter};
use codescope::storage::sqlite::SqliteStorage;
use codescope::storage::Storage;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

fn harness() -> (Arc<dyn Storage>, Arc<dyn Embedder>, Indexer) {
    let storage: Arc<dyn Storage> = Arc::new(SqliteStorage::open_in_memory(2_000).unwrap());
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(32));
    let indexer = Indexer::new(storage.clone(), embedder.clone(), Config::default());
    (storage, embedder, indexer)
}

// Property 1: hash-idempotent reindex.
#[tokio::test]
async fn hash_idempotent_reindex_produces_the_same_symbol_set() {
    let (storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lib.rs"), "pub fn add(a: i32, b: i32) -> i32 { a + b }\n").unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
    let first = storage.find_all_symbols(&project_id).await.unwrap();

    let project_id_again = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
    let second = storage.find_all_symbols(&project_id_again).await.unwrap();

    assert_eq!(first.len(), second.len());
    let key = |s: &codescope::CodeSymbol| (s.project_id.clone(), s.file_path.clone(), s.name_path.clone(), s.start_byte, s.end_byte);
    let mut first_keys: Vec<_> = first.iter().map(key).collect();
    let mut second_keys: Vec<_> = second.iter().map(key).collect();
    first_keys.sort();
    second_keys.sort();
    assert_eq!(first_keys, second_keys);
}

// Property 3: parent-path consistency.
#[tokio::test]
async fn parent_path_consistency_holds_for_nested_symbols() {
    let (storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lib.rs"), "pub struct S;\nimpl S { pub fn go(&self) {} }\n").unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
    let symbols = storage.find_all_symbols(&project_id).await.unwrap();

    let by_id: std::collections::HashMap<&str, &codescope::CodeSymbol> = symbols.iter().map(|s| (s.id.as_str(), s)).collect();
    for symbol in &symbols {
        if let Some(parent_id) = &symbol.parent_id {
            let parent = by_id.get(parent_id.as_str()).expect("parent symbol must exist");
            assert_eq!(parent.file_path, symbol.file_path);
            assert_eq!(symbol.name_path, format!("{}/{}", parent.name_path, symbol.name));
        }
    }
}

// Property 4 / S6: at-most-one active job per project, duplicate submission within 100ms.
#[tokio::test]
async fn duplicate_submission_returns_same_job_id() {
    let (_storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "pub fn a() {}").unwrap();

    let jobs = JobManager::new(indexer, 600);
    let first = jobs.submit(&dir.path().to_path_buf(), None).await.unwrap();
    let second = jobs.submit(&dir.path().to_path_buf(), None).await.unwrap();
    assert_eq!(first.id, second.id);

    let active = jobs.list_active_jobs();
    let matching_this_project = active.iter().filter(|j| j.project_id == first.project_id).count();
    assert!(matching_this_project <= 1);
}

// Property 5 / S5: mutation round-trip.
#[tokio::test]
async fn replacing_a_symbol_with_its_own_body_is_a_no_op_on_disk() {
    let (storage, embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    let source = "pub fn add(a: i32, b: i32) -> i32 { a + b }\n";
    fs::write(dir.path().join("lib.rs"), source).unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

    let mutator = Mutator::new(storage.clone(), indexer.clone(), dir.path());
    let resolved = mutator
        .resolve(&project_id, SymbolLocator::NamePath { name_path: "/add", relative_path: None })
        .await
        .unwrap();
    let original_body = &source[resolved.start_byte..resolved.end_byte];

    mutator.replace(&resolved, original_body).await.unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("lib.rs")).unwrap(), source);

    let new_body = "pub fn add(a: i32, b: i32) -> i32 { a + b + 0 }";
    mutator.replace(&resolved, new_body).await.unwrap();

    let search = SearchSurface::new(storage, embedder);
    let overview = search.get_symbols_overview(&project_id, "lib.rs", 100).await.unwrap();
    let updated = overview.iter().find(|s| s.name_path == "/add").unwrap();
    assert_eq!((updated.end_line - updated.start_line), 0);
    let _ = resolved;
}

// Property 6: delete cascade.
#[tokio::test]
async fn delete_project_removes_it_from_the_listing_and_drops_all_symbols() {
    let (storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.rs"), "pub fn a() {}").unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
    indexer.delete_project(&project_id).await.unwrap();

    let projects = storage.list_code_projects().await.unwrap();
    assert!(!projects.iter().any(|p| p.project_id == project_id));
    assert!(storage.find_all_symbols(&project_id).await.unwrap().is_empty());
}

// Property 7: semantic search determinism.
#[tokio::test]
async fn semantic_search_is_deterministic_for_a_fixed_embedder_and_query() {
    let (storage, embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lib.rs"), "pub fn add(a: i32, b: i32) -> i32 { a + b }\npub fn sub(a: i32, b: i32) -> i32 { a - b }\n").unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

    let search = SearchSurface::new(storage, embedder);
    let first = search.search_symbols_semantic(&project_id, "add", 10, &SymbolFilter::default()).await.unwrap();
    let second = search.search_symbols_semantic(&project_id, "add", 10, &SymbolFilter::default()).await.unwrap();

    let first_order: Vec<&str> = first.iter().map(|h| h.symbol.name.as_str()).collect();
    let second_order: Vec<&str> = second.iter().map(|h| h.symbol.name.as_str()).collect();
    assert_eq!(first_order, second_order);
}

// S1: Go package & methods.
#[tokio::test]
async fn go_package_and_receiver_method_name_paths() {
    let (storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(
        dir.path().join("pkg/demo.go"),
        "package demo\ntype T struct { X int }\nfunc (t *T) F() int { return t.X }\n",
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
    let symbols = storage.find_all_symbols(&project_id).await.unwrap();
    let paths: Vec<&str> = symbols.iter().map(|s| s.name_path.as_str()).collect();

    assert!(paths.contains(&"/demo"));
    assert!(paths.contains(&"/T"));
    assert!(paths.contains(&"/T/X"));
    assert!(paths.contains(&"/T.F"));
}

// S3: TypeScript arrow function assigned to a const is extracted as a function.
#[tokio::test]
async fn typescript_arrow_const_is_extracted_as_a_function() {
    let (storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("lib.ts"), "export const add = (a:number,b:number)=>a+b;\n").unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
    let symbols = storage.find_all_symbols(&project_id).await.unwrap();

    let add = symbols.iter().find(|s| s.name == "add").expect("arrow function assigned to add");
    assert_eq!(add.symbol_type.as_str(), "function");
}

// S4: Python @property is extracted as a property symbol parented to its class.
#[tokio::test]
async fn python_property_decorator_is_extracted_as_a_property() {
    let (storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("shape.py"),
        "class Shape:\n    @property\n    def area(self):\n        return 0\n",
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;
    let symbols = storage.find_all_symbols(&project_id).await.unwrap();

    let by_id: std::collections::HashMap<&str, &codescope::CodeSymbol> = symbols.iter().map(|s| (s.id.as_str(), s)).collect();
    let area = symbols.iter().find(|s| s.name == "area").expect("area property");
    assert_eq!(area.symbol_type.as_str(), "property");
    let parent_id = area.parent_id.as_ref().expect("area is parented to its class");
    assert_eq!(by_id[parent_id.as_str()].name, "Shape");
}

// S5: replacing a Go method's body leaves the file byte-equal elsewhere and
// reindexing yields the same name_path with an updated end_byte.
#[tokio::test]
async fn replacing_a_go_method_body_updates_the_symbol_span() {
    let (storage, _embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    let source = "package demo\ntype T struct { X int }\nfunc (t *T) F() int { return t.X }\n";
    fs::write(dir.path().join("pkg/demo.go"), source).unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

    let mutator = Mutator::new(storage.clone(), indexer.clone(), dir.path());
    let resolved = mutator
        .resolve(&project_id, SymbolLocator::NamePath { name_path: "/T.F", relative_path: Some("pkg/demo.go") })
        .await
        .unwrap();
    let original_end = resolved.end_byte;

    mutator.replace(&resolved, "func (t *T) F() int { return t.X + 1 }").await.unwrap();

    let symbols = storage.find_all_symbols(&project_id).await.unwrap();
    let updated = symbols.iter().find(|s| s.name_path == "/T.F").expect("method still present after reindex");
    assert_eq!(updated.name_path, "/T.F");
    assert_ne!(updated.end_byte, original_end);
}

// Property 8: glob-to-regex path pattern matching, exercised through hybrid_search's filter.
#[tokio::test]
async fn hybrid_search_double_star_matches_nested_paths_single_star_does_not() {
    let (storage, embedder, indexer) = harness();
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/a")).unwrap();
    fs::write(dir.path().join("src/a/b.rs"), "pub fn nested() {}\n").unwrap();
    fs::write(dir.path().join("src/top.rs"), "pub fn top_level() {}\n").unwrap();

    let cancel = CancellationToken::new();
    let project_id = indexer.index_project(dir.path(), None, &cancel).await.unwrap().project_id;

    let search = SearchSurface::new(storage, embedder);
    let double_star = search
        .hybrid_search(&project_id, "nested", &SymbolFilter::default(), Some("src/**"), false, 20)
        .await
        .unwrap();
    assert!(double_star.iter().any(|s| s.symbol.file_path == "src/a/b.rs"));

    let single_star = search
        .hybrid_search(&project_id, "top_level", &SymbolFilter::default(), Some("src/*"), false, 20)
        .await
        .unwrap();
    assert!(single_star.iter().any(|s| s.symbol.file_path == "src/top.rs"));

    let single_star_nested = search
        .hybrid_search(&project_id, "nested", &SymbolFilter::default(), Some("src/*"), false, 20)
        .await
        .unwrap();
    assert!(!single_star_nested.iter().any(|s| s.symbol.file_path == "src/a/b.rs"));
}

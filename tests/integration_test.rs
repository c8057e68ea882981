use lua_annotgen::{
    analyzer::{Analyzer, ScanOptions},
    model::FieldKind,
    renderer::{build_header_block, RenderMode},
    scanner::FileScanner,
    type_registry::TypeRegistry,
    writer::{merge_with_file_content, write_file, WriteOptions},
};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

/// Helper function to create a temporary Lua project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn store_project() -> TempDir {
    create_test_project(vec![
        ("lua/demo/store.lua", include_str!("fixtures/lua/demo/store.lua")),
        (
            "lua/demo/types/limits.lua",
            include_str!("fixtures/lua/demo/types/limits.lua"),
        ),
    ])
}

#[test]
fn test_store_module_end_to_end() {
    let temp_dir = store_project();
    let file = temp_dir.path().join("lua/demo/store.lua");

    // Step 1: Discover files
    let files = FileScanner::new(temp_dir.path().to_path_buf())
        .scan()
        .expect("Failed to scan directory");
    assert_eq!(files.len(), 2);
    assert!(files.contains(&file));

    // Step 2: Analyze
    let analyzer = Analyzer::new(ScanOptions::default(), None);
    let annotations = analyzer.analyze_file(&file).expect("Failed to analyze");

    let header = &annotations.header;
    assert_eq!(header.module_path, "demo.store");
    assert_eq!(header.brief, "Key/value store helpers");
    assert_eq!(
        header.description,
        "Keeps cached lookups and exposes a small query API."
    );

    let class = header.class.as_ref().expect("class is always present");
    assert_eq!(class.class_name, "DemoStore");
    assert_eq!(class.extends, "DemoStoreDef");

    let names: Vec<_> = class.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["get", "set", "clear", "cache", "limits"]);

    let get = annotations.field("get").unwrap();
    assert_eq!(get.kind, FieldKind::Function);
    assert_eq!(
        get.type_expr,
        "fun(key: string, fallback: any): string|nil Looks up a key"
    );

    let set = annotations.field("set").unwrap();
    assert_eq!(set.kind, FieldKind::Function);
    assert_eq!(
        set.type_expr,
        "fun(key: any, value: any): {ok: boolean, err: string}"
    );

    let clear = annotations.field("clear").unwrap();
    assert_eq!(clear.overloads, vec!["fun(): nil".to_string()]);

    let cache = annotations.field("cache").unwrap();
    assert_eq!(cache.type_expr, "StoreCache");
    assert_eq!(cache.source_line, Some(7));

    assert_eq!(annotations.field("limits").unwrap().type_expr, "any");
    assert!(annotations.discovered_global_class_names.is_none());

    // Step 3: Render and merge
    let mut annotations = annotations;
    let merged = merge_with_file_content(&mut annotations, RenderMode::Split).to_vec();
    assert_eq!(
        merged[..16].to_vec(),
        vec![
            "---@module 'demo.store'",
            "---@brief Key/value store helpers",
            "---@desc Keeps cached lookups and exposes a small query API.",
            "---@class DemoStoreDef",
            "---@field get fun(key: string, fallback: any): string|nil Looks up a key",
            "---@field set fun(key: any, value: any): {ok: boolean, err: string}",
            "---@field clear fun(scope: any): any",
            "---@field clear fun(): nil",
            "---@field cache StoreCache",
            "---@field limits any",
            "",
            "---@class DemoStore : DemoStoreDef",
            "local M = {}",
            "",
            "---@class StoreCache",
            "M.cache = {}",
        ]
    );
    assert_eq!(merged.last().map(String::as_str), Some("return M"));
}

#[test]
fn test_global_types_resolve_plain_fields() {
    let temp_dir = store_project();
    let file = temp_dir.path().join("lua/demo/store.lua");

    let registry = TypeRegistry::scan(temp_dir.path());
    assert!(registry.contains("Limits"));
    assert!(registry.contains("LimitsDef"));

    let options = ScanOptions {
        resolve_global_types: true,
        ..ScanOptions::default()
    };
    let annotations = Analyzer::new(options, Some(&registry))
        .analyze_file(&file)
        .unwrap();

    assert_eq!(annotations.field("limits").unwrap().type_expr, "Limits");
    // explicit class attachment still wins
    assert_eq!(annotations.field("cache").unwrap().type_expr, "StoreCache");

    let matched = annotations.discovered_global_class_names.unwrap();
    assert_eq!(matched.into_iter().collect::<Vec<_>>(), vec!["Limits"]);
}

#[test]
fn test_in_place_rewrite_is_stable() {
    let temp_dir = store_project();
    let file = temp_dir.path().join("lua/demo/store.lua");
    let analyzer = Analyzer::new(ScanOptions::default(), None);

    let mut runs = Vec::new();
    for _ in 0..2 {
        let mut annotations = analyzer.analyze_file(&file).unwrap();
        merge_with_file_content(&mut annotations, RenderMode::Split);
        write_file(&annotations, &WriteOptions::default(), RenderMode::Split).unwrap();
        runs.push(std::fs::read_to_string(&file).unwrap());
    }

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0].matches("---@module").count(), 1);
    assert_eq!(runs[0].matches("local M = {}").count(), 1);
}

#[test]
fn test_explicit_tags_end_to_end() {
    let temp_dir = create_test_project(vec![(
        "lua/calc/ops.lua",
        "---@module 'calc.ops'\n---@brief Math\n\nlocal M = {}\n\n---@param p1 T1\n---@param p2 T2\n---@return R\nfunction M.combine(a, b)\nend\n\nreturn M\n",
    )]);
    let file = temp_dir.path().join("lua/calc/ops.lua");

    let annotations = Analyzer::new(ScanOptions::default(), None)
        .analyze_file(&file)
        .unwrap();
    let lines = build_header_block(&annotations.header, RenderMode::Inline);

    assert_eq!(
        lines,
        vec![
            "---@module 'calc.ops'",
            "---@brief Math",
            "---@desc LEER",
            "---@class CalcOps",
            "---@field combine fun(p1: T1, p2: T2): R",
            "local M = {}",
        ]
    );
}

#[test]
fn test_annot_output_leaves_source_untouched() {
    let temp_dir = store_project();
    let file = temp_dir.path().join("lua/demo/store.lua");
    let original = std::fs::read_to_string(&file).unwrap();

    let annotations = Analyzer::new(ScanOptions::default(), None)
        .analyze_file(&file)
        .unwrap();
    let options = WriteOptions {
        annot_only: true,
        ..WriteOptions::default()
    };
    let lines = write_file(&annotations, &options, RenderMode::Split).unwrap();

    assert_eq!(std::fs::read_to_string(&file).unwrap(), original);
    let annot = temp_dir.path().join("lua/demo/store.annot.lua");
    assert!(Path::new(&annot).exists());
    assert_eq!(lines.first().map(String::as_str), Some("---@module 'demo.store'"));
}

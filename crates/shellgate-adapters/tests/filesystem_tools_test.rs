//! Tests for filesystem tools: read, write, list, info, mkdir, delete, search.

use serde_json::{json, Value};
use shellgate_adapters::{build_gateway, Encoding, FileOps};
use shellgate_runtime::{PathGuard, SandboxConfig, ToolError, ToolGateway};
use std::path::Path;
use std::sync::Arc;

fn make_gateway(dir: &Path) -> ToolGateway {
    build_gateway(&SandboxConfig::with_workspace(dir)).unwrap()
}

fn make_ops(dir: &Path, max_file_size: u64) -> FileOps {
    let guard = Arc::new(PathGuard::new(dir.to_path_buf(), &[]).unwrap());
    FileOps::new(guard, max_file_size)
}

fn names(listing: &Value) -> Vec<String> {
    listing["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap().to_string())
        .collect()
}

fn result_paths(search: &Value) -> Vec<String> {
    search["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap().to_string())
        .collect()
}

// ── read_file / write_file ──────────────────────────────────────────────

#[tokio::test]
async fn test_write_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());
    let content = "line1\nünïcödé line2\n";

    let written = gateway
        .call("write_file", json!({"path": "notes/a.txt", "content": content}))
        .await;
    assert_eq!(written["success"], true);
    assert_eq!(written["path"], "notes/a.txt");
    assert_eq!(written["size"], content.len());
    assert_eq!(written["created"], true);

    let read = gateway.call("read_file", json!({"path": "notes/a.txt"})).await;
    assert_eq!(read["success"], true);
    assert_eq!(read["content"], content);
    assert_eq!(read["is_binary"], false);
    assert_eq!(read["encoding"], "utf-8");
    assert_eq!(
        std::fs::read(dir.path().join("notes/a.txt")).unwrap(),
        content.as_bytes()
    );
}

#[tokio::test]
async fn test_overwrite_reports_not_created() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    gateway
        .call("write_file", json!({"path": "f.txt", "content": "one"}))
        .await;
    let second = gateway
        .call("write_file", json!({"path": "f.txt", "content": "two"}))
        .await;

    assert_eq!(second["created"], false);
    assert_eq!(std::fs::read_to_string(dir.path().join("f.txt")).unwrap(), "two");
}

#[tokio::test]
async fn test_oversized_write_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let ops = make_ops(dir.path(), 16);

    let err = ops
        .write("big/blob.txt", &"x".repeat(17), Encoding::Utf8)
        .await
        .unwrap_err();

    assert_eq!(ToolError::classify(&err).kind(), "resource_limit_exceeded");
    assert!(!dir.path().join("big/blob.txt").exists());
    assert!(!dir.path().join("big").exists());
}

#[tokio::test]
async fn test_oversized_read_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("big.txt"), "0123456789").unwrap();
    let ops = make_ops(dir.path(), 4);

    let err = ops.read("big.txt", Encoding::Utf8).await.unwrap_err();

    let classified = ToolError::classify(&err);
    assert_eq!(classified.kind(), "resource_limit_exceeded");
    assert!(classified.to_string().contains("too large"));
}

#[tokio::test]
async fn test_binary_read_falls_back_to_base64() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bin.dat"), [0xff, 0xfe, 0x00]).unwrap();
    let gateway = make_gateway(dir.path());

    let read = gateway.call("read_file", json!({"path": "bin.dat"})).await;

    assert_eq!(read["success"], true);
    assert_eq!(read["is_binary"], true);
    assert_eq!(read["encoding"], "base64");
    assert_eq!(read["content"], "//4A");
    assert_eq!(read["size"], 3);
}

#[tokio::test]
async fn test_write_base64_content() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    let written = gateway
        .call(
            "write_file",
            json!({"path": "img.bin", "content": "//4A", "encoding": "base64"}),
        )
        .await;

    assert_eq!(written["success"], true);
    assert_eq!(written["size"], 3);
    assert_eq!(
        std::fs::read(dir.path().join("img.bin")).unwrap(),
        vec![0xff, 0xfe, 0x00]
    );
}

#[tokio::test]
async fn test_read_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    let read = gateway.call("read_file", json!({"path": "nope.txt"})).await;

    assert_eq!(read["success"], false);
    assert_eq!(read["error_kind"], "operation_failure");
    assert!(read["error"].as_str().unwrap().contains("File not found"));
}

#[tokio::test]
async fn test_read_traversal_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());
    let root = dir.path().canonicalize().unwrap();

    let read = gateway
        .call(
            "read_file",
            json!({"path": format!("{}/../etc/passwd", root.display())}),
        )
        .await;

    assert_eq!(read["success"], false);
    assert_eq!(read["error_kind"], "policy_rejection");
}

#[tokio::test]
async fn test_read_outside_workspace_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();
    let outside = other.path().join("secret.txt");
    std::fs::write(&outside, "secret").unwrap();
    let gateway = make_gateway(dir.path());

    let read = gateway
        .call("read_file", json!({"path": outside.to_str().unwrap()}))
        .await;

    assert_eq!(read["success"], false);
    assert!(read["error"]
        .as_str()
        .unwrap()
        .contains("Can only read from workspace"));
}

#[tokio::test]
async fn test_write_outside_workspace_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    let written = gateway
        .call("write_file", json!({"path": "../escape.txt", "content": "x"}))
        .await;

    assert_eq!(written["success"], false);
    assert_eq!(written["error_kind"], "policy_rejection");
    assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
}

// ── list_directory / get_file_info ──────────────────────────────────────

#[tokio::test]
async fn test_list_directories_first_then_name() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("b_dir")).unwrap();
    std::fs::create_dir(dir.path().join("a_dir")).unwrap();
    std::fs::write(dir.path().join("c.txt"), "c").unwrap();
    std::fs::write(dir.path().join("a.txt"), "aaa").unwrap();
    let gateway = make_gateway(dir.path());

    let listing = gateway.call("list_directory", json!({})).await;

    assert_eq!(listing["success"], true);
    assert_eq!(listing["count"], 4);
    assert_eq!(names(&listing), vec!["a_dir", "b_dir", "a.txt", "c.txt"]);
    let entries = listing["entries"].as_array().unwrap();
    assert_eq!(entries[0]["type"], "directory");
    assert_eq!(entries[0]["size"], 0);
    assert_eq!(entries[2]["type"], "file");
    assert_eq!(entries[2]["size"], 3);
    assert_eq!(entries[2]["path"], "a.txt");
    assert_eq!(entries[2]["permissions"].as_str().unwrap().len(), 3);
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_skips_dangling_symlink() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ok.txt"), "ok").unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling")).unwrap();
    let gateway = make_gateway(dir.path());

    let listing = gateway.call("list_directory", json!({"path": "."})).await;

    assert_eq!(names(&listing), vec!["ok.txt"]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_list_does_not_stat_through_escaping_symlink() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("secret"), "twelve bytes").unwrap();
    std::fs::write(dir.path().join("local.txt"), "abc").unwrap();
    std::os::unix::fs::symlink(outside.path().join("secret"), dir.path().join("secret")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("local.txt"), dir.path().join("mirror")).unwrap();
    let gateway = make_gateway(dir.path());

    let listing = gateway.call("list_directory", json!({})).await;

    assert_eq!(names(&listing), vec!["local.txt", "mirror", "secret"]);
    let entries = listing["entries"].as_array().unwrap();
    assert_eq!(entries[1]["type"], "file");
    assert_eq!(entries[1]["size"], 3);
    assert_eq!(entries[2]["type"], "symlink");
    assert_eq!(entries[2]["size"], 0);
}

#[tokio::test]
async fn test_list_file_is_not_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("f.txt"), "f").unwrap();
    let gateway = make_gateway(dir.path());

    let listing = gateway.call("list_directory", json!({"path": "f.txt"})).await;

    assert_eq!(listing["success"], false);
    assert!(listing["error"].as_str().unwrap().contains("Not a directory"));
}

#[tokio::test]
async fn test_file_info_fields() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("report.txt"), "12345").unwrap();
    let gateway = make_gateway(dir.path());

    let info = gateway
        .call("get_file_info", json!({"path": "report.txt"}))
        .await;

    assert_eq!(info["success"], true);
    assert_eq!(info["name"], "report.txt");
    assert_eq!(info["type"], "file");
    assert_eq!(info["size"], 5);
    assert_eq!(info["extension"], ".txt");
    assert!(info["modified"].is_string());
    assert_eq!(
        info["absolute_path"],
        dir.path()
            .canonicalize()
            .unwrap()
            .join("report.txt")
            .to_str()
            .unwrap()
    );
}

// ── create_directory / delete_path ──────────────────────────────────────

#[tokio::test]
async fn test_create_directory_nested_and_existing() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    let first = gateway
        .call("create_directory", json!({"path": "a/b/c"}))
        .await;
    let second = gateway
        .call("create_directory", json!({"path": "a/b/c"}))
        .await;

    assert_eq!(first["success"], true);
    assert_eq!(first["created"], true);
    assert_eq!(second["success"], true);
    assert_eq!(second["created"], false);
    assert!(dir.path().join("a/b/c").is_dir());
}

#[tokio::test]
async fn test_delete_workspace_root_refused() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());
    let root = dir.path().canonicalize().unwrap();

    for path in [".".to_string(), root.display().to_string()] {
        let result = gateway
            .call("delete_path", json!({"path": path, "recursive": true}))
            .await;
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "cannot delete workspace root");
    }
    assert!(root.is_dir());
}

#[tokio::test]
async fn test_delete_non_empty_dir_requires_recursive() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("full/inner")).unwrap();
    std::fs::write(dir.path().join("full/inner/f.txt"), "f").unwrap();
    let gateway = make_gateway(dir.path());

    let refused = gateway.call("delete_path", json!({"path": "full"})).await;
    assert_eq!(refused["success"], false);
    assert_eq!(refused["error_kind"], "operation_failure");
    assert!(dir.path().join("full/inner/f.txt").exists());

    let deleted = gateway
        .call("delete_path", json!({"path": "full", "recursive": true}))
        .await;
    assert_eq!(deleted["success"], true);
    assert!(!dir.path().join("full").exists());
}

#[tokio::test]
async fn test_delete_file_and_missing_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("gone.txt"), "x").unwrap();
    let gateway = make_gateway(dir.path());

    let deleted = gateway.call("delete_path", json!({"path": "gone.txt"})).await;
    assert_eq!(deleted["success"], true);
    assert!(!dir.path().join("gone.txt").exists());

    let missing = gateway.call("delete_path", json!({"path": "gone.txt"})).await;
    assert_eq!(missing["success"], false);
    assert!(missing["error"].as_str().unwrap().contains("Path not found"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_delete_symlink_keeps_target() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("data")).unwrap();
    std::fs::write(dir.path().join("data/keep.txt"), "keep").unwrap();
    std::os::unix::fs::symlink(dir.path().join("data"), dir.path().join("alias")).unwrap();
    let gateway = make_gateway(dir.path());

    let deleted = gateway
        .call("delete_path", json!({"path": "alias", "recursive": true}))
        .await;

    assert_eq!(deleted["success"], true);
    assert!(!dir.path().join("alias").exists());
    assert!(dir.path().join("data/keep.txt").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_delete_symlink_pointing_outside_or_at_root() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("keep.txt"), "keep").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("out")).unwrap();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("home")).unwrap();
    let gateway = make_gateway(dir.path());

    for link in ["out", "home"] {
        let deleted = gateway
            .call("delete_path", json!({"path": link, "recursive": true}))
            .await;
        assert_eq!(deleted["success"], true, "{link}: {deleted}");
        assert!(std::fs::symlink_metadata(dir.path().join(link)).is_err());
    }
    assert!(outside.path().join("keep.txt").exists());
    assert!(dir.path().is_dir());
}

// ── search_files ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_recursive_and_flat() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("sub/deep")).unwrap();
    std::fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
    std::fs::write(dir.path().join("sub/b.rs"), "fn b() {}").unwrap();
    std::fs::write(dir.path().join("sub/deep/c.rs"), "fn c() {}").unwrap();
    std::fs::write(dir.path().join("sub/notes.txt"), "n").unwrap();
    let gateway = make_gateway(dir.path());

    let recursive = gateway.call("search_files", json!({"pattern": "*.rs"})).await;
    assert_eq!(recursive["success"], true);
    assert_eq!(recursive["count"], 3);
    assert_eq!(
        result_paths(&recursive),
        vec!["a.rs", "sub/b.rs", "sub/deep/c.rs"]
    );

    let flat = gateway
        .call("search_files", json!({"pattern": "*.rs", "recursive": false}))
        .await;
    assert_eq!(result_paths(&flat), vec!["a.rs"]);

    let scoped = gateway
        .call(
            "search_files",
            json!({"pattern": "*.rs", "directory": "sub", "recursive": false}),
        )
        .await;
    assert_eq!(result_paths(&scoped), vec!["sub/b.rs"]);
    let hit = &scoped["results"][0];
    assert_eq!(hit["name"], "b.rs");
    assert!(hit["absolute_path"].as_str().unwrap().ends_with("sub/b.rs"));
}

#[tokio::test]
async fn test_search_rejects_escaping_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    let result = gateway.call("search_files", json!({"pattern": "../*"})).await;

    assert_eq!(result["success"], false);
    assert_eq!(result["error_kind"], "invalid_input");
}

#[tokio::test]
async fn test_search_outside_workspace_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    let result = gateway
        .call("search_files", json!({"pattern": "*", "directory": "/etc"}))
        .await;

    assert_eq!(result["success"], false);
    assert_eq!(result["error_kind"], "policy_rejection");
}

#[cfg(unix)]
#[tokio::test]
async fn test_search_does_not_follow_directory_symlink_loops() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "a").unwrap();
    for link in ["l1", "l2", "l3"] {
        std::os::unix::fs::symlink(".", dir.path().join(link)).unwrap();
    }
    let ops = make_ops(dir.path(), 1024);

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        ops.search("*.txt", None, true),
    )
    .await
    .expect("search should finish")
    .unwrap();

    assert_eq!(outcome.count, 1);
    assert_eq!(outcome.results[0].path, "a.txt");
}

#[cfg(unix)]
#[tokio::test]
async fn test_search_reports_file_symlinks_inside_workspace_only() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("real.log"), "r").unwrap();
    std::fs::write(outside.path().join("secret.log"), "s").unwrap();
    std::os::unix::fs::symlink(dir.path().join("real.log"), dir.path().join("alias.log")).unwrap();
    std::os::unix::fs::symlink(outside.path().join("secret.log"), dir.path().join("leak.log"))
        .unwrap();
    let gateway = make_gateway(dir.path());

    let result = gateway.call("search_files", json!({"pattern": "*.log"})).await;

    assert_eq!(result_paths(&result), vec!["alias.log", "real.log"]);
}

#[tokio::test]
async fn test_search_pattern_with_directory_component() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("a/src")).unwrap();
    std::fs::create_dir_all(dir.path().join("src")).unwrap();
    std::fs::write(dir.path().join("a/src/x.rs"), "x").unwrap();
    std::fs::write(dir.path().join("src/y.rs"), "y").unwrap();
    std::fs::write(dir.path().join("z.rs"), "z").unwrap();
    let gateway = make_gateway(dir.path());

    let recursive = gateway.call("search_files", json!({"pattern": "src/*.rs"})).await;
    assert_eq!(result_paths(&recursive), vec!["a/src/x.rs", "src/y.rs"]);

    let flat = gateway
        .call("search_files", json!({"pattern": "src/*.rs", "recursive": false}))
        .await;
    assert_eq!(result_paths(&flat), vec!["src/y.rs"]);
}

#[tokio::test]
async fn test_unknown_tool() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    let result = gateway.call("format_disk", json!({})).await;

    assert_eq!(result["success"], false);
    assert!(result["error"].as_str().unwrap().contains("unknown tool"));
}

#[tokio::test]
async fn test_all_tools_registered() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = make_gateway(dir.path());

    assert_eq!(
        gateway.tool_names(),
        vec![
            "create_directory",
            "delete_path",
            "get_file_info",
            "list_directory",
            "read_file",
            "search_files",
            "shell",
            "write_file",
        ]
    );
}

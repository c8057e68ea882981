use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_lua-annotgen")))
}

const OPS: &str = "\
---@module 'calc.ops'
---@brief Math helpers

local M = {}

---@param p1 T1
---@param p2 T2
---@return R
function M.combine(a, b)
end

return M
";

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("lua/calc")).unwrap();
    fs::write(dir.path().join("lua/calc/ops.lua"), OPS).unwrap();
    dir
}

#[test]
fn dry_run_prints_rendered_file() {
    let dir = project();
    let file = dir.path().join("lua/calc/ops.lua");

    cmd()
        .arg("--path")
        .arg(&file)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("-- {} --", file.display())))
        .stdout(predicate::str::contains(
            "---@field combine fun(p1: T1, p2: T2): R\n",
        ))
        .stdout(predicate::str::contains("---@class CalcOps : CalcOpsDef\n"));

    // nothing written
    assert_eq!(fs::read_to_string(&file).unwrap(), OPS);
}

#[test]
fn missing_path_exits_with_one() {
    cmd()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--path is required"));
}

#[test]
fn non_lua_file_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "hello").unwrap();

    cmd().arg("--path").arg(&file).assert().code(1);
}

#[test]
fn in_place_write_is_silent() {
    let dir = project();
    let file = dir.path().join("lua/calc/ops.lua");

    cmd()
        .arg("--path")
        .arg(dir.path())
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());

    let written = fs::read_to_string(&file).unwrap();
    assert!(written.starts_with("---@module 'calc.ops'\n---@brief Math helpers\n"));
    assert!(written.ends_with("function M.combine(a, b)\nend\n\nreturn M\n"));
}

#[test]
fn annot_into_out_dir() {
    let dir = project();
    let out = dir.path().join("out");

    cmd()
        .arg("--path")
        .arg(dir.path().join("lua"))
        .arg("--out")
        .arg(&out)
        .arg("--annot")
        .arg("--inline")
        .assert()
        .success();

    let annot = fs::read_to_string(out.join("ops.annot.lua")).unwrap();
    assert_eq!(
        annot,
        "---@module 'calc.ops'\n---@brief Math helpers\n---@desc LEER\n---@class CalcOps\n---@field combine fun(p1: T1, p2: T2): R\nlocal M = {}\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("lua/calc/ops.lua")).unwrap(),
        OPS
    );
}

#[test]
fn json_format_prints_model() {
    let dir = project();

    cmd()
        .arg("--path")
        .arg(dir.path())
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"module_path\": \"calc.ops\""))
        .stdout(predicate::str::contains("\"type\": \"fun(p1: T1, p2: T2): R\""));
}

//! Integration tests for the `eggs` CLI.

use std::{
    fs,
    io::Write,
    path::Path,
};

use assert_cmd::cargo_bin_cmd;
use tempfile::tempdir;
use testresult::TestResult;

fn write_index(dir: &Path, contents: &str) {
    let mut file = fs::File::create(dir.join("index-depend.txt")).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

fn make_egg(path: &Path) {
    let file = fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    writer.start_file("foo/__init__.py", zip::write::FileOptions::default()).unwrap();
    writer.write_all(b"# foo").unwrap();
    writer.finish().unwrap();
}

fn md5_of(bytes: &[u8]) -> String {
    use md5::{Digest, Md5};
    let mut hasher = Md5::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Adds one egg record to `dir`'s index, writing the backing archive alongside it.
fn repo_with(dir: &Path, name: &str, version: &str, build: u32) {
    let archive_path = dir.join(format!("{name}-{version}-{build}.egg"));
    make_egg(&archive_path);
    let md5 = md5_of(&fs::read(&archive_path).unwrap());
    let size = fs::metadata(&archive_path).unwrap().len();
    let mut index = fs::read_to_string(dir.join("index-depend.txt")).unwrap_or_default();
    index.push_str(&format!(
        "==> {name}-{version}-{build}.egg <==\nname = '{name}'\nversion = '{version}'\nbuild = {build}\nmd5 = '{md5}'\nsize = {size}\n\n"
    ));
    write_index(dir, &index);
}

#[test]
fn install_then_query_then_remove_round_trips() -> TestResult {
    let repo = tempdir()?;
    let prefix = tempdir()?;
    repo_with(repo.path(), "foo", "1.0.0", 1);

    let mut cmd = cargo_bin_cmd!("eggs");
    cmd.args(["--repo", &format!("file://{}", repo.path().display()), "--prefix", &prefix.path().display().to_string(), "install", "foo"]);
    cmd.assert().success();

    let mut cmd = cargo_bin_cmd!("eggs");
    cmd.args(["--prefix", &prefix.path().display().to_string(), "query", "foo"]);
    let output = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("foo-1.0.0-1.egg"), "expected installed egg in query output, got: {stdout}");
    assert!(stdout.starts_with('i'), "expected the installed marker, got: {stdout}");

    let mut cmd = cargo_bin_cmd!("eggs");
    cmd.args(["--prefix", &prefix.path().display().to_string(), "history"]);
    let output = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.contains("rev 1"), "expected a recorded revision, got: {stdout}");

    let mut cmd = cargo_bin_cmd!("eggs");
    cmd.args(["--prefix", &prefix.path().display().to_string(), "remove", "foo"]);
    cmd.assert().success();

    let mut cmd = cargo_bin_cmd!("eggs");
    cmd.args(["--prefix", &prefix.path().display().to_string(), "query", "foo"]);
    let output = cmd.assert().success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout).into_owned();
    assert!(stdout.trim().is_empty(), "expected no installed or remote eggs after removal, got: {stdout}");

    Ok(())
}

#[test]
fn removing_a_missing_egg_fails() -> TestResult {
    let prefix = tempdir()?;

    let mut cmd = cargo_bin_cmd!("eggs");
    cmd.args(["--prefix", &prefix.path().display().to_string(), "remove", "nonexistent"]);
    cmd.assert().failure().code(1);

    Ok(())
}

#[test]
fn missing_required_argument_is_a_usage_error() {
    let mut cmd = cargo_bin_cmd!("eggs");
    cmd.arg("install");
    cmd.assert().failure().code(2);
}

//! Capability-based file helpers for the on-disk point cache and config.
#![forbid(unsafe_code)]

use std::io::{self, ErrorKind, Read, Write};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open the directory holding `path` and return it with the bare file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Create every missing directory above `path`.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = split_root(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Read `path` as UTF-8, returning `None` when it does not exist.
pub fn read_optional(path: &Utf8Path) -> io::Result<Option<String>> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    let mut file = match dir.open(&name) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(Some(contents))
}

/// Replace the contents of `path`, creating parent directories as needed.
///
/// The data is written to a sibling temporary file first and renamed into
/// place, so readers observe either the old or the new contents.
pub fn write_replacing(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = open_dir_and_file(path)?;
    let staging = format!(".{name}.tmp");
    let written = write_staging(&dir, &staging, contents)
        .and_then(|()| dir.rename(&staging, &dir, &name));
    written.or_else(|err| match dir.remove_file(&staging) {
        Ok(()) => Err(err),
        Err(cleanup) if cleanup.kind() == ErrorKind::NotFound => Err(err),
        Err(cleanup) => Err(io::Error::new(
            err.kind(),
            format!("{err}; staging file {staging} left behind: {cleanup}"),
        )),
    })
}

fn write_staging(dir: &fs_utf8::Dir, staging: &str, contents: &str) -> io::Result<()> {
    let mut file = dir.create(staging)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()
}

/// Split `path` into an ambient root directory and the remainder below it.
fn split_root(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();
    let root = match std_path.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            Some(Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR_STR))
        }
        Some(Component::RootDir) => Some(Utf8PathBuf::from(std::path::MAIN_SEPARATOR_STR)),
        _ => None,
    };
    let Some(root) = root else {
        let dir = fs_utf8::Dir::open_ambient_dir(".", ambient_authority())?;
        return Ok((dir, path.to_path_buf()));
    };
    let relative = path
        .strip_prefix(&root)
        .map_err(|_| io::Error::other(format!("{path} is not below {root}")))?
        .to_path_buf();
    let dir = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
    Ok((dir, relative))
}

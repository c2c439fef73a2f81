//! Output path arithmetic
//!
//! All paths are '/'-separated and relative to a target's output root, so results
//! are identical on every host platform.

use crate::naming::package_to_underscore;

/// `library.v1` -> `library/v1`
pub fn package_to_dir(package: &str) -> String {
    package
        .split('.')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory part of a path: `library/v1/models/lib.schema` -> `library/v1/models`
pub fn dir_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Number of segments in a normalized directory (`""` and `"."` are 0)
pub fn depth(dir: &str) -> usize {
    segments(dir).len()
}

/// Join and normalize path parts, dropping empty and `.` segments and folding `..`
pub fn join(parts: &[&str]) -> String {
    let mut out: Vec<&str> = Vec::new();
    for part in parts {
        for segment in part.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if matches!(out.last(), Some(last) if *last != "..") {
                        out.pop();
                    } else {
                        out.push("..");
                    }
                }
                s => out.push(s),
            }
        }
    }
    out.join("/")
}

/// Normalize a single path
pub fn normalize(path: &str) -> String {
    join(&[path])
}

/// Relative reference from a directory to a path, always starting with `./` or `../`
pub fn relative_path(from_dir: &str, to_path: &str) -> String {
    let from = segments(from_dir);
    let to = segments(to_path);
    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from.len() - common;
    let rest = to[common..].join("/");
    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}

/// Module specifier for importing one generated `.ts` file from another
pub fn relative_import(from_file: &str, to_file: &str) -> String {
    let target = to_file.strip_suffix(".ts").unwrap_or(to_file);
    relative_path(dir_of(&normalize(from_file)), &normalize(target))
}

/// Reference from a directory to a root-level module name
pub fn import_from_dir(from_dir: &str, module: &str) -> String {
    match depth(from_dir) {
        0 => format!("./{module}"),
        n => format!("{}{module}", "../".repeat(n)),
    }
}

/// Import path from files of one package to another package's root-level module
///
/// One `../` per segment of the importing package's directory, then the imported
/// package's underscore-joined name. Packages at the root get a bare `./` reference.
pub fn cross_package_import(from_package: &str, to_package: &str) -> String {
    import_from_dir(
        &package_to_dir(from_package),
        &package_to_underscore(to_package),
    )
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

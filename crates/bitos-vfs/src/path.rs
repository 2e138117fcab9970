//! Path parsing and resolution.
//!
//! Paths are `/`-delimited. Empty segments collapse, `..` pops one segment
//! (never above the root), and `~` / `$HOME` stand for [`HOME`]. A `.`
//! segment is an ordinary name and will simply not resolve.

use crate::node::Node;

/// Home directory of the simulated user.
pub const HOME: &str = "/home/user";

/// Split a path into normalized segments.
pub fn normalize(path: &str) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for component in path.split('/') {
        match component {
            "" => {},
            ".." => {
                segments.pop();
            },
            "~" | "$HOME" => {
                segments.clear();
                segments.extend(HOME.split('/').filter(|s| !s.is_empty()).map(String::from));
            },
            other => segments.push(other.to_string()),
        }
    }
    segments
}

/// Join segments back into an absolute path.
pub fn join<S: AsRef<str>>(segments: &[S]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut out = String::new();
    for seg in segments {
        out.push('/');
        out.push_str(seg.as_ref());
    }
    out
}

/// Resolve `path` against the working directory `cwd` into a normalized
/// absolute path.
pub fn resolve_relative(cwd: &str, path: &str) -> String {
    if path.starts_with('/') {
        return join(&normalize(path));
    }
    let combined = if cwd == "/" {
        format!("/{path}")
    } else {
        format!("{cwd}/{path}")
    };
    join(&normalize(&combined))
}

/// Walk an absolute path from `root`.
///
/// Returns `None` as soon as a segment is missing or a file would have to
/// be descended into.
pub fn resolve_absolute<'a>(root: &'a Node, path: &str) -> Option<&'a Node> {
    let mut current = root;
    for segment in normalize(path) {
        current = match current {
            Node::Directory(dir) => dir.get(&segment)?,
            Node::File(_) => return None,
        };
    }
    Some(current)
}

/// Whether `name` can be stored as a single directory entry.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}

/// Last segment of a path, or `/` for the root.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Directory;

    #[test]
    fn normalize_collapses_slashes() {
        assert_eq!(normalize("//home///user/"), vec!["home", "user"]);
    }

    #[test]
    fn normalize_root_is_empty() {
        assert!(normalize("/").is_empty());
        assert!(normalize("").is_empty());
    }

    #[test]
    fn normalize_dotdot_pops() {
        assert_eq!(normalize("/home/user/../guest"), vec!["home", "guest"]);
    }

    #[test]
    fn normalize_dotdot_clamps_at_root() {
        assert!(normalize("/../..").is_empty());
    }

    #[test]
    fn normalize_keeps_single_dot_literally() {
        assert_eq!(normalize("/tmp/./x"), vec!["tmp", ".", "x"]);
    }

    #[test]
    fn normalize_tilde_is_home() {
        assert_eq!(normalize("~"), vec!["home", "user"]);
        assert_eq!(normalize("$HOME/documents"), vec!["home", "user", "documents"]);
    }

    #[test]
    fn join_root() {
        let empty: [&str; 0] = [];
        assert_eq!(join(&empty), "/");
        assert_eq!(join(&["etc", "hosts"]), "/etc/hosts");
    }

    #[test]
    fn resolve_relative_absolute_is_normalized() {
        assert_eq!(resolve_relative("/tmp", "/etc//apt/"), "/etc/apt");
    }

    #[test]
    fn resolve_relative_appends() {
        assert_eq!(resolve_relative("/home/user", "documents"), "/home/user/documents");
        assert_eq!(resolve_relative("/", "etc"), "/etc");
    }

    #[test]
    fn resolve_relative_parent() {
        assert_eq!(resolve_relative("/home/user", ".."), "/home");
        assert_eq!(resolve_relative("/home", ".."), "/");
    }

    #[test]
    fn resolve_relative_parent_at_root_stays() {
        assert_eq!(resolve_relative("/", ".."), "/");
    }

    #[test]
    fn resolve_relative_home() {
        assert_eq!(resolve_relative("/var/log", "~"), HOME);
        assert_eq!(resolve_relative("/var/log", "$HOME"), HOME);
    }

    #[test]
    fn resolve_relative_nested() {
        assert_eq!(
            resolve_relative("/home/user", "documents/../downloads"),
            "/home/user/downloads"
        );
    }

    #[test]
    fn resolve_absolute_walks_tree() {
        let mut etc = Directory::new();
        etc.insert("hosts", Node::File("127.0.0.1 localhost".into()));
        let mut root = Directory::new();
        root.insert("etc", Node::Directory(etc));
        let root = Node::Directory(root);

        assert!(matches!(resolve_absolute(&root, "/"), Some(Node::Directory(_))));
        assert!(matches!(resolve_absolute(&root, "/etc/hosts"), Some(Node::File(_))));
        assert!(resolve_absolute(&root, "/etc/missing").is_none());
        assert!(resolve_absolute(&root, "/etc/hosts/deeper").is_none());
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("notes.txt"));
        assert!(is_valid_name(".bashrc"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("."));
        assert!(!is_valid_name(".."));
        assert!(!is_valid_name("a/b"));
    }

    #[test]
    fn file_name_of_paths() {
        assert_eq!(file_name("/etc/hosts"), "hosts");
        assert_eq!(file_name("/etc/"), "etc");
        assert_eq!(file_name("/"), "/");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_is_idempotent(path in "[/a-z0-9_.~]{0,50}") {
                let once = join(&normalize(&path));
                let twice = join(&normalize(&once));
                prop_assert_eq!(once, twice);
            }

            #[test]
            fn normalized_segments_are_clean(path in "[/a-z.]{0,50}") {
                for seg in normalize(&path) {
                    prop_assert!(!seg.is_empty());
                    prop_assert!(seg != "..");
                    prop_assert!(!seg.contains('/'));
                }
            }

            #[test]
            fn resolved_paths_are_absolute(
                cwd in "(/[a-z]{1,5}){0,4}",
                path in "[a-z./]{0,20}",
            ) {
                let cwd = if cwd.is_empty() { "/".to_string() } else { cwd };
                let resolved = resolve_relative(&cwd, &path);
                prop_assert!(resolved.starts_with('/'));
                prop_assert!(!resolved.contains("//"));
                prop_assert!(resolved == "/" || !resolved.ends_with('/'));
            }
        }
    }
}

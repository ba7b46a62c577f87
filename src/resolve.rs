//! Request-path resolution against the serving allowlist.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Repository prefixes the server is willing to expose.
///
/// Everything outside this list is refused regardless of whether it exists on
/// disk. The list only changes with a rebuild; there is no runtime registration.
pub const ALLOWED_PREFIXES: [&str; 6] = [
    "/modern/client-web/",
    "/modern/assets/runtime/",
    "/modern/assets/pristine/",
    "/modern/",
    "/docs/wiki/",
    "/legacy/u6-decompiled/SRC/",
];

/// Where a request for the bare root gets redirected: the web client.
pub const ENTRY_PATH: &str = "/modern/client-web/";

/// Lexically normalizes a decoded request path.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment, and a
/// `..` that would climb above the root rejects the whole path. The trailing
/// slash survives so directory-style requests still read as directories.
///
/// Normalizing before the allowlist check means the check runs against what the
/// path *means*, not what it *says*: `/modern/client-web/../../etc/passwd`
/// comes out as `/etc/passwd` and fails the allowlist.
pub fn normalize(path: &str) -> Option<String> {
    if !path.starts_with('/') {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(segment),
        }
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if path.ends_with('/') && normalized.len() > 1 {
        normalized.push('/');
    }
    Some(normalized)
}

/// True when a normalized path falls inside the allowlist.
///
/// Each prefix may be requested bare (`/docs/wiki`) or slash-terminated; the
/// bare form names the same directory as its slash-terminated twin.
pub fn is_allowed(path: &str) -> bool {
    ALLOWED_PREFIXES
        .iter()
        .any(|prefix| path == prefix.trim_end_matches('/') || path.starts_with(prefix))
}

/// Maps a decoded request path to the filesystem path it may serve, or `None`
/// when the request must be refused.
///
/// Rejections are deliberately uniform: the caller answers 403 without learning
/// whether the path was malformed, outside the allowlist, or escaping the root
/// through a symlink.
///
/// `root_dir` must already be canonical (it is canonicalized once at startup).
pub async fn resolve_target(root_dir: &Path, req_path: &str) -> Option<PathBuf> {
    let normalized = normalize(req_path)?;
    if !is_allowed(&normalized) {
        return None;
    }

    let candidate = root_dir.join(normalized.trim_matches('/'));
    match fs::canonicalize(&candidate).await {
        Ok(resolved) => resolved.starts_with(root_dir).then_some(resolved),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            // The target itself is missing. Let the nearest existing ancestor
            // vouch that it would have lived under the root, so the caller can
            // answer 404 instead of leaking whether the allowlist was the
            // problem.
            let name = candidate.file_name()?.to_owned();
            match fs::canonicalize(candidate.parent()?).await {
                Ok(dir) => dir.starts_with(root_dir).then(|| dir.join(&name)),
                Err(err) if err.kind() == ErrorKind::NotFound => Some(candidate),
                Err(_) => None,
            }
        }
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_resolves_dot_segments() {
        assert_eq!(normalize("/a/b/../c"), Some("/a/c".to_string()));
        assert_eq!(normalize("/a/./b"), Some("/a/b".to_string()));
        assert_eq!(normalize("/a//b"), Some("/a/b".to_string()));
    }

    #[test]
    fn normalize_keeps_trailing_slash() {
        assert_eq!(
            normalize("/modern/client-web/"),
            Some("/modern/client-web/".to_string())
        );
        assert_eq!(normalize("/"), Some("/".to_string()));
    }

    #[test]
    fn normalize_rejects_escapes() {
        assert_eq!(normalize("/.."), None);
        assert_eq!(normalize("/a/../.."), None);
        assert_eq!(normalize("relative/path"), None);
        assert_eq!(normalize(""), None);
    }

    #[test]
    fn normalize_rewrites_traversal_into_sibling() {
        assert_eq!(
            normalize("/modern/client-web/../../etc/passwd"),
            Some("/etc/passwd".to_string())
        );
    }

    #[test]
    fn allowlist_accepts_prefixes_and_bare_forms() {
        assert!(is_allowed("/modern/client-web/"));
        assert!(is_allowed("/modern/client-web"));
        assert!(is_allowed("/modern/client-web/app.js"));
        assert!(is_allowed("/docs/wiki"));
        assert!(is_allowed("/legacy/u6-decompiled/SRC/converse.c"));
    }

    #[test]
    fn allowlist_refuses_everything_else() {
        assert!(!is_allowed("/"));
        assert!(!is_allowed("/etc/passwd"));
        assert!(!is_allowed("/modernfoo"));
        assert!(!is_allowed("/docs/other/page.html"));
        assert!(!is_allowed("/legacy/u6-decompiled/OTHER/file.c"));
    }

    fn fixture_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("modern/client-web")).unwrap();
        std::fs::write(
            dir.path().join("modern/client-web/index.html"),
            "<html>ok</html>",
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn resolves_existing_file() {
        let dir = fixture_root();
        let root = dir.path().canonicalize().unwrap();
        let resolved = resolve_target(&root, "/modern/client-web/index.html")
            .await
            .unwrap();
        assert_eq!(resolved, root.join("modern/client-web/index.html"));
    }

    #[tokio::test]
    async fn resolves_missing_file_under_allowed_prefix() {
        let dir = fixture_root();
        let root = dir.path().canonicalize().unwrap();
        let resolved = resolve_target(&root, "/modern/client-web/missing.txt")
            .await
            .unwrap();
        assert_eq!(resolved, root.join("modern/client-web/missing.txt"));
    }

    #[tokio::test]
    async fn refuses_traversal_out_of_allowlist() {
        let dir = fixture_root();
        let root = dir.path().canonicalize().unwrap();
        let resolved = resolve_target(&root, "/modern/client-web/../../etc/passwd").await;
        assert_eq!(resolved, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn refuses_symlink_escaping_root() {
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();

        let dir = fixture_root();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.join("modern/leak")).unwrap();

        let resolved = resolve_target(&root, "/modern/leak/secret.txt").await;
        assert_eq!(resolved, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn follows_symlink_staying_inside_root() {
        let dir = fixture_root();
        let root = dir.path().canonicalize().unwrap();
        std::os::unix::fs::symlink(root.join("modern/client-web"), root.join("modern/alias"))
            .unwrap();

        let resolved = resolve_target(&root, "/modern/alias/index.html")
            .await
            .unwrap();
        assert_eq!(resolved, root.join("modern/client-web/index.html"));
    }
}

//! Asset store backends.

mod fs;
mod memory;

use url::Url;

pub use fs::FilesystemAssetStore;
pub use memory::MemoryAssetStore;

/// Public URL of a stored path, percent-encoding each path segment.
pub(crate) fn join_public_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), encode_path(path))
}

fn encode_path(path: &str) -> String {
    let segments = path.trim_start_matches('/').split('/');
    let Ok(mut scratch) = Url::parse("http://assets.invalid/") else {
        return format!("/{}", path.trim_start_matches('/'));
    };
    if let Ok(mut encoded) = scratch.path_segments_mut() {
        encoded.clear().extend(segments);
    }
    scratch.path().to_string()
}

#[cfg(test)]
mod tests {
    use super::join_public_url;

    #[test]
    fn plain_paths_join_with_one_slash() {
        assert_eq!(
            join_public_url("https://cdn.test/assets/", "/doc1/kix.1-large.jpg"),
            "https://cdn.test/assets/doc1/kix.1-large.jpg"
        );
        assert_eq!(
            join_public_url("/assets", "doc1/kix.1-tiny.jpg"),
            "/assets/doc1/kix.1-tiny.jpg"
        );
    }

    #[test]
    fn reserved_characters_in_object_ids_are_encoded() {
        assert_eq!(
            join_public_url("https://cdn.test", "doc1/kix 1#a?b-small.png"),
            "https://cdn.test/doc1/kix%201%23a%3Fb-small.png"
        );
    }
}

//! Maps remote collections onto local documents.
//!
//! A collection's title is reduced to ASCII letters and spaces to form the
//! document name. Two titles that reduce to the same name share one
//! document; the first one to be materialized owns the mapping entry.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::remote::RemoteCollection;
use crate::storage::{EntryKind, Mapping, MappingEntry, Result, Vault};

/// Characters left untouched by a browser's `encodeURI`
const URI_COMPONENT_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

const APP_URL: &str = "https://readavocado.com/app/";

/// Outcome of [`ensure_document`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredDocument {
    pub path: String,
    pub created: bool,
}

/// Keep only ASCII letters and spaces, then trim
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
        .collect();
    kept.trim().to_string()
}

/// Vault path of the document for a title inside `root_folder`
pub fn document_path(root_folder: &str, title: &str) -> String {
    let root = root_folder.trim_end_matches('/');
    if root.is_empty() {
        format!("{}.md", sanitize_title(title))
    } else {
        format!("{}/{}.md", root, sanitize_title(title))
    }
}

/// Initial content of a freshly materialized document
pub fn render_header(collection: &RemoteCollection) -> String {
    let cover = if collection.has_cover() {
        format!("![cover]({})", collection.cover_url)
    } else {
        String::new()
    };
    let link = utf8_percent_encode(&collection.title, URI_COMPONENT_KEEP);

    format!(
        "# {title}\n{cover}\n## Info\n- Title: {title}\n- Author: {author}\n- [Open in Readavocado]({APP_URL}{link})\n## Highlights\n",
        title = collection.title,
        author = collection.author,
    )
}

/// Make sure `collection` has a document under `root_folder`.
///
/// When nothing (or a folder) occupies the document path a new document is
/// created and registered in `mapping` with cursor 1. An existing document is
/// left untouched, even if it has no mapping entry.
pub fn ensure_document(
    vault: &dyn Vault,
    root_folder: &str,
    collection: &RemoteCollection,
    mapping: &mut Mapping,
) -> Result<EnsuredDocument> {
    let path = document_path(root_folder, &collection.title);

    if vault.entry_kind(&path)? == Some(EntryKind::Document) {
        return Ok(EnsuredDocument {
            path,
            created: false,
        });
    }

    vault.create(&path, &render_header(collection))?;
    mapping.insert(path.clone(), MappingEntry::new(collection.id.clone()));

    Ok(EnsuredDocument {
        path,
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CollectionId, FileVault};
    use tempfile::TempDir;

    fn collection(id: i64, title: &str, cover: &str) -> RemoteCollection {
        RemoteCollection {
            id: CollectionId::Number(id),
            title: title.to_string(),
            author: "Author".to_string(),
            cover_url: cover.to_string(),
        }
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("My Book!!"), "My Book");
        assert_eq!(sanitize_title("  1984: A Novel  "), "A Novel");
        assert_eq!(sanitize_title("Café au lait"), "Caf au lait");
        assert_eq!(sanitize_title("???"), "");
    }

    #[test]
    fn test_sanitize_is_idempotent_and_clean() {
        let samples = [
            "My Book!!",
            " leading",
            "trailing ",
            "Ünïcödé & symbols #1",
            "\tTabs\tand\nnewlines ",
            "Dune (Part 2) - Herbert",
            "",
        ];
        for sample in samples {
            let once = sanitize_title(sample);
            assert_eq!(sanitize_title(&once), once);
            assert!(once.chars().all(|c| c.is_ascii_alphabetic() || c == ' '));
            assert_eq!(once.trim(), once);
        }
    }

    #[test]
    fn test_document_path() {
        assert_eq!(document_path("Avocado", "My Book!!"), "Avocado/My Book.md");
        assert_eq!(document_path("Avocado/", "My Book"), "Avocado/My Book.md");
        assert_eq!(document_path("", "My Book"), "My Book.md");
    }

    #[test]
    fn test_header_without_cover() {
        let header = render_header(&collection(42, "My Book!!", ""));
        assert_eq!(
            header,
            "# My Book!!\n\n## Info\n- Title: My Book!!\n- Author: Author\n- [Open in Readavocado](https://readavocado.com/app/My%20Book!!)\n## Highlights\n"
        );
    }

    #[test]
    fn test_header_with_cover() {
        let header = render_header(&collection(1, "Dune", "https://img.example/dune.jpg"));
        assert!(header.starts_with("# Dune\n![cover](https://img.example/dune.jpg)\n## Info\n"));

        // Anything without "http" is not a cover link
        let header = render_header(&collection(1, "Dune", "none"));
        assert!(!header.contains("![cover]"));
    }

    #[test]
    fn test_ensure_document_creates_once() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::new(temp.path().to_path_buf());
        vault.create_folder("Avocado").unwrap();
        let mut mapping = Mapping::new();

        let first = ensure_document(&vault, "Avocado", &collection(42, "My Book!!", ""), &mut mapping)
            .unwrap();
        assert_eq!(
            first,
            EnsuredDocument {
                path: "Avocado/My Book.md".to_string(),
                created: true
            }
        );
        assert_eq!(mapping["Avocado/My Book.md"], MappingEntry::new(CollectionId::Number(42)));

        let second = ensure_document(&vault, "Avocado", &collection(42, "My Book!!", ""), &mut mapping)
            .unwrap();
        assert!(!second.created);
        assert_eq!(mapping.len(), 1);
    }

    #[test]
    fn test_existing_unmapped_document_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::new(temp.path().to_path_buf());
        vault.create_folder("Avocado").unwrap();
        vault.create("Avocado/Dune.md", "my notes").unwrap();
        let mut mapping = Mapping::new();

        let ensured = ensure_document(&vault, "Avocado", &collection(7, "Dune", ""), &mut mapping)
            .unwrap();
        assert!(!ensured.created);
        assert!(mapping.is_empty());
        assert_eq!(
            std::fs::read_to_string(temp.path().join("Avocado/Dune.md")).unwrap(),
            "my notes"
        );
    }

    #[test]
    fn test_folder_at_document_path_fails() {
        let temp = TempDir::new().unwrap();
        let vault = FileVault::new(temp.path().to_path_buf());
        vault.create_folder("Avocado/Dune.md").unwrap();
        let mut mapping = Mapping::new();

        assert!(ensure_document(&vault, "Avocado", &collection(7, "Dune", ""), &mut mapping).is_err());
        assert!(mapping.is_empty());
    }
}

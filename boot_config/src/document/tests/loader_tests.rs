//! Tests for name resolution, stores and the parse cache.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, ensure};
use camino::Utf8Path;
use rstest::{fixture, rstest};

use crate::BootError;
use crate::document::loader::normalise_name;
use crate::document::{DirectoryStore, DocumentLoader, DocumentStore, MemoryStore, SearchPathStore};

#[fixture]
fn loader() -> DocumentLoader {
    let store = MemoryStore::new()
        .with("boot-common.js", "{}")
        .with("herald/all-xmpp.js", "{}")
        .with("herald/java-xmpp.js", "{}")
        .with("composer/python-top.js", r#"{ "bundles": [] }"#);
    DocumentLoader::new(Arc::new(store))
}

#[rstest]
#[case("a.js", Some("a.js"))]
#[case("./herald/../a.js", Some("a.js"))]
#[case("/herald//x.js", Some("herald/x.js"))]
#[case("herald\\x.js", Some("herald/x.js"))]
#[case("../a.js", None)]
#[case("", None)]
#[case(".", None)]
fn normalises_names(#[case] name: &str, #[case] expected: Option<&str>) {
    assert_eq!(normalise_name(name).as_deref(), expected);
}

#[rstest]
#[case("all-xmpp.js", Some("herald/java-xmpp.js"), "herald/all-xmpp.js")]
#[case("boot-common.js", Some("herald/java-xmpp.js"), "boot-common.js")]
#[case("../boot-common.js", Some("herald/java-xmpp.js"), "boot-common.js")]
#[case("composer/python-top.js", Some("boot-common.js"), "composer/python-top.js")]
#[case("herald/all-xmpp.js", None, "herald/all-xmpp.js")]
fn locates_relative_then_root(
    loader: DocumentLoader,
    #[case] name: &str,
    #[case] from: Option<&str>,
    #[case] expected: &str,
) -> Result<()> {
    let found = loader.locate(name, from).map_err(|err| anyhow!("{err}"))?;
    ensure!(found == expected, "{name} from {from:?} located {found}");
    Ok(())
}

#[rstest]
fn missing_name_reports_referencing_document(loader: DocumentLoader) -> Result<()> {
    let Err(err) = loader.locate("nope.js", Some("boot-common.js")) else {
        return Err(anyhow!("nope.js was located"));
    };
    ensure!(
        matches!(
            err.as_ref(),
            BootError::NotFound { name, referenced_from: Some(from) }
                if name == "nope.js" && from == "boot-common.js"
        ),
        "unexpected error {err}"
    );
    Ok(())
}

#[rstest]
fn caches_parsed_documents_until_cleared(loader: DocumentLoader) -> Result<()> {
    ensure!(loader.cached_names().is_empty());
    let first = loader.load("composer/python-top.js").map_err(|err| anyhow!("{err}"))?;
    let second = loader.load("composer/python-top.js").map_err(|err| anyhow!("{err}"))?;
    ensure!(Arc::ptr_eq(&first, &second), "second load reparsed");
    ensure!(loader.cached_names() == ["composer/python-top.js"]);
    loader.clear();
    ensure!(loader.cached_names().is_empty());
    Ok(())
}

#[test]
fn malformed_documents_are_not_cached() -> Result<()> {
    let loader = DocumentLoader::new(Arc::new(MemoryStore::new().with("bad.js", "{ oops")));
    ensure!(loader.load("bad.js").is_err());
    ensure!(loader.cached_names().is_empty());
    Ok(())
}

#[test]
fn directory_store_reads_nested_names() -> Result<()> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    std::fs::create_dir(dir.path().join("herald")).context("create herald dir")?;
    std::fs::write(dir.path().join("herald/all-xmpp.js"), "{ \"a\": 1 }")
        .context("write fragment")?;
    let root = Utf8Path::from_path(dir.path()).ok_or_else(|| anyhow!("non-UTF-8 temp dir"))?;
    let store = DirectoryStore::open(root).map_err(|err| anyhow!("{err}"))?;
    ensure!(store.root() == root);
    ensure!(store.contains("herald/all-xmpp.js"));
    ensure!(store.contains("./herald/../herald/all-xmpp.js"));
    ensure!(!store.contains("herald"), "directories are not documents");
    ensure!(!store.contains("../escape.js"));
    let text = store.read("herald/all-xmpp.js").map_err(|err| anyhow!("{err}"))?;
    ensure!(text.contains("\"a\""));
    let missing = match store.read("absent.js") {
        Ok(text) => return Err(anyhow!("absent.js read as {text}")),
        Err(err) => err,
    };
    ensure!(matches!(*missing, BootError::NotFound { .. }), "{missing}");
    Ok(())
}

#[test]
fn search_path_prefers_earlier_stores() -> Result<()> {
    let search = SearchPathStore::new()
        .with(MemoryStore::new().with("boot.js", "base"))
        .with(
            MemoryStore::new()
                .with("boot.js", "home")
                .with("extra.js", "home-only"),
        );
    ensure!(search.len() == 2);
    ensure!(search.read("boot.js").map_err(|err| anyhow!("{err}"))? == "base");
    ensure!(search.read("extra.js").map_err(|err| anyhow!("{err}"))? == "home-only");
    ensure!(search.read("none.js").is_err());
    Ok(())
}

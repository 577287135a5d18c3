//! Where post links come from: a single argument, a text file or the clipboard.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use postgrab_core::{is_valid_post_link, parse_link_list};

pub fn single_link(link: &str) -> anyhow::Result<Vec<String>> {
    let link = link.trim();
    if !is_valid_post_link(link) {
        bail!("{link:?} is not a post link (expected https://www.reddit.com/r/<name>/comments/<id>/...)");
    }
    Ok(vec![link.to_string()])
}

pub fn links_from_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read link file {}", path.display()))?;
    parse_link_list(&text).with_context(|| {
        format!(
            "invalid link file {}; it should hold one post link per line",
            path.display()
        )
    })
}

pub fn links_from_clipboard() -> anyhow::Result<Vec<String>> {
    let text = arboard::Clipboard::new()
        .and_then(|mut clipboard| clipboard.get_text())
        .context("cannot read the clipboard")?;
    parse_link_list(&text).context("the clipboard should contain one post link per line")
}

#[cfg(test)]
mod tests {
    use super::{links_from_file, single_link};

    #[test]
    fn single_link_is_validated() {
        assert_eq!(
            single_link(" https://www.reddit.com/r/a/comments/b/c/ ").unwrap(),
            vec!["https://www.reddit.com/r/a/comments/b/c/".to_string()]
        );
        assert!(single_link("https://www.reddit.com/r/a/").is_err());
    }

    #[test]
    fn link_file_is_parsed() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("links.txt");
        std::fs::write(
            &path,
            "https://www.reddit.com/r/a/comments/1/x/\nhttps://www.reddit.com/r/b/comments/2/y/\n",
        )
        .unwrap();
        assert_eq!(links_from_file(&path).unwrap().len(), 2);

        std::fs::write(&path, "https://www.reddit.com/r/a/comments/1/x/\nnope\n").unwrap();
        assert!(links_from_file(&path).is_err());
        assert!(links_from_file(&temp.path().join("missing.txt")).is_err());
    }
}

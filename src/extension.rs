//! Extension classification.
//!
//! Maps a file name to the subdirectory it should be organized into.
//! Classification is purely lexical: no filesystem access, no content
//! sniffing.

/// Returns the destination subdirectory name for a file, or `None` when
/// the name carries no usable extension and the file should stay put.
///
/// The destination is the lowercased text after the last `.`. Both the
/// part before that dot and the suffix after it must be non-empty, so
/// `README`, `.gitignore` and `file.` have no destination, while
/// `photo.JPG` maps to `jpg` and `archive.tar.gz` maps to `gz`.
///
/// # Examples
///
/// ```
/// use extidy::extension::destination_dir;
///
/// assert_eq!(destination_dir("notes.TXT"), Some("txt".to_string()));
/// assert_eq!(destination_dir("README"), None);
/// assert_eq!(destination_dir(".gitignore"), None);
/// ```
pub fn destination_dir(file_name: &str) -> Option<String> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

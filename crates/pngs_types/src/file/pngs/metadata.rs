//! Free-form metadata strings stored in the container header.

use crate::file::PngsError;

/// Ordered list of unique ASCII strings.
///
/// Entries keep insertion order. Adding a string that is already present does
/// nothing, so the table never holds duplicates.
///
/// # Examples
///
/// ```
/// use pngs_types::file::pngs::MetadataTable;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut metadata = MetadataTable::new();
/// assert!(metadata.add("author=someone")?);
/// assert!(!metadata.add("author=someone")?);
/// metadata.add("fps=24")?;
///
/// let keys: Vec<&str> = metadata.filter(|e| e.starts_with("fps=")).collect();
/// assert_eq!(keys, ["fps=24"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MetadataTable {
	entries: Vec<String>,
}

impl MetadataTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `entry` unless it is already present.
	///
	/// Returns `true` if the entry was added.
	///
	/// # Errors
	///
	/// Returns [`PngsError::Argument`] if `entry` contains non-ASCII characters;
	/// the table is left unchanged.
	pub fn add(&mut self, entry: impl Into<String>) -> Result<bool, PngsError> {
		let entry = entry.into();
		if !entry.is_ascii() {
			return Err(PngsError::argument(format!("metadata entry {entry:?} is not ASCII")));
		}
		if self.contains(&entry) {
			return Ok(false);
		}
		self.entries.push(entry);
		Ok(true)
	}

	/// Removes `entry`. Returns `false` if it was not present.
	pub fn remove(&mut self, entry: &str) -> bool {
		match self.entries.iter().position(|e| e == entry) {
			Some(index) => {
				self.entries.remove(index);
				true
			}
			None => false,
		}
	}

	/// Removes and returns the entry at `index`.
	pub fn remove_at(&mut self, index: usize) -> Result<String, PngsError> {
		if index >= self.entries.len() {
			return Err(PngsError::index(index, self.entries.len()));
		}
		Ok(self.entries.remove(index))
	}

	/// Returns `true` if `entry` is present.
	pub fn contains(&self, entry: &str) -> bool {
		self.entries.iter().any(|e| e == entry)
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if the table has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the entry at `index`.
	pub fn get(&self, index: usize) -> Option<&str> {
		self.entries.get(index).map(String::as_str)
	}

	/// Iterates over entries in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(String::as_str)
	}

	/// Iterates over the entries matching `predicate`, in insertion order.
	pub fn filter<P>(&self, mut predicate: P) -> impl Iterator<Item = &str>
	where
		P: FnMut(&str) -> bool,
	{
		self.iter().filter(move |e| predicate(e))
	}

	/// Removes every entry.
	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

impl<'a> IntoIterator for &'a MetadataTable {
	type Item = &'a str;
	type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

	fn into_iter(self) -> Self::IntoIter {
		let as_str: fn(&'a String) -> &'a str = String::as_str;
		self.entries.iter().map(as_str)
	}
}

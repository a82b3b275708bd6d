//! Option filtering shared by plugins.

use std::collections::BTreeSet;

/// Prefix of per-import mapping options, e.g. `Mfoo/bar.proto=example.com/foo`.
pub const IMPORT_MAPPING_PREFIX: &str = "M";

/// Sort and deduplicate.
pub fn dedup_and_sort<I>(values: I) -> Vec<String>
where
  I: IntoIterator<Item = String>,
{
  values.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Keep the options relevant to a library importing `imports`.
///
/// Import mappings (`M<file>=<value>`) survive only when `<file>` is actually
/// imported; every other option is kept. The result is sorted and
/// deduplicated.
pub fn filter_options<'a, I>(options: I, imports: &BTreeSet<String>) -> Vec<String>
where
  I: IntoIterator<Item = &'a String>,
{
  dedup_and_sort(
    options
      .into_iter()
      .filter(|option| match option.strip_prefix(IMPORT_MAPPING_PREFIX) {
        Some(mapping) => {
          let filename = mapping.split_once('=').map_or(mapping, |(key, _)| key);
          imports.contains(filename)
        }
        None => true,
      })
      .cloned(),
  )
}

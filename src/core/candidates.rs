use crate::config::FiltersConfig;
use crate::domain::model::{Candidate, LibraryItem};
use std::collections::BTreeSet;

/// Search terms for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub artists: BTreeSet<String>,
    pub creators: BTreeSet<String>,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.artists.len() + self.creators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Artists first, then creators, each tagged with its query type.
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.artists
            .into_iter()
            .map(Candidate::artist)
            .chain(self.creators.into_iter().map(Candidate::creator))
            .collect()
    }
}

fn normalize_lowercase(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

fn normalize_path(path: &str) -> String {
    path.to_lowercase().replace('\\', "/")
}

fn in_ignored_folder(path: &str, folders: &BTreeSet<String>) -> bool {
    let path = normalize_path(path);
    folders
        .iter()
        .any(|folder| path.contains(&format!("/{}/", folder)))
}

pub fn derive_candidates(items: &[LibraryItem], filters: &FiltersConfig) -> CandidateSet {
    let folders: BTreeSet<String> = filters
        .folders_to_ignore
        .iter()
        .map(|f| normalize_path(f.trim()).trim_matches('/').to_string())
        .filter(|f| !f.is_empty())
        .collect();
    let ignored_prefixes = normalize_lowercase(&filters.artists_to_ignore);

    let artists = items
        .iter()
        .filter(|item| !in_ignored_folder(&item.path, &folders))
        .map(|item| item.artist.as_str())
        .filter(|artist| {
            let lowered = artist.trim().to_lowercase();
            !ignored_prefixes
                .iter()
                .any(|prefix| lowered.starts_with(prefix.as_str()))
        })
        .chain(filters.artists_to_include.iter().map(String::as_str))
        .map(|artist| artist.trim().to_string())
        .filter(|artist| !artist.is_empty())
        .collect();

    CandidateSet {
        artists,
        creators: normalize_lowercase(&filters.creators_to_include),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::QueryType;

    fn item(artist: &str, path: &str) -> LibraryItem {
        LibraryItem {
            artist: artist.to_string(),
            path: path.to_string(),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_prefix_ignore_and_include() {
        let filters = FiltersConfig {
            artists_to_ignore: strings(&["foo"]),
            artists_to_include: strings(&["Baz"]),
            ..FiltersConfig::default()
        };

        let forward = vec![
            item("Foo", "/dlc/a.psarc"),
            item("Bar", "/dlc/b.psarc"),
            item("Foobaz", "/dlc/c.psarc"),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let expected: BTreeSet<String> = strings(&["Bar", "Baz"]).into_iter().collect();
        assert_eq!(derive_candidates(&forward, &filters).artists, expected);
        assert_eq!(derive_candidates(&reversed, &filters).artists, expected);
    }

    #[test]
    fn test_ignored_folders_with_mixed_separators() {
        let filters = FiltersConfig {
            folders_to_ignore: strings(&[" Official ", "\\rs1\\"]),
            ..FiltersConfig::default()
        };
        let items = vec![
            item("Kept", "C:\\Games\\dlc\\custom\\kept_p.psarc"),
            item("Official Band", "C:\\Games\\dlc\\official\\o_p.psarc"),
            item("Old Band", "/games/dlc/RS1/old_p.psarc"),
            item("Partial", "/games/dlc/officially/p_p.psarc"),
        ];

        let set = derive_candidates(&items, &filters);
        let expected: BTreeSet<String> = strings(&["Kept", "Partial"]).into_iter().collect();
        assert_eq!(set.artists, expected);
    }

    #[test]
    fn test_trim_dedupe_and_case_sensitive_identity() {
        let items = vec![
            item("  Band ", "/a"),
            item("Band", "/b"),
            item("band", "/c"),
            item("   ", "/d"),
        ];

        let set = derive_candidates(&items, &FiltersConfig::default());
        let expected: BTreeSet<String> = strings(&["Band", "band"]).into_iter().collect();
        assert_eq!(set.artists, expected);
    }

    #[test]
    fn test_creators_are_normalized() {
        let filters = FiltersConfig {
            creators_to_include: strings(&[" Alice", "alice", "BOB ", ""]),
            ..FiltersConfig::default()
        };

        let set = derive_candidates(&[], &filters);
        let expected: BTreeSet<String> = strings(&["alice", "bob"]).into_iter().collect();
        assert_eq!(set.creators, expected);
        assert!(set.artists.is_empty());
    }

    #[test]
    fn test_into_candidates_tags_query_type() {
        let filters = FiltersConfig {
            artists_to_include: strings(&["Band"]),
            creators_to_include: strings(&["maker"]),
            ..FiltersConfig::default()
        };

        let set = derive_candidates(&[], &filters);
        assert_eq!(set.len(), 2);

        let candidates = set.into_candidates();
        assert_eq!(candidates[0].query_type, QueryType::Artist);
        assert_eq!(candidates[0].name, "Band");
        assert_eq!(candidates[1].query_type, QueryType::Creator);
        assert_eq!(candidates[1].name, "maker");
    }
}

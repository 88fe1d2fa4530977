//! MusicBrainz search DTOs
//!
//! These types match what the MusicBrainz `/recording?query=` search returns.
//! Only the fields needed to find a release with artwork are declared.
//!
//! API Reference: https://musicbrainz.org/doc/MusicBrainz_API/Search

use serde::Deserialize;

/// Recording search response
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingSearchResponse {
    #[serde(default)]
    pub recordings: Vec<Recording>,
}

/// One search hit
#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    /// MusicBrainz recording ID
    pub id: String,
    pub title: String,
    /// Search relevance (0-100)
    pub score: Option<u32>,
    /// Releases this recording appears on
    #[serde(default)]
    pub releases: Vec<Release>,
}

/// Release (album/single/EP)
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// MusicBrainz release ID
    pub id: String,
    pub title: String,
    /// Release status (Official, Bootleg, etc.)
    pub status: Option<String>,
}

impl RecordingSearchResponse {
    /// Release IDs worth asking the Cover Art Archive about, best first.
    ///
    /// Hits are taken in score order; within a hit, official releases come
    /// before everything else.
    pub fn candidate_releases(&self, max: usize) -> Vec<String> {
        let mut recordings: Vec<&Recording> = self.recordings.iter().collect();
        recordings.sort_by_key(|r| std::cmp::Reverse(r.score.unwrap_or(0)));

        let mut ids: Vec<String> = Vec::new();
        for recording in recordings {
            let mut releases: Vec<&Release> = recording.releases.iter().collect();
            releases.sort_by_key(|r| r.status.as_deref() != Some("Official"));
            for release in releases {
                if !ids.contains(&release.id) {
                    tracing::trace!(
                        target: "providers",
                        recording = %recording.id,
                        title = %recording.title,
                        release = %release.title,
                        "Candidate release"
                    );
                    ids.push(release.id.clone());
                }
            }
        }
        ids.truncate(max);
        ids
    }
}
